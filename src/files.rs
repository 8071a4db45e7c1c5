//! File helpers for the command line: exclusive 0600 output creation, and
//! the permission gate on private-key files.

use std::fs::File;
use std::io::{self, Read, Write};
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::Path;

use crate::error::{Error, Result};

/// Modes under which a private-key file is acceptable.
const KEY_MODES: [u32; 2] = [0o400, 0o600];

/// Opens `path` for reading, or stdin when no path is given.
pub fn open_input(path: Option<&Path>) -> Result<Box<dyn Read>> {
    match path {
        Some(path) => Ok(Box::new(File::open(path)?)),
        None => Ok(Box::new(io::stdin())),
    }
}

/// Creates `path` exclusively with mode 0600 for writing, or hands back
/// stdout when no path is given. Existing files are never overwritten.
pub fn create_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = File::options()
                .write(true)
                .create_new(true)
                .mode(0o600)
                .open(path)?;
            Ok(Box::new(file))
        }
        None => Ok(Box::new(io::stdout())),
    }
}

/// Opens a private-key file, refusing modes other than 0400 and 0600.
pub fn open_key(path: &Path) -> Result<File> {
    let file = File::open(path)?;
    let mode = file.metadata()?.permissions().mode() & 0o7777;
    if !KEY_MODES.contains(&mode) {
        return Err(Error::InsecureKeyFile(path.to_owned()));
    }
    Ok(file)
}

/// Opens a private-key source: a permission-checked file, or stdin when no
/// path is given.
pub fn open_key_input(path: Option<&Path>) -> Result<Box<dyn Read>> {
    match path {
        Some(path) => Ok(Box::new(open_key(path)?)),
        None => Ok(Box::new(io::stdin())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    #[test]
    fn key_modes_are_enforced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("key.pem");
        fs::write(&path, b"secret").unwrap();

        for mode in [0o600u32, 0o400] {
            fs::set_permissions(&path, fs::Permissions::from_mode(mode)).unwrap();
            assert!(open_key(&path).is_ok(), "mode {mode:o}");
        }
        for mode in [0o644u32, 0o640, 0o444, 0o660, 0o700] {
            fs::set_permissions(&path, fs::Permissions::from_mode(mode)).unwrap();
            let err = open_key(&path).unwrap_err();
            assert!(matches!(err, Error::InsecureKeyFile(_)), "mode {mode:o}");
        }
    }

    #[test]
    fn outputs_are_created_0600_and_exclusive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.bin");

        {
            let mut out = create_output(Some(path.as_path())).unwrap();
            out.write_all(b"payload").unwrap();
        }
        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o7777;
        assert_eq!(mode, 0o600);

        assert!(create_output(Some(path.as_path())).is_err());
    }

    #[test]
    fn missing_input_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        match open_input(Some(missing.as_path())) {
            Err(err) => assert!(matches!(err, Error::Io(_))),
            Ok(_) => panic!("expected an error"),
        }
    }
}
