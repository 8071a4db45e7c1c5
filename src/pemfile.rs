//! PEM framing shared by the key codecs: RFC 7468 base64 bodies wrapped at
//! 64 columns, no headers.

use std::io::{Read, Write};

use pem_rfc7468::LineEnding;

use crate::error::{Error, Result};

/// Encodes `der` under the given type label and writes the PEM block.
pub(crate) fn write(label: &'static str, der: &[u8], w: &mut dyn Write) -> Result<()> {
    let pem = pem_rfc7468::encode_string(label, LineEnding::LF, der)?;
    w.write_all(pem.as_bytes())?;
    Ok(())
}

/// Reads everything from `r` and decodes a single PEM block, requiring the
/// given type label.
pub(crate) fn read(label: &'static str, r: &mut dyn Read) -> Result<Vec<u8>> {
    let mut body = Vec::new();
    r.read_to_end(&mut body)?;

    let (found, der) = pem_rfc7468::decode_vec(&body)?;
    if found != label {
        return Err(Error::UnexpectedPemType {
            expected: label,
            found: found.to_owned(),
        });
    }

    Ok(der)
}
