//! The `godot` command: a thin multiplexer over the signature schemes and
//! the SHA-256 digester.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use rand::rngs::OsRng;
use tracing_subscriber::EnvFilter;

use godot::scheme::{Ecdsa, Rsa, SignatureScheme};
use godot::{files, rsa, sha256, Error, Result};

// file options collect every occurrence; at_most_one()/exactly_one() refuse
// repeats after parsing

#[derive(Parser)]
#[command(name = "godot", about = "godot implements digital signature primitives")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Perform secp256k1 ECDSA operations
    Ecdsa {
        #[command(subcommand)]
        op: KeyOp,
    },
    /// Perform 4096-bit RSA operations
    Rsa {
        #[command(subcommand)]
        op: KeyOp,
    },
    /// Calculate a SHA-256 digest
    Sha256 {
        /// Write the digest in binary instead of hexadecimal format
        #[arg(short, long)]
        binary: bool,
        /// Read data from a file instead of stdin
        #[arg(short = 'i', long = "in", value_name = "FILE")]
        input: Vec<PathBuf>,
        /// Write data to a file instead of stdout
        #[arg(short = 'o', long = "out", value_name = "FILE")]
        output: Vec<PathBuf>,
    },
    /// Print godot's version number
    Version,
}

#[derive(Subcommand)]
enum KeyOp {
    /// Generate a private key
    New {
        /// Write the key to a file instead of stdout
        #[arg(short = 'o', long = "out", value_name = "FILE")]
        output: Vec<PathBuf>,
    },
    /// Derive the public key of a private key
    Pub {
        /// Read the private key from a file instead of stdin
        #[arg(short = 'i', long = "in", value_name = "FILE")]
        input: Vec<PathBuf>,
        /// Write the public key to a file instead of stdout
        #[arg(short = 'o', long = "out", value_name = "FILE")]
        output: Vec<PathBuf>,
    },
    /// Sign a message
    Sign {
        /// The private key to sign with
        #[arg(short = 'k', long = "key", value_name = "FILE", required = true)]
        key: Vec<PathBuf>,
        /// Read the message from a file instead of stdin
        #[arg(short = 'i', long = "in", value_name = "FILE")]
        input: Vec<PathBuf>,
        /// Write the signature to a file instead of stdout
        #[arg(short = 'o', long = "out", value_name = "FILE")]
        output: Vec<PathBuf>,
    },
    /// Verify a signature
    Verify {
        /// The public key to verify against
        #[arg(short = 'k', long = "key", value_name = "FILE", required = true)]
        key: Vec<PathBuf>,
        /// The signature to verify
        #[arg(short = 's', long = "sig", value_name = "FILE", required = true)]
        sig: Vec<PathBuf>,
        /// Read the message from a file instead of stdin
        #[arg(short = 'i', long = "in", value_name = "FILE")]
        input: Vec<PathBuf>,
    },
}

/// Rejects repeated use of a single-occurrence file option.
fn at_most_one(mut paths: Vec<PathBuf>) -> Result<Option<PathBuf>> {
    if paths.len() > 1 {
        return Err(Error::InvalidArguments("multiple use of options [ikos]"));
    }
    Ok(paths.pop())
}

/// Like [`at_most_one`], for options clap already requires to be present.
fn exactly_one(paths: Vec<PathBuf>) -> Result<PathBuf> {
    at_most_one(paths)?.ok_or(Error::InvalidArguments("missing file option"))
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // usage errors exit 1, like every other failure; help and completions
    // stay on stdout with status 0
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match run(cli.command) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<ExitCode> {
    match command {
        Command::Ecdsa { op } => run_key_op(Ecdsa::new(), 0, op),
        Command::Rsa { op } => run_key_op(Rsa::new(), rsa::KEY_BITS, op),
        Command::Sha256 {
            binary,
            input,
            output,
        } => run_sha256(binary, at_most_one(input)?, at_most_one(output)?),
        Command::Version => {
            println!("godot {}", env!("CARGO_PKG_VERSION"));
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn run_key_op(mut scheme: impl SignatureScheme, bits: usize, op: KeyOp) -> Result<ExitCode> {
    match op {
        KeyOp::New { output } => {
            let output = at_most_one(output)?;
            let mut out = files::create_output(output.as_deref())?;
            scheme.new_key(bits, &mut OsRng, &mut out)?;
        }
        KeyOp::Pub { input, output } => {
            let input = at_most_one(input)?;
            let output = at_most_one(output)?;
            let mut input = files::open_key_input(input.as_deref())?;
            scheme.load_private(&mut input)?;
            let mut out = files::create_output(output.as_deref())?;
            scheme.write_public(&mut out)?;
        }
        KeyOp::Sign { key, input, output } => {
            let key = exactly_one(key)?;
            let input = at_most_one(input)?;
            let output = at_most_one(output)?;
            let mut key = files::open_key(&key)?;
            scheme.load_private(&mut key)?;
            let mut message = files::open_input(input.as_deref())?;
            let mut out = files::create_output(output.as_deref())?;
            scheme.sign(&mut OsRng, &mut message, &mut out)?;
        }
        KeyOp::Verify { key, sig, input } => {
            let key = exactly_one(key)?;
            let sig = exactly_one(sig)?;
            let input = at_most_one(input)?;
            let mut key = files::open_input(Some(key.as_path()))?;
            scheme.load_public(&mut key)?;
            let mut sig = files::open_input(Some(sig.as_path()))?;
            let mut message = files::open_input(input.as_deref())?;
            return if scheme.verify(&mut sig, &mut message)? {
                println!("good signature");
                Ok(ExitCode::SUCCESS)
            } else {
                println!("bad signature");
                Ok(ExitCode::FAILURE)
            };
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn run_sha256(
    binary: bool,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<ExitCode> {
    let mut input = files::open_input(input.as_deref())?;
    let digest = sha256::digest_reader(&mut input)?;

    let mut out = files::create_output(output.as_deref())?;
    if binary {
        out.write_all(digest.as_ref())?;
    } else {
        writeln!(out, "{}", hex::encode(digest.as_ref()))?;
    }

    Ok(ExitCode::SUCCESS)
}
