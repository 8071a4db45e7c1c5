//! Error types surfaced by the toolkit.

use std::path::PathBuf;

use thiserror::Error;

/// Result type with the toolkit's [`Error`].
pub type Result<T> = core::result::Result<T, Error>;

/// All failure modes of the cryptographic core and its I/O surface.
///
/// Library code never aborts the process: every error propagates to the
/// caller as one of these kinds, and the command-line front end translates
/// them into a message on stderr and a nonzero exit status.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Command-line usage the argument parser accepts but the tool forbids,
    /// such as repeating a single-use option.
    #[error("{0}")]
    InvalidArguments(&'static str),

    /// Failure opening, reading, writing, or closing a byte stream.
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// A private-key file whose mode is neither 0400 nor 0600.
    #[error("refusing to work with insecure key file {}", .0.display())]
    InsecureKeyFile(PathBuf),

    /// Malformed PEM framing.
    #[error("pem decode error: {0}")]
    Pem(#[from] pem_rfc7468::Error),

    /// A well-formed PEM block with the wrong type label.
    #[error("invalid pem: expected {expected:?}, found {found:?}")]
    UnexpectedPemType {
        /// The label the caller required.
        expected: &'static str,
        /// The label actually present in the input.
        found: String,
    },

    /// Malformed ASN.1 DER.
    #[error("asn1 decode error: {0}")]
    Asn1(#[from] der::Error),

    /// A structurally valid encoding carrying an unusable key.
    #[error("invalid key: {0}")]
    InvalidKey(&'static str),

    /// An RSA modulus whose byte length does not match the expected size.
    #[error("invalid key size")]
    InvalidKeySize,

    /// A signature that cannot be interpreted at all.
    #[error("{0}")]
    InvalidSignature(&'static str),

    /// An EC key referencing a curve other than secp256k1.
    #[error("unsupported curve")]
    UnsupportedCurve,

    /// A digest of the wrong length handed to ECDSA signing.
    #[error("invalid hash length")]
    InvalidHashLength,

    /// The operating system CSPRNG failed or returned short.
    #[error("entropy failure")]
    Entropy,

    /// More input than the SHA-256 round cap admits.
    #[error("input too long")]
    InputTooLong,

    /// EMSA-PSS encoding constraints cannot be met.
    #[error("encoding error")]
    PssEncode,
}
