//! Digital signature primitives: 4096-bit RSA with EMSA-PSS and secp256k1
//! ECDSA, both over SHA-256, with PEM-encoded keys and binary signatures.
//!
//! The crate is organized bottom-up. [`sha256`] implements FIPS 180-4;
//! [`field`] and [`curve`] provide generic prime-field and short-Weierstrass
//! arithmetic over which [`secp256k1`] is instantiated; [`rsa`] and [`pss`]
//! carry the RSA core and its padding; [`pkcs1`], [`x509`] and [`sec1`] are
//! the ASN.1/PEM codecs. [`scheme`] ties each signature algorithm into one
//! uniform capability consumed by the `godot` binary.
//!
//! Nothing here attempts constant-time execution beyond digest comparison;
//! the toolkit trades side-channel hardening for clarity.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod curve;
pub mod entropy;
mod error;
pub mod field;
pub mod files;
mod pemfile;
pub mod pkcs1;
pub mod pss;
pub mod rsa;
pub mod scheme;
pub mod sec1;
pub mod secp256k1;
pub mod sha256;
pub mod x509;

pub use error::{Error, Result};
