//! X.509 SubjectPublicKeyInfo encoding of RSA public keys, per RFC 3279
//! section 2.3.1: the rsaEncryption algorithm identifier with a NULL
//! parameter, and a BIT STRING wrapping the two-INTEGER `RSAPublicKey`
//! SEQUENCE. Framed as a `PUBLIC KEY` PEM block.

use std::io::{Read, Write};

use der::asn1::{BitString, Null, ObjectIdentifier, Uint};
use der::{Decode, Encode, Sequence};
use num_bigint_dig::BigUint;

use crate::error::{Error, Result};
use crate::pemfile;
use crate::rsa::RsaPublicKey;

/// PEM type label for SubjectPublicKeyInfo blocks.
pub const PEM_LABEL: &str = "PUBLIC KEY";

/// rsaEncryption, `1.2.840.113549.1.1.1`.
pub const RSA_ENCRYPTION_OID: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1");

#[derive(Sequence)]
struct AlgorithmIdentifierDer {
    algorithm: ObjectIdentifier,
    parameters: Null,
}

#[derive(Sequence)]
struct SubjectPublicKeyInfoDer {
    algorithm: AlgorithmIdentifierDer,
    subject_public_key: BitString,
}

#[derive(Sequence)]
struct RsaPublicKeyDer {
    modulus: Uint,
    public_exponent: Uint,
}

/// Serializes `key` as a PEM-framed SubjectPublicKeyInfo.
pub fn write_public(key: &RsaPublicKey, w: &mut dyn Write) -> Result<()> {
    let body = RsaPublicKeyDer {
        modulus: Uint::new(&key.n.to_bytes_be())?,
        public_exponent: Uint::new(&key.e.to_bytes_be())?,
    }
    .to_der()?;

    let spki = SubjectPublicKeyInfoDer {
        algorithm: AlgorithmIdentifierDer {
            algorithm: RSA_ENCRYPTION_OID,
            parameters: Null,
        },
        subject_public_key: BitString::from_bytes(&body)?,
    }
    .to_der()?;

    pemfile::write(PEM_LABEL, &spki, w)
}

/// Parses a PEM-framed SubjectPublicKeyInfo into an RSA public key.
pub fn read_public(r: &mut dyn Read) -> Result<RsaPublicKey> {
    let der = pemfile::read(PEM_LABEL, r)?;
    let spki = SubjectPublicKeyInfoDer::from_der(&der)?;

    if spki.algorithm.algorithm != RSA_ENCRYPTION_OID {
        return Err(Error::InvalidKey("not an RSA public key"));
    }

    let body = spki
        .subject_public_key
        .as_bytes()
        .ok_or(Error::InvalidKey("public key bit string has unused bits"))?;
    let key = RsaPublicKeyDer::from_der(body)?;

    Ok(RsaPublicKey {
        n: BigUint::from_bytes_be(key.modulus.as_bytes()),
        e: BigUint::from_bytes_be(key.public_exponent.as_bytes()),
    })
}
