//! The uniform signature-scheme capability: one trait, implemented once for
//! RSA-PSS and once for secp256k1 ECDSA, over which the command line is a
//! thin multiplexer.

use std::io::{Read, Write};

use num_bigint_dig::BigUint;
use rand::{CryptoRng, RngCore};
use tracing::debug;

use crate::error::{Error, Result};
use crate::sec1::{EcPrivateKey, EcPublicKey, EcdsaSignature};
use crate::{pkcs1, pss, rsa, sec1, secp256k1, sha256, x509};

/// PSS message representatives span one bit less than the modulus.
const RSA_EM_BITS_DELTA: usize = 1;

/// A digital signature scheme with PEM-encoded keys and binary signatures.
///
/// Implementations keep the loaded key material; each operation consumes or
/// produces whole byte streams.
pub trait SignatureScheme {
    /// Generates a key pair of `bits` bits (ignored by schemes with a fixed
    /// group) and writes the private key in PEM format.
    fn new_key(
        &mut self,
        bits: usize,
        rng: &mut (impl CryptoRng + RngCore),
        out: &mut dyn Write,
    ) -> Result<()>;

    /// Loads a PEM private key.
    fn load_private(&mut self, input: &mut dyn Read) -> Result<()>;

    /// Loads a PEM public key.
    fn load_public(&mut self, input: &mut dyn Read) -> Result<()>;

    /// Writes the public half of the loaded private key in PEM format.
    fn write_public(&self, out: &mut dyn Write) -> Result<()>;

    /// Signs the message stream, writing the binary signature.
    fn sign(
        &self,
        rng: &mut (impl CryptoRng + RngCore),
        message: &mut dyn Read,
        out: &mut dyn Write,
    ) -> Result<()>;

    /// Checks the signature stream against the message stream.
    fn verify(&self, signature: &mut dyn Read, message: &mut dyn Read) -> Result<bool>;
}

/// RSA with EMSA-PSS/SHA-256, fixed to 4096-bit keys by default.
pub struct Rsa {
    bits: usize,
    private: Option<rsa::RsaPrivateKey>,
    public: Option<rsa::RsaPublicKey>,
}

impl Default for Rsa {
    fn default() -> Self {
        Rsa::new()
    }
}

impl Rsa {
    /// An empty 4096-bit scheme instance; load or generate a key before use.
    pub fn new() -> Rsa {
        Rsa::with_bits(rsa::KEY_BITS)
    }

    /// An empty scheme instance expecting `bits`-bit moduli.
    pub fn with_bits(bits: usize) -> Rsa {
        Rsa {
            bits,
            private: None,
            public: None,
        }
    }

    /// Keys whose modulus is not exactly `bits/8` bytes long are refused.
    fn modulus_size(&self, n: &BigUint) -> Result<usize> {
        let size = self.bits / 8;
        if n.to_bytes_be().len() != size {
            return Err(Error::InvalidKeySize);
        }
        Ok(size)
    }
}

impl SignatureScheme for Rsa {
    fn new_key(
        &mut self,
        bits: usize,
        rng: &mut (impl CryptoRng + RngCore),
        out: &mut dyn Write,
    ) -> Result<()> {
        let key = rsa::generate(bits, rng);
        pkcs1::write_private(&key, out)?;
        self.bits = bits;
        self.private = Some(key);
        Ok(())
    }

    fn load_private(&mut self, input: &mut dyn Read) -> Result<()> {
        self.private = Some(pkcs1::read_private(input)?);
        Ok(())
    }

    fn load_public(&mut self, input: &mut dyn Read) -> Result<()> {
        self.public = Some(x509::read_public(input)?);
        Ok(())
    }

    fn write_public(&self, out: &mut dyn Write) -> Result<()> {
        let key = self
            .private
            .as_ref()
            .ok_or(Error::InvalidKey("no private key loaded"))?;
        x509::write_public(&key.public_key(), out)
    }

    fn sign(
        &self,
        rng: &mut (impl CryptoRng + RngCore),
        message: &mut dyn Read,
        out: &mut dyn Write,
    ) -> Result<()> {
        let key = self
            .private
            .as_ref()
            .ok_or(Error::InvalidKey("no private key loaded"))?;
        let size = self.modulus_size(&key.n)?;
        let em_bits = key.n.bits() - RSA_EM_BITS_DELTA;

        let m_hash = sha256::digest_reader(message)?;
        let em = pss::encode(&m_hash, em_bits, rng)?;
        let m = BigUint::from_bytes_be(&em);

        debug!(size, "signing with RSA-PSS");
        out.write_all(&key.sign_raw(&m, size))?;
        Ok(())
    }

    fn verify(&self, signature: &mut dyn Read, message: &mut dyn Read) -> Result<bool> {
        let key = self
            .public
            .as_ref()
            .ok_or(Error::InvalidKey("no public key loaded"))?;
        let size = self.modulus_size(&key.n)?;
        let em_bits = key.n.bits() - RSA_EM_BITS_DELTA;

        let mut sig = Vec::new();
        signature.read_to_end(&mut sig)?;
        let recovered = key.verify_raw(&sig, size)?;

        // the encoded message spans ceil(em_bits / 8) bytes, which is one
        // less than the modulus width when n's bit length is 8k + 1; any
        // recovered byte above it must be zero
        let em_len = em_bits.div_ceil(8);
        let (prefix, em) = recovered.split_at(size - em_len);
        if prefix.iter().any(|&b| b != 0) {
            return Ok(false);
        }

        let m_hash = sha256::digest_reader(message)?;
        pss::verify(&m_hash, em, em_bits)
    }
}

/// secp256k1 ECDSA with SHA-256.
#[derive(Default)]
pub struct Ecdsa {
    private: Option<EcPrivateKey>,
    public: Option<EcPublicKey>,
}

impl Ecdsa {
    /// An empty scheme instance; load or generate a key before use.
    pub fn new() -> Ecdsa {
        Ecdsa::default()
    }
}

impl SignatureScheme for Ecdsa {
    fn new_key(
        &mut self,
        _bits: usize,
        rng: &mut (impl CryptoRng + RngCore),
        out: &mut dyn Write,
    ) -> Result<()> {
        let (q, d) = secp256k1::generate_keypair(rng);
        let key = EcPrivateKey {
            curve: secp256k1::CURVE_OID,
            d,
            qx: q.x().expect("generated point is finite").value().clone(),
            qy: q.y().expect("generated point is finite").value().clone(),
        };
        sec1::write_private(&key, out)?;
        self.private = Some(key);
        Ok(())
    }

    fn load_private(&mut self, input: &mut dyn Read) -> Result<()> {
        let key = sec1::read_private(input)?;
        if key.curve != secp256k1::CURVE_OID {
            return Err(Error::UnsupportedCurve);
        }
        self.private = Some(key);
        Ok(())
    }

    fn load_public(&mut self, input: &mut dyn Read) -> Result<()> {
        let key = sec1::read_public(input)?;
        if key.curve != secp256k1::CURVE_OID {
            return Err(Error::UnsupportedCurve);
        }
        self.public = Some(key);
        Ok(())
    }

    fn write_public(&self, out: &mut dyn Write) -> Result<()> {
        let key = self
            .private
            .as_ref()
            .ok_or(Error::InvalidKey("no private key loaded"))?;
        let public = EcPublicKey {
            curve: key.curve,
            qx: key.qx.clone(),
            qy: key.qy.clone(),
        };
        sec1::write_public(&public, out)
    }

    fn sign(
        &self,
        rng: &mut (impl CryptoRng + RngCore),
        message: &mut dyn Read,
        out: &mut dyn Write,
    ) -> Result<()> {
        let key = self
            .private
            .as_ref()
            .ok_or(Error::InvalidKey("no private key loaded"))?;

        let h = sha256::digest_reader(message)?;
        let (r, s) = secp256k1::sign(h.as_bytes(), &key.d, rng)?;

        debug!("signing with ECDSA");
        EcdsaSignature { r, s }.write(out)
    }

    fn verify(&self, signature: &mut dyn Read, message: &mut dyn Read) -> Result<bool> {
        let key = self
            .public
            .as_ref()
            .ok_or(Error::InvalidKey("no public key loaded"))?;

        let h = sha256::digest_reader(message)?;
        let sig = EcdsaSignature::read(signature)?;
        secp256k1::verify(&key.qx, &key.qy, &sig.r, &sig.s, h.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;
    use std::io::Cursor;

    #[test]
    fn ecdsa_full_cycle() {
        let mut scheme = Ecdsa::new();
        let mut priv_pem = Vec::new();
        scheme.new_key(0, &mut OsRng, &mut priv_pem).unwrap();

        let mut pub_pem = Vec::new();
        scheme.write_public(&mut pub_pem).unwrap();

        let mut signature = Vec::new();
        scheme
            .sign(&mut OsRng, &mut Cursor::new(b"hello".to_vec()), &mut signature)
            .unwrap();

        let mut verifier = Ecdsa::new();
        verifier.load_public(&mut Cursor::new(pub_pem)).unwrap();
        assert!(verifier
            .verify(
                &mut Cursor::new(signature.clone()),
                &mut Cursor::new(b"hello".to_vec()),
            )
            .unwrap());
        assert!(!verifier
            .verify(
                &mut Cursor::new(signature),
                &mut Cursor::new(b"world".to_vec()),
            )
            .unwrap());
    }

    #[test]
    fn ecdsa_reload_private_key() {
        let mut scheme = Ecdsa::new();
        let mut priv_pem = Vec::new();
        scheme.new_key(0, &mut OsRng, &mut priv_pem).unwrap();

        let mut reloaded = Ecdsa::new();
        reloaded
            .load_private(&mut Cursor::new(priv_pem))
            .unwrap();
        assert_eq!(reloaded.private, scheme.private);
    }

    #[test]
    fn ecdsa_rejects_foreign_curve() {
        // a syntactically valid key naming prime256v1 instead of secp256k1
        let (q, d) = secp256k1::generate_keypair(&mut OsRng);
        let key = EcPrivateKey {
            curve: der::asn1::ObjectIdentifier::new_unwrap("1.2.840.10045.3.1.7"),
            d,
            qx: q.x().unwrap().value().clone(),
            qy: q.y().unwrap().value().clone(),
        };
        let mut pem = Vec::new();
        sec1::write_private(&key, &mut pem).unwrap();

        let err = Ecdsa::new()
            .load_private(&mut Cursor::new(pem))
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedCurve));
    }

    #[test]
    fn sign_without_key_fails() {
        let scheme = Ecdsa::new();
        let err = scheme
            .sign(
                &mut OsRng,
                &mut Cursor::new(Vec::<u8>::new()),
                &mut Vec::new(),
            )
            .unwrap_err();
        assert!(matches!(err, Error::InvalidKey(_)));
    }

    // RSA façade tests with a full-size key live in tests/rsa.rs; small
    // keys keep these quick
    #[test]
    fn rsa_full_cycle_small_key() {
        // 1024 bits is the smallest convenient size that still fits the
        // 66-byte PSS minimum
        let mut scheme = Rsa::with_bits(1024);
        let mut priv_pem = Vec::new();
        scheme.new_key(1024, &mut OsRng, &mut priv_pem).unwrap();

        let mut pub_pem = Vec::new();
        scheme.write_public(&mut pub_pem).unwrap();

        let mut signature = Vec::new();
        scheme
            .sign(&mut OsRng, &mut Cursor::new(b"hello".to_vec()), &mut signature)
            .unwrap();
        assert_eq!(signature.len(), 128);

        let mut verifier = Rsa::with_bits(1024);
        verifier.load_public(&mut Cursor::new(pub_pem)).unwrap();
        assert!(verifier
            .verify(
                &mut Cursor::new(signature.clone()),
                &mut Cursor::new(b"hello".to_vec()),
            )
            .unwrap());
        assert!(!verifier
            .verify(
                &mut Cursor::new(signature),
                &mut Cursor::new(b"world".to_vec()),
            )
            .unwrap());
    }

    #[test]
    fn rsa_rejects_undersized_modulus() {
        let key = rsa::generate(512, &mut OsRng);
        let mut pem = Vec::new();
        pkcs1::write_private(&key, &mut pem).unwrap();

        // a 4096-bit scheme must refuse the 512-bit key at sign time
        let mut scheme = Rsa::new();
        scheme.load_private(&mut Cursor::new(pem)).unwrap();
        let err = scheme
            .sign(&mut OsRng, &mut Cursor::new(b"x".to_vec()), &mut Vec::new())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidKeySize));
    }
}
