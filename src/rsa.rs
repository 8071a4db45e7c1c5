//! The core of the RSA algorithm: key generation and the raw modular
//! exponentiation underneath signing and verification. Padding lives in
//! [`crate::pss`], encodings in [`crate::pkcs1`] and [`crate::x509`].

use num_bigint_dig::{BigUint, ModInverse};
use rand::{CryptoRng, RngCore};
use tracing::debug;
use zeroize::Zeroize;

use crate::entropy;
use crate::error::{Error, Result};

/// The fixed public exponent.
pub const PUBLIC_EXPONENT: u32 = 65537;

/// The key size the toolkit operates at.
pub const KEY_BITS: usize = 4096;

/// An RSA private key with CRT auxiliary parameters, as laid out in
/// RFC 3447 A.1.2 (version 0).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RsaPrivateKey {
    /// Modulus n = pq.
    pub n: BigUint,
    /// Public exponent e.
    pub e: BigUint,
    /// Private exponent d = e^-1 mod phi(n).
    pub d: BigUint,
    /// First prime factor.
    pub p: BigUint,
    /// Second prime factor.
    pub q: BigUint,
    /// d mod (p - 1).
    pub dp: BigUint,
    /// d mod (q - 1).
    pub dq: BigUint,
    /// q^-1 mod p.
    pub qinv: BigUint,
}

/// An RSA public key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RsaPublicKey {
    /// Modulus n.
    pub n: BigUint,
    /// Public exponent e.
    pub e: BigUint,
}

impl Drop for RsaPrivateKey {
    fn drop(&mut self) {
        self.d.zeroize();
        self.p.zeroize();
        self.q.zeroize();
        self.dp.zeroize();
        self.dq.zeroize();
        self.qinv.zeroize();
    }
}

impl RsaPrivateKey {
    /// The public half.
    pub fn public_key(&self) -> RsaPublicKey {
        RsaPublicKey {
            n: self.n.clone(),
            e: self.e.clone(),
        }
    }

    /// `s = m^d mod n`, serialized as exactly `size` big-endian bytes.
    ///
    /// The caller guarantees `m < n`; the PSS representative always is.
    pub fn sign_raw(&self, m: &BigUint, size: usize) -> Vec<u8> {
        to_fixed_be(&m.modpow(&self.d, &self.n), size)
    }
}

impl RsaPublicKey {
    /// Recovers the message representative `m = s^e mod n` from a raw
    /// signature, serialized as exactly `size` big-endian bytes.
    pub fn verify_raw(&self, sig: &[u8], size: usize) -> Result<Vec<u8>> {
        if sig.len() != size {
            return Err(Error::InvalidSignature("invalid signature size"));
        }
        let s = BigUint::from_bytes_be(sig);
        Ok(to_fixed_be(&s.modpow(&self.e, &self.n), size))
    }
}

/// Generates a fresh RSA key of exactly `bits` bits with e = 65537.
///
/// Two independent `bits/2`-bit primes are drawn from the probabilistic
/// generator; the pair is rejected and redrawn if the primes coincide, if
/// the modulus falls short of `bits` bits, or if e is not invertible mod
/// phi = (p-1)(q-1).
pub fn generate(bits: usize, rng: &mut (impl CryptoRng + RngCore)) -> RsaPrivateKey {
    assert!(bits >= 64 && bits % 2 == 0, "unusable RSA key size");
    let e = BigUint::from(PUBLIC_EXPONENT);

    loop {
        let p = entropy::random_prime(rng, bits / 2);
        let q = entropy::random_prime(rng, bits / 2);
        if p == q {
            continue;
        }

        let n = &p * &q;
        if n.bits() != bits {
            continue;
        }

        let p_minus = &p - 1u32;
        let q_minus = &q - 1u32;
        let phi = &p_minus * &q_minus;

        let d = match (&e).mod_inverse(&phi).and_then(|d| d.to_biguint()) {
            Some(d) => d,
            None => continue,
        };

        let dp = &d % &p_minus;
        let dq = &d % &q_minus;
        let qinv = (&q)
            .mod_inverse(&p)
            .and_then(|x| x.to_biguint())
            .expect("distinct primes are coprime");

        debug!(bits, "generated RSA key pair");
        return RsaPrivateKey {
            n,
            e,
            d,
            p,
            q,
            dp,
            dq,
            qinv,
        };
    }
}

/// Big-endian serialization left-padded with zeros to `size` bytes.
///
/// Panics if the value does not fit, which would mean a representative at
/// least as large as the modulus.
fn to_fixed_be(x: &BigUint, size: usize) -> Vec<u8> {
    let bytes = x.to_bytes_be();
    assert!(bytes.len() <= size, "value exceeds its fixed width");
    let mut out = vec![0u8; size - bytes.len()];
    out.extend_from_slice(&bytes);
    out
}
