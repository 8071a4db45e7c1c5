//! EMSA-PSS encoding and verification, PKCS#1 v2.2 section 9.1.
//!
//! The mask generation function is MGF1 from section B.2.1 of the same
//! document. SHA-256 is the digest mechanism throughout, and the salt is one
//! digest long. The data block carries the standard `PS || 0x01 || salt`
//! layout, so signatures produced here verify under any conforming PSS
//! implementation.

use rand::{CryptoRng, RngCore};
use subtle::ConstantTimeEq;

use crate::entropy;
use crate::error::{Error, Result};
use crate::sha256::{self, Digest, DIGEST_LEN};

/// Salt length in bytes, fixed to one SHA-256 digest.
pub const SALT_LEN: usize = DIGEST_LEN;

/// MGF1 (section B.2.1): the concatenation of `SHA256(seed || BE32(i))` for
/// `i = 0, 1, ...`, truncated to `mask_len` bytes.
fn mgf1(seed: &[u8], mask_len: usize) -> Vec<u8> {
    let rounds = mask_len.div_ceil(DIGEST_LEN);
    let mut t = Vec::with_capacity(rounds * DIGEST_LEN);

    for i in 0..rounds as u32 {
        let mut block = Vec::with_capacity(seed.len() + 4);
        block.extend_from_slice(seed);
        block.extend_from_slice(&i.to_be_bytes());
        t.extend_from_slice(sha256::digest(&block).as_bytes());
    }

    t.truncate(mask_len);
    t
}

/// `M' = 8 zero bytes || mHash || salt` (step 5 of 9.1.1), rehashed to H.
fn salted_hash(m_hash: &Digest, salt: &[u8]) -> Digest {
    let mut m = Vec::with_capacity(8 + DIGEST_LEN + salt.len());
    m.extend_from_slice(&[0u8; 8]);
    m.extend_from_slice(m_hash.as_bytes());
    m.extend_from_slice(salt);
    sha256::digest(&m)
}

/// The EMSA-PSS encoding operation (section 9.1.1).
///
/// Returns the `ceil(em_bits / 8)`-byte encoded message EM; the caller
/// interprets it as a big-endian message representative.
pub fn encode(
    m_hash: &Digest,
    em_bits: usize,
    rng: &mut (impl CryptoRng + RngCore),
) -> Result<Vec<u8>> {
    let em_len = em_bits.div_ceil(8);
    if em_len < DIGEST_LEN + SALT_LEN + 2 {
        return Err(Error::PssEncode);
    }

    let salt = entropy::random_bytes(rng, SALT_LEN)?;
    let h = salted_hash(m_hash, &salt);

    // DB = PS || 0x01 || salt, masked with MGF1(H)
    let db_len = em_len - DIGEST_LEN - 1;
    let mut db = vec![0u8; db_len];
    db[db_len - SALT_LEN - 1] = 0x01;
    db[db_len - SALT_LEN..].copy_from_slice(&salt);

    for (b, m) in db.iter_mut().zip(mgf1(h.as_bytes(), db_len)) {
        *b ^= m;
    }

    // step 11: clear the leftmost 8*emLen - emBits bits of maskedDB
    let top_bits = 8 * em_len - em_bits;
    if top_bits > 0 {
        db[0] &= 0xff >> top_bits;
    }

    let mut em = db;
    em.extend_from_slice(h.as_bytes());
    em.push(0xbc);

    Ok(em)
}

/// The EMSA-PSS verification operation (section 9.1.2).
///
/// `em` must be the full `ceil(em_bits / 8)`-byte encoded message. Any
/// structural inconsistency, and a salted-hash mismatch alike, yields
/// `Ok(false)`; the final comparison is constant-time.
pub fn verify(m_hash: &Digest, em: &[u8], em_bits: usize) -> Result<bool> {
    let em_len = em_bits.div_ceil(8);
    if em_len < DIGEST_LEN + SALT_LEN + 2 {
        return Err(Error::PssEncode);
    }
    if em.len() != em_len || em[em_len - 1] != 0xbc {
        return Ok(false);
    }

    let db_len = em_len - DIGEST_LEN - 1;
    let masked_db = &em[..db_len];
    let h = &em[db_len..em_len - 1];

    let top_bits = 8 * em_len - em_bits;
    if top_bits > 0 && masked_db[0] >> (8 - top_bits) != 0 {
        return Ok(false);
    }

    let mut db = mgf1(h, db_len);
    for (b, m) in db.iter_mut().zip(masked_db) {
        *b ^= m;
    }
    if top_bits > 0 {
        db[0] &= 0xff >> top_bits;
    }

    // PS must be all zero, then the 0x01 separator, then the salt
    let ps_len = db_len - SALT_LEN - 1;
    if db[..ps_len].iter().any(|&b| b != 0) || db[ps_len] != 0x01 {
        return Ok(false);
    }
    let salt = &db[ps_len + 1..];

    let expected = salted_hash(m_hash, salt);
    Ok(h.ct_eq(expected.as_bytes()).into())
}
