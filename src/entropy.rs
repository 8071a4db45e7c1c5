//! The toolkit's source of randomness.
//!
//! Every randomized operation takes a caller-supplied CSPRNG; the command
//! line hands in [`rand::rngs::OsRng`], which reads the operating system's
//! entropy pool (`/dev/urandom` on Linux). Prime search and uniform sampling
//! are delegated to the probabilistic generators in `num-bigint-dig`.

use num_bigint_dig::{BigUint, RandBigInt, RandPrime};
use rand::{CryptoRng, RngCore};

use crate::error::{Error, Result};

/// Fills `buf` with random bytes, reporting CSPRNG failure as
/// [`Error::Entropy`].
pub fn fill(rng: &mut (impl CryptoRng + RngCore), buf: &mut [u8]) -> Result<()> {
    rng.try_fill_bytes(buf).map_err(|_| Error::Entropy)
}

/// Returns `n` random bytes.
pub fn random_bytes(rng: &mut (impl CryptoRng + RngCore), n: usize) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; n];
    fill(rng, &mut buf)?;
    Ok(buf)
}

/// Returns an integer sampled uniformly from `[0, bound)`.
pub fn uniform_below(rng: &mut (impl CryptoRng + RngCore), bound: &BigUint) -> BigUint {
    rng.gen_biguint_below(bound)
}

/// Returns a random prime of exactly `bits` bits.
///
/// The underlying generator sets the two most significant bits, so the
/// product of two `bits`-bit primes always has `2 * bits` bits.
pub fn random_prime(rng: &mut (impl CryptoRng + RngCore), bits: usize) -> BigUint {
    rng.gen_prime(bits)
}
