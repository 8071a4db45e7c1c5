//! The secp256k1 curve and ECDSA over it.
//!
//! Domain parameters are those of SEC 2: Recommended Elliptic Curve Domain
//! Parameters, <https://www.secg.org/sec2-v2.pdf>. The curve equation is
//! `y^2 = x^3 + 7` over a ~256-bit prime field.

use std::sync::LazyLock;

use der::asn1::ObjectIdentifier;
use num_bigint_dig::BigUint;
use num_traits::Zero;
use rand::{CryptoRng, RngCore};
use tracing::debug;

use crate::curve::{Curve, Point};
use crate::entropy;
use crate::error::{Error, Result};
use crate::field::Field;
use crate::sha256;

/// Object identifier of secp256k1, `1.3.132.0.10`.
pub const CURVE_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.132.0.10");

/// Byte length of field elements and scalars.
pub const FIELD_LEN: usize = 32;

/// The order of the prime field over which secp256k1 is defined:
/// 2^256 - 2^32 - 2^9 - 2^8 - 2^7 - 2^6 - 2^4 - 1.
const FIELD_ORDER: [u8; 32] = [
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfe, 0xff, 0xff, 0xfc, 0x2f,
];

/// The order of the base point G.
const BASE_ORDER: [u8; 32] = [
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfe,
    0xba, 0xae, 0xdc, 0xe6, 0xaf, 0x48, 0xa0, 0x3b, 0xbf, 0xd2, 0x5e, 0x8c, 0xd0, 0x36, 0x41, 0x41,
];

/// The X coordinate of the base point G.
const BASE_X: [u8; 32] = [
    0x79, 0xbe, 0x66, 0x7e, 0xf9, 0xdc, 0xbb, 0xac, 0x55, 0xa0, 0x62, 0x95, 0xce, 0x87, 0x0b, 0x07,
    0x02, 0x9b, 0xfc, 0xdb, 0x2d, 0xce, 0x28, 0xd9, 0x59, 0xf2, 0x81, 0x5b, 0x16, 0xf8, 0x17, 0x98,
];

/// The Y coordinate of the base point G.
const BASE_Y: [u8; 32] = [
    0x48, 0x3a, 0xda, 0x77, 0x26, 0xa3, 0xc4, 0x65, 0x5d, 0xa4, 0xfb, 0xfc, 0x0e, 0x11, 0x08, 0xa8,
    0xfd, 0x17, 0xb4, 0x48, 0xa6, 0x85, 0x54, 0x19, 0x9c, 0x47, 0xd0, 0x8f, 0xfb, 0x10, 0xd4, 0xb8,
];

static FIELD: LazyLock<Field> = LazyLock::new(|| Field::new(BigUint::from_bytes_be(&FIELD_ORDER)));

static CURVE: LazyLock<Curve<'static>> = LazyLock::new(|| Curve::new(&FIELD, 0, 7));

static BASE: LazyLock<Point<'static>> = LazyLock::new(|| {
    let x = FIELD.element(BigUint::from_bytes_be(&BASE_X));
    let y = FIELD.element(BigUint::from_bytes_be(&BASE_Y));
    CURVE.point(x, y)
});

static ORDER: LazyLock<BigUint> = LazyLock::new(|| BigUint::from_bytes_be(&BASE_ORDER));

/// The scalar field Z_n, for signature arithmetic mod the base order.
static SCALAR: LazyLock<Field> = LazyLock::new(|| Field::new(ORDER.clone()));

/// The secp256k1 curve.
pub fn curve() -> &'static Curve<'static> {
    &CURVE
}

/// The base point G.
pub fn generator() -> &'static Point<'static> {
    &BASE
}

/// The order n of the base point.
pub fn base_order() -> &'static BigUint {
    &ORDER
}

/// Generates a key pair: `d` uniform in `[1, n)`, `Q = dG`.
pub fn generate_keypair(rng: &mut (impl CryptoRng + RngCore)) -> (Point<'static>, BigUint) {
    let d = loop {
        let d = entropy::uniform_below(rng, &ORDER);
        if !d.is_zero() {
            break d;
        }
    };
    let q = BASE.mul(&d);
    debug!("generated secp256k1 key pair");
    (q, d)
}

/// Derives a nonce `k` in `[0, n)` for message hash `h` under key `d`.
///
/// The construction is randomized, not RFC 6979: a buffer of |n| + 8 bytes
/// is assembled from SHA-256 blocks `B_i = SHA256(BE32(i) || d || h || R_i)`
/// with 32 fresh CSPRNG bytes per block, then interpreted big-endian and
/// reduced mod n. The extra 8 bytes keep the bias from the reduction
/// negligible.
fn nonce(
    n: &BigUint,
    d: &BigUint,
    h: &[u8],
    rng: &mut (impl CryptoRng + RngCore),
) -> Result<BigUint> {
    let k_len = n.to_bytes_be().len() + 8;
    let mut buf = Vec::with_capacity(k_len + sha256::DIGEST_LEN);

    let mut i: u32 = 0;
    while buf.len() < k_len {
        let r = entropy::random_bytes(rng, sha256::DIGEST_LEN)?;
        let mut block = Vec::with_capacity(128);
        block.extend_from_slice(&i.to_be_bytes());
        block.extend_from_slice(&d.to_bytes_be());
        block.extend_from_slice(h);
        block.extend_from_slice(&r);
        buf.extend_from_slice(sha256::digest(&block).as_bytes());
        i += 1;
    }

    let k = BigUint::from_bytes_be(&buf[..k_len]);
    Ok(k % n)
}

/// Picks a nonce and computes the corresponding curve point, returning
/// `(k, r)` with `r = x(kG) mod n`. Retries while `k = 0`; the caller
/// retries while `r = 0`.
fn rand_point(h: &[u8], d: &BigUint, rng: &mut (impl CryptoRng + RngCore)) -> Result<(BigUint, BigUint)> {
    let n = &*ORDER;
    let k = loop {
        let k = nonce(n, d, h, rng)?;
        if !k.is_zero() {
            break k;
        }
    };

    let kg = BASE.mul(&k);
    let x = kg.x().expect("kG is finite for 0 < k < n");
    let r = x.value() % n;

    Ok((k, r))
}

/// ECDSA signature generation over the 32-byte message hash `h`.
///
/// Returns `(r, s)` with both in `[1, n)`. No low-s normalization is
/// applied.
pub fn sign(
    h: &[u8],
    d: &BigUint,
    rng: &mut (impl CryptoRng + RngCore),
) -> Result<(BigUint, BigUint)> {
    if h.len() != sha256::DIGEST_LEN {
        return Err(Error::InvalidHashLength);
    }

    loop {
        let (k, r) = loop {
            let (k, r) = rand_point(h, d, rng)?;
            if !r.is_zero() {
                break (k, r);
            }
        };

        // s = (d*r + e) / k mod n
        let e = BigUint::from_bytes_be(h);
        let df = SCALAR.reduce(d);
        let ef = SCALAR.reduce(&e);
        let kf = SCALAR.element(k);
        let rf = SCALAR.element(r.clone());

        let s = df.mul(&rf).add(&ef).div(&kf);
        if !s.is_zero() {
            debug!("produced ecdsa signature");
            return Ok((r, s.into_value()));
        }
    }
}

/// ECDSA signature verification over the 32-byte message hash `h`.
///
/// Implements the standard equation: `w = s^-1 mod n`, `u1 = e*w`,
/// `u2 = r*w`, `X = u1*G + u2*Q`; the signature is valid iff `X` is finite
/// and `x(X) mod n = r`.
pub fn verify(qx: &BigUint, qy: &BigUint, r: &BigUint, s: &BigUint, h: &[u8]) -> Result<bool> {
    let n = &*ORDER;

    if qx >= FIELD.order() || qy >= FIELD.order() {
        return Err(Error::InvalidKey("point coordinate out of range"));
    }
    let x = FIELD.element(qx.clone());
    let y = FIELD.element(qy.clone());
    if !CURVE.contains(&x, &y) {
        return Err(Error::InvalidKey("point not on curve"));
    }
    let q = CURVE.point(x, y);

    if r.is_zero() || r >= n || s.is_zero() || s >= n {
        return Ok(false);
    }

    let e = BigUint::from_bytes_be(h);
    let w = SCALAR.element(s.clone()).inv();
    let u1 = SCALAR.reduce(&e).mul(&w);
    let u2 = SCALAR.element(r.clone()).mul(&w);

    let point = BASE.mul(u1.value()).add(&q.mul(u2.value()));
    match point.x() {
        None => Ok(false),
        Some(x) => Ok(&(x.value() % n) == r),
    }
}
