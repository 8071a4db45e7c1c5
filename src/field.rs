//! Prime field arithmetic.
//!
//! A [`Field`] is defined by its (prime) order; an [`Element`] borrows the
//! field it belongs to and keeps its value reduced into `[0, p)`. Range and
//! cross-field violations are programming errors and panic.

use core::fmt;

use num_bigint_dig::{BigUint, ModInverse};
use num_traits::Zero;

/// A prime field of order `p`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    p: BigUint,
}

impl Field {
    /// Defines the field of order `p`. The order must be prime; this is the
    /// caller's responsibility and is not verified here.
    pub fn new(p: BigUint) -> Field {
        assert!(p >= BigUint::from(3u32), "field order must be at least 3");
        Field { p }
    }

    /// The field order.
    pub fn order(&self) -> &BigUint {
        &self.p
    }

    /// Wraps `v` as an element. Panics if `v >= p`.
    pub fn element(&self, v: BigUint) -> Element<'_> {
        assert!(v < self.p, "integer out of field range");
        Element { field: self, v }
    }

    /// Element from a small constant.
    pub fn from_u64(&self, v: u64) -> Element<'_> {
        self.element(BigUint::from(v))
    }

    /// Reduces an arbitrary integer into the field.
    pub fn reduce(&self, v: &BigUint) -> Element<'_> {
        Element {
            field: self,
            v: v % &self.p,
        }
    }

    /// The additive identity.
    pub fn zero(&self) -> Element<'_> {
        Element {
            field: self,
            v: BigUint::zero(),
        }
    }
}

/// An element of a [`Field`], always in `[0, p)`.
#[derive(Clone, Debug)]
pub struct Element<'f> {
    field: &'f Field,
    v: BigUint,
}

impl<'f> Element<'f> {
    fn check_field(&self, rhs: &Element<'f>) {
        assert!(
            core::ptr::eq(self.field, rhs.field) || self.field == rhs.field,
            "mixed elements of distinct fields"
        );
    }

    /// The element's value.
    pub fn value(&self) -> &BigUint {
        &self.v
    }

    /// Consumes the element, returning its value.
    pub fn into_value(self) -> BigUint {
        self.v
    }

    /// Whether this is the additive identity.
    pub fn is_zero(&self) -> bool {
        self.v.is_zero()
    }

    /// `self + rhs (mod p)`.
    pub fn add(&self, rhs: &Element<'f>) -> Element<'f> {
        self.check_field(rhs);
        self.field.reduce(&(&self.v + &rhs.v))
    }

    /// `self - rhs (mod p)`, reduced into `[0, p)`.
    pub fn sub(&self, rhs: &Element<'f>) -> Element<'f> {
        self.check_field(rhs);
        // rhs.v < p, so adding p first never underflows
        self.field.reduce(&(&self.v + &self.field.p - &rhs.v))
    }

    /// `self * rhs (mod p)`.
    pub fn mul(&self, rhs: &Element<'f>) -> Element<'f> {
        self.check_field(rhs);
        self.field.reduce(&(&self.v * &rhs.v))
    }

    /// `self ^ e (mod p)`.
    pub fn pow(&self, e: &BigUint) -> Element<'f> {
        Element {
            field: self.field,
            v: self.v.modpow(e, &self.field.p),
        }
    }

    /// The additive inverse.
    pub fn neg(&self) -> Element<'f> {
        self.field.reduce(&(&self.field.p - &self.v))
    }

    /// The multiplicative inverse, by the extended Euclidean algorithm.
    ///
    /// Panics if `gcd(self, p) != 1`, which cannot happen for a nonzero
    /// element of a prime field.
    pub fn inv(&self) -> Element<'f> {
        let x = (&self.v)
            .mod_inverse(&self.field.p)
            .and_then(|x| x.to_biguint())
            .expect("bogus parameters in element inversion");
        self.field.element(x)
    }

    /// `self / rhs (mod p)`, defined as multiplication by the inverse.
    pub fn div(&self, rhs: &Element<'f>) -> Element<'f> {
        self.mul(&rhs.inv())
    }
}

impl PartialEq for Element<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.check_field(other);
        self.v == other.v
    }
}

impl Eq for Element<'_> {}

impl fmt::Display for Element<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn f17() -> Field {
        Field::new(BigUint::from(17u32))
    }

    #[test]
    fn reduction_into_range() {
        let f = f17();
        assert_eq!(f.reduce(&BigUint::from(40u32)), f.from_u64(6));
        assert_eq!(f.from_u64(9).add(&f.from_u64(12)), f.from_u64(4));
        assert_eq!(f.from_u64(3).sub(&f.from_u64(12)), f.from_u64(8));
        assert_eq!(f.from_u64(5).mul(&f.from_u64(7)), f.from_u64(1));
    }

    #[test]
    fn negation() {
        let f = f17();
        assert_eq!(f.from_u64(5).neg(), f.from_u64(12));
        assert_eq!(f.zero().neg(), f.zero());
    }

    #[test]
    fn inverse_round_trip() {
        let f = f17();
        for v in 1..17u64 {
            let e = f.from_u64(v);
            assert_eq!(e.mul(&e.inv()), f.from_u64(1), "v {v}");
        }
    }

    #[test]
    fn division() {
        let f = f17();
        // 3 / 5 = 3 * 7 = 21 = 4 (mod 17)
        assert_eq!(f.from_u64(3).div(&f.from_u64(5)), f.from_u64(4));
    }

    #[test]
    fn pow_matches_repeated_mul() {
        let f = f17();
        let mut acc = f.from_u64(1);
        let g = f.from_u64(3);
        for e in 0..20u64 {
            assert_eq!(g.pow(&BigUint::from(e)), acc, "e {e}");
            acc = acc.mul(&g);
        }
    }

    #[test]
    #[should_panic(expected = "out of field range")]
    fn element_rejects_out_of_range() {
        f17().element(BigUint::from(17u32));
    }

    #[test]
    #[should_panic(expected = "bogus parameters")]
    fn zero_has_no_inverse() {
        let f = f17();
        let _ = f.zero().inv();
    }

    #[test]
    #[should_panic(expected = "mixed elements of distinct fields")]
    fn cross_field_arithmetic_panics() {
        let f = f17();
        let g = Field::new(BigUint::from(19u32));
        let _ = f.from_u64(3).add(&g.from_u64(5));
    }
}
