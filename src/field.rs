//! The STARK-friendly prime field, `GF(p)` for `p = 2^251 + 17 * 2^192 + 1`.
//!
//! Elements are stored internally in Montgomery form (`R = 2^256`) and all
//! arithmetic is performed with a CIOS-flavored reduction built on top of
//! [`BigInt`]'s widening multiply, mirroring how `k256`'s `FieldElement5x52`
//! keeps a 52-bit radix representation internal to the type and only
//! converts to/from the canonical form at the boundary.

use core::cmp::Ordering;
use core::fmt;
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq, CtOption};

use crate::bigint::BigInt;
use crate::error::{Error, Result};

/// The field modulus, `p = 2^251 + 17 * 2^192 + 1`, in standard form.
pub const MODULUS: BigInt<4> = BigInt::from_limbs([
    0x0000000000000001,
    0x0000000000000000,
    0x0000000000000000,
    0x0800000000000011,
]);

/// `R^2 mod p`, used to lift standard-form values into Montgomery form.
const R2: BigInt<4> = BigInt::from_limbs([
    0xfffffd737e000401,
    0x00000001330fffff,
    0xffffffffff6f8000,
    0x07ffd4ab5e008810,
]);

/// `-p^-1 mod 2^256`, the Montgomery reduction constant.
const N_PRIME: BigInt<4> = BigInt::from_limbs([
    0xffffffffffffffff,
    0xffffffffffffffff,
    0xffffffffffffffff,
    0x0800000000000010,
]);

/// The Montgomery form of `1`, i.e. `R mod p`.
const R_MOD_P: BigInt<4> = BigInt::from_limbs([
    0xffffffffffffffe1,
    0xffffffffffffffff,
    0xffffffffffffffff,
    0x07fffffffffffdf0,
]);

/// A smallest quadratic non-residue mod `p`, used by [`PrimeFieldElement::sqrt`].
/// Verified offline: `3^((p-1)/2) mod p == p - 1`.
const QUADRATIC_NON_RESIDUE: u64 = 3;

/// Odd part of `p - 1`: `p - 1 = Q * 2^S`.
const TONELLI_SHANKS_Q: BigInt<4> = BigInt::from_u64(0x0800000000000011);
/// `(Q + 1) / 2`.
const TONELLI_SHANKS_Q_PLUS_ONE_HALF: BigInt<4> = BigInt::from_u64(0x0400000000000009);
/// `S`, the power of two dividing `p - 1`.
const TONELLI_SHANKS_S: u32 = 192;

/// The minimal field interface [`crate::fraction::FractionFieldElement`] is
/// generic over, so the lazy-fraction ring can be specialized to any base
/// field rather than being hardwired to [`PrimeFieldElement`].
pub trait Field: Copy + PartialEq + Eq {
    /// The additive identity.
    const ZERO: Self;
    /// The multiplicative identity.
    const ONE: Self;

    /// True iff this is the additive identity.
    fn is_zero(&self) -> bool;
    /// Field addition.
    fn add(&self, rhs: &Self) -> Self;
    /// Field subtraction.
    fn sub(&self, rhs: &Self) -> Self;
    /// Field negation.
    fn neg(&self) -> Self;
    /// Field multiplication.
    fn mul(&self, rhs: &Self) -> Self;
    /// Multiplicative inverse; fails on zero.
    fn invert(&self) -> Result<Self>;
}

impl Field for PrimeFieldElement {
    const ZERO: Self = PrimeFieldElement::ZERO;
    const ONE: Self = PrimeFieldElement::ONE;

    fn is_zero(&self) -> bool {
        PrimeFieldElement::is_zero(self)
    }

    fn add(&self, rhs: &Self) -> Self {
        PrimeFieldElement::add(self, rhs)
    }

    fn sub(&self, rhs: &Self) -> Self {
        PrimeFieldElement::sub(self, rhs)
    }

    fn neg(&self) -> Self {
        PrimeFieldElement::neg(self)
    }

    fn mul(&self, rhs: &Self) -> Self {
        PrimeFieldElement::mul(self, rhs)
    }

    fn invert(&self) -> Result<Self> {
        PrimeFieldElement::invert(self)
    }
}

/// An element of the STARK prime field.
///
/// Internally stored in Montgomery form; this is never observable from the
/// public API, which only ever hands out or accepts standard-form bytes or
/// [`BigInt`] values.
#[derive(Clone, Copy)]
pub struct PrimeFieldElement(BigInt<4>);

impl PrimeFieldElement {
    /// The additive identity.
    pub const ZERO: Self = Self(BigInt::ZERO);
    /// The multiplicative identity.
    pub const ONE: Self = Self(R_MOD_P);

    fn redc(t: BigInt<8>) -> BigInt<4> {
        let t_low: BigInt<4> = t.truncate();
        let m: BigInt<4> = t_low.widening_mul::<8>(&N_PRIME).truncate();
        let mp: BigInt<8> = m.widening_mul(&MODULUS);
        let sum = t.wrapping_add(&mp);
        let mut result: BigInt<4> = sum.high();
        if result.cmp(&MODULUS) != Ordering::Less {
            result = result.wrapping_sub(&MODULUS);
        }
        result
    }

    /// Lifts a standard-form [`BigInt`] into the field, reducing modulo `p`
    /// if necessary.
    pub fn from_bigint(value: &BigInt<4>) -> Self {
        let (_, reduced) = value.div(&MODULUS).expect("MODULUS is a nonzero constant");
        Self(Self::redc(reduced.widening_mul(&R2)))
    }

    /// Converts this element back to its standard-form [`BigInt`] representative.
    pub fn to_bigint(self) -> BigInt<4> {
        Self::redc(self.0.widen())
    }

    /// Builds an element from a `u64`, reducing modulo `p`.
    pub fn from_u64(value: u64) -> Self {
        Self::from_bigint(&BigInt::from_u64(value))
    }

    /// Builds an element directly from its internal Montgomery
    /// representation (i.e. `standard_value * R mod p`), without checking
    /// that the input is itself already reduced below `p`.
    ///
    /// Intended for `const` curve-constant tables, where the Montgomery
    /// representative of a known-good literal can be precomputed once
    /// offline rather than converted at every process start.
    pub const fn from_montgomery_unchecked(repr: BigInt<4>) -> Self {
        Self(repr)
    }

    /// Parses big-endian bytes as a standard-form integer, reducing modulo `p`.
    pub fn from_be_bytes(bytes: &[u8; 32]) -> Self {
        let mut limbs = [0u64; 4];
        for (i, chunk) in bytes.chunks_exact(8).enumerate() {
            limbs[3 - i] = u64::from_be_bytes(chunk.try_into().expect("8-byte chunk"));
        }
        Self::from_bigint(&BigInt::from_limbs(limbs))
    }

    /// Serializes this element to 32 big-endian bytes in standard form.
    pub fn to_be_bytes(self) -> [u8; 32] {
        let value = self.to_bigint();
        let mut bytes = [0u8; 32];
        for i in 0..4 {
            bytes[24 - 8 * i..32 - 8 * i].copy_from_slice(&value.limb(i).to_be_bytes());
        }
        bytes
    }

    /// True iff this element is the additive identity.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Field addition.
    pub fn add(&self, rhs: &Self) -> Self {
        let (sum, carry) = self.0.add_with_carry(&rhs.0);
        let mut result = sum;
        if carry != 0 || result.cmp(&MODULUS) != Ordering::Less {
            result = result.wrapping_sub(&MODULUS);
        }
        Self(result)
    }

    /// Field subtraction.
    pub fn sub(&self, rhs: &Self) -> Self {
        let (diff, borrow) = self.0.sub_with_borrow(&rhs.0);
        let result = if borrow != 0 {
            diff.wrapping_add(&MODULUS)
        } else {
            diff
        };
        Self(result)
    }

    /// Field negation.
    pub fn neg(&self) -> Self {
        Self::ZERO.sub(self)
    }

    /// Field multiplication.
    pub fn mul(&self, rhs: &Self) -> Self {
        Self(Self::redc(self.0.widening_mul(&rhs.0)))
    }

    /// Field squaring; equivalent to `self.mul(self)` but reads better at call sites.
    pub fn square(&self) -> Self {
        self.mul(self)
    }

    /// Raises this element to the power described by the bits of `exponent`,
    /// most significant bit first, in variable time.
    pub fn pow_vartime(&self, exponent: &BigInt<4>) -> Self {
        let mut result = Self::ONE;
        let mut i = BigInt::<4>::BITS;
        while i > 0 {
            i -= 1;
            result = result.square();
            if exponent.bit(i) {
                result = result.mul(self);
            }
        }
        result
    }

    /// Multiplicative inverse via Fermat's little theorem.
    ///
    /// Fails with [`Error::FieldInverseOfZero`] when `self` is zero.
    pub fn invert(&self) -> Result<Self> {
        if self.is_zero() {
            return Err(Error::FieldInverseOfZero);
        }
        let inverse_std = self
            .0
            .inv_mod_prime::<8>(&MODULUS)
            .expect("checked non-zero above");
        let lifted = BigInt::<4>::mul_mod::<8>(&inverse_std, &R2, &MODULUS)
            .expect("MODULUS is a nonzero constant");
        Ok(Self(lifted))
    }

    /// Division: `self * rhs^-1`.
    pub fn div(&self, rhs: &Self) -> Result<Self> {
        Ok(self.mul(&rhs.invert()?))
    }

    /// Square root via Tonelli-Shanks, since `p ≡ 1 (mod 4)` rules out the
    /// `p ≡ 3 (mod 4)` shortcut. Returns [`CtOption::none`] when `self` is
    /// not a quadratic residue. Not constant time.
    pub fn sqrt_vartime(&self) -> CtOption<Self> {
        if self.is_zero() {
            return CtOption::new(Self::ZERO, Choice::from(1u8));
        }

        let z = Self::from_u64(QUADRATIC_NON_RESIDUE);
        let mut m = TONELLI_SHANKS_S;
        let mut c = z.pow_vartime(&TONELLI_SHANKS_Q);
        let mut t = self.pow_vartime(&TONELLI_SHANKS_Q);
        let mut r = self.pow_vartime(&TONELLI_SHANKS_Q_PLUS_ONE_HALF);

        loop {
            if t == Self::ONE {
                let is_root = r.square() == *self;
                return CtOption::new(r, Choice::from(is_root as u8));
            }

            let mut i = 0u32;
            let mut temp = t;
            while temp != Self::ONE {
                temp = temp.square();
                i += 1;
                if i == m {
                    return CtOption::new(Self::ZERO, Choice::from(0u8));
                }
            }

            let mut b = c;
            for _ in 0..(m - i - 1) {
                b = b.square();
            }
            m = i;
            c = b.square();
            t = t.mul(&c);
            r = r.mul(&b);
        }
    }

    /// Draws a uniform random element of `[0, p)` by rejection sampling.
    pub fn random(rng: &mut impl rand_core::RngCore) -> Self {
        loop {
            let candidate = BigInt::<4>::random(rng);
            if candidate.cmp(&MODULUS) == Ordering::Less {
                return Self(Self::redc(candidate.widening_mul(&R2)));
            }
        }
    }

    /// Standard-form ordering, used by the range checks in ECDSA and the
    /// order-message preconditions.
    pub fn cmp_standard(&self, other: &Self) -> Ordering {
        self.to_bigint().cmp(&other.to_bigint())
    }
}

impl PartialEq for PrimeFieldElement {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for PrimeFieldElement {}

impl ConstantTimeEq for PrimeFieldElement {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.0.ct_eq(&other.0)
    }
}

impl ConditionallySelectable for PrimeFieldElement {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Self(BigInt::conditional_select(&a.0, &b.0, choice))
    }
}

impl Default for PrimeFieldElement {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Debug for PrimeFieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrimeFieldElement(0x{:x})", self.to_bigint())
    }
}

#[cfg(feature = "zeroize")]
impl zeroize::DefaultIsZeroes for PrimeFieldElement {}

/// `serde` support: serialized as the 32-byte big-endian standard-form
/// encoding of [`Self::to_be_bytes`], hex-encoded for human-readable
/// formats, matching the convention `ed448`/`x448` use for their field
/// and scalar types.
#[cfg(feature = "serde")]
impl serdect::serde::Serialize for PrimeFieldElement {
    fn serialize<S>(&self, s: S) -> core::result::Result<S::Ok, S::Error>
    where
        S: serdect::serde::Serializer,
    {
        serdect::array::serialize_hex_lower_or_bin(&self.to_be_bytes(), s)
    }
}

#[cfg(feature = "serde")]
impl<'de> serdect::serde::Deserialize<'de> for PrimeFieldElement {
    fn deserialize<D>(d: D) -> core::result::Result<Self, D::Error>
    where
        D: serdect::serde::Deserializer<'de>,
    {
        let mut bytes = [0u8; 32];
        serdect::array::deserialize_hex_or_bin(&mut bytes, d)?;
        let value = BigInt::<4>::from_be_bytes(&bytes);
        if value.cmp(&MODULUS) != Ordering::Less {
            return Err(serdect::serde::de::Error::custom(
                "value is not a canonical field element (>= p)",
            ));
        }
        Ok(Self::from_bigint(&value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_round_trips() {
        assert_eq!(PrimeFieldElement::ONE.to_bigint(), BigInt::<4>::ONE);
        assert_eq!(
            PrimeFieldElement::from_bigint(&BigInt::ONE),
            PrimeFieldElement::ONE
        );
    }

    #[test]
    fn add_sub_are_inverse() {
        let mut rng = rand_core::OsRng;
        for _ in 0..20 {
            let a = PrimeFieldElement::random(&mut rng);
            let b = PrimeFieldElement::random(&mut rng);
            assert_eq!(a.add(&b).sub(&b), a);
        }
    }

    #[test]
    fn mul_matches_schoolbook_mod() {
        let a = PrimeFieldElement::from_u64(123456789);
        let b = PrimeFieldElement::from_u64(987654321);
        let product = a.mul(&b);
        let expected = BigInt::<4>::mul_mod::<8>(
            &BigInt::from_u64(123456789),
            &BigInt::from_u64(987654321),
            &MODULUS,
        )
        .unwrap();
        assert_eq!(product.to_bigint(), expected);
    }

    #[test]
    fn invert_is_multiplicative_inverse() {
        let mut rng = rand_core::OsRng;
        for _ in 0..20 {
            let mut a = PrimeFieldElement::random(&mut rng);
            if a.is_zero() {
                a = PrimeFieldElement::ONE;
            }
            let inv = a.invert().unwrap();
            assert_eq!(a.mul(&inv), PrimeFieldElement::ONE);
        }
    }

    #[test]
    fn invert_zero_fails() {
        assert_eq!(
            PrimeFieldElement::ZERO.invert().unwrap_err(),
            Error::FieldInverseOfZero
        );
    }

    #[test]
    fn sqrt_of_square_round_trips() {
        let mut rng = rand_core::OsRng;
        for _ in 0..20 {
            let a = PrimeFieldElement::random(&mut rng);
            let square = a.square();
            let root = square.sqrt_vartime();
            assert!(bool::from(root.is_some()));
            let root = Option::from(root).expect("quadratic residue by construction");
            assert_eq!(root.square(), square);
        }
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_round_trips_through_json() {
        let mut rng = rand_core::OsRng;
        let a = PrimeFieldElement::random(&mut rng);
        let json = serde_json::to_string(&a).unwrap();
        let back: PrimeFieldElement = serde_json::from_str(&json).unwrap();
        assert_eq!(back, a);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_rejects_non_canonical_value() {
        let json = alloc::format!("\"{:x}\"", MODULUS);
        let result: core::result::Result<PrimeFieldElement, _> = serde_json::from_str(&json);
        assert!(result.is_err());
    }

    #[test]
    fn bytes_round_trip() {
        let mut rng = rand_core::OsRng;
        for _ in 0..20 {
            let a = PrimeFieldElement::random(&mut rng);
            let bytes = a.to_be_bytes();
            assert_eq!(PrimeFieldElement::from_be_bytes(&bytes), a);
        }
    }
}
