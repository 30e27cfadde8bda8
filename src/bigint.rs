//! Fixed-width multi-precision unsigned integers.
//!
//! `BigInt<N>` is an array of `N` 64-bit limbs, least significant limb
//! first. All arithmetic is modulo `2^(64*N)`; there is no signed
//! representation and no normalization beyond the limb array itself —
//! every bit pattern is a legal value.

use core::cmp::Ordering;
use core::fmt;
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};

use crate::error::Error;

/// An unsigned integer made of `N` 64-bit limbs, limb 0 being the least
/// significant.
#[derive(Clone, Copy, Default)]
pub struct BigInt<const N: usize>(pub(crate) [u64; N]);

impl<const N: usize> BigInt<N> {
    /// Number of bits in this width.
    pub const BITS: u32 = (N as u32) * 64;

    /// The additive identity.
    pub const ZERO: Self = Self([0u64; N]);

    /// The multiplicative identity.
    pub const ONE: Self = {
        let mut limbs = [0u64; N];
        if N != 0 {
            limbs[0] = 1;
        }
        Self(limbs)
    };

    /// Returns the additive identity.
    pub const fn zero() -> Self {
        Self::ZERO
    }

    /// Returns the multiplicative identity.
    pub const fn one() -> Self {
        Self::ONE
    }

    /// Builds a value directly from its little-endian limb array.
    pub const fn from_limbs(limbs: [u64; N]) -> Self {
        Self(limbs)
    }

    /// Zero-extends a `u64` into limb 0.
    pub const fn from_u64(value: u64) -> Self {
        let mut limbs = [0u64; N];
        if N != 0 {
            limbs[0] = value;
        }
        Self(limbs)
    }

    /// Parses a big-endian hexadecimal literal (optionally `0x`-prefixed)
    /// into the narrowest multiple of a 64-bit limb that this width can
    /// hold. Panics on malformed input or overflow; intended for use with
    /// compile-time constants.
    pub const fn from_be_hex(hex: &str) -> Self {
        let bytes = hex.as_bytes();
        let (bytes, start) = if bytes.len() >= 2 && bytes[0] == b'0' && (bytes[1] == b'x' || bytes[1] == b'X') {
            (bytes, 2)
        } else {
            (bytes, 0)
        };

        let mut limbs = [0u64; N];
        let mut limb_idx = 0;
        let mut shift = 0u32;
        let mut i = bytes.len();
        while i > start {
            i -= 1;
            let nibble = match bytes[i] {
                b'0'..=b'9' => bytes[i] - b'0',
                b'a'..=b'f' => bytes[i] - b'a' + 10,
                b'A'..=b'F' => bytes[i] - b'A' + 10,
                _ => panic!("invalid hex digit"),
            };
            assert!(limb_idx < N, "hex literal too wide for BigInt<N>");
            limbs[limb_idx] |= (nibble as u64) << shift;
            shift += 4;
            if shift == 64 {
                shift = 0;
                limb_idx += 1;
            }
        }
        Self(limbs)
    }

    /// Returns a read-only view of limb `i`.
    pub const fn limb(&self, i: usize) -> u64 {
        self.0[i]
    }

    /// Returns the little-endian limb array.
    pub const fn as_limbs(&self) -> &[u64; N] {
        &self.0
    }

    /// True iff every limb is zero.
    pub const fn is_zero(&self) -> bool {
        let mut i = 0;
        while i < N {
            if self.0[i] != 0 {
                return false;
            }
            i += 1;
        }
        true
    }

    /// Counts the most-significant zero bits; returns [`Self::BITS`] for zero.
    pub fn num_leading_zeros(&self) -> u32 {
        let mut zeros = 0u32;
        let mut i = N;
        while i > 0 {
            i -= 1;
            let lz = self.0[i].leading_zeros();
            zeros += lz;
            if lz < 64 {
                break;
            }
        }
        zeros
    }

    /// Returns the value of bit `i` (0 = least significant), where `i < Self::BITS`.
    pub fn bit(&self, i: u32) -> bool {
        let limb = (i / 64) as usize;
        let shift = i % 64;
        (self.0[limb] >> shift) & 1 == 1
    }

    /// Lexicographic comparison, most significant limb first.
    pub fn cmp(&self, other: &Self) -> Ordering {
        let mut i = N;
        while i > 0 {
            i -= 1;
            match self.0[i].cmp(&other.0[i]) {
                Ordering::Equal => continue,
                other => return other,
            }
        }
        Ordering::Equal
    }

    /// Addition with an explicit output carry bit.
    pub fn add_with_carry(&self, rhs: &Self) -> (Self, u64) {
        let mut out = [0u64; N];
        let mut carry = 0u64;
        for i in 0..N {
            let (a, c1) = self.0[i].overflowing_add(rhs.0[i]);
            let (b, c2) = a.overflowing_add(carry);
            out[i] = b;
            carry = (c1 as u64) + (c2 as u64);
        }
        (Self(out), carry)
    }

    /// Wrapping addition modulo `2^(64N)`.
    pub fn wrapping_add(&self, rhs: &Self) -> Self {
        self.add_with_carry(rhs).0
    }

    /// Subtraction with an explicit output borrow bit.
    pub fn sub_with_borrow(&self, rhs: &Self) -> (Self, u64) {
        let mut out = [0u64; N];
        let mut borrow = 0u64;
        for i in 0..N {
            let (a, b1) = self.0[i].overflowing_sub(rhs.0[i]);
            let (b, b2) = a.overflowing_sub(borrow);
            out[i] = b;
            borrow = (b1 as u64) + (b2 as u64);
        }
        (Self(out), borrow)
    }

    /// Wrapping subtraction modulo `2^(64N)`.
    pub fn wrapping_sub(&self, rhs: &Self) -> Self {
        self.sub_with_borrow(rhs).0
    }

    /// Two's complement negation within this width.
    pub fn negate(&self) -> Self {
        Self::ZERO.wrapping_sub(self)
    }

    /// 64x64 -> 128 bit multiplication, returned as `(high, low)`.
    pub const fn umul128(a: u64, b: u64) -> (u64, u64) {
        let wide = (a as u128) * (b as u128);
        ((wide >> 64) as u64, wide as u64)
    }

    /// Widening multiplication into an output width `M`, which must equal `2 * N`.
    pub fn widening_mul<const M: usize>(&self, rhs: &Self) -> BigInt<M> {
        const { assert!(M == 2 * N, "widening_mul: output width must be double the input width") };

        let mut out = [0u64; M];
        for i in 0..N {
            let mut carry = 0u64;
            for j in 0..N {
                let (hi, lo) = Self::umul128(self.0[i], rhs.0[j]);
                let (sum1, c1) = out[i + j].overflowing_add(lo);
                let (sum2, c2) = sum1.overflowing_add(carry);
                out[i + j] = sum2;
                carry = hi + (c1 as u64) + (c2 as u64);
            }
            out[i + N] = out[i + N].wrapping_add(carry);
        }
        BigInt(out)
    }

    /// Truncates to a narrower width `M <= N`, dropping the high `N - M` limbs.
    ///
    /// Callers are expected to only use this once they know the value already
    /// fits in `M` limbs (e.g. a remainder bounded by a narrower modulus).
    pub fn truncate<const M: usize>(&self) -> BigInt<M> {
        let mut out = [0u64; M];
        let copy = M.min(N);
        out[..copy].copy_from_slice(&self.0[..copy]);
        BigInt(out)
    }

    /// Zero-extends into a wider width `M >= N`.
    pub fn widen<const M: usize>(&self) -> BigInt<M> {
        let mut out = [0u64; M];
        out[..N].copy_from_slice(&self.0[..]);
        BigInt(out)
    }

    /// Returns the high `M` limbs, i.e. `self >> (64 * (N - M))`, for `M <= N`.
    pub fn high<const M: usize>(&self) -> BigInt<M> {
        let mut out = [0u64; M];
        let copy = M.min(N);
        out[..copy].copy_from_slice(&self.0[N - copy..]);
        BigInt(out)
    }

    /// Long division: returns `(quotient, remainder)` such that
    /// `quotient * divisor + remainder == self` and `remainder < divisor`.
    ///
    /// Fails with a "divisor must not be zero" error on a zero divisor.
    pub fn div(&self, divisor: &Self) -> Result<(Self, Self), Error> {
        if divisor.is_zero() {
            return Err(Error::DivisorZero);
        }

        let mut quotient = Self::ZERO;
        let mut remainder = Self::ZERO;

        let mut i = Self::BITS;
        while i > 0 {
            i -= 1;
            remainder = shift_left_one(&remainder);
            if self.bit(i) {
                remainder.0[0] |= 1;
            }
            if remainder.cmp(divisor) != Ordering::Less {
                remainder = remainder.wrapping_sub(divisor);
                set_bit(&mut quotient, i);
            }
        }

        Ok((quotient, remainder))
    }

    /// Computes `(a * b) mod m` via widening multiplication followed by division.
    ///
    /// `M` must equal `2 * N`; this is enforced by [`Self::widening_mul`].
    pub fn mul_mod<const M: usize>(a: &Self, b: &Self, m: &Self) -> Result<Self, Error> {
        let wide: BigInt<M> = a.widening_mul(b);
        let wide_m: BigInt<M> = m.widen();
        let (_, rem) = wide.div(&wide_m)?;
        Ok(rem.truncate())
    }

    /// Modular inverse via Fermat's little theorem: `self^(p-2) mod p`.
    ///
    /// Fails with "Inverse of 0" when `self` is zero. `M` must equal `2 * N`.
    pub fn inv_mod_prime<const M: usize>(&self, p: &Self) -> Result<Self, Error> {
        if self.is_zero() {
            return Err(Error::InverseOfZero);
        }

        let two = Self::from_u64(2);
        let (exponent, _) = p.sub_with_borrow(&two);

        let mut result = Self::ONE;
        let mut base = *self;
        let mut i = Self::BITS;
        while i > 0 {
            i -= 1;
            result = Self::mul_mod::<M>(&result, &result, p)?;
            if exponent.bit(i) {
                result = Self::mul_mod::<M>(&result, &base, p)?;
            }
        }
        let _ = &mut base;
        Ok(result)
    }

    /// Draws a uniformly random value over the full `2^(64N)` range of this width.
    pub fn random(rng: &mut impl rand_core::RngCore) -> Self {
        let mut limbs = [0u64; N];
        for limb in limbs.iter_mut() {
            *limb = rng.next_u64();
        }
        Self(limbs)
    }
}

/// 32-byte big-endian serialization, fixed to the one width this crate's
/// field elements and scalars actually use.
///
/// `N * 8` is not usable as an array length in a generic impl on stable
/// Rust (no `generic_const_exprs`), so this is an inherent impl on the
/// concrete `BigInt<4>` rather than `BigInt<N>` — the same fixed-width
/// approach `k256`/`p256` take with their `FieldBytes` type aliases.
impl BigInt<4> {
    /// Serializes to 32 big-endian bytes, most significant limb first.
    pub fn to_be_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        for i in 0..4 {
            let limb_bytes = self.0[3 - i].to_be_bytes();
            out[i * 8..(i + 1) * 8].copy_from_slice(&limb_bytes);
        }
        out
    }

    /// Parses 32 big-endian bytes, most significant limb first. The
    /// inverse of [`Self::to_be_bytes`].
    pub fn from_be_bytes(bytes: &[u8; 32]) -> Self {
        let mut limbs = [0u64; 4];
        for i in 0..4 {
            let mut chunk = [0u8; 8];
            chunk.copy_from_slice(&bytes[i * 8..(i + 1) * 8]);
            limbs[3 - i] = u64::from_be_bytes(chunk);
        }
        Self(limbs)
    }
}

fn shift_left_one<const N: usize>(value: &BigInt<N>) -> BigInt<N> {
    let mut out = [0u64; N];
    let mut carry = 0u64;
    for i in 0..N {
        out[i] = (value.0[i] << 1) | carry;
        carry = value.0[i] >> 63;
    }
    BigInt(out)
}

fn set_bit<const N: usize>(value: &mut BigInt<N>, i: u32) {
    let limb = (i / 64) as usize;
    let shift = i % 64;
    value.0[limb] |= 1u64 << shift;
}

impl<const N: usize> PartialEq for BigInt<N> {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl<const N: usize> Eq for BigInt<N> {}

impl<const N: usize> PartialOrd for BigInt<N> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<const N: usize> Ord for BigInt<N> {
    fn cmp(&self, other: &Self) -> Ordering {
        BigInt::cmp(self, other)
    }
}

impl<const N: usize> ConstantTimeEq for BigInt<N> {
    fn ct_eq(&self, other: &Self) -> Choice {
        let mut choice = Choice::from(1u8);
        for i in 0..N {
            choice &= self.0[i].ct_eq(&other.0[i]);
        }
        choice
    }
}

impl<const N: usize> ConditionallySelectable for BigInt<N> {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        let mut out = [0u64; N];
        for i in 0..N {
            out[i] = u64::conditional_select(&a.0[i], &b.0[i], choice);
        }
        Self(out)
    }
}

impl<const N: usize> fmt::Debug for BigInt<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BigInt<{N}>(0x")?;
        for i in (0..N).rev() {
            write!(f, "{:016x}", self.0[i])?;
        }
        write!(f, ")")
    }
}

impl<const N: usize> fmt::LowerHex for BigInt<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in (0..N).rev() {
            write!(f, "{:016x}", self.0[i])?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn div_matches_reference() {
        let a = BigInt::<2>::from_limbs([0, 1]);
        let b = BigInt::<2>::from_limbs([5, 0]);
        let (q, r) = a.div(&b).unwrap();
        assert_eq!(q, BigInt::<2>::from_limbs([0x3333333333333333, 0]));
        assert_eq!(r, BigInt::<2>::from_limbs([1, 0]));
    }

    #[test]
    fn div_no_remainder() {
        let a = BigInt::<2>::from_limbs([20, 15]);
        let b = BigInt::<2>::from_limbs([5, 0]);
        let (q, r) = a.div(&b).unwrap();
        assert_eq!(q, BigInt::<2>::from_limbs([4, 3]));
        assert_eq!(r, BigInt::<2>::ZERO);
    }

    #[test]
    fn div_by_zero_fails() {
        let a = BigInt::<2>::from_limbs([0, 1]);
        let err = a.div(&BigInt::<2>::ZERO).unwrap_err();
        assert!(matches!(err, Error::DivisorZero));
    }

    #[test]
    fn div_identity_random() {
        use rand_core::RngCore;
        let mut rng = rand_core::OsRng;
        for _ in 0..50 {
            let a = BigInt::<2>::random(&mut rng);
            let mut b = BigInt::<2>::random(&mut rng);
            if b.is_zero() {
                b = BigInt::<2>::ONE;
            }
            let (q, r) = a.div(&b).unwrap();
            let wide_q: BigInt<4> = q.widen();
            let wide_b: BigInt<4> = b.widen();
            let wide_r: BigInt<4> = r.widen();
            let product = wide_q.widening_mul::<8>(&wide_b).truncate::<4>();
            assert_eq!(product.wrapping_add(&wide_r), a.widen());
            assert!(r.cmp(&b) == Ordering::Less);
        }
        let _ = rng.next_u64();
    }

    #[test]
    fn multiplication_examples() {
        let a = BigInt::<1>::from_u64(1 << 23);
        let b = BigInt::<1>::from_u64(1 << 27);
        let product: BigInt<2> = a.widening_mul(&b);
        assert_eq!(product, BigInt::<2>::from_limbs([1 << 50, 0]));
    }

    #[test]
    fn mul_mod_examples() {
        let a = BigInt::<4>::from_u64(7);
        let b = BigInt::<4>::from_u64(5);
        let m = BigInt::<4>::from_u64(32);
        assert_eq!(
            BigInt::<4>::mul_mod::<8>(&a, &b, &m).unwrap(),
            BigInt::<4>::from_u64(3)
        );

        let minus_one = BigInt::<4>::ONE.negate();
        let eight = BigInt::<4>::from_u64(8);
        assert_eq!(
            BigInt::<4>::mul_mod::<8>(&minus_one, &minus_one, &eight).unwrap(),
            BigInt::<4>::ONE
        );
    }

    #[test]
    fn inv_mod_prime_round_trips() {
        let prime = BigInt::<4>::from_be_hex(
            "f04a65fa008b9e14bfe07094f9ff9bb7363ae6512e213a0a104adb17fb81b385",
        );
        use rand_core::RngCore;
        let mut rng = rand_core::OsRng;
        let mut val = BigInt::<4>::random(&mut rng);
        while val.is_zero() || val.cmp(&prime) != Ordering::Less {
            val = BigInt::<4>::random(&mut rng);
        }
        let inv = val.inv_mod_prime::<8>(&prime).unwrap();
        assert_eq!(
            BigInt::<4>::mul_mod::<8>(&val, &inv, &prime).unwrap(),
            BigInt::<4>::ONE
        );
    }

    #[test]
    fn inv_mod_prime_zero_fails() {
        let prime = BigInt::<4>::from_be_hex(
            "f04a65fa008b9e14bfe07094f9ff9bb7363ae6512e213a0a104adb17fb81b385",
        );
        let err = BigInt::<4>::ZERO.inv_mod_prime::<8>(&prime).unwrap_err();
        assert!(matches!(err, Error::InverseOfZero));
    }

    #[test]
    fn num_leading_zeros() {
        assert_eq!(BigInt::<5>::ONE.num_leading_zeros(), BigInt::<5>::BITS - 1);
        assert_eq!(BigInt::<5>::ZERO.num_leading_zeros(), BigInt::<5>::BITS);
        assert_eq!(
            BigInt::<5>::from_limbs([17, 0, 0, 0, 0]).num_leading_zeros(),
            BigInt::<5>::BITS - 5
        );
        assert_eq!(
            BigInt::<5>::from_limbs([0, 1, 0, 0, 1]).num_leading_zeros(),
            63
        );
    }

    #[test]
    fn widening_zero_extends() {
        let narrow = BigInt::<2>::from_limbs([0xffffffff00000001, 0x17]);
        let wide: BigInt<3> = narrow.widen();
        assert_eq!(wide, BigInt::<3>::from_limbs([0xffffffff00000001, 0x17, 0]));
    }

    #[test]
    fn hex_literal_parsing() {
        let a = BigInt::<4>::from_be_hex(
            "0x73eda753299d7d483339d80809a1d80553bda402fffe5bfeffffffff00000001",
        );
        let b = BigInt::<4>::from_limbs([
            0xffffffff00000001,
            0x53bda402fffe5bfe,
            0x3339d80809a1d805,
            0x73eda753299d7d48,
        ]);
        assert_eq!(a, b);
    }

    #[test]
    fn be_bytes_round_trip() {
        let a = BigInt::<4>::from_be_hex(
            "0123456789abcdef0011223344556677fedcba98765432100123456789abcde",
        );
        let bytes = a.to_be_bytes();
        assert_eq!(bytes[0], 0x01);
        assert_eq!(bytes[31], 0xde);
        assert_eq!(BigInt::<4>::from_be_bytes(&bytes), a);
    }
}
