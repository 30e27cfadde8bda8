//! Lazy fractions over a base field, used to defer modular inversions
//! during elliptic-curve scalar multiplication.
//!
//! Projective coordinates are the usual way to avoid a per-step inversion;
//! this crate instead follows the reference implementation's approach of
//! keeping points in affine coordinates but lifting them into a fraction
//! ring during the scalar-multiplication loop, so only the *final* result
//! pays for a single [`Field::invert`] via [`FractionFieldElement::to_base_field_element`].

use crate::error::{Error, Result};
use crate::field::{Field, PrimeFieldElement};

/// A lazily-reduced fraction `num / den` over a base field `F`.
///
/// The denominator is always non-zero; constructing, adding, subtracting
/// or multiplying two valid fractions can never produce a zero
/// denominator, since `F` has no zero divisors.
#[derive(Clone, Copy, Debug)]
pub struct FractionFieldElement<F> {
    num: F,
    den: F,
}

impl<F: Field> FractionFieldElement<F> {
    /// The additive identity, `0 / 1`.
    pub const ZERO: Self = Self {
        num: F::ZERO,
        den: F::ONE,
    };

    /// The multiplicative identity, `1 / 1`.
    pub const ONE: Self = Self {
        num: F::ONE,
        den: F::ONE,
    };

    /// Builds `num / den`. Fails with [`Error::DivisorZero`] if `den` is zero.
    pub fn new(num: F, den: F) -> Result<Self> {
        if den.is_zero() {
            return Err(Error::DivisorZero);
        }
        Ok(Self { num, den })
    }

    /// Lifts a base-field element `value` into `value / 1`.
    pub fn from_base(value: F) -> Self {
        Self {
            num: value,
            den: F::ONE,
        }
    }

    /// True iff the numerator is zero (the denominator never is).
    pub fn is_zero(&self) -> bool {
        self.num.is_zero()
    }

    /// Cross-multiplied equality: `a/b == c/d` iff `a*d == c*b`.
    pub fn eq(&self, other: &Self) -> bool {
        self.num.mul(&other.den) == other.num.mul(&self.den)
    }

    /// Fraction addition: `a/b + c/d = (a*d + c*b) / (b*d)`.
    pub fn add(&self, rhs: &Self) -> Self {
        Self {
            num: self.num.mul(&rhs.den).add(&rhs.num.mul(&self.den)),
            den: self.den.mul(&rhs.den),
        }
    }

    /// Fraction subtraction: `a/b - c/d = (a*d - c*b) / (b*d)`.
    pub fn sub(&self, rhs: &Self) -> Self {
        Self {
            num: self.num.mul(&rhs.den).sub(&rhs.num.mul(&self.den)),
            den: self.den.mul(&rhs.den),
        }
    }

    /// Fraction negation: `-(a/b) = (-a)/b`.
    pub fn neg(&self) -> Self {
        Self {
            num: self.num.neg(),
            den: self.den,
        }
    }

    /// Fraction multiplication: `(a/b) * (c/d) = (a*c) / (b*d)`.
    pub fn mul(&self, rhs: &Self) -> Self {
        Self {
            num: self.num.mul(&rhs.num),
            den: self.den.mul(&rhs.den),
        }
    }

    /// Fraction inverse: `(a/b)^-1 = b/a`. Fails with
    /// [`Error::FractionHasNoInverse`] when the numerator is zero.
    pub fn invert(&self) -> Result<Self> {
        if self.num.is_zero() {
            return Err(Error::FractionHasNoInverse);
        }
        Ok(Self {
            num: self.den,
            den: self.num,
        })
    }

    /// Fraction division: `self * rhs^-1`.
    pub fn div(&self, rhs: &Self) -> Result<Self> {
        Ok(self.mul(&rhs.invert()?))
    }

    /// Collapses this fraction to a single base-field element, paying for
    /// the one unavoidable inversion. Fails with [`Error::DivisorZero`]
    /// only in the unreachable case of a zero denominator.
    pub fn to_base_field_element(&self) -> Result<F> {
        Ok(self.num.mul(&self.den.invert()?))
    }
}

impl<F: Field> PartialEq for FractionFieldElement<F> {
    fn eq(&self, other: &Self) -> bool {
        FractionFieldElement::eq(self, other)
    }
}

impl<F: Field> Eq for FractionFieldElement<F> {}

impl<F: Field> Field for FractionFieldElement<F> {
    const ZERO: Self = FractionFieldElement::ZERO;
    const ONE: Self = FractionFieldElement::ONE;

    fn is_zero(&self) -> bool {
        FractionFieldElement::is_zero(self)
    }

    fn add(&self, rhs: &Self) -> Self {
        FractionFieldElement::add(self, rhs)
    }

    fn sub(&self, rhs: &Self) -> Self {
        FractionFieldElement::sub(self, rhs)
    }

    fn neg(&self) -> Self {
        FractionFieldElement::neg(self)
    }

    fn mul(&self, rhs: &Self) -> Self {
        FractionFieldElement::mul(self, rhs)
    }

    fn invert(&self) -> Result<Self> {
        FractionFieldElement::invert(self)
    }
}

impl FractionFieldElement<PrimeFieldElement> {
    /// Draws a random fraction with a uniformly random non-zero denominator.
    pub fn random(rng: &mut impl rand_core::RngCore) -> Self {
        let num = PrimeFieldElement::random(rng);
        let mut den = PrimeFieldElement::random(rng);
        while den.is_zero() {
            den = PrimeFieldElement::random(rng);
        }
        Self { num, den }
    }
}
