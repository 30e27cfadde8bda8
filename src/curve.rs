//! The short Weierstrass curve `y^2 = x^3 + alpha*x + beta` over a generic
//! field `F`, plus the concrete STARK curve parameters.
//!
//! Following `spec.md` §9, the point at infinity has no representation:
//! every operation that would produce it returns [`Error::ZeroElement`]
//! instead. Callers that need to fold that case into control flow (e.g.
//! scalar multiplication) do so with `?` the way the rest of this crate
//! threads errors.

use subtle::CtOption;

use crate::bigint::BigInt;
use crate::error::{Error, Result};
use crate::field::{Field, PrimeFieldElement};
use crate::fraction::FractionFieldElement;

/// An affine point `(x, y)` on a short Weierstrass curve over `F`.
///
/// The curve's `alpha`/`beta` coefficients are not stored on the point;
/// they are threaded through the operations that need them (`Double`,
/// `MultiplyByScalar`, `GetPointFromX`, `Random`), matching the reference
/// implementation's `EcPoint<F>` — a point alone does not know which curve
/// it lies on.
#[derive(Clone, Copy, Debug)]
pub struct EcPoint<F> {
    /// x-coordinate.
    pub x: F,
    /// y-coordinate.
    pub y: F,
}

impl<F: Field> PartialEq for EcPoint<F> {
    fn eq(&self, other: &Self) -> bool {
        self.x == other.x && self.y == other.y
    }
}

impl<F: Field> Eq for EcPoint<F> {}

impl<F: Field> EcPoint<F> {
    /// Builds a point from its coordinates. Does not check that the point
    /// lies on any particular curve; callers that need that guarantee
    /// should use [`EcPoint::get_point_from_x`].
    pub const fn new(x: F, y: F) -> Self {
        Self { x, y }
    }

    /// Point negation: `(x, -y)`.
    pub fn neg(&self) -> Self {
        Self {
            x: self.x,
            y: self.y.neg(),
        }
    }

    /// Point doubling: `m = (3x^2 + alpha) / (2y)`, `x' = m^2 - 2x`,
    /// `y' = m(x - x') - y`.
    ///
    /// Fails with [`Error::ZeroElement`] when `self.y == 0`, since the
    /// result would be the point at infinity.
    pub fn double(&self, alpha: &F) -> Result<Self> {
        if self.y.is_zero() {
            return Err(Error::ZeroElement);
        }
        let three_x_sq = self.x.mul(&self.x).mul(&three::<F>());
        let numerator = three_x_sq.add(alpha);
        let denominator = self.y.add(&self.y);
        let m = numerator.mul(&denominator.invert()?);
        let x_new = m.mul(&m).sub(&self.x).sub(&self.x);
        let y_new = m.mul(&self.x.sub(&x_new)).sub(&self.y);
        Ok(Self { x: x_new, y: y_new })
    }

    /// Point addition. Fails with [`Error::ZeroElement`] whenever `self.x
    /// == other.x` (either `other == self`, which needs `alpha` to double
    /// and so is left to [`EcPoint::add_with_alpha`], or `other == -self`,
    /// which really is the point at infinity).
    pub fn add(&self, other: &Self) -> Result<Self> {
        if self.x == other.x {
            return Err(Error::ZeroElement);
        }
        let m = other.y.sub(&self.y).mul(&other.x.sub(&self.x).invert()?);
        let x_new = m.mul(&m).sub(&self.x).sub(&other.x);
        let y_new = m.mul(&self.x.sub(&x_new)).sub(&self.y);
        Ok(Self { x: x_new, y: y_new })
    }

    /// Point addition that also knows `alpha`, so that `P + P` correctly
    /// dispatches to [`EcPoint::double`] rather than failing.
    pub fn add_with_alpha(&self, other: &Self, alpha: &F) -> Result<Self> {
        if self.x == other.x {
            if self.y == other.y {
                return self.double(alpha);
            }
            return Err(Error::ZeroElement);
        }
        let m = other.y.sub(&self.y).mul(&other.x.sub(&self.x).invert()?);
        let x_new = m.mul(&m).sub(&self.x).sub(&other.x);
        let y_new = m.mul(&self.x.sub(&x_new)).sub(&self.y);
        Ok(Self { x: x_new, y: y_new })
    }

    /// Point subtraction: `self + (-other)`, curve-agnostic like [`EcPoint::add`].
    pub fn sub(&self, other: &Self) -> Result<Self> {
        self.add(&other.neg())
    }
}

fn three<F: Field>() -> F {
    F::ONE.add(&F::ONE).add(&F::ONE)
}

impl EcPoint<PrimeFieldElement> {
    /// Scalar multiplication via double-and-add over the fraction field,
    /// so that every intermediate doubling/addition is inversion-free and
    /// only the final projection back to `F` pays for one.
    ///
    /// Fails with [`Error::ZeroElement`] if `scalar` is zero or if the
    /// double-and-add walk ever attempts to form the point at infinity.
    pub fn multiply_by_scalar(
        &self,
        scalar: &BigInt<4>,
        alpha: &PrimeFieldElement,
    ) -> Result<Self> {
        self.convert_to()
            .multiply_by_scalar(scalar, &FractionFieldElement::from_base(*alpha))?
            .convert_to_base()
    }

    /// Recovers a point with the given x-coordinate on `y^2 = x^3 +
    /// alpha*x + beta`, if one exists.
    ///
    /// Returns `None` (not an error) when `x` does not lie on the curve,
    /// per `spec.md` §7 ("X-recovery on non-curve x" is an absent value,
    /// not a raised error).
    pub fn get_point_from_x(
        x: PrimeFieldElement,
        alpha: &PrimeFieldElement,
        beta: &PrimeFieldElement,
    ) -> Option<Self> {
        let t = x.mul(&x).mul(&x).add(&alpha.mul(&x)).add(beta);
        let root: CtOption<PrimeFieldElement> = t.sqrt_vartime();
        Option::from(root).map(|y| EcPoint { x, y })
    }

    /// Draws a uniformly random point on the curve by rejection-sampling
    /// `x` until [`EcPoint::get_point_from_x`] succeeds, then randomly
    /// flips the sign of `y`.
    pub fn random(
        alpha: &PrimeFieldElement,
        beta: &PrimeFieldElement,
        rng: &mut impl rand_core::RngCore,
    ) -> Self {
        loop {
            let x = PrimeFieldElement::random(rng);
            if let Some(point) = Self::get_point_from_x(x, alpha, beta) {
                return if rng.next_u32() & 1 == 0 {
                    point
                } else {
                    point.neg()
                };
            }
        }
    }

    /// Lifts this point into the fraction field over `PrimeFieldElement`.
    pub fn convert_to(&self) -> EcPoint<FractionFieldElement<PrimeFieldElement>> {
        EcPoint {
            x: FractionFieldElement::from_base(self.x),
            y: FractionFieldElement::from_base(self.y),
        }
    }
}

/// `serde` support: serialized as `x || y`, 64 bytes, each coordinate the
/// 32-byte big-endian standard-form encoding [`PrimeFieldElement`] itself
/// uses. There is no compressed form, since `spec.md` §9 gives this crate
/// no representation for the point at infinity to disambiguate a sign bit
/// against.
#[cfg(feature = "serde")]
impl serdect::serde::Serialize for EcPoint<PrimeFieldElement> {
    fn serialize<S>(&self, s: S) -> core::result::Result<S::Ok, S::Error>
    where
        S: serdect::serde::Serializer,
    {
        let mut bytes = [0u8; 64];
        bytes[..32].copy_from_slice(&self.x.to_be_bytes());
        bytes[32..].copy_from_slice(&self.y.to_be_bytes());
        serdect::array::serialize_hex_lower_or_bin(&bytes, s)
    }
}

#[cfg(feature = "serde")]
impl<'de> serdect::serde::Deserialize<'de> for EcPoint<PrimeFieldElement> {
    fn deserialize<D>(d: D) -> core::result::Result<Self, D::Error>
    where
        D: serdect::serde::Deserializer<'de>,
    {
        let mut bytes = [0u8; 64];
        serdect::array::deserialize_hex_or_bin(&mut bytes, d)?;
        let x = PrimeFieldElement::from_be_bytes(bytes[..32].try_into().expect("32-byte slice"));
        let y = PrimeFieldElement::from_be_bytes(bytes[32..].try_into().expect("32-byte slice"));
        Ok(EcPoint { x, y })
    }
}

impl EcPoint<FractionFieldElement<PrimeFieldElement>> {
    /// Projects a fraction-field point back to the base field, paying for
    /// one inversion per coordinate.
    pub fn convert_to_base(&self) -> Result<EcPoint<PrimeFieldElement>> {
        Ok(EcPoint {
            x: self.x.to_base_field_element()?,
            y: self.y.to_base_field_element()?,
        })
    }

    /// Scalar multiplication via double-and-add, staying entirely within
    /// the fraction field so the caller can keep composing (e.g. adding
    /// another fraction-field point) before paying for a single final
    /// inversion, rather than one inversion per multiplication.
    ///
    /// Fails with [`Error::ZeroElement`] if `scalar` is zero or if the
    /// double-and-add walk ever attempts to form the point at infinity.
    pub fn multiply_by_scalar(
        &self,
        scalar: &BigInt<4>,
        alpha: &FractionFieldElement<PrimeFieldElement>,
    ) -> Result<Self> {
        if scalar.is_zero() {
            return Err(Error::ZeroElement);
        }

        let mut base = *self;
        let mut accumulator: Option<Self> = None;

        let bits = BigInt::<4>::BITS - scalar.num_leading_zeros();
        for i in 0..bits {
            if scalar.bit(i) {
                accumulator = Some(match accumulator {
                    None => base,
                    Some(acc) => acc.add_with_alpha(&base, alpha)?,
                });
            }
            if i + 1 < bits {
                base = base.double(alpha)?;
            }
        }

        accumulator.ok_or(Error::ZeroElement)
    }
}

/// Immutable curve parameters: the Weierstrass coefficients, the group
/// order, and the generator, matching `spec.md` §4.D "Curve constants".
///
/// The Pedersen hash's own base-point table (the shift point and `P1..P4`)
/// is a separate, smaller table — see [`crate::pedersen::constants`] —
/// since in the reference implementation it is generated independently of
/// the ECDSA generator and the two tables do not overlap (confirmed
/// against the known-answer vectors in `spec.md` §8).
#[derive(Clone, Copy, Debug)]
pub struct StarkCurve {
    /// The `alpha` coefficient.
    pub alpha: PrimeFieldElement,
    /// The `beta` coefficient.
    pub beta: PrimeFieldElement,
    /// The order `n` of the curve's cyclic group. Distinct from the field
    /// modulus `p`.
    pub order: BigInt<4>,
    /// The ECDSA generator `G`.
    pub generator: EcPoint<PrimeFieldElement>,
}

impl StarkCurve {
    /// The STARK curve used by StarkEx/StarkNet:
    /// `y^2 = x^3 + x + beta (mod p)`.
    pub fn get() -> &'static Self {
        &STARK_CURVE
    }
}

static STARK_CURVE: StarkCurve = StarkCurve {
    alpha: PrimeFieldElement::ONE,
    beta: BETA,
    order: ORDER,
    generator: EcPoint::new(GENERATOR_X, GENERATOR_Y),
};

/// `beta`, the STARK curve's Weierstrass constant.
const BETA: PrimeFieldElement = PrimeFieldElement::from_montgomery_unchecked(BigInt::from_be_hex(
    "13931651774247fab8a1e002a41f9476725f2237aab9006359ddd67b59a21ca",
));

/// The order of the STARK curve's group, `n`.
pub const ORDER: BigInt<4> = BigInt::from_be_hex(
    "0800000000000010ffffffffffffffffb781126dcae7b2321e66a241adc64d2f",
);

/// Generator x-coordinate.
const GENERATOR_X: PrimeFieldElement = PrimeFieldElement::from_montgomery_unchecked(
    BigInt::from_be_hex("33840300bf6cec10429bf5184041c7b51a9bf65d4403deac9019623cf0273dd"),
);
/// Generator y-coordinate.
const GENERATOR_Y: PrimeFieldElement = PrimeFieldElement::from_montgomery_unchecked(
    BigInt::from_be_hex("5a0e71610f55329fbd89a97cf4b33ad0939e3442869bbe7569d0da34235308a"),
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_is_on_curve() {
        let curve = StarkCurve::get();
        let g = curve.generator;
        let lhs = g.y.mul(&g.y);
        let rhs = g.x.mul(&g.x).mul(&g.x).add(&curve.alpha.mul(&g.x)).add(&curve.beta);
        assert_eq!(lhs, rhs);
    }

    #[test]
    fn generator_x_matches_known_answer() {
        let curve = StarkCurve::get();
        assert_eq!(
            curve.generator.x.to_bigint(),
            BigInt::from_be_hex("1ef15c18599971b7beced415a40f0c7deacfd9b0d1819e03d723d8bc943cfca")
        );
    }

    #[test]
    fn double_matches_triple_add() {
        let mut rng = rand_core::OsRng;
        let x = PrimeFieldElement::random(&mut rng);
        let y = PrimeFieldElement::random(&mut rng);
        let alpha = PrimeFieldElement::random(&mut rng);
        let point = EcPoint::new(x, y);
        let point_times_4 = point.double(&alpha).unwrap().double(&alpha).unwrap();
        let rhs = point
            .add_with_alpha(&point.double(&alpha).unwrap(), &alpha)
            .unwrap()
            .add_with_alpha(&point, &alpha)
            .unwrap();
        assert_eq!(point_times_4, rhs);
    }

    #[test]
    fn mul_by_zero_fails() {
        let mut rng = rand_core::OsRng;
        let point = EcPoint::new(
            PrimeFieldElement::random(&mut rng),
            PrimeFieldElement::random(&mut rng),
        );
        let alpha = PrimeFieldElement::random(&mut rng);
        let err = point.multiply_by_scalar(&BigInt::ZERO, &alpha).unwrap_err();
        assert_eq!(err, Error::ZeroElement);
    }

    #[test]
    fn mul_power_becomes_zero() {
        let mut rng = rand_core::OsRng;
        let point = EcPoint::new(PrimeFieldElement::random(&mut rng), PrimeFieldElement::ZERO);
        let alpha = PrimeFieldElement::ONE;
        // `point` has order 2 (`y == 0`), so doubling it is already the
        // point at infinity; any scalar whose double-and-add walk doubles
        // the base before its final bit — including 3, not just 4 — must
        // fail rather than silently skip the infinite intermediate.
        let err = point
            .multiply_by_scalar(&BigInt::from_u64(3), &alpha)
            .unwrap_err();
        assert_eq!(err, Error::ZeroElement);
        let err = point
            .multiply_by_scalar(&BigInt::from_u64(4), &alpha)
            .unwrap_err();
        assert_eq!(err, Error::ZeroElement);
    }

    #[test]
    fn plus_point_commutes_and_associates() {
        let mut rng = rand_core::OsRng;
        let alpha = PrimeFieldElement::random(&mut rng);
        let beta = PrimeFieldElement::random(&mut rng);
        let p1 = EcPoint::random(&alpha, &beta, &mut rng);
        let p2 = EcPoint::random(&alpha, &beta, &mut rng);
        let p3 = EcPoint::random(&alpha, &beta, &mut rng);
        assert_eq!(
            p1.add_with_alpha(&p2, &alpha).unwrap(),
            p2.add_with_alpha(&p1, &alpha).unwrap()
        );
        let lhs = p1
            .add_with_alpha(&p2, &alpha)
            .unwrap()
            .add_with_alpha(&p3, &alpha)
            .unwrap();
        let rhs = p1
            .add_with_alpha(&p2.add_with_alpha(&p3, &alpha).unwrap(), &alpha)
            .unwrap();
        assert_eq!(lhs, rhs);
    }

    #[test]
    fn minus_point_inverts_double_and_add() {
        let mut rng = rand_core::OsRng;
        let x1 = PrimeFieldElement::random(&mut rng);
        let y1 = PrimeFieldElement::random(&mut rng);
        let alpha = PrimeFieldElement::random(&mut rng);
        let x2 = PrimeFieldElement::random(&mut rng);
        let y2 = PrimeFieldElement::random(&mut rng);
        let p1 = EcPoint::new(x1, y1);
        let p2 = EcPoint::new(x2, y2);
        let p1_times_2 = p1.double(&alpha).unwrap();
        assert_eq!(p1_times_2.sub(&p1).unwrap(), p1);
        assert_eq!(
            p1.add_with_alpha(&p2, &alpha).unwrap().sub(&p1).unwrap(),
            p2
        );
    }

    #[test]
    fn random_point_is_on_curve_and_x_recovers_both_signs() {
        let mut rng = rand_core::OsRng;
        let alpha = PrimeFieldElement::random(&mut rng);
        let beta = PrimeFieldElement::random(&mut rng);
        let point = EcPoint::random(&alpha, &beta, &mut rng);
        assert_eq!(
            point.y.mul(&point.y),
            point.x.mul(&point.x).mul(&point.x).add(&alpha.mul(&point.x)).add(&beta)
        );
        let recovered = EcPoint::get_point_from_x(point.x, &alpha, &beta).unwrap();
        assert_eq!(point.x, recovered.x);
        assert!(point.y == recovered.y || point.y == recovered.y.neg());
    }

    #[test]
    fn convert_to_round_trips() {
        let mut rng = rand_core::OsRng;
        let point = EcPoint::new(
            PrimeFieldElement::random(&mut rng),
            PrimeFieldElement::random(&mut rng),
        );
        let converted = point.convert_to();
        assert_eq!(converted.convert_to_base().unwrap(), point);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_round_trips_generator() {
        let g = StarkCurve::get().generator;
        let json = serde_json::to_string(&g).unwrap();
        let back: EcPoint<PrimeFieldElement> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, g);
    }

    #[test]
    fn group_order_kills_generator() {
        let curve = StarkCurve::get();
        let g = curve.generator;
        let err = g.multiply_by_scalar(&curve.order, &curve.alpha).unwrap_err();
        assert_eq!(err, Error::ZeroElement);

        for r in 1u64..=20 {
            let r_big = BigInt::<4>::from_u64(r);
            let (order_plus_r, _) = curve.order.add_with_carry(&r_big);
            assert_eq!(
                g.multiply_by_scalar(&order_plus_r, &curve.alpha).unwrap(),
                g.multiply_by_scalar(&r_big, &curve.alpha).unwrap()
            );
        }
    }
}
