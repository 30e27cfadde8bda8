//! The StarkEx variant of ECDSA: verification with `(r, w)` where `w =
//! s^-1 mod n`, plus a minimal signer for completeness (`spec.md` §1).
//!
//! Verification is the hard subsystem here (§1); signing is a thin,
//! textbook construction layered on top since the reference
//! implementation does not ship one (`spec.md` §4.E [SUPPLEMENT]).

use crate::bigint::BigInt;
use crate::curve::{EcPoint, StarkCurve};
use crate::error::{Error, Result};
use crate::field::PrimeFieldElement;
use crate::fraction::FractionFieldElement;

/// `2^251`, the exclusive upper bound every ECDSA input (`z`, `r`, `w`)
/// must satisfy in standard form (`spec.md` §4.E preconditions).
const RANGE_BOUND: BigInt<4> = BigInt::from_be_hex(
    "800000000000000000000000000000000000000000000000000000000000000",
);

fn check_in_range(value: &PrimeFieldElement, name: &'static str) -> Result<()> {
    if value.is_zero() {
        return Err(Error::ValueIsZero(name));
    }
    if value.to_bigint().cmp(&RANGE_BOUND) != core::cmp::Ordering::Less {
        return Err(Error::ValueTooBig(name));
    }
    Ok(())
}

/// A public key on the STARK curve: an [`EcPoint`] known to lie on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VerifyingKey(EcPoint<PrimeFieldElement>);

impl VerifyingKey {
    /// Wraps a full `(x, y)` public key. The caller is responsible for the
    /// point lying on the curve; [`VerifyingKey::from_x`] enforces it.
    pub fn from_point(point: EcPoint<PrimeFieldElement>) -> Self {
        Self(point)
    }

    /// Recovers a public key from its x-coordinate alone, as used by
    /// `VerifyEcdsaPartialKey`. Fails with [`Error::NotOnCurve`] if no
    /// point with this x-coordinate lies on the curve.
    pub fn from_x(x: PrimeFieldElement) -> Result<Self> {
        let curve = StarkCurve::get();
        EcPoint::get_point_from_x(x, &curve.alpha, &curve.beta)
            .map(Self)
            .ok_or(Error::NotOnCurve)
    }

    /// The underlying curve point.
    pub fn as_point(&self) -> EcPoint<PrimeFieldElement> {
        self.0
    }

    /// The x-coordinate alone, as exchanged in partial-key contexts.
    pub fn x(&self) -> PrimeFieldElement {
        self.0.x
    }

    /// Point negation: `-Q` signs exactly the messages `Q` does not and
    /// vice versa is false — verification accepts *both*, per
    /// `spec.md` §4.E's "or" branch.
    pub fn neg(&self) -> Self {
        Self(self.0.neg())
    }
}

/// A STARK-curve ECDSA signature: `(r, w)` with `w = s^-1 mod n`, matching
/// the reference implementation's wire format rather than the textbook
/// `(r, s)` pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Signature {
    /// The `r` component.
    pub r: PrimeFieldElement,
    /// `w = s^-1 mod n`.
    pub w: PrimeFieldElement,
}

/// Derives the public key `[private_key] * G` for a given private scalar.
pub fn get_public_key(private_key: &BigInt<4>) -> VerifyingKey {
    let curve = StarkCurve::get();
    let point = curve
        .generator
        .multiply_by_scalar(private_key, &curve.alpha)
        .expect("private_key is reduced by the caller and the generator has prime order n");
    VerifyingKey::from_point(point)
}

/// Verifies a STARK ECDSA signature against a full `(x, y)` public key.
///
/// Accepts iff the signature validates for `public_key` **or** for
/// `-public_key`, since partial-key verification can only recover an
/// x-coordinate and both signs must be accepted (`spec.md` §4.E).
pub fn verify(public_key: &VerifyingKey, z: &PrimeFieldElement, signature: &Signature) -> Result<bool> {
    check_in_range(z, "z")?;
    check_in_range(&signature.r, "r")?;
    check_in_range(&signature.w, "w")?;

    let curve = StarkCurve::get();
    type Frac = FractionFieldElement<PrimeFieldElement>;

    let zw = BigInt::<4>::mul_mod::<8>(&z.to_bigint(), &signature.w.to_bigint(), &curve.order)?;
    let rw = BigInt::<4>::mul_mod::<8>(
        &signature.r.to_bigint(),
        &signature.w.to_bigint(),
        &curve.order,
    )?;

    let frac_alpha = Frac::from_base(curve.alpha);
    let a: EcPoint<Frac> = curve.generator.convert_to().multiply_by_scalar(&zw, &frac_alpha)?;
    let b: EcPoint<Frac> = public_key
        .as_point()
        .convert_to()
        .multiply_by_scalar(&rw, &frac_alpha)?;

    let plus_x = a.add_with_alpha(&b, &frac_alpha)?.x.to_base_field_element()?;
    if plus_x == signature.r {
        return Ok(true);
    }
    let minus_x = a.sub(&b)?.x.to_base_field_element()?;
    Ok(minus_x == signature.r)
}

/// Verifies a STARK ECDSA signature given only the public key's
/// x-coordinate, recovering the corresponding point first.
///
/// Fails with [`Error::NotOnCurve`] if `public_key_x` does not correspond
/// to a valid point (`spec.md` §7 "does not correspond to a valid point").
pub fn verify_partial_key(
    public_key_x: &PrimeFieldElement,
    z: &PrimeFieldElement,
    signature: &Signature,
) -> Result<bool> {
    let public_key = VerifyingKey::from_x(*public_key_x)?;
    verify(&public_key, z, signature)
}

/// Textbook ECDSA-with-STARK-curve signing: `r = ([k]G).x`, `s = (z +
/// r*priv) / k mod n`, `w = s^-1 mod n`. The caller supplies the nonce
/// `k`; this crate does not derive one (`spec.md` §9 Open Questions).
///
/// This is not the hard subsystem (`spec.md` §1): `original_source` does
/// not ship a signing routine at all, so this is a minimal, from-scratch
/// implementation rather than a port.
pub fn sign(private_key: &BigInt<4>, message: &PrimeFieldElement, k: &BigInt<4>) -> Result<Signature> {
    let curve = StarkCurve::get();
    if k.is_zero() {
        return Err(Error::ValueIsZero("k"));
    }

    let r_point = curve
        .generator
        .multiply_by_scalar(k, &curve.alpha)?;
    let r = r_point.x.to_bigint();
    if r.is_zero() {
        return Err(Error::ValueIsZero("r"));
    }

    let order = curve.order;
    let z = message.to_bigint();
    let r_priv = BigInt::<4>::mul_mod::<8>(&r, private_key, &order)?;
    let (sum, carry) = z.add_with_carry(&r_priv);
    let sum = if carry != 0 || sum.cmp(&order) != core::cmp::Ordering::Less {
        sum.wrapping_sub(&order)
    } else {
        sum
    };
    if sum.is_zero() {
        return Err(Error::ValueIsZero("s"));
    }
    let k_inv = k.inv_mod_prime::<8>(&order)?;
    let s = BigInt::<4>::mul_mod::<8>(&sum, &k_inv, &order)?;
    let w = s.inv_mod_prime::<8>(&order)?;

    Ok(Signature {
        r: PrimeFieldElement::from_bigint(&r),
        w: PrimeFieldElement::from_bigint(&w),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_key_from_private_matches_known_answer() {
        let private_key = BigInt::<4>::from_be_hex(
            "3c1e9550e66958296d11b60f8e8e7a7ad990d07fa65d5f7652c4a6c87d4e3cc",
        );
        let public_key = get_public_key(&private_key);
        assert_eq!(
            public_key.x().to_bigint(),
            BigInt::from_be_hex("77a3b314db07c45076d11f62b6f9e748a39790441823307743cf00d6597ea43")
        );
        assert_eq!(
            public_key.as_point().y.to_bigint(),
            BigInt::from_be_hex("54d7beec5ec728223671c627557efc5c9a6508425dc6c900b7741bf60afec06")
        );
    }

    fn known_answer_signature() -> (VerifyingKey, PrimeFieldElement, Signature) {
        let x = PrimeFieldElement::from_bigint(&BigInt::from_be_hex(
            "77a3b314db07c45076d11f62b6f9e748a39790441823307743cf00d6597ea43",
        ));
        let y = PrimeFieldElement::from_bigint(&BigInt::from_be_hex(
            "54d7beec5ec728223671c627557efc5c9a6508425dc6c900b7741bf60afec06",
        ));
        let public_key = VerifyingKey::from_point(EcPoint::new(x, y));
        let z = PrimeFieldElement::from_bigint(&BigInt::from_be_hex(
            "397e76d1667c4454bfb83514e120583af836f8e32a516765497823eabe16a3f",
        ));
        let r = PrimeFieldElement::from_bigint(&BigInt::from_be_hex(
            "173fd03d8b008ee7432977ac27d1e9d1a1f6c98b1a2f05fa84a21c84c44e882",
        ));
        let w = PrimeFieldElement::from_bigint(&BigInt::from_be_hex(
            "1f2c44a7798f55192f153b4c48ea5c1241fbb69e6132cc8a0da9c5b62a4286e",
        ));
        (public_key, z, Signature { r, w })
    }

    #[test]
    fn verify_accepts_known_answer_and_negated_key() {
        let (public_key, z, signature) = known_answer_signature();
        assert!(verify(&public_key, &z, &signature).unwrap());
        assert!(verify(&public_key.neg(), &z, &signature).unwrap());
    }

    #[test]
    fn verify_rejects_tampered_inputs() {
        let (public_key, z, signature) = known_answer_signature();
        let one = PrimeFieldElement::ONE;
        assert!(!verify(&public_key, &z.add(&one), &signature).unwrap());
        assert!(!verify(
            &public_key,
            &z,
            &Signature { r: signature.r.add(&one), w: signature.w }
        )
        .unwrap());
        assert!(!verify(
            &public_key,
            &z,
            &Signature { r: signature.r, w: signature.w.add(&one) }
        )
        .unwrap());
    }

    #[test]
    fn verify_partial_key_matches_full_verify() {
        let (public_key, z, signature) = known_answer_signature();
        assert!(verify_partial_key(&public_key.x(), &z, &signature).unwrap());
        assert!(!verify_partial_key(&public_key.as_point().y, &z, &signature).is_ok_and(|ok| ok));
    }

    #[test]
    fn verify_partial_key_fails_off_curve_x() {
        let mut rng = rand_core::OsRng;
        let off_curve_x = loop {
            let candidate = PrimeFieldElement::random(&mut rng);
            let curve = StarkCurve::get();
            if EcPoint::get_point_from_x(candidate, &curve.alpha, &curve.beta).is_none() {
                break candidate;
            }
        };
        let z = PrimeFieldElement::random(&mut rng);
        let signature = Signature {
            r: PrimeFieldElement::random(&mut rng),
            w: PrimeFieldElement::random(&mut rng),
        };
        let err = verify_partial_key(&off_curve_x, &z, &signature).unwrap_err();
        assert_eq!(err, Error::NotOnCurve);
    }

    #[test]
    fn sign_then_verify_round_trips() {
        let mut rng = rand_core::OsRng;
        let private_key = BigInt::<4>::random(&mut rng);
        let public_key = get_public_key(&private_key);
        let message = PrimeFieldElement::random(&mut rng);
        let k = BigInt::<4>::from_be_hex(
            "54d7beec5ec728223671c627557efc5c9a6508425dc6c900b7741bf60afec06",
        );
        let signature = sign(&private_key, &message, &k).unwrap();
        assert!(verify(&public_key, &message, &signature).unwrap());
    }

    #[test]
    fn check_in_range_rejects_zero_and_too_big() {
        let err = check_in_range(&PrimeFieldElement::ZERO, "z").unwrap_err();
        assert_eq!(err, Error::ValueIsZero("z"));

        let too_big = PrimeFieldElement::from_bigint(&RANGE_BOUND);
        let err = check_in_range(&too_big, "z").unwrap_err();
        assert_eq!(err, Error::ValueTooBig("z"));
    }
}
