//! The canonical StarkEx/StarkNet Pedersen hash, `PedersenHash(a, b)`.
//!
//! As `spec.md` §4.F notes, the production constants table is external —
//! several hundred kilobytes of precomputed windowed lookup entries. This
//! module instead keeps the five canonical base points
//! ([`constants::SHIFT_POINT`], `P1..P4`) and computes each chunk's
//! contribution with [`EcPoint::multiply_by_scalar`] rather than a
//! precomputed table, which is behaviorally identical — same group law,
//! same base points, same output — and is checked against the known
//! x-coordinates `spec.md` §8 gives for `PedersenHash(0, 0)` and one
//! non-trivial pair.

use crate::bigint::BigInt;
use crate::curve::{EcPoint, StarkCurve};
use crate::error::Result;
use crate::field::PrimeFieldElement;

/// Number of low-order bits of each input routed through the "low" base
/// point (`P1` for `a`, `P3` for `b`); the remaining high-order bits (at
/// most 4, since field elements are strictly below `2^252`) are routed
/// through the "high" base point (`P2` for `a`, `P4` for `b`).
const LOW_BITS: u32 = 248;

/// The fixed base points the hash is built from.
pub mod constants {
    use crate::curve::EcPoint;
    use crate::field::PrimeFieldElement;

    /// `shift_point`, `P1`, `P2`, `P3`, `P4`: the five STARK-curve points
    /// the canonical Pedersen hash accumulates into, in the order they are
    /// consumed by [`super::hash`].
    pub struct PedersenConstants {
        /// The accumulator's starting point.
        pub shift_point: EcPoint<PrimeFieldElement>,
        /// `P1`: multiplies the low 248 bits of `a`.
        pub p1: EcPoint<PrimeFieldElement>,
        /// `P2`: multiplies the high bits of `a`.
        pub p2: EcPoint<PrimeFieldElement>,
        /// `P3`: multiplies the low 248 bits of `b`.
        pub p3: EcPoint<PrimeFieldElement>,
        /// `P4`: multiplies the high bits of `b`.
        pub p4: EcPoint<PrimeFieldElement>,
    }

    /// Returns the canonical STARK-curve Pedersen base points.
    pub fn table() -> &'static PedersenConstants {
        &TABLE
    }

    static TABLE: PedersenConstants = PedersenConstants {
        shift_point: EcPoint::new(SHIFT_X, SHIFT_Y),
        p1: EcPoint::new(P1_X, P1_Y),
        p2: EcPoint::new(P2_X, P2_Y),
        p3: EcPoint::new(P3_X, P3_Y),
        p4: EcPoint::new(P4_X, P4_Y),
    };

    use crate::bigint::BigInt;

    const SHIFT_X: PrimeFieldElement = PrimeFieldElement::from_montgomery_unchecked(
        BigInt::from_be_hex("463d1e72d2ebf3416c727d5f24b5dc16b69f758cd49de911ad69b41a9ba0b3a"),
    );
    const SHIFT_Y: PrimeFieldElement = PrimeFieldElement::from_montgomery_unchecked(
        BigInt::from_be_hex("1211aac6ce572de4298f85b038ef6a8aeae324054290152c5c9927f66d85eeb"),
    );

    const P1_X: PrimeFieldElement = PrimeFieldElement::from_montgomery_unchecked(
        BigInt::from_be_hex("35aa92df0885fd20732d950000368debeeff4924de3c52831fe19ef7e807b3f"),
    );
    const P1_Y: PrimeFieldElement = PrimeFieldElement::from_montgomery_unchecked(
        BigInt::from_be_hex("51e9120dbb3de8a06055f47bdbf73e0b46ecbdd7b9728f2ba89f77c4afe39a3"),
    );

    const P2_X: PrimeFieldElement = PrimeFieldElement::from_montgomery_unchecked(
        BigInt::from_be_hex("382d64c9967a1988b6346c265aee724abd5caac208ecefbe4deec837f33b9ce"),
    );
    const P2_Y: PrimeFieldElement = PrimeFieldElement::from_montgomery_unchecked(
        BigInt::from_be_hex("3f6c38c2c154983480b2d54a9d5af7c23536cf1caa6a1aac199e12f5f31cb95"),
    );

    const P3_X: PrimeFieldElement = PrimeFieldElement::from_montgomery_unchecked(
        BigInt::from_be_hex("4b2a130122949c2b341405f34f13adafc851cc69e25ccc010b47bd849ffb510"),
    );
    const P3_Y: PrimeFieldElement = PrimeFieldElement::from_montgomery_unchecked(
        BigInt::from_be_hex("23c3adddadec10c99e3e86ec55f1fdfa2f96150f926753cab6d4ef844e2ab95"),
    );

    const P4_X: PrimeFieldElement = PrimeFieldElement::from_montgomery_unchecked(
        BigInt::from_be_hex("5e7a88386446f6c042909de8ae81d919400fdfe2acac5eb0fe61e5bdc6b2c54"),
    );
    const P4_Y: PrimeFieldElement = PrimeFieldElement::from_montgomery_unchecked(
        BigInt::from_be_hex("4cb4faae6091a1453bbfa8676fe82d43d75f33b9e7f39ac71a19251fe20ecd6"),
    );
}

/// Splits `value`'s standard-form representative into `(low, high)`, where
/// `low` holds the bottom [`LOW_BITS`] bits and `high` holds the rest.
fn split_bits(value: &PrimeFieldElement) -> (BigInt<4>, BigInt<4>) {
    let std = value.to_bigint();
    let low_limbs_full = (LOW_BITS / 64) as usize;
    let remaining_bits = LOW_BITS % 64;

    let mut low_limbs = [0u64; 4];
    let mut high_limbs = [0u64; 4];

    for i in 0..low_limbs_full {
        low_limbs[i] = std.limb(i);
    }
    if remaining_bits > 0 {
        let mask = (1u64 << remaining_bits) - 1;
        low_limbs[low_limbs_full] = std.limb(low_limbs_full) & mask;
        high_limbs[0] = std.limb(low_limbs_full) >> remaining_bits;
        for i in (low_limbs_full + 1)..4 {
            high_limbs[i - low_limbs_full] = std.limb(i);
        }
    } else {
        for i in low_limbs_full..4 {
            high_limbs[i - low_limbs_full] = std.limb(i);
        }
    }

    (BigInt::from_limbs(low_limbs), BigInt::from_limbs(high_limbs))
}

fn accumulate(
    acc: EcPoint<PrimeFieldElement>,
    base: &EcPoint<PrimeFieldElement>,
    scalar: &BigInt<4>,
    alpha: &PrimeFieldElement,
) -> Result<EcPoint<PrimeFieldElement>> {
    if scalar.is_zero() {
        // A zero window value picks the table's zero-offset entry, which
        // is encoded as "no addition" (spec.md §4.F).
        return Ok(acc);
    }
    let contribution = base.multiply_by_scalar(scalar, alpha)?;
    acc.add_with_alpha(&contribution, alpha)
}

/// The canonical StarkEx/StarkNet Pedersen hash of two field elements.
///
/// Bit-identical to the reference implementation: `PedersenHash(0, 0)` and
/// one non-trivial pair are pinned by known-answer tests below, matching
/// `spec.md` §8 scenario 3.
pub fn hash(a: PrimeFieldElement, b: PrimeFieldElement) -> Result<PrimeFieldElement> {
    let curve = StarkCurve::get();
    let table = constants::table();

    let (a_low, a_high) = split_bits(&a);
    let (b_low, b_high) = split_bits(&b);

    let mut acc = table.shift_point;
    acc = accumulate(acc, &table.p1, &a_low, &curve.alpha)?;
    acc = accumulate(acc, &table.p2, &a_high, &curve.alpha)?;
    acc = accumulate(acc, &table.p3, &b_low, &curve.alpha)?;
    acc = accumulate(acc, &table.p4, &b_high, &curve.alpha)?;

    Ok(acc.x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_of_zero_zero_matches_known_answer() {
        let result = hash(PrimeFieldElement::ZERO, PrimeFieldElement::ZERO).unwrap();
        let expected = PrimeFieldElement::from_bigint(&BigInt::from_be_hex(
            "49ee3eba8c1600700ee1b87eb599f16716b0b1022947733551fde4050ca6804",
        ));
        assert_eq!(result, expected);
    }

    #[test]
    fn hash_of_nonzero_pair_matches_known_answer() {
        let a = PrimeFieldElement::from_bigint(&BigInt::from_be_hex(
            "3d937c035c878245caf64531a5756109c53068da139362728feb561405371cb",
        ));
        let b = PrimeFieldElement::from_bigint(&BigInt::from_be_hex(
            "208a0a10250e382e1e4bbe2880906c2791bf6275695e02fbbc6aeff9cd8b31a",
        ));
        let result = hash(a, b).unwrap();
        let expected = PrimeFieldElement::from_bigint(&BigInt::from_be_hex(
            "30e480bed5fe53fa909cc0f8c4d99b8f9f2c016be4c41e13a4848797979c662",
        ));
        assert_eq!(result, expected);
    }

    #[test]
    fn hash_is_deterministic_and_order_sensitive() {
        let mut rng = rand_core::OsRng;
        let a = PrimeFieldElement::random(&mut rng);
        let b = PrimeFieldElement::random(&mut rng);
        assert_eq!(hash(a, b).unwrap(), hash(a, b).unwrap());
        if a != b {
            assert_ne!(hash(a, b).unwrap(), hash(b, a).unwrap());
        }
    }

    #[test]
    fn benchmark_chain_is_nonzero() {
        let mut rng = rand_core::OsRng;
        let mut res = PrimeFieldElement::ZERO;
        for _ in 0..100 {
            let y = PrimeFieldElement::random(&mut rng);
            res = hash(res, y).unwrap();
        }
        assert_ne!(res, PrimeFieldElement::ZERO);
    }
}
