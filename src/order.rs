//! StarkEx order-message serialization: fixed-order bit packing of a trade
//! tuple, hashed with [`crate::pedersen`] into a single field element, plus
//! 63-bit order-id extraction from the resulting message.
//!
//! `spec.md` §4.G names three message shapes (settlement, transfer,
//! conditional transfer); the exact parameter lists and the
//! `expiration_timestamp` units below are carried over from
//! `original_source`'s `order.h`/`order.cc` ([SUPPLEMENT] in
//! `SPEC_FULL.md`).

use crate::bigint::BigInt;
use crate::error::{Error, Result};
use crate::field::PrimeFieldElement;
use crate::pedersen;

const ORDER_TYPE_LIMIT: u64 = 3;
const VAULT_ID_LIMIT: u64 = 1 << 31;
const AMOUNT_LIMIT: u64 = 1 << 63;
const NONCE_LIMIT: u64 = 1 << 31;
const EXPIRATION_TIMESTAMP_LIMIT: u64 = 1 << 22;

/// Upper bound (exclusive) any order message must satisfy for
/// [`get_order_id_from_message`] to recover a well-formed 63-bit id: the
/// message's standard-form top limb must be below `2^59`, i.e. the message
/// itself below `2^251`.
const TOP_LIMB_LIMIT: u64 = 1 << 59;

fn check_limit(value: u64, limit: u64, name: &'static str) -> Result<()> {
    if value >= limit {
        return Err(Error::FieldOutOfRange(name));
    }
    Ok(())
}

/// Packs the seven order-tuple fields into a single field element by
/// repeated shift-and-add, in the fixed order `(order_type, vault_a,
/// vault_b, amount_a, amount_b, nonce, expiration_timestamp)`.
///
/// Each field is range-checked against its documented limit (`spec.md`
/// §3) before packing; out-of-range inputs fail with
/// [`Error::FieldOutOfRange`].
fn get_order_packed_message(
    order_type: u64,
    vault_a: u64,
    vault_b: u64,
    amount_a: u64,
    amount_b: u64,
    nonce: u64,
    expiration_timestamp: u64,
) -> Result<PrimeFieldElement> {
    check_limit(order_type, ORDER_TYPE_LIMIT, "order_type")?;
    check_limit(vault_a, VAULT_ID_LIMIT, "vault_a")?;
    check_limit(vault_b, VAULT_ID_LIMIT, "vault_b")?;
    check_limit(amount_a, AMOUNT_LIMIT, "amount_a")?;
    check_limit(amount_b, AMOUNT_LIMIT, "amount_b")?;
    check_limit(nonce, NONCE_LIMIT, "nonce")?;
    check_limit(
        expiration_timestamp,
        EXPIRATION_TIMESTAMP_LIMIT,
        "expiration_timestamp",
    )?;

    let mut packed = PrimeFieldElement::from_u64(order_type);
    packed = packed
        .mul(&PrimeFieldElement::from_u64(VAULT_ID_LIMIT))
        .add(&PrimeFieldElement::from_u64(vault_a));
    packed = packed
        .mul(&PrimeFieldElement::from_u64(VAULT_ID_LIMIT))
        .add(&PrimeFieldElement::from_u64(vault_b));
    packed = packed
        .mul(&PrimeFieldElement::from_u64(AMOUNT_LIMIT))
        .add(&PrimeFieldElement::from_u64(amount_a));
    packed = packed
        .mul(&PrimeFieldElement::from_u64(AMOUNT_LIMIT))
        .add(&PrimeFieldElement::from_u64(amount_b));
    packed = packed
        .mul(&PrimeFieldElement::from_u64(NONCE_LIMIT))
        .add(&PrimeFieldElement::from_u64(nonce));
    packed = packed
        .mul(&PrimeFieldElement::from_u64(EXPIRATION_TIMESTAMP_LIMIT))
        .add(&PrimeFieldElement::from_u64(expiration_timestamp));
    Ok(packed)
}

/// Builds the canonical settlement-order message.
///
/// `party_a` sells `amount_sell` of `token_sell` from `vault_id_sell` and
/// buys `amount_buy` of `token_buy` into `vault_id_buy`.
/// `expiration_timestamp` is hours elapsed since the Unix epoch (`unix
/// timestamp / 3600`).
#[allow(clippy::too_many_arguments)]
pub fn get_settlement_order_message(
    vault_id_sell: u64,
    vault_id_buy: u64,
    amount_sell: u64,
    amount_buy: u64,
    nonce: u64,
    expiration_timestamp: u64,
    token_sell: PrimeFieldElement,
    token_buy: PrimeFieldElement,
) -> Result<PrimeFieldElement> {
    let packed = get_order_packed_message(
        0,
        vault_id_sell,
        vault_id_buy,
        amount_sell,
        amount_buy,
        nonce,
        expiration_timestamp,
    )?;
    pedersen::hash(pedersen::hash(token_sell, token_buy)?, packed)
}

/// Builds the canonical transfer-order message.
///
/// The sender transfers `amount` of `token` to `target_public_key`, from
/// `sender_vault_id` to `target_vault_id`. `amount_b` is implicitly zero,
/// per `spec.md` §4.G. `expiration_timestamp` is hours elapsed since the
/// Unix epoch.
pub fn get_transfer_order_message(
    sender_vault_id: u64,
    target_vault_id: u64,
    amount: u64,
    nonce: u64,
    expiration_timestamp: u64,
    token: PrimeFieldElement,
    target_public_key: PrimeFieldElement,
) -> Result<PrimeFieldElement> {
    let packed = get_order_packed_message(
        1,
        sender_vault_id,
        target_vault_id,
        amount,
        0,
        nonce,
        expiration_timestamp,
    )?;
    pedersen::hash(pedersen::hash(token, target_public_key)?, packed)
}

/// Builds the canonical conditional-transfer-order message.
///
/// As [`get_transfer_order_message`], except the transfer is only valid if
/// `condition` holds; this is folded into the message by hashing the
/// transfer's inner digest together with `condition` before packing.
#[allow(clippy::too_many_arguments)]
pub fn get_conditional_transfer_order_message(
    sender_vault_id: u64,
    target_vault_id: u64,
    amount: u64,
    nonce: u64,
    expiration_timestamp: u64,
    token: PrimeFieldElement,
    target_public_key: PrimeFieldElement,
    condition: PrimeFieldElement,
) -> Result<PrimeFieldElement> {
    let packed = get_order_packed_message(
        2,
        sender_vault_id,
        target_vault_id,
        amount,
        0,
        nonce,
        expiration_timestamp,
    )?;
    let inner = pedersen::hash(token, target_public_key)?;
    pedersen::hash(pedersen::hash(inner, condition)?, packed)
}

/// Extracts the 63-bit order id from an order message (the result of one
/// of the `get_*_order_message` functions above).
///
/// The message's standard-form top limb must be below `2^59` — i.e. the
/// message itself below `2^251` — else this fails with
/// [`Error::MessageOutOfRange`]. The id is then the message's 63 high
/// bits: 60 bits from the top limb and 4 more from the next one.
pub fn get_order_id_from_message(message: PrimeFieldElement) -> Result<u64> {
    let bigint = message.to_bigint();
    let top_limb = bigint.limb(3);
    if top_limb >= TOP_LIMB_LIMIT {
        return Err(Error::MessageOutOfRange);
    }
    Ok((top_limb << 4) | (bigint.limb(2) >> 60))
}
