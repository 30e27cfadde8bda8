//! The `extern "C"` surface for embedding this crate from non-Rust callers,
//! mirroring the reference C++ shim's three entry points: `GetPublicKey`,
//! `Verify`, `Sign` (`spec.md` §6, grounded on `original_source`'s
//! `ffi/ecdsa.cc`).
//!
//! Every field element and scalar crosses the boundary as 32 big-endian
//! bytes, standard form (not Montgomery form) — the same layout the
//! reference shim's `Serialize`/`Deserialize` helpers use. There is no
//! panic-across-FFI path: every fallible step is caught and turned into a
//! `0`/non-zero return code, since unwinding across an `extern "C"`
//! boundary is undefined behavior.

#![allow(unsafe_code, non_snake_case)]

use std::panic::AssertUnwindSafe;

use crate::bigint::BigInt;
use crate::ecdsa::{self, Signature};
use crate::field::PrimeFieldElement;

/// Byte width of a single field element / scalar on the wire.
pub const ELEMENT_SIZE: usize = 32;

fn read_element(bytes: &[u8; ELEMENT_SIZE]) -> PrimeFieldElement {
    PrimeFieldElement::from_be_bytes(bytes)
}

fn write_element(value: PrimeFieldElement, out: &mut [u8; ELEMENT_SIZE]) {
    *out = value.to_be_bytes();
}

fn catch<F: FnOnce() -> R, R>(f: F) -> Option<R> {
    std::panic::catch_unwind(AssertUnwindSafe(f)).ok()
}

/// Derives the public key for `private_key` and writes its x-coordinate,
/// standard form, big-endian, into `out`.
///
/// Returns `0` on success, `1` on failure (mirrors the reference shim's
/// convention, which uses `0` for success and a non-zero libc-style error
/// code otherwise — this crate collapses all failures to `1` since no
/// caller-visible error message channel exists here).
///
/// # Safety
/// `private_key` must point to `ELEMENT_SIZE` readable bytes and `out` to
/// `ELEMENT_SIZE` writable bytes; both must be non-null and not overlap.
#[no_mangle]
pub unsafe extern "C" fn GetPublicKey(
    private_key: *const u8,
    out: *mut u8,
) -> i32 {
    let private_key = unsafe { &*(private_key as *const [u8; ELEMENT_SIZE]) };
    let out = unsafe { &mut *(out as *mut [u8; ELEMENT_SIZE]) };

    let result = catch(|| {
        let scalar = BigInt::<4>::from_be_bytes(private_key);
        ecdsa::get_public_key(&scalar).x()
    });
    match result {
        Some(public_key_x) => {
            write_element(public_key_x, out);
            0
        }
        None => 1,
    }
}

/// Verifies an ECDSA signature against a public key's x-coordinate alone
/// (`VerifyEcdsaPartialKey` in the reference shim).
///
/// Returns `1` if the signature is valid, `0` otherwise (including any
/// error: a malformed key, an out-of-range scalar, and so on — the
/// reference shim likewise collapses every verification failure to
/// `false`).
///
/// # Safety
/// `stark_key`, `msg_hash`, `r_bytes`, `w_bytes` must each point to
/// `ELEMENT_SIZE` readable bytes, non-null.
#[no_mangle]
pub unsafe extern "C" fn Verify(
    stark_key: *const u8,
    msg_hash: *const u8,
    r_bytes: *const u8,
    w_bytes: *const u8,
) -> i32 {
    let stark_key = unsafe { &*(stark_key as *const [u8; ELEMENT_SIZE]) };
    let msg_hash = unsafe { &*(msg_hash as *const [u8; ELEMENT_SIZE]) };
    let r_bytes = unsafe { &*(r_bytes as *const [u8; ELEMENT_SIZE]) };
    let w_bytes = unsafe { &*(w_bytes as *const [u8; ELEMENT_SIZE]) };

    let result = catch(|| {
        let public_key_x = read_element(stark_key);
        let z = read_element(msg_hash);
        let signature = Signature {
            r: read_element(r_bytes),
            w: read_element(w_bytes),
        };
        ecdsa::verify_partial_key(&public_key_x, &z, &signature)
    });
    match result {
        Some(Ok(true)) => 1,
        _ => 0,
    }
}

/// Signs `message` with `private_key` and nonce `k`, writing `r` then `w`
/// (32 bytes each, standard form, big-endian) into `out`, which must hold
/// at least `2 * ELEMENT_SIZE` bytes.
///
/// Returns `0` on success, `1` on failure (e.g. `k` is zero, or the
/// resulting `r`/`s` happens to be zero).
///
/// # Safety
/// `private_key`, `message`, `k` must point to `ELEMENT_SIZE` readable
/// bytes; `out` to `2 * ELEMENT_SIZE` writable bytes.
#[no_mangle]
pub unsafe extern "C" fn Sign(
    private_key: *const u8,
    message: *const u8,
    k: *const u8,
    out: *mut u8,
) -> i32 {
    let private_key = unsafe { &*(private_key as *const [u8; ELEMENT_SIZE]) };
    let message = unsafe { &*(message as *const [u8; ELEMENT_SIZE]) };
    let k = unsafe { &*(k as *const [u8; ELEMENT_SIZE]) };
    let out = unsafe { core::slice::from_raw_parts_mut(out, 2 * ELEMENT_SIZE) };

    let result = catch(|| {
        let scalar = BigInt::<4>::from_be_bytes(private_key);
        let message = read_element(message);
        let k = BigInt::<4>::from_be_bytes(k);
        ecdsa::sign(&scalar, &message, &k)
    });
    match result {
        Some(Ok(signature)) => {
            let mut r_bytes = [0u8; ELEMENT_SIZE];
            let mut w_bytes = [0u8; ELEMENT_SIZE];
            write_element(signature.r, &mut r_bytes);
            write_element(signature.w, &mut w_bytes);
            out[..ELEMENT_SIZE].copy_from_slice(&r_bytes);
            out[ELEMENT_SIZE..].copy_from_slice(&w_bytes);
            0
        }
        _ => 1,
    }
}
