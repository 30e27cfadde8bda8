#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "ffi"), forbid(unsafe_code))]
#![cfg_attr(feature = "ffi", deny(unsafe_code))]
#![warn(
    clippy::mod_module_files,
    clippy::unwrap_used,
    missing_docs,
    rust_2018_idioms,
    unused_lifetimes,
    unused_qualifications
)]

//! Pure Rust implementation of the STARK-friendly elliptic curve used by
//! the StarkEx/StarkNet family of protocols.
//!
//! This crate is deliberately narrow: it implements exactly one curve,
//! over exactly one prime field, and does not aim to be a general-purpose
//! bignum or elliptic-curve library. See [`curve`] for the curve
//! parameters and [`ecdsa`]/[`pedersen`]/[`order`] for the
//! application-facing operations built on top of them.
//!
//! ## Feature flags
//!
//! - `std` (default): enables `std::error::Error` impls and OS randomness.
//! - `alloc`: enables allocation-dependent trait impls.
//! - `serde`: `Serialize`/`Deserialize` for field elements, points and
//!   order messages via [`serdect`].
//! - `zeroize`: [`zeroize::Zeroize`] impls for signing-path secrets.
//! - `ffi`: the `extern "C"` surface described in [`ffi`].

#[cfg(feature = "alloc")]
extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub mod bigint;
pub mod curve;
pub mod ecdsa;
pub mod error;
pub mod field;
pub mod fraction;
#[cfg(feature = "ffi")]
pub mod ffi;
pub mod order;
pub mod pedersen;

pub use bigint::BigInt;
pub use curve::{EcPoint, StarkCurve};
pub use error::{Error, Result};
pub use field::PrimeFieldElement;
pub use fraction::FractionFieldElement;

/// Number of 64-bit limbs used to represent field elements and scalars.
///
/// The STARK field modulus is 252 bits wide; four 64-bit limbs (256 bits)
/// give headroom for Montgomery reduction without a fifth limb.
pub const LIMBS: usize = 4;

/// Width of the double-wide intermediate used by [`bigint::BigInt::widening_mul`]
/// and friends when operating on [`LIMBS`]-limb values.
pub const WIDE_LIMBS: usize = 2 * LIMBS;

/// A [`BigInt`] sized to hold a field element or scalar of this curve.
pub type Limb = BigInt<LIMBS>;
