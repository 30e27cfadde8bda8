//! Error type shared by every module in this crate.

use core::fmt;

/// The error type returned by fallible operations in this crate.
///
/// Variants carry enough context to reproduce the exact wording used by
/// the reference StarkEx/StarkNet implementation, since several callers
/// (notably order-message validation) key off of specific substrings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error {
    /// A division was attempted with a zero divisor.
    DivisorZero,
    /// A [`crate::bigint::BigInt::inv_mod_prime`] modular inverse was requested for zero.
    InverseOfZero,
    /// A [`crate::field::PrimeFieldElement::invert`] inverse was requested for zero.
    FieldInverseOfZero,
    /// A [`crate::fraction::FractionFieldElement`] with a zero numerator has no inverse.
    FractionHasNoInverse,
    /// A scalar multiplication produced the point at infinity, which this
    /// crate cannot represent.
    ZeroElement,
    /// An x-coordinate does not lie on the curve.
    NotOnCurve,
    /// A packed order message does not fit the bit width an order id is
    /// extracted from.
    MessageOutOfRange,
    /// A named order-message field value exceeds its documented bound, or an
    /// `order_type` outside `{0, 1, 2}` was supplied.
    FieldOutOfRange(&'static str),
    /// A named ECDSA input (`z`, `r` or `w`) was zero.
    ValueIsZero(&'static str),
    /// A named ECDSA input (`z`, `r` or `w`) exceeded the curve's range bound.
    ValueTooBig(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::DivisorZero => write!(f, "divisor must not be zero"),
            Error::InverseOfZero => write!(f, "Inverse of 0 is not defined."),
            Error::FieldInverseOfZero => write!(f, "Zero does not have an inverse."),
            Error::FractionHasNoInverse => write!(f, "Zero does not have an inverse."),
            Error::ZeroElement => write!(f, "the result is the zero element (point at infinity)"),
            Error::NotOnCurve => {
                write!(f, "the given value does not correspond to a valid point on the elliptic curve.")
            }
            Error::MessageOutOfRange => write!(f, "message is out of range."),
            Error::FieldOutOfRange(name) => {
                if *name == "order_type" {
                    write!(f, "Invalid order_type.")
                } else {
                    write!(f, "{name} is out of range.")
                }
            }
            Error::ValueIsZero(name) => write!(f, "{name} cannot be zero."),
            Error::ValueTooBig(name) => write!(f, "{name} is too big."),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Convenience alias used throughout this crate.
pub type Result<T> = core::result::Result<T, Error>;
