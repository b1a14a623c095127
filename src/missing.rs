//! Equality for values that may be missing.
//!
//! The missing value of a `metfor` quantity in an `Optioned` is NaN, so comparing two `Optioned`
//! quantities directly never finds two missing values equal. Types holding `Optioned` fields
//! compare them with `same` instead of deriving `PartialEq`.

use optional::{Noned, Optioned};

/// Two optional values are the same if both are missing or both hold equal values.
#[inline]
pub(crate) fn same<T>(left: Optioned<T>, right: Optioned<T>) -> bool
where
    T: Noned + Copy + PartialEq,
{
    left.into_option() == right.into_option()
}
