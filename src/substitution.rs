//! Keys for recording where a calculation recovered from degenerate math.
//!
//! None of the algorithms in this crate give up on a bad value. When an interpolation has a zero
//! denominator or the provider handed over a missing number, the nearest sensible value is
//! substituted and the calculation carries on. Every such substitution is logged with `tracing`
//! and recorded in a `Substitutions` set on the result, so a consumer can tell a clean number
//! from a patched one.
use std::fmt::Display;
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

/// The kinds of substitutions that can be made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Substitution {
    /// A value from the forecast provider was missing or not finite and was replaced with 0.
    MissingInput = 0,
    /// The cloudbase interpolation ratio had a near zero denominator or was not finite.
    DegenerateCloudbaseRatio = 1,
    /// The top of lift interpolation ratio had a near zero denominator or was not finite.
    DegenerateTopOfLiftRatio = 2,
    /// The thermal velocity formula produced a value that was not a finite number.
    InvalidVelocity = 3,
    /// A thermal index crossing could not be interpolated and the nearer point was used.
    DegenerateIndexCrossing = 4,
}

impl Substitution {
    #[inline]
    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl Display for Substitution {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use Substitution::*;

        let msg = match self {
            MissingInput => "missing input replaced with 0",
            DegenerateCloudbaseRatio => "degenerate cloudbase ratio",
            DegenerateTopOfLiftRatio => "degenerate top of lift ratio",
            InvalidVelocity => "invalid thermal velocity replaced with 0",
            DegenerateIndexCrossing => "degenerate thermal index crossing",
        };

        write!(f, "{}", msg)
    }
}

/// A set of substitutions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Substitutions(u8);

impl Substitutions {
    /// An empty set.
    #[inline]
    pub fn new() -> Self {
        Substitutions(0)
    }

    /// Add a substitution to the set.
    #[inline]
    pub fn insert(&mut self, sub: Substitution) {
        self.0 |= sub.bit();
    }

    /// Check for a substitution in the set.
    #[inline]
    pub fn contains(&self, sub: Substitution) -> bool {
        self.0 & sub.bit() != 0
    }

    /// True if no substitutions were made.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// All of the substitutions in either set.
    #[inline]
    pub fn union(self, other: Substitutions) -> Substitutions {
        Substitutions(self.0 | other.0)
    }

    /// Iterate over the substitutions in the set.
    pub fn iter(&self) -> impl Iterator<Item = Substitution> {
        let bits = self.0;
        Substitution::iter().filter(move |sub| bits & sub.bit() != 0)
    }
}

impl From<Substitution> for Substitutions {
    fn from(sub: Substitution) -> Self {
        Substitutions(sub.bit())
    }
}
