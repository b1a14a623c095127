//! The fixed ladder of pressure levels a forecast provides for every hour.
//!
//! Forecast models report upper air data on constant pressure surfaces. The thermal simulator
//! only needs nine of them, from 900 hPa up to 500 hPa, and each is described by its geopotential
//! height and the ambient temperature and dew point there.
use crate::{
    error::{AnalysisError, Result},
    substitution::{Substitution, Substitutions},
};
use metfor::{Celsius, Feet, HectoPascal, Quantity};
use optional::Optioned;
use std::fmt::Display;
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

/// Number of levels in a `LevelLadder`.
pub const LADDER_SIZE: usize = 9;

/// The pressure levels of the ladder, in order from the bottom up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, Hash, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum PressureLevel {
    Hpa900,
    Hpa850,
    Hpa800,
    Hpa750,
    Hpa700,
    Hpa650,
    Hpa600,
    Hpa550,
    Hpa500,
}

impl PressureLevel {
    /// The pressure of this level.
    pub fn pressure(self) -> HectoPascal {
        use PressureLevel::*;

        let hpa = match self {
            Hpa900 => 900.0,
            Hpa850 => 850.0,
            Hpa800 => 800.0,
            Hpa750 => 750.0,
            Hpa700 => 700.0,
            Hpa650 => 650.0,
            Hpa600 => 600.0,
            Hpa550 => 550.0,
            Hpa500 => 500.0,
        };

        HectoPascal(hpa)
    }

    /// Position of this level in the ladder, 0 is the bottom.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl Display for PressureLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:.0} hPa", self.pressure().unpack())
    }
}

/// One pressure level at one forecast hour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelSample {
    /// Geopotential height of the level.
    pub height: Feet,
    /// Ambient temperature.
    pub temperature: Celsius,
    /// Ambient dew point.
    pub dew_point: Celsius,
}

impl LevelSample {
    /// Create a new sample.
    #[inline]
    pub fn new(height: Feet, temperature: Celsius, dew_point: Celsius) -> Self {
        LevelSample {
            height,
            temperature,
            dew_point,
        }
    }

    /// Build a sample from provider values that may be missing.
    ///
    /// The forecast providers treat a missing number as 0, so that is what is substituted here.
    /// Any substitution is logged and reported in the returned set.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use metfor::{Celsius, Feet};
    /// use optional::{none, some};
    /// use soaring_analysis::{LevelSample, Substitution};
    ///
    /// let (sample, subs) = LevelSample::from_provider(
    ///     some(Feet(4500.0)),
    ///     some(Celsius(12.0)),
    ///     none(),
    /// );
    /// assert_eq!(sample.dew_point, Celsius(0.0));
    /// assert!(subs.contains(Substitution::MissingInput));
    /// ```
    pub fn from_provider(
        height: Optioned<Feet>,
        temperature: Optioned<Celsius>,
        dew_point: Optioned<Celsius>,
    ) -> (Self, Substitutions) {
        let mut subs = Substitutions::new();

        let height = or_zero(height, "height", &mut subs);
        let temperature = or_zero(temperature, "temperature", &mut subs);
        let dew_point = or_zero(dew_point, "dew point", &mut subs);

        (LevelSample::new(height, temperature, dew_point), subs)
    }

    /// Check whether the ambient air at this level is saturated.
    #[inline]
    pub fn is_saturated(&self) -> bool {
        self.temperature <= self.dew_point
    }
}

fn or_zero<Q>(val: Optioned<Q>, name: &'static str, subs: &mut Substitutions) -> Q
where
    Q: Quantity + optional::Noned + Copy,
{
    match val.into_option() {
        Some(v) if v.unpack().is_finite() => v,
        _ => {
            tracing::warn!(field = name, "missing level value, substituting 0");
            subs.insert(Substitution::MissingInput);
            Q::pack(0.0)
        }
    }
}

/// The ladder of levels for a single forecast hour, ordered from the bottom up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelLadder {
    levels: [LevelSample; LADDER_SIZE],
}

impl LevelLadder {
    /// Create a ladder from samples ordered bottom (900 hPa) to top (500 hPa).
    pub fn new(levels: [LevelSample; LADDER_SIZE]) -> Self {
        LevelLadder { levels }
    }

    /// Create a ladder from a slice, which must have exactly one sample per pressure level.
    pub fn from_slice(levels: &[LevelSample]) -> Result<Self> {
        if levels.len() != LADDER_SIZE {
            return Err(AnalysisError::InvalidInput);
        }

        let mut arr = [levels[0]; LADDER_SIZE];
        arr.copy_from_slice(levels);

        Ok(LevelLadder { levels: arr })
    }

    /// Get the sample for a pressure level.
    #[inline]
    pub fn level(&self, lvl: PressureLevel) -> &LevelSample {
        &self.levels[lvl.index()]
    }

    /// The top of the ladder.
    #[inline]
    pub fn top(&self) -> &LevelSample {
        &self.levels[LADDER_SIZE - 1]
    }

    /// Iterate over the levels from the bottom up.
    pub fn iter(&self) -> impl Iterator<Item = (PressureLevel, &LevelSample)> {
        PressureLevel::iter().zip(self.levels.iter())
    }

    /// The samples from the bottom up.
    #[inline]
    pub fn samples(&self) -> &[LevelSample] {
        &self.levels
    }
}
