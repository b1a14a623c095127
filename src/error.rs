//! Error types for the soaring-analysis crate.
use std::{error::Error, fmt::Display};

/// Error type for the crate.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum AnalysisError {
    /// The lift parameters have not been delivered yet, so no thermal analysis can be done.
    LiftParametersUnavailable,
    /// A lift parameter was negative or not a finite number.
    InvalidParameters(&'static str),
    /// The lift parameters could not be parsed.
    ConfigFormat(String),
    /// Forecast hours were not supplied in strictly increasing chronological order.
    UnorderedForecast,
    /// A value that is required is not available.
    MissingValue,
    /// Not enough data available for analysis
    NotEnoughData,
    /// Bad or invalid input.
    InvalidInput,
}

impl Display for AnalysisError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use AnalysisError::*;

        match self {
            LiftParametersUnavailable => write!(f, "lift parameters are not available"),
            InvalidParameters(name) => write!(f, "invalid lift parameter: {}", name),
            ConfigFormat(msg) => write!(f, "unable to parse lift parameters: {}", msg),
            UnorderedForecast => write!(f, "forecast hours are not in chronological order"),
            MissingValue => write!(f, "missing value required for analysis"),
            NotEnoughData => write!(f, "not enough data available for analysis"),
            InvalidInput => write!(f, "invalid input"),
        }
    }
}

impl Error for AnalysisError {}

impl From<serde_json::Error> for AnalysisError {
    fn from(err: serde_json::Error) -> Self {
        AnalysisError::ConfigFormat(err.to_string())
    }
}

/// Shorthand for results.
pub type Result<T> = std::result::Result<T, AnalysisError>;
