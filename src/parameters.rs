//! Tunable constants for the thermal simulator.
//!
//! The lift parameters are supplied once per session by a configuration provider and never change
//! during a forecast run. There are deliberately no default values; without parameters the
//! simulator declines to run.
use crate::error::{AnalysisError, Result};
use metfor::{Feet, MetersPSec};
use serde::{Deserialize, Serialize};
use std::io::Read;

/// The tuning constants for the thermal column simulator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiftParameters {
    /// Rate the thermal parcel cools as it rises, &deg;C / km.
    pub lapse_rate_c_per_km: f64,
    /// Scale factor for the thermal velocity formula, m/s.
    pub velocity_constant: f64,
    /// How much warmer than the ambient air the surface must be before thermals first trigger
    /// on a given day, &deg;C.
    pub initial_trigger_temp_diff_c: f64,
    /// Surface excess needed to keep thermals going once they triggered that day, &deg;C.
    pub ongoing_trigger_temp_diff_c: f64,
    /// Depth of the near surface ramp zone where thermals are weaker, feet.
    pub ramp_distance_ft: f64,
    /// Percentage the velocity is reduced by in the ramp zone.
    pub ramp_start_pct: f64,
    /// Sink rate of the glider, subtracted from the thermal velocity, m/s.
    pub glider_sink_rate_ms: f64,
    /// Difference between the dry adiabatic and dew point lapse rates, &deg;C / km. Used for the
    /// surface cloudbase estimate.
    pub cloudbase_lapse_rates_diff_c: f64,
}

impl LiftParameters {
    /// Parse and validate parameters from a JSON string.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use soaring_analysis::LiftParameters;
    ///
    /// let params = LiftParameters::from_json_str(r#"{
    ///     "lapse_rate_c_per_km": 9.8,
    ///     "velocity_constant": 4.0,
    ///     "initial_trigger_temp_diff_c": 3.0,
    ///     "ongoing_trigger_temp_diff_c": 1.0,
    ///     "ramp_distance_ft": 1000.0,
    ///     "ramp_start_pct": 50.0,
    ///     "glider_sink_rate_ms": 1.0,
    ///     "cloudbase_lapse_rates_diff_c": 8.0
    /// }"#).unwrap();
    ///
    /// assert_eq!(params.lapse_rate_c_per_km, 9.8);
    /// assert!(LiftParameters::from_json_str("{}").is_err());
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self> {
        let params: LiftParameters = serde_json::from_str(json)?;
        params.validate()
    }

    /// Parse and validate parameters from a reader, e.g. a config file.
    pub fn from_reader<R: Read>(rdr: R) -> Result<Self> {
        let params: LiftParameters = serde_json::from_reader(rdr)?;
        params.validate()
    }

    /// Check that every value is a finite, non-negative number.
    ///
    /// The two trigger deltas are not checked against each other, either ordering is accepted.
    pub fn validate(self) -> Result<Self> {
        let fields = [
            ("lapse_rate_c_per_km", self.lapse_rate_c_per_km),
            ("velocity_constant", self.velocity_constant),
            ("initial_trigger_temp_diff_c", self.initial_trigger_temp_diff_c),
            ("ongoing_trigger_temp_diff_c", self.ongoing_trigger_temp_diff_c),
            ("ramp_distance_ft", self.ramp_distance_ft),
            ("ramp_start_pct", self.ramp_start_pct),
            ("glider_sink_rate_ms", self.glider_sink_rate_ms),
            ("cloudbase_lapse_rates_diff_c", self.cloudbase_lapse_rates_diff_c),
        ];

        for &(name, val) in fields.iter() {
            if !val.is_finite() || val < 0.0 {
                tracing::warn!(parameter = name, value = val, "rejecting lift parameters");
                return Err(AnalysisError::InvalidParameters(name));
            }
        }

        Ok(self)
    }

    /// The trigger temperature excess, depending on whether thermals already triggered today.
    #[inline]
    pub fn trigger_temp_diff(&self, triggered_today: bool) -> f64 {
        if triggered_today {
            self.ongoing_trigger_temp_diff_c
        } else {
            self.initial_trigger_temp_diff_c
        }
    }

    /// The depth of the ramp zone.
    #[inline]
    pub fn ramp_distance(&self) -> Feet {
        Feet(self.ramp_distance_ft)
    }

    /// The sink rate of the glider.
    #[inline]
    pub fn glider_sink_rate(&self) -> MetersPSec {
        MetersPSec(self.glider_sink_rate_ms)
    }
}
