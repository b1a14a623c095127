#![warn(missing_docs)]
//! Thermal lift and atmospheric profile analysis for soaring forecasts.
//!
//! There are two independent analyses:
//!
//!  - A thermal column simulator that walks a rising parcel up a ladder of 9 pressure levels for
//!    each forecast hour, producing thermal velocities, cloudbase, and top of lift. The forecast
//!    assembler runs it over a site's hourly forecast, carrying whether thermals already
//!    triggered from hour to hour within a day.
//!  - A sounding index locator that finds where the thermal index of a fine grained sounding
//!    crosses -3 and 0 for a candidate maximum surface temperature.
//!
//! Nothing here panics on degenerate math. Division by (nearly) zero and invalid results are
//! replaced by a documented substitute, recorded as a `Substitution`, and logged through
//! `tracing`. The crate installs no tracing subscriber.

//
// API
//
pub use crate::{
    error::{AnalysisError, Result},
    forecast::{
        analyze_site, DailySummary, HourlyForecast, HourlyThermals, SiteForecast, SiteThermals,
    },
    indexes::{
        locate_lift_indices, locate_lift_indices_default, thermal_index_profile, DryAdiabat,
        LiftIndexResult, DALR_C_PER_M, NEG_THREE_INDEX, TOP_OF_LIFT_INDEX,
    },
    ladder::{LevelLadder, LevelSample, PressureLevel, LADDER_SIZE},
    parameters::LiftParameters,
    sounding::{Sounding, SoundingPoint},
    substitution::{Substitution, Substitutions},
    thermal::{
        estimated_cloudbase, simulate_column, thermal_step, ColumnAnalysis, DayState, Surface,
        ThermalStep, TopOfLift, SURFACE_BUFFER,
    },
};

//
// Internal use only
//

// Modules
mod error;
mod forecast;
mod indexes;
mod interpolation;
mod ladder;
mod missing;
mod parameters;
mod sounding;
mod substitution;
mod thermal;
