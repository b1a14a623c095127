//! Run the thermal simulator over a site's hourly forecast.
//!
//! Hours are processed in order, and the day state is threaded from one hour to the next and
//! reset whenever the calendar date changes.

use crate::{
    error::{AnalysisError, Result},
    ladder::LevelLadder,
    missing::same,
    parameters::LiftParameters,
    thermal::{
        estimated_cloudbase, simulate_column, ColumnAnalysis, DayState, Surface, TopOfLift,
    },
};
use chrono::{NaiveDate, NaiveDateTime};
use itertools::Itertools;
use metfor::{Celsius, Feet, MetersPSec};
use optional::{none, some, Optioned};

/// The forecast for one hour at a site.
#[derive(Debug, Clone)]
pub struct HourlyForecast {
    /// Valid time of the forecast, local time at the site.
    pub valid_time: NaiveDateTime,
    /// Surface temperature.
    pub surface_t: Celsius,
    /// Surface dew point, if the provider has it.
    pub surface_dp: Optioned<Celsius>,
    /// Conditions on the pressure levels.
    pub ladder: LevelLadder,
}

impl PartialEq for HourlyForecast {
    fn eq(&self, other: &Self) -> bool {
        self.valid_time == other.valid_time
            && self.surface_t == other.surface_t
            && same(self.surface_dp, other.surface_dp)
            && self.ladder == other.ladder
    }
}

impl HourlyForecast {
    /// Create a new hourly forecast.
    pub fn new(
        valid_time: NaiveDateTime,
        surface_t: Celsius,
        surface_dp: Optioned<Celsius>,
        ladder: LevelLadder,
    ) -> Self {
        HourlyForecast {
            valid_time,
            surface_t,
            surface_dp,
            ladder,
        }
    }

    /// The surface conditions for this hour at a site with the given elevation.
    #[inline]
    pub fn surface(&self, elevation: Feet) -> Surface {
        Surface {
            altitude: elevation,
            temperature: self.surface_t,
            dew_point: self.surface_dp,
        }
    }
}

/// The hourly forecasts for a site, in chronological order.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteForecast {
    /// Elevation of the launch or site.
    pub elevation: Feet,
    /// Forecast hours, strictly increasing in valid time.
    pub hours: Vec<HourlyForecast>,
}

/// The simulated thermals for one forecast hour.
#[derive(Debug, Clone)]
pub struct HourlyThermals {
    /// Valid time of the forecast hour.
    pub valid_time: NaiveDateTime,
    /// The walk up the level ladder.
    pub column: ColumnAnalysis,
    /// Cloudbase estimated from the surface temperature and dew point spread.
    pub estimated_cloudbase: Optioned<Feet>,
}

impl PartialEq for HourlyThermals {
    fn eq(&self, other: &Self) -> bool {
        self.valid_time == other.valid_time
            && self.column == other.column
            && same(self.estimated_cloudbase, other.estimated_cloudbase)
    }
}

/// The simulated thermals for every hour at a site.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteThermals {
    hours: Vec<HourlyThermals>,
}

impl SiteThermals {
    /// Results for every hour, in chronological order.
    #[inline]
    pub fn hours(&self) -> &[HourlyThermals] {
        &self.hours
    }

    /// Summarize each calendar day.
    pub fn daily_summaries(&self) -> Vec<DailySummary> {
        let by_day = self.hours.iter().group_by(|hour| hour.valid_time.date());

        let summaries: Vec<DailySummary> = (&by_day)
            .into_iter()
            .map(|(date, hours)| DailySummary::from_hours(date, hours))
            .collect();

        summaries
    }
}

/// The highlights of one day at a site.
#[derive(Debug, Clone, Copy)]
pub struct DailySummary {
    /// Calendar date.
    pub date: NaiveDate,
    /// Number of forecast hours that day.
    pub num_hours: usize,
    /// The first hour thermals triggered.
    pub first_trigger: Option<NaiveDateTime>,
    /// The strongest thermal velocity of the day.
    pub peak_velocity: MetersPSec,
    /// When the strongest thermals occurred.
    pub peak_velocity_time: Option<NaiveDateTime>,
    /// The highest numeric top of lift of the day.
    pub highest_top_of_lift: Optioned<Feet>,
    /// The lowest cloudbase of the day.
    pub lowest_cloudbase: Optioned<Feet>,
    /// Was the column uncapped in any hour?
    pub uncapped: bool,
}

impl PartialEq for DailySummary {
    fn eq(&self, other: &Self) -> bool {
        self.date == other.date
            && self.num_hours == other.num_hours
            && self.first_trigger == other.first_trigger
            && self.peak_velocity == other.peak_velocity
            && self.peak_velocity_time == other.peak_velocity_time
            && same(self.highest_top_of_lift, other.highest_top_of_lift)
            && same(self.lowest_cloudbase, other.lowest_cloudbase)
            && self.uncapped == other.uncapped
    }
}

impl DailySummary {
    fn from_hours<'a, I>(date: NaiveDate, hours: I) -> Self
    where
        I: Iterator<Item = &'a HourlyThermals>,
    {
        let start = DailySummary {
            date,
            num_hours: 0,
            first_trigger: None,
            peak_velocity: MetersPSec(0.0),
            peak_velocity_time: None,
            highest_top_of_lift: none(),
            lowest_cloudbase: none(),
            uncapped: false,
        };

        hours.fold(start, |mut acc, hour| {
            let col = &hour.column;

            acc.num_hours += 1;

            if acc.first_trigger.is_none() && col.trigger_reached_today() {
                acc.first_trigger = Some(hour.valid_time);
            }

            if col.max_velocity() > acc.peak_velocity {
                acc.peak_velocity = col.max_velocity();
                acc.peak_velocity_time = Some(hour.valid_time);
            }

            if let Some(top) = col.top_of_lift().height() {
                match acc.highest_top_of_lift.into_option() {
                    Some(highest) if highest >= top => {}
                    _ => acc.highest_top_of_lift = some(top),
                }
            }

            if let Some(cb) = col.cloudbase().into_option() {
                match acc.lowest_cloudbase.into_option() {
                    Some(lowest) if lowest <= cb => {}
                    _ => acc.lowest_cloudbase = some(cb),
                }
            }

            acc.uncapped |= col.top_of_lift() == TopOfLift::Uncapped;

            acc
        })
    }
}

/// Simulate the thermals for every forecast hour at a site.
///
/// Without lift parameters nothing is computed and `LiftParametersUnavailable` is returned. The
/// hours must be strictly increasing in valid time.
pub fn analyze_site(site: &SiteForecast, params: Option<&LiftParameters>) -> Result<SiteThermals> {
    let params = params.ok_or(AnalysisError::LiftParametersUnavailable)?;

    if site
        .hours
        .iter()
        .tuple_windows::<(_, _)>()
        .any(|(prev, next)| next.valid_time <= prev.valid_time)
    {
        return Err(AnalysisError::UnorderedForecast);
    }

    let hours: Vec<HourlyThermals> = site
        .hours
        .iter()
        // Carry the day state to the next hour, starting over on a new date.
        .scan(
            None,
            |state: &mut Option<(NaiveDate, DayState)>, hour: &HourlyForecast| {
                let date = hour.valid_time.date();
                let day = match *state {
                    Some((prev_date, day)) if prev_date == date => day,
                    _ => DayState::new(),
                };

                let surface = hour.surface(site.elevation);
                let column = simulate_column(&hour.ladder, &surface, day, params);
                *state = Some((date, column.day_state()));

                Some(HourlyThermals {
                    valid_time: hour.valid_time,
                    estimated_cloudbase: estimated_cloudbase(&surface, params),
                    column,
                })
            },
        )
        .collect();

    tracing::debug!(
        elevation = site.elevation.0,
        num_hours = hours.len(),
        "analyzed site forecast"
    );

    Ok(SiteThermals { hours })
}
