//! Simulate a rising thermal through the level ladder of a forecast hour.
//!
//! The simulation walks the ladder from the surface up one level at a time. Each step cools the
//! thermal parcel at the configured lapse rate and compares it to the ambient air to decide if the
//! thermal triggered, where cloudbase is, where the lift tops out, and how strong the lift is at
//! that level. Every step depends on the result of the step below it, so the walk is done as a
//! fold over the ladder in `column::simulate_column`, threading the `ThermalStep` of the level
//! below and the `DayState` forward.
use crate::{
    interpolation::{lerp, Ratio},
    ladder::LevelSample,
    missing::same,
    parameters::LiftParameters,
    substitution::{Substitution, Substitutions},
};
use metfor::{Celsius, Feet, Meters, MetersPSec, Quantity};
use optional::{none, some, Optioned};

pub use self::column::{simulate_column, ColumnAnalysis, TopOfLift};

mod column;

/// Levels closer than this to the surface are not part of the usable thermal column.
pub const SURFACE_BUFFER: Feet = Feet(200.0);

/// State that carries from one forecast hour to the next within a calendar day at one site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DayState {
    /// Thermals have triggered at some point earlier in the day.
    pub trigger_reached_today: bool,
}

impl DayState {
    /// The state at the first hour of a new day.
    #[inline]
    pub fn new() -> Self {
        DayState::default()
    }

    /// The state after a step. Once triggered, a day stays triggered.
    #[inline]
    pub fn after(self, step: &ThermalStep) -> Self {
        DayState {
            trigger_reached_today: self.trigger_reached_today || step.trigger_reached_today,
        }
    }
}

/// Surface conditions at the site for one forecast hour.
#[derive(Debug, Clone, Copy)]
pub struct Surface {
    /// Elevation of the site.
    pub altitude: Feet,
    /// Surface temperature.
    pub temperature: Celsius,
    /// Surface dew point, if the provider has it.
    pub dew_point: Optioned<Celsius>,
}

/// The result of simulating the thermal at one level.
///
/// A step also describes the level it was computed for, because the next step up needs the
/// altitude and ambient values of the level below it.
#[derive(Debug, Clone, Copy)]
pub struct ThermalStep {
    /// Altitude of the level.
    pub height: Feet,
    /// Ambient temperature at the level.
    pub ambient_t: Celsius,
    /// Ambient dew point at the level.
    pub ambient_dp: Celsius,
    /// Thermal climb rate available to a glider at this level, never negative, rounded to 0.1.
    pub thermal_velocity: MetersPSec,
    /// Temperature of the thermal parcel at this level.
    pub parcel_dew_point: Celsius,
    /// Cloudbase, if it has been reached at or below this level.
    pub cloudbase: Optioned<Feet>,
    /// Top of lift, if it has been reached at or below this level.
    pub top_of_lift: Optioned<Feet>,
    /// Approximate ambient temperature at the top of lift.
    pub top_of_lift_t: Optioned<Celsius>,
    /// Thermals have triggered today, including at this step.
    pub trigger_reached_today: bool,
    /// Substitutions made while computing this step.
    pub substitutions: Substitutions,
}

impl PartialEq for Surface {
    fn eq(&self, other: &Self) -> bool {
        self.altitude == other.altitude
            && self.temperature == other.temperature
            && same(self.dew_point, other.dew_point)
    }
}

impl PartialEq for ThermalStep {
    fn eq(&self, other: &Self) -> bool {
        self.height == other.height
            && self.ambient_t == other.ambient_t
            && self.ambient_dp == other.ambient_dp
            && self.thermal_velocity == other.thermal_velocity
            && self.parcel_dew_point == other.parcel_dew_point
            && same(self.cloudbase, other.cloudbase)
            && same(self.top_of_lift, other.top_of_lift)
            && same(self.top_of_lift_t, other.top_of_lift_t)
            && self.trigger_reached_today == other.trigger_reached_today
            && self.substitutions == other.substitutions
    }
}

impl ThermalStep {
    /// The starting point for a column walk, built from the surface conditions.
    ///
    /// The parcel starts at the surface temperature. Without a surface dew point the surface air
    /// is treated as having no spread.
    pub fn seed(surface: &Surface, day: DayState) -> Self {
        ThermalStep {
            height: surface.altitude,
            ambient_t: surface.temperature,
            ambient_dp: surface
                .dew_point
                .into_option()
                .unwrap_or(surface.temperature),
            thermal_velocity: MetersPSec(0.0),
            parcel_dew_point: surface.temperature,
            cloudbase: none(),
            top_of_lift: none(),
            top_of_lift_t: none(),
            trigger_reached_today: day.trigger_reached_today,
            substitutions: Substitutions::new(),
        }
    }

    /// Cloudbase in feet, 0 if it has not been reached.
    #[inline]
    pub fn cloudbase_ft(&self) -> f64 {
        self.cloudbase.into_option().map_or(0.0, Quantity::unpack)
    }

    /// Top of lift in feet, 0 if it has not been reached.
    #[inline]
    pub fn top_of_lift_ft(&self) -> f64 {
        self.top_of_lift.into_option().map_or(0.0, Quantity::unpack)
    }
}

/// An altitude of 0 means "not reached" to the forecast consumers, so it does not count.
#[inline]
pub(crate) fn reached(altitude: Optioned<Feet>) -> bool {
    altitude
        .into_option()
        .map_or(false, |alt| alt.unpack() > 0.0)
}

/// Simulate the thermal at one level.
///
/// `prior` is the step for the level below (or `ThermalStep::seed` for the bottom of the ladder)
/// and `day` is the state of the day before this step. The function never fails. Degenerate math
/// is replaced with the nearest sensible value, logged, and recorded in the step's
/// `substitutions`.
///
/// # Examples
///
/// ```rust
/// use metfor::{Celsius, Feet, MetersPSec};
/// use optional::none;
/// use soaring_analysis::{thermal_step, DayState, LevelSample, LiftParameters, Surface, ThermalStep};
///
/// let params = LiftParameters {
///     lapse_rate_c_per_km: 9.8,
///     velocity_constant: 4.0,
///     initial_trigger_temp_diff_c: 3.0,
///     ongoing_trigger_temp_diff_c: 1.0,
///     ramp_distance_ft: 0.0,
///     ramp_start_pct: 0.0,
///     glider_sink_rate_ms: 1.0,
///     cloudbase_lapse_rates_diff_c: 8.0,
/// };
///
/// let surface = Surface { altitude: Feet(1000.0), temperature: Celsius(25.0), dew_point: none() };
/// let seed = ThermalStep::seed(&surface, DayState::new());
///
/// let level = LevelSample::new(Feet(3000.0), Celsius(17.0), Celsius(2.0));
/// let step = thermal_step(&level, &seed, DayState::new(), &surface, &params);
///
/// assert!(step.trigger_reached_today);
/// assert!(step.thermal_velocity > MetersPSec(0.0));
/// ```
pub fn thermal_step(
    level: &LevelSample,
    prior: &ThermalStep,
    day: DayState,
    surface: &Surface,
    params: &LiftParameters,
) -> ThermalStep {
    let surface_alt = surface.altitude.unpack();

    // Below the usable thermal column, nothing happens here.
    if level.height.unpack() < surface_alt + SURFACE_BUFFER.unpack() {
        return *prior;
    }

    let triggered = day.trigger_reached_today || prior.trigger_reached_today;

    // Once the lift has topped out the rest of the column is dead air.
    if reached(prior.top_of_lift) && prior.top_of_lift_ft() >= surface_alt {
        return ThermalStep {
            height: level.height,
            ambient_t: level.temperature,
            ambient_dp: level.dew_point,
            thermal_velocity: MetersPSec(0.0),
            trigger_reached_today: triggered,
            substitutions: Substitutions::new(),
            ..*prior
        };
    }

    let prior_alt = prior.height.unpack().max(surface_alt);
    let height = level.height.unpack();
    let ambient_t = level.temperature.unpack();
    let ambient_dp = level.dew_point.unpack();

    let mut subs = Substitutions::new();

    let trigger_diff = params.trigger_temp_diff(triggered);
    if surface.temperature.unpack() < ambient_t + trigger_diff {
        tracing::trace!(
            height,
            surface_t = surface.temperature.unpack(),
            ambient_t,
            trigger_diff,
            "thermals not triggered"
        );

        return ThermalStep {
            height: level.height,
            ambient_t: level.temperature,
            ambient_dp: level.dew_point,
            thermal_velocity: MetersPSec(0.0),
            parcel_dew_point: prior.parcel_dew_point,
            cloudbase: prior.cloudbase,
            top_of_lift: below_cloudbase(prior.cloudbase, some(Feet(prior_alt))),
            top_of_lift_t: some(prior.ambient_t),
            trigger_reached_today: triggered,
            substitutions: subs,
        };
    }

    let dz = Feet(height - prior_alt);
    let dz_km = Meters::from(dz).unpack() / 1000.0;
    let parcel = prior.parcel_dew_point.unpack() - params.lapse_rate_c_per_km * dz_km;

    let mut cloudbase = prior.cloudbase;
    let mut top_of_lift = prior.top_of_lift;
    let mut top_of_lift_t = prior.top_of_lift_t;
    let mut capped_here = false;

    if !reached(cloudbase) && level.is_saturated() {
        let prior_dp = prior.ambient_dp.unpack();
        let ratio = Ratio::new(prior_dp - prior.ambient_t.unpack(), prior_dp - parcel);
        let fraction = level_fraction(
            ratio,
            Substitution::DegenerateCloudbaseRatio,
            height,
            &mut subs,
        );

        cloudbase = some(lerp(Feet(prior_alt), level.height, fraction));
        capped_here = true;
    }

    if !reached(top_of_lift) && parcel <= ambient_dp {
        let ratio = Ratio::zero_crossing(
            prior.parcel_dew_point.unpack() - prior.ambient_dp.unpack(),
            parcel - ambient_dp,
        );
        let fraction = level_fraction(
            ratio,
            Substitution::DegenerateTopOfLiftRatio,
            height,
            &mut subs,
        );

        top_of_lift = some(lerp(Feet(prior_alt), level.height, fraction));
        // Approximated by the ambient temperature at this level, not interpolated.
        top_of_lift_t = some(level.temperature);
        capped_here = true;
    }

    let mut velocity = 0.0;
    if !capped_here {
        velocity = raw_velocity(parcel, ambient_t, ambient_dp, params, height, &mut subs);
        velocity *= ramp_factor(prior_alt, height, surface_alt, params);
        velocity -= params.glider_sink_rate().unpack();

        if velocity <= 0.0 {
            velocity = 0.0;
            if !reached(top_of_lift) {
                top_of_lift = some(level.height);
                top_of_lift_t = some(level.temperature);
            }
        }
    }

    let top_of_lift = below_cloudbase(cloudbase, top_of_lift);

    velocity = (velocity * 10.0).round() / 10.0;

    tracing::trace!(
        height,
        parcel,
        ambient_t,
        ambient_dp,
        velocity,
        "thermal step"
    );

    ThermalStep {
        height: level.height,
        ambient_t: level.temperature,
        ambient_dp: level.dew_point,
        thermal_velocity: MetersPSec(velocity),
        parcel_dew_point: Celsius(parcel),
        cloudbase,
        top_of_lift,
        top_of_lift_t,
        trigger_reached_today: true,
        substitutions: subs,
    }
}

/// Lift cannot usefully go above cloudbase.
fn below_cloudbase(cloudbase: Optioned<Feet>, top_of_lift: Optioned<Feet>) -> Optioned<Feet> {
    match (cloudbase.into_option(), top_of_lift.into_option()) {
        (Some(cb), Some(top)) if reached(cloudbase) && cb < top => some(cb),
        _ => top_of_lift,
    }
}

/// Turn an interpolation ratio into a fraction of the distance between two levels.
///
/// A degenerate or non-finite ratio falls back to the lower level.
fn level_fraction(
    ratio: Ratio,
    kind: Substitution,
    height: f64,
    subs: &mut Substitutions,
) -> f64 {
    match ratio {
        Ratio::Value(val) => val.max(0.0).min(1.0),
        Ratio::Degenerate | Ratio::NotFinite => {
            tracing::warn!(height, ?ratio, "{}, using the level below", kind);
            subs.insert(kind);
            0.0
        }
    }
}

/// Thermal strength before the ramp and glider sink are applied, m/s.
fn raw_velocity(
    parcel: f64,
    ambient_t: f64,
    ambient_dp: f64,
    params: &LiftParameters,
    height: f64,
    subs: &mut Substitutions,
) -> f64 {
    let parcel_excess = (parcel - ambient_dp).max(0.0);
    let ambient_spread = (ambient_t - ambient_dp).max(0.0);

    let numerator = 1.1f64.powf(parcel_excess) - 1.0;
    if numerator <= 0.0 {
        return 0.0;
    }
    let denominator = 1.1f64.powf(ambient_spread) - 1.0;

    match Ratio::new(numerator, denominator) {
        Ratio::Value(val) => params.velocity_constant * val.sqrt(),
        ratio => {
            tracing::warn!(
                height,
                parcel_excess,
                ambient_spread,
                ?ratio,
                "{}",
                Substitution::InvalidVelocity
            );
            subs.insert(Substitution::InvalidVelocity);
            0.0
        }
    }
}

/// Thermals are weaker near the ground. The reduction applies to the part of the level span that
/// lies inside the ramp zone.
fn ramp_factor(prior_alt: f64, height: f64, surface_alt: f64, params: &LiftParameters) -> f64 {
    let ramp_top = surface_alt + params.ramp_distance().unpack();
    let span = height - prior_alt;

    if prior_alt >= ramp_top || span <= 0.0 {
        return 1.0;
    }

    let portion = ((ramp_top.min(height) - prior_alt) / span).max(0.0).min(1.0);

    1.0 - params.ramp_start_pct / 100.0 * portion
}

/// Estimate cloudbase from the surface temperature and dew point spread.
///
/// The spread closes at the difference between the dry adiabatic and dew point lapse rates, so
/// the estimate needs the surface dew point and a positive `cloudbase_lapse_rates_diff_c`.
pub fn estimated_cloudbase(surface: &Surface, params: &LiftParameters) -> Optioned<Feet> {
    let dew_point = match surface.dew_point.into_option() {
        Some(dp) => dp,
        None => return none(),
    };

    if params.cloudbase_lapse_rates_diff_c <= 0.0 {
        return none();
    }

    let spread = (surface.temperature - dew_point).unpack().max(0.0);
    let agl = Feet::from(Meters(spread / params.cloudbase_lapse_rates_diff_c * 1000.0));

    some(Feet(surface.altitude.unpack() + agl.unpack()))
}
