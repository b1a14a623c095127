//! Thermal indexes of a sounding for a candidate surface temperature.
//!
//! The thermal index of a level is the ambient temperature minus the temperature a dry parcel
//! lifted from the surface at the candidate temperature would have there. Below about -3 the
//! thermals are usable, and they top out near 0.

use crate::{
    error::{AnalysisError, Result},
    interpolation::{lerp, Ratio, DEGENERATE_EPS},
    missing::same,
    sounding::{Sounding, SoundingPoint},
    substitution::{Substitution, Substitutions},
};
use itertools::Itertools;
use metfor::{Celsius, Meters, Quantity};
use optional::{none, some, Optioned};

/// Dry adiabatic lapse rate, &deg;C / m.
pub const DALR_C_PER_M: f64 = 0.0098;

/// Index value where thermals are considered usable.
pub const NEG_THREE_INDEX: f64 = -3.0;

/// Index value at the top of lift.
pub const TOP_OF_LIFT_INDEX: f64 = 0.0;

/// A dry adiabat as a line in (temperature, altitude) space, `altitude = slope * t + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DryAdiabat {
    slope: f64,
    intercept: f64,
}

impl DryAdiabat {
    /// The dry adiabat through a point.
    pub fn through(altitude: Meters, temperature: Celsius) -> Self {
        let slope = -1.0 / DALR_C_PER_M;
        let intercept = altitude.unpack() - slope * temperature.unpack();

        DryAdiabat { slope, intercept }
    }

    /// The temperature of the adiabat at an altitude.
    #[inline]
    pub fn temperature_at(&self, altitude: Meters) -> Celsius {
        Celsius((altitude.unpack() - self.intercept) / self.slope)
    }

    /// The altitude where the adiabat reaches a temperature.
    #[inline]
    pub fn altitude_at(&self, temperature: Celsius) -> Meters {
        Meters(self.slope * temperature.unpack() + self.intercept)
    }

    /// Thermal index of a sounding point relative to this adiabat.
    #[inline]
    pub fn thermal_index(&self, pnt: &SoundingPoint) -> f64 {
        (pnt.temperature - self.temperature_at(pnt.altitude)).unpack()
    }
}

/// Where the thermal index crosses -3 and 0.
///
/// A value is none only when the sounding ended before the index reached it.
#[derive(Debug, Clone, Copy)]
pub struct LiftIndexResult {
    /// Altitude where the thermal index reaches 0.
    pub top_of_lift_altitude: Optioned<Meters>,
    /// Ambient temperature at the top of lift.
    pub top_of_lift_t: Optioned<Celsius>,
    /// Altitude where the thermal index reaches -3.
    pub neg_three_altitude: Optioned<Meters>,
    /// Ambient temperature at the -3 altitude.
    pub neg_three_t: Optioned<Celsius>,
    /// Any substitutions made while interpolating the crossings.
    pub substitutions: Substitutions,
}

impl PartialEq for LiftIndexResult {
    fn eq(&self, other: &Self) -> bool {
        same(self.top_of_lift_altitude, other.top_of_lift_altitude)
            && same(self.top_of_lift_t, other.top_of_lift_t)
            && same(self.neg_three_altitude, other.neg_three_altitude)
            && same(self.neg_three_t, other.neg_three_t)
            && self.substitutions == other.substitutions
    }
}

/// Locate the altitudes where the thermal index crosses -3 and 0 for a candidate maximum surface
/// temperature.
///
/// # Examples
///
/// ```rust
/// use metfor::{Celsius, Meters};
/// use soaring_analysis::{locate_lift_indices, Sounding, SoundingPoint};
///
/// // Environment cooling at 6.5 C/km.
/// let points = (0..=16)
///     .map(|i| {
///         let alt = 1000.0 + 250.0 * i as f64;
///         let t = 20.0 - 0.0065 * (alt - 1000.0);
///         SoundingPoint { temperature: Celsius(t), dew_point: Celsius(t - 10.0), altitude: Meters(alt) }
///     })
///     .collect();
/// let snd = Sounding::new().with_points(points);
///
/// let res = locate_lift_indices(&snd, Celsius(26.0)).unwrap();
/// let top = res.top_of_lift_altitude.unwrap();
/// let neg3 = res.neg_three_altitude.unwrap();
///
/// assert!(neg3 < top);
/// assert!((top.0 - 2818.18).abs() < 0.01);
/// ```
pub fn locate_lift_indices(snd: &Sounding, candidate_t: Celsius) -> Result<LiftIndexResult> {
    let pnts = snd.points();
    let adiabat = surface_adiabat(snd, candidate_t)?;

    let indexes: Vec<f64> = pnts.iter().map(|pnt| adiabat.thermal_index(pnt)).collect();

    let mut substitutions = Substitutions::new();

    let (neg_three, start) = match find_crossing(&adiabat, pnts, &indexes, 0, NEG_THREE_INDEX) {
        Some((pnt, idx, subs)) => {
            substitutions = substitutions.union(subs);
            (Some(pnt), idx)
        }
        None => (None, pnts.len()),
    };

    let top = find_crossing(&adiabat, pnts, &indexes, start, TOP_OF_LIFT_INDEX).map(
        |(pnt, _, subs)| {
            substitutions = substitutions.union(subs);
            pnt
        },
    );

    let (neg_three_altitude, neg_three_t) = split(neg_three);
    let (top_of_lift_altitude, top_of_lift_t) = split(top);

    tracing::debug!(
        candidate_t = candidate_t.unpack(),
        neg_three = ?neg_three_altitude.into_option(),
        top_of_lift = ?top_of_lift_altitude.into_option(),
        "located thermal indexes"
    );

    Ok(LiftIndexResult {
        top_of_lift_altitude,
        top_of_lift_t,
        neg_three_altitude,
        neg_three_t,
        substitutions,
    })
}

/// Locate the thermal indexes using `override_t` if given, otherwise the sounding's forecast
/// maximum temperature.
pub fn locate_lift_indices_default(
    snd: &Sounding,
    override_t: Option<Celsius>,
) -> Result<LiftIndexResult> {
    let candidate_t = override_t
        .or_else(|| snd.default_candidate_temperature().into_option())
        .ok_or(AnalysisError::MissingValue)?;

    locate_lift_indices(snd, candidate_t)
}

/// The thermal index at every point of the sounding, bottom up.
pub fn thermal_index_profile(snd: &Sounding, candidate_t: Celsius) -> Result<Vec<f64>> {
    let adiabat = surface_adiabat(snd, candidate_t)?;

    Ok(snd
        .points()
        .iter()
        .map(|pnt| adiabat.thermal_index(pnt))
        .collect())
}

fn surface_adiabat(snd: &Sounding, candidate_t: Celsius) -> Result<DryAdiabat> {
    if !candidate_t.unpack().is_finite() {
        return Err(AnalysisError::InvalidInput);
    }

    let pnts = snd.points();
    let sfc = pnts.first().ok_or(AnalysisError::NotEnoughData)?;

    if pnts
        .iter()
        .tuple_windows::<(_, _)>()
        .any(|(lower, upper)| upper.altitude <= lower.altitude)
    {
        return Err(AnalysisError::InvalidInput);
    }

    Ok(DryAdiabat::through(sfc.altitude, candidate_t))
}

// Find the first point at or after `start` where the index reaches `target`, and interpolate
// the crossing from the point below it. Also returns the position of that point.
fn find_crossing(
    adiabat: &DryAdiabat,
    pnts: &[SoundingPoint],
    indexes: &[f64],
    start: usize,
    target: f64,
) -> Option<(SoundingPoint, usize, Substitutions)> {
    let idx = (start..pnts.len()).find(|&i| indexes[i] >= target)?;

    if idx == 0 {
        return Some((pnts[0], 0, Substitutions::new()));
    }

    let (pnt, subs) = interpolate_crossing(
        adiabat,
        (&pnts[idx - 1], indexes[idx - 1]),
        (&pnts[idx], indexes[idx]),
        target,
    );

    Some((pnt, idx, subs))
}

fn interpolate_crossing(
    adiabat: &DryAdiabat,
    (p0, i0): (&SoundingPoint, f64),
    (p1, i1): (&SoundingPoint, f64),
    target: f64,
) -> (SoundingPoint, Substitutions) {
    // An isothermal segment meets the shifted adiabat where the adiabat has t - target.
    if (p1.temperature - p0.temperature).unpack().abs() < DEGENERATE_EPS {
        let altitude = adiabat.altitude_at(Celsius(p1.temperature.unpack() - target));
        return (
            SoundingPoint {
                temperature: p1.temperature,
                dew_point: lerp(
                    p0.dew_point,
                    p1.dew_point,
                    segment_fraction(p0.altitude, p1.altitude, altitude),
                ),
                altitude,
            },
            Substitutions::new(),
        );
    }

    match Ratio::new(target - i0, i1 - i0) {
        Ratio::Value(fraction) => {
            let fraction = fraction.max(0.0).min(1.0);
            (
                SoundingPoint {
                    temperature: lerp(p0.temperature, p1.temperature, fraction),
                    dew_point: lerp(p0.dew_point, p1.dew_point, fraction),
                    altitude: lerp(p0.altitude, p1.altitude, fraction),
                },
                Substitutions::new(),
            )
        }
        Ratio::Degenerate | Ratio::NotFinite => {
            tracing::warn!(
                lower = p0.altitude.unpack(),
                upper = p1.altitude.unpack(),
                index = target,
                "segment parallel to the dry adiabat, using upper point"
            );
            (*p1, Substitutions::from(Substitution::DegenerateIndexCrossing))
        }
    }
}

fn segment_fraction(bottom: Meters, top: Meters, altitude: Meters) -> f64 {
    match Ratio::new((altitude - bottom).unpack(), (top - bottom).unpack()) {
        Ratio::Value(fraction) => fraction.max(0.0).min(1.0),
        Ratio::Degenerate | Ratio::NotFinite => 1.0,
    }
}

fn split(pnt: Option<SoundingPoint>) -> (Optioned<Meters>, Optioned<Celsius>) {
    match pnt {
        Some(pnt) => (some(pnt.altitude), some(pnt.temperature)),
        None => (none(), none()),
    }
}
