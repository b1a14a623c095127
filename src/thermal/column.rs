use super::{reached, thermal_step, DayState, Surface, ThermalStep, SURFACE_BUFFER};
use crate::{
    ladder::{LevelLadder, LADDER_SIZE},
    missing::same,
    parameters::LiftParameters,
    substitution::Substitutions,
};
use metfor::{Celsius, Feet, MetersPSec, Quantity};
use optional::{none, some, Optioned};

/// Where the lift ends for a forecast hour.
#[derive(Debug, Clone, Copy)]
pub enum TopOfLift {
    /// The lift tops out at this altitude.
    Altitude {
        /// Altitude of the top of lift.
        height: Feet,
        /// Approximate ambient temperature there.
        temperature: Optioned<Celsius>,
    },
    /// The parcel was still buoyant at the top of the ladder, the real top is higher.
    Uncapped,
    /// The whole ladder was below the usable thermal column.
    Unavailable,
}

impl PartialEq for TopOfLift {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                TopOfLift::Altitude {
                    height: left_height,
                    temperature: left_t,
                },
                TopOfLift::Altitude {
                    height: right_height,
                    temperature: right_t,
                },
            ) => left_height == right_height && same(*left_t, *right_t),
            (TopOfLift::Uncapped, TopOfLift::Uncapped) => true,
            (TopOfLift::Unavailable, TopOfLift::Unavailable) => true,
            _ => false,
        }
    }
}

impl TopOfLift {
    /// The altitude, if there is a numeric top of lift.
    pub fn height(&self) -> Option<Feet> {
        match self {
            TopOfLift::Altitude { height, .. } => Some(*height),
            TopOfLift::Uncapped | TopOfLift::Unavailable => None,
        }
    }

    /// True for a column that never topped out.
    #[inline]
    pub fn is_uncapped(&self) -> bool {
        *self == TopOfLift::Uncapped
    }
}

/// The thermal column for one forecast hour.
#[derive(Debug, Clone)]
pub struct ColumnAnalysis {
    steps: Vec<ThermalStep>,
    day: DayState,
    cloudbase: Optioned<Feet>,
    top_of_lift: TopOfLift,
    max_velocity: MetersPSec,
    substitutions: Substitutions,
}

impl PartialEq for ColumnAnalysis {
    fn eq(&self, other: &Self) -> bool {
        self.steps == other.steps
            && self.day == other.day
            && same(self.cloudbase, other.cloudbase)
            && self.top_of_lift == other.top_of_lift
            && self.max_velocity == other.max_velocity
            && self.substitutions == other.substitutions
    }
}

impl ColumnAnalysis {
    /// The step at every level of the ladder, from the bottom up.
    #[inline]
    pub fn steps(&self) -> &[ThermalStep] {
        &self.steps
    }

    /// The day state after this hour, to be passed to the next hour of the same day.
    #[inline]
    pub fn day_state(&self) -> DayState {
        self.day
    }

    /// Did thermals trigger during or before this hour?
    #[inline]
    pub fn trigger_reached_today(&self) -> bool {
        self.day.trigger_reached_today
    }

    /// Cloudbase, if the ambient air became saturated within the ladder.
    #[inline]
    pub fn cloudbase(&self) -> Optioned<Feet> {
        self.cloudbase
    }

    /// Top of lift.
    #[inline]
    pub fn top_of_lift(&self) -> TopOfLift {
        self.top_of_lift
    }

    /// The strongest thermal velocity at any level.
    #[inline]
    pub fn max_velocity(&self) -> MetersPSec {
        self.max_velocity
    }

    /// Every substitution made while walking the column.
    #[inline]
    pub fn substitutions(&self) -> Substitutions {
        self.substitutions
    }
}

/// Walk the thermal up the ladder for one forecast hour.
///
/// `day` is the state left by the previous hour of the same day, or `DayState::new()` for the
/// first hour of a day.
pub fn simulate_column(
    ladder: &LevelLadder,
    surface: &Surface,
    day: DayState,
    params: &LiftParameters,
) -> ColumnAnalysis {
    let seed = ThermalStep::seed(surface, day);

    let steps: Vec<ThermalStep> = ladder
        .samples()
        .iter()
        // Thread the step below and the day state up through the ladder.
        .scan((seed, day), |state, level| {
            let (prior, day) = *state;
            let step = thermal_step(level, &prior, day, surface, params);
            *state = (step, day.after(&step));
            Some(step)
        })
        .collect();
    debug_assert_eq!(steps.len(), LADDER_SIZE);

    let day = steps.iter().fold(day, |day, step| day.after(step));

    let last = steps.last().copied().unwrap_or(seed);
    let cloudbase = if reached(last.cloudbase) {
        last.cloudbase
    } else {
        none()
    };

    let top_of_lift = find_top_of_lift(ladder, surface, &steps, &last);

    let max_velocity = steps
        .iter()
        .map(|step| step.thermal_velocity)
        .fold(MetersPSec(0.0), |max, v| if v > max { v } else { max });

    let substitutions = steps
        .iter()
        .fold(Substitutions::new(), |acc, step| acc.union(step.substitutions));

    tracing::debug!(
        surface_t = surface.temperature.unpack(),
        triggered = day.trigger_reached_today,
        cloudbase = last.cloudbase_ft(),
        ?top_of_lift,
        max_velocity = max_velocity.unpack(),
        "simulated thermal column"
    );

    ColumnAnalysis {
        steps,
        day,
        cloudbase,
        top_of_lift,
        max_velocity,
        substitutions,
    }
}

fn find_top_of_lift(
    ladder: &LevelLadder,
    surface: &Surface,
    steps: &[ThermalStep],
    last: &ThermalStep,
) -> TopOfLift {
    let top_level = ladder.top();

    if top_level.height.unpack() < surface.altitude.unpack() + SURFACE_BUFFER.unpack() {
        return TopOfLift::Unavailable;
    }

    if reached(last.top_of_lift) {
        return TopOfLift::Altitude {
            height: last.top_of_lift.unpack(),
            temperature: last.top_of_lift_t,
        };
    }

    // Lift ends at cloudbase if the parcel was still going when the clouds started.
    if reached(last.cloudbase) {
        let temperature = steps
            .iter()
            .find(|step| reached(step.cloudbase))
            .map(|step| step.ambient_t);

        return TopOfLift::Altitude {
            height: last.cloudbase.unpack(),
            temperature: Optioned::from(temperature),
        };
    }

    if last.parcel_dew_point > top_level.dew_point {
        TopOfLift::Uncapped
    } else {
        TopOfLift::Altitude {
            height: top_level.height,
            temperature: some(top_level.temperature),
        }
    }
}
