use super::*;
use itertools::izip;
use metfor::MetersPSec;
use soaring_analysis::{analyze_site, SiteThermals, TopOfLift};

const ALT_TOL: f64 = 0.05;
const VEL_TOL: f64 = 1.0e-6;

fn analyze(site: &SiteForecast, params: &LiftParameters) -> SiteThermals {
    init_logging();
    analyze_site(site, Some(params)).unwrap()
}

#[allow(dead_code)] // False alarm - lint is done before macro expansion.
pub fn test_trigger_reached_today(
    site: &SiteForecast,
    params: &LiftParameters,
    tgt_float_vals: &HashMap<String, Vec<f64>>,
) {
    let anal = analyze(site, params);
    let targets = &tgt_float_vals["trigger_reached_today"];
    assert_eq!(anal.hours().len(), targets.len());

    for (hour, &tgt) in izip!(anal.hours(), targets) {
        assert_eq!(
            hour.column.trigger_reached_today(),
            tgt > 0.5,
            "at {}",
            hour.valid_time
        );
    }
}

#[allow(dead_code)] // False alarm - lint is done before macro expansion.
pub fn test_max_velocity(
    site: &SiteForecast,
    params: &LiftParameters,
    tgt_float_vals: &HashMap<String, Vec<f64>>,
) {
    let anal = analyze(site, params);
    let targets = &tgt_float_vals["max_velocity"];
    assert_eq!(anal.hours().len(), targets.len());

    for (hour, &tgt) in izip!(anal.hours(), targets) {
        let MetersPSec(v) = hour.column.max_velocity();
        check_value(Some(v), tgt, VEL_TOL, "max velocity");
    }
}

#[allow(dead_code)] // False alarm - lint is done before macro expansion.
pub fn test_top_of_lift(
    site: &SiteForecast,
    params: &LiftParameters,
    tgt_float_vals: &HashMap<String, Vec<f64>>,
) {
    let anal = analyze(site, params);
    let targets = &tgt_float_vals["top_of_lift"];
    assert_eq!(anal.hours().len(), targets.len());

    for (hour, &tgt) in izip!(anal.hours(), targets) {
        let top = hour.column.top_of_lift();
        if tgt.is_infinite() {
            assert_eq!(top, TopOfLift::Uncapped, "at {}", hour.valid_time);
        } else {
            let height = top.height().map(|Feet(ft)| ft);
            check_value(height, tgt, ALT_TOL, "top of lift");
        }
    }
}

#[allow(dead_code)] // False alarm - lint is done before macro expansion.
pub fn test_cloudbase(
    site: &SiteForecast,
    params: &LiftParameters,
    tgt_float_vals: &HashMap<String, Vec<f64>>,
) {
    let anal = analyze(site, params);
    let targets = &tgt_float_vals["cloudbase"];
    assert_eq!(anal.hours().len(), targets.len());

    for (hour, &tgt) in izip!(anal.hours(), targets) {
        let cb = hour.column.cloudbase().into_option().map(|Feet(ft)| ft);
        check_value(cb, tgt, ALT_TOL, "cloudbase");
    }
}

#[allow(dead_code)] // False alarm - lint is done before macro expansion.
pub fn test_estimated_cloudbase(
    site: &SiteForecast,
    params: &LiftParameters,
    tgt_float_vals: &HashMap<String, Vec<f64>>,
) {
    let anal = analyze(site, params);
    let targets = &tgt_float_vals["estimated_cloudbase"];
    assert_eq!(anal.hours().len(), targets.len());

    for (hour, &tgt) in izip!(anal.hours(), targets) {
        let cb = hour.estimated_cloudbase.into_option().map(|Feet(ft)| ft);
        check_value(cb, tgt, ALT_TOL, "estimated cloudbase");
    }
}

#[allow(dead_code)] // False alarm - lint is done before macro expansion.
pub fn test_daily_summaries(
    site: &SiteForecast,
    params: &LiftParameters,
    tgt_float_vals: &HashMap<String, Vec<f64>>,
) {
    let anal = analyze(site, params);
    let summaries = anal.daily_summaries();

    let num_hours: usize = summaries.iter().map(|s| s.num_hours).sum();
    assert_eq!(num_hours, anal.hours().len());

    let peak = tgt_float_vals["max_velocity"]
        .iter()
        .cloned()
        .fold(0.0, f64::max);
    let best_day = summaries
        .iter()
        .map(|s| s.peak_velocity.0)
        .fold(0.0, f64::max);
    assert!(approx_equal(peak, best_day, VEL_TOL));

    for summary in &summaries {
        let hours: Vec<_> = anal
            .hours()
            .iter()
            .filter(|hour| hour.valid_time.date() == summary.date)
            .collect();
        assert_eq!(hours.len(), summary.num_hours);

        // Once triggered, the rest of the day stays triggered.
        let flags: Vec<bool> = hours
            .iter()
            .map(|hour| hour.column.trigger_reached_today())
            .collect();
        let first = flags.iter().position(|&flag| flag);
        if let Some(first) = first {
            assert!(flags[first..].iter().all(|&flag| flag));
            assert_eq!(summary.first_trigger, Some(hours[first].valid_time));
        } else {
            assert!(summary.first_trigger.is_none());
        }

        assert_eq!(
            summary.uncapped,
            hours
                .iter()
                .any(|hour| hour.column.top_of_lift().is_uncapped())
        );
    }
}

#[allow(dead_code)] // False alarm - lint is done before macro expansion.
pub fn test_column_invariants(site: &SiteForecast, params: &LiftParameters) {
    let anal = analyze(site, params);

    for hour in anal.hours() {
        let col = &hour.column;

        if let (Some(cb), Some(top)) = (col.cloudbase().into_option(), col.top_of_lift().height()) {
            assert!(top <= cb, "top of lift above cloudbase at {}", hour.valid_time);
        }

        for step in col.steps() {
            let MetersPSec(v) = step.thermal_velocity;
            assert!(v >= 0.0);
            assert!((v * 10.0 - (v * 10.0).round()).abs() < 1.0e-9);

            if let (Some(cb), Some(top)) = (
                step.cloudbase.into_option(),
                step.top_of_lift.into_option(),
            ) {
                assert!(top <= cb);
            }
        }
    }

    // Identical inputs give identical results.
    assert_eq!(anal, analyze(site, params));
}
