use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::NaiveDateTime;
use metfor::{Celsius, Feet, Meters};
use optional::Optioned;
use soaring_analysis::{
    HourlyForecast, LevelLadder, LevelSample, LiftParameters, SiteForecast, Sounding,
    Substitutions, LADDER_SIZE,
};

pub mod forecast_tests;

#[allow(unused_macros)] // False alarm
macro_rules! test_sounding_file {
    ($test_mod_name:ident, $fname:expr) => {
        mod $test_mod_name {
            use std::collections::HashMap;

            use crate::utils::{self, index_tests};
            use soaring_analysis::Sounding;

            fn load_data() -> (Sounding, HashMap<String, Vec<f64>>) {
                utils::load_sounding_file($fname)
            }

            #[test]
            fn neg_three_index() {
                let (snd, fvals) = load_data();
                index_tests::test_neg_three_index(&snd, &fvals);
            }

            #[test]
            fn top_of_lift_index() {
                let (snd, fvals) = load_data();
                index_tests::test_top_of_lift_index(&snd, &fvals);
            }

            #[test]
            fn index_profile_agrees_with_crossings() {
                let (snd, fvals) = load_data();
                index_tests::test_index_profile(&snd, &fvals);
            }

            #[test]
            fn forecast_max_is_default_candidate() {
                let (snd, fvals) = load_data();
                index_tests::test_default_candidate(snd, &fvals);
            }
        }
    };
}

#[allow(unused_macros)] // False alarm
macro_rules! test_forecast_file {
    ($test_mod_name:ident, $fname:expr) => {
        mod $test_mod_name {
            use std::collections::HashMap;

            use crate::utils::{self, forecast_tests};
            use soaring_analysis::{LiftParameters, SiteForecast, Substitutions};

            fn load_data() -> (
                SiteForecast,
                Substitutions,
                LiftParameters,
                HashMap<String, Vec<f64>>,
            ) {
                let (site, subs, fvals) = utils::load_forecast_file($fname);
                (site, subs, utils::load_parameters(), fvals)
            }

            #[test]
            fn trigger_reached_today() {
                let (site, _, params, fvals) = load_data();
                forecast_tests::test_trigger_reached_today(&site, &params, &fvals);
            }

            #[test]
            fn max_velocity() {
                let (site, _, params, fvals) = load_data();
                forecast_tests::test_max_velocity(&site, &params, &fvals);
            }

            #[test]
            fn top_of_lift() {
                let (site, _, params, fvals) = load_data();
                forecast_tests::test_top_of_lift(&site, &params, &fvals);
            }

            #[test]
            fn cloudbase() {
                let (site, _, params, fvals) = load_data();
                forecast_tests::test_cloudbase(&site, &params, &fvals);
            }

            #[test]
            fn estimated_cloudbase() {
                let (site, _, params, fvals) = load_data();
                forecast_tests::test_estimated_cloudbase(&site, &params, &fvals);
            }

            #[test]
            fn daily_summaries() {
                let (site, _, params, fvals) = load_data();
                forecast_tests::test_daily_summaries(&site, &params, &fvals);
            }

            #[test]
            fn column_invariants() {
                let (site, _, params, _) = load_data();
                forecast_tests::test_column_invariants(&site, &params);
            }
        }
    };
}

/// Send the library's logs to the test output, `RUST_LOG=soaring_analysis=trace` to see them.
#[allow(dead_code)]
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[allow(dead_code)] // False alarm - lint is done before macro expansion.
pub fn approx_equal(tgt: f64, guess: f64, tol: f64) -> bool {
    assert!(tol > 0.0);

    f64::abs(tgt - guess) <= tol
}

/// Targets use NaN for "no value".
#[allow(dead_code)]
pub fn check_value(analysis: Option<f64>, target: f64, tol: f64, what: &str) {
    match analysis {
        Some(val) => assert!(
            approx_equal(target, val, tol),
            "{}: expected {} found {}",
            what,
            target,
            val
        ),
        None => assert!(target.is_nan(), "{}: expected {} found none", what, target),
    }
}

fn test_data_path(fname: &str) -> PathBuf {
    let mut test_path = PathBuf::new();
    test_path.push("test_data");
    test_path.push(fname);
    test_path
}

fn read_test_file(fname: &str) -> String {
    let location = test_data_path(fname);
    let mut f = File::open(&location).expect(&format!("Error opening file: {:#?}", location));

    let mut contents = String::new();
    f.read_to_string(&mut contents)
        .expect(&format!("Error reading file: {:#?}", location));

    contents
}

#[allow(dead_code)]
pub fn load_parameters() -> LiftParameters {
    let location = test_data_path("lift_parameters.json");
    let f = File::open(&location).expect(&format!("Error opening file: {:#?}", location));

    LiftParameters::from_reader(f).expect("Invalid lift parameters")
}

#[allow(dead_code)]
pub fn load_sounding_file(fname: &str) -> (Sounding, HashMap<String, Vec<f64>>) {
    let contents = read_test_file(fname);
    let mut line_iter = contents.lines();

    //
    // Parse profile data
    //
    let mut alt: Vec<Optioned<Meters>> = vec![];
    let mut temp: Vec<Optioned<Celsius>> = vec![];
    let mut dp: Vec<Optioned<Celsius>> = vec![];

    for line in line_iter.by_ref() {
        if line.starts_with("### Analysis Float Section ###") {
            break;
        }

        let tokens: Vec<&str> = line.split(',').collect();
        if tokens.len() < 3 || f64::from_str(tokens[0]).is_err() {
            continue;
        }

        alt.push(f64::from_str(tokens[0]).ok().map(Meters).into());
        temp.push(f64::from_str(tokens[1]).ok().map(Celsius).into());
        dp.push(f64::from_str(tokens[2]).ok().map(Celsius).into());
    }

    let snd = Sounding::from_profiles(&temp, &dp, &alt)
        .with_source_description(format!("test file {}", fname));

    (snd, parse_float_section(line_iter))
}

#[allow(dead_code)]
pub fn load_forecast_file(
    fname: &str,
) -> (SiteForecast, Substitutions, HashMap<String, Vec<f64>>) {
    let contents = read_test_file(fname);
    let mut line_iter = contents.lines();

    //
    // Site data
    //
    let mut elevation = None;
    for line in line_iter.by_ref() {
        if line.starts_with("### Hours ###") {
            break;
        }

        let tokens: Vec<&str> = line.split(',').collect();
        if tokens.len() == 2 && tokens[0] == "elevation_ft" {
            elevation = f64::from_str(tokens[1]).ok().map(Feet);
        }
    }
    let elevation = elevation.expect("Missing site elevation");

    //
    // Hourly data
    //
    let mut hours = vec![];
    let mut subs = Substitutions::new();
    for line in line_iter.by_ref() {
        if line.starts_with("### Analysis Float Section ###") {
            break;
        }

        let tokens: Vec<&str> = line.split(',').collect();
        if tokens.len() != 3 + 3 * LADDER_SIZE {
            continue;
        }

        let valid_time = match NaiveDateTime::parse_from_str(tokens[0], "%Y-%m-%d %H:%M:%S") {
            Ok(vt) => vt,
            Err(_) => continue,
        };
        let surface_t = Celsius(f64::from_str(tokens[1]).unwrap());
        let surface_dp: Optioned<Celsius> = f64::from_str(tokens[2]).ok().map(Celsius).into();

        let samples: Vec<LevelSample> = tokens[3..]
            .chunks(3)
            .map(|vals| {
                let (sample, sample_subs) = LevelSample::from_provider(
                    f64::from_str(vals[0]).ok().map(Feet).into(),
                    f64::from_str(vals[1]).ok().map(Celsius).into(),
                    f64::from_str(vals[2]).ok().map(Celsius).into(),
                );
                subs = subs.union(sample_subs);
                sample
            })
            .collect();
        let ladder = LevelLadder::from_slice(&samples).unwrap();

        hours.push(HourlyForecast::new(valid_time, surface_t, surface_dp, ladder));
    }

    let site = SiteForecast { elevation, hours };

    (site, subs, parse_float_section(line_iter))
}

fn parse_float_section<'a, I: Iterator<Item = &'a str>>(lines: I) -> HashMap<String, Vec<f64>> {
    let mut target_float_vals = HashMap::new();
    for line in lines {
        let tokens: Vec<&str> = line
            .split(',')
            .map(|val| val.trim())
            .filter(|val| !val.is_empty())
            .collect();

        if tokens.len() < 2 {
            continue;
        }

        let key = tokens[0].to_owned();
        let values: Vec<f64> = tokens[1..]
            .iter()
            .map(|&val| match val {
                "none" => f64::NAN,
                "uncapped" => f64::INFINITY,
                val => f64::from_str(val).unwrap(),
            })
            .collect();

        target_float_vals.insert(key, values);
    }

    target_float_vals
}
