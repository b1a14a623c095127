use chrono::NaiveDateTime;
use metfor::{Celsius, Feet, Meters};
use optional::Optioned;
use soaring_analysis::{
    HourlyForecast, LevelLadder, LevelSample, LiftParameters, SiteForecast, Sounding,
    LADDER_SIZE,
};
use std::{fs::File, io::Read, path::PathBuf, str::FromStr};

#[allow(dead_code)]
pub fn load_all_sounding_files() -> [Sounding; 2] {
    let snd1 = load_sounding_file("afternoon_inversion.csv");
    let snd2 = load_sounding_file("isothermal_layer.csv");

    [snd1, snd2]
}

#[allow(dead_code)]
pub fn load_all_forecast_files() -> [SiteForecast; 2] {
    let site1 = load_forecast_file("mountain_days.csv");
    let site2 = load_forecast_file("humid_day.csv");

    [site1, site2]
}

#[allow(dead_code)]
pub fn load_parameters() -> LiftParameters {
    let f = File::open(test_data_path("lift_parameters.json")).expect("oops");
    LiftParameters::from_reader(f).expect("oops")
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

fn load_sounding_file(fname: &str) -> Sounding {
    let contents = read_test_file(fname);

    let mut alt: Vec<Optioned<Meters>> = vec![];
    let mut temp: Vec<Optioned<Celsius>> = vec![];
    let mut dp: Vec<Optioned<Celsius>> = vec![];

    for line in contents.lines() {
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

    Sounding::from_profiles(&temp, &dp, &alt)
}

fn load_forecast_file(fname: &str) -> SiteForecast {
    let contents = read_test_file(fname);

    let mut elevation = Feet(0.0);
    let mut hours = vec![];

    for line in contents.lines() {
        if line.starts_with("### Analysis Float Section ###") {
            break;
        }

        let tokens: Vec<&str> = line.split(',').collect();
        if tokens.len() == 2 && tokens[0] == "elevation_ft" {
            elevation = Feet(f64::from_str(tokens[1]).expect("oops"));
            continue;
        }

        if tokens.len() != 3 + 3 * LADDER_SIZE {
            continue;
        }

        let valid_time = match NaiveDateTime::parse_from_str(tokens[0], "%Y-%m-%d %H:%M:%S") {
            Ok(vt) => vt,
            Err(_) => continue,
        };
        let surface_t = Celsius(f64::from_str(tokens[1]).expect("oops"));
        let surface_dp: Optioned<Celsius> = f64::from_str(tokens[2]).ok().map(Celsius).into();

        let samples: Vec<LevelSample> = tokens[3..]
            .chunks(3)
            .map(|vals| {
                LevelSample::from_provider(
                    f64::from_str(vals[0]).ok().map(Feet).into(),
                    f64::from_str(vals[1]).ok().map(Celsius).into(),
                    f64::from_str(vals[2]).ok().map(Celsius).into(),
                )
                .0
            })
            .collect();
        let ladder = LevelLadder::from_slice(&samples).expect("oops");

        hours.push(HourlyForecast::new(valid_time, surface_t, surface_dp, ladder));
    }

    SiteForecast { elevation, hours }
}
