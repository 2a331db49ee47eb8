use crate::core::driver::{DriverModel, DriverPars};
use crate::core::environment::EnvironmentPars;
use crate::core::track::{TrackPars, TrackPoint};
use crate::core::vehicle::{CarClass, VehiclePars};
use anyhow::Context;
use serde::Deserialize;
use std::fs::OpenOptions;
use std::path::Path;

/// * `tick_period_ms` - (ms) Simulated time one tick advances
/// * `max_vehicles` - Upper bound on the roster size
/// * `target_laps` - Leader lap count at which the session ends
/// * `seed` - RNG seed, same seed means same session
#[derive(Debug, Deserialize, Clone)]
pub struct SessionPars {
    pub tick_period_ms: f64,
    #[serde(default = "SessionPars::def_max_vehicles")]
    pub max_vehicles: usize,
    pub target_laps: u32,
    pub seed: u64,
}

impl SessionPars {
    fn def_max_vehicles() -> usize {
        30
    }
}

/// SimPars is used to store all other parameter structs.
#[derive(Debug, Deserialize, Clone)]
pub struct SimPars {
    pub session_pars: SessionPars,
    pub track_pars: TrackPars,
    pub driver_pars: DriverPars,
    pub environment_pars: EnvironmentPars,
    pub roster: Vec<VehiclePars>,
}

/// read_sim_pars reads the JSON file and decodes the JSON string into the simulation parameters
/// struct. A track referencing a centerline CSV gets its points resolved
/// relative to the parameter file's directory.
pub fn read_sim_pars(filepath: &Path) -> anyhow::Result<SimPars> {
    let fh = OpenOptions::new()
        .read(true)
        .open(filepath)
        .context(format!(
            "Failed to open parameter file {}!",
            filepath.display()
        ))?;
    let mut pars: SimPars = serde_json::from_reader(&fh).context(format!(
        "Failed to parse parameter file {}!",
        filepath.display()
    ))?;
    resolve_track_points(&mut pars.track_pars, filepath.parent())?;
    Ok(pars)
}

#[derive(Debug, Deserialize)]
struct CenterlineRow {
    x_m: f64,
    y_m: f64,
}

/// read_track_points reads a centerline CSV with `x_m`/`y_m` columns into a
/// point list.
pub fn read_track_points(filepath: &Path) -> anyhow::Result<Vec<TrackPoint>> {
    let mut reader = csv::Reader::from_path(filepath).context(format!(
        "Failed to open centerline file {}!",
        filepath.display()
    ))?;

    let mut points = Vec::new();
    for row in reader.deserialize() {
        let row: CenterlineRow = row.context(format!(
            "Failed to parse centerline file {}!",
            filepath.display()
        ))?;
        points.push(TrackPoint {
            x: row.x_m,
            y: row.y_m,
        });
    }
    Ok(points)
}

/// If the track parameters reference a centerline CSV, load it and replace
/// the inline point list.
pub fn resolve_track_points(
    track_pars: &mut TrackPars,
    base_dir: Option<&Path>,
) -> anyhow::Result<()> {
    if let Some(csv_path) = &track_pars.centerline_csv {
        let path = match base_dir {
            Some(base) => base.join(csv_path),
            None => Path::new(csv_path).to_path_buf(),
        };
        track_pars.points = read_track_points(&path)?;
    }
    Ok(())
}

/// default_endurance returns a complete built-in parameter set for a short
/// multi-class session on a Le-Mans-like layout, used whenever no parameter
/// file is given.
pub fn default_endurance() -> SimPars {
    let points: Vec<TrackPoint> = [
        (100.0, 190.0),
        (180.0, 190.0),
        (190.0, 170.0),
        (190.0, 60.0),
        (140.0, 60.0),
        (140.0, 65.0),
        (90.0, 65.0),
        (50.0, 65.0),
        (50.0, 70.0),
        (10.0, 70.0),
        (10.0, 120.0),
        (50.0, 150.0),
        (100.0, 190.0),
    ]
    .iter()
    .map(|&(x, y)| TrackPoint { x, y })
    .collect();

    let zone = |segment_index: usize,
                brake_start: f64,
                brake_target: f64,
                target_gear: u8,
                downshift_step: u8,
                min_corner_speed: f64| {
        crate::core::track::BrakingZone {
            segment_index,
            brake_start,
            brake_target,
            target_gear,
            downshift_step,
            min_corner_speed,
            braking_power: 1.0,
        }
    };

    let track_pars = TrackPars {
        name: "Circuit de l'Endurance".to_string(),
        points,
        braking_zones: vec![
            zone(1, 0.90, 80.0, 3, 1, 110.0),
            zone(3, 0.85, 100.0, 3, 2, 85.0),
            zone(6, 0.85, 95.0, 3, 2, 95.0),
            zone(9, 0.90, 85.0, 4, 1, 120.0),
            zone(10, 0.50, 60.0, 4, 1, 70.0),
        ],
        movement_scale_factor: 350_000.0,
        sector_splits: [4, 8],
        centerline_csv: None,
    };

    let driver_pars = DriverPars {
        gear_speeds: vec![0.0, 90.0, 140.0, 200.0, 250.0, 295.0, 335.0],
        max_gear: 6,
        max_speed: 340.0,
        rpm_floor: 1000.0,
        rpm_ceiling: 9000.0,
        rev_match_flare: 10_500.0,
        rev_match_ticks: 2,
        throttle_ceiling: 85.0,
        throttle_ceiling_top: 98.0,
        top_gear_threshold: 5,
    };

    let environment_pars = EnvironmentPars {
        air_temp: 22.0,
        track_temp: 31.0,
        cloud_cover: 0.3,
        flag_probability: 0.005,
        flag_window_ms: 5000.0,
        rain_threshold: 0.7,
        rain_probability: 0.01,
    };

    let numbers = [7u32, 8, 2, 23, 31, 22, 51, 92, 63, 98];
    let licenses = [
        "Platinum", "Platinum", "Gold", "Gold", "Silver", "Gold", "Silver", "Bronze", "Silver",
        "Bronze",
    ];
    let nationalities = ["JPN", "CHE", "USA", "GBR", "DNK", "FRA", "ITA", "DEU", "ITA", "USA"];
    let classes = [
        CarClass::Gtp,
        CarClass::Gtp,
        CarClass::Gtp,
        CarClass::Lmp2,
        CarClass::Lmp2,
        CarClass::Lmp2,
        CarClass::Gt3,
        CarClass::Gt3,
        CarClass::Gt3,
        CarClass::Gt3,
    ];
    let colors = [
        "#e10600", "#0090ff", "#ff8700", "#005aff", "#2293d1", "#f596c8", "#dc0000", "#00d2be",
        "#006f62", "#ffd700",
    ];

    let roster = (0..numbers.len())
        .map(|i| VehiclePars {
            number: numbers[i],
            license: licenses[i].to_string(),
            nationality: nationalities[i].to_string(),
            class: classes[i],
            color: colors[i].to_string(),
            model: if i == 0 {
                DriverModel::Detailed
            } else {
                DriverModel::Simplified
            },
            // staggered grid so nobody starts exactly on the line
            start_progress: 0.05 * i as f64,
            fuel: 60.0,
            pace_offset: 0.015 * (i % 5) as f64,
        })
        .collect();

    SimPars {
        session_pars: SessionPars {
            tick_period_ms: 100.0,
            max_vehicles: 30,
            target_laps: 3,
            seed: 42,
        },
        track_pars,
        driver_pars,
        environment_pars,
        roster,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::race::Race;
    use std::io::Write;

    #[test]
    fn default_parameters_build_a_valid_race() {
        let pars = default_endurance();

        assert_eq!(pars.roster.len(), 10);
        assert!(Race::new(&pars).is_ok());
    }

    #[test]
    fn parameter_file_round_trips_through_json() {
        let pars_json = r##"{
            "session_pars": {"tick_period_ms": 100.0, "target_laps": 2, "seed": 7},
            "track_pars": {
                "name": "triangle",
                "points": [
                    {"x": 0.0, "y": 0.0},
                    {"x": 100.0, "y": 0.0},
                    {"x": 50.0, "y": 80.0}
                ],
                "braking_zones": [],
                "movement_scale_factor": 350000.0,
                "sector_splits": [1, 2]
            },
            "driver_pars": {
                "gear_speeds": [0.0, 90.0, 140.0, 200.0, 250.0, 295.0, 335.0],
                "max_gear": 6,
                "max_speed": 340.0,
                "rpm_floor": 1000.0,
                "rpm_ceiling": 9000.0,
                "rev_match_flare": 10500.0,
                "rev_match_ticks": 2,
                "throttle_ceiling": 85.0,
                "throttle_ceiling_top": 98.0,
                "top_gear_threshold": 5
            },
            "environment_pars": {"air_temp": 22.0, "track_temp": 31.0, "cloud_cover": 0.3},
            "roster": [
                {"number": 7, "license": "Gold", "nationality": "FRA",
                 "class": "GTP", "color": "#e10600", "model": "detailed", "fuel": 60.0}
            ]
        }"##;

        let dir = std::env::temp_dir().join("telemsim_pars_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("pars.json");
        let mut fh = std::fs::File::create(&path).unwrap();
        fh.write_all(pars_json.as_bytes()).unwrap();

        let pars = read_sim_pars(&path).unwrap();

        assert_eq!(pars.session_pars.target_laps, 2);
        assert_eq!(pars.session_pars.max_vehicles, 30);
        assert_eq!(pars.roster[0].class, CarClass::Gtp);
        assert_eq!(pars.roster[0].model, DriverModel::Detailed);
        assert!(Race::new(&pars).is_ok());
    }

    #[test]
    fn centerline_csv_replaces_the_inline_points() {
        let dir = std::env::temp_dir().join("telemsim_csv_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("centerline.csv");
        let mut fh = std::fs::File::create(&path).unwrap();
        fh.write_all(b"x_m,y_m\n0.0,0.0\n100.0,0.0\n50.0,80.0\n")
            .unwrap();

        let mut track_pars = TrackPars {
            name: "csv track".to_string(),
            points: vec![],
            braking_zones: vec![],
            movement_scale_factor: 350_000.0,
            sector_splits: [1, 2],
            centerline_csv: Some("centerline.csv".to_string()),
        };
        resolve_track_points(&mut track_pars, Some(&dir)).unwrap();

        assert_eq!(track_pars.points.len(), 3);
        assert_eq!(track_pars.points[2].y, 80.0);
    }

    #[test]
    fn missing_parameter_file_reports_the_path() {
        let err = read_sim_pars(Path::new("/does/not/exist.json")).unwrap_err();

        assert!(format!("{}", err).contains("/does/not/exist.json"));
    }
}
