use crate::core::laps::LapRecord;
use crate::core::race::Race;
use serde::Serialize;
use std::fmt::Write;

/// Final standing of one entry, kept for post-processing once the engine
/// state is gone.
#[derive(Debug, Serialize, Clone)]
pub struct VehicleSummary {
    pub number: u32,
    pub license: String,
    pub class: String,
    pub laps_completed: u32,
    pub best_lap_time: Option<f64>,
    pub fuel_remaining: f64,
    pub laps: Vec<LapRecord>,
}

/// SessionSummary contains all session information that is required for
/// post-processing the results.
#[derive(Debug, Serialize, Clone)]
pub struct SessionSummary {
    pub track_name: String,
    /// (s) simulated time at the end of the session
    pub session_time: f64,
    pub ticks: u64,
    pub vehicles: Vec<VehicleSummary>,
}

impl SessionSummary {
    pub fn from_race(race: &Race) -> SessionSummary {
        SessionSummary {
            track_name: race.track.name.clone(),
            session_time: race.cur_time,
            ticks: race.tick_count,
            vehicles: race
                .vehicles
                .iter()
                .map(|vehicle| VehicleSummary {
                    number: vehicle.pars.number,
                    license: vehicle.pars.license.clone(),
                    class: vehicle.pars.class.as_str().to_string(),
                    laps_completed: vehicle.laps.laps_completed,
                    best_lap_time: vehicle.laps.best_lap_time,
                    fuel_remaining: vehicle.fuel,
                    laps: vehicle.laps.history.clone(),
                })
                .collect(),
        }
    }

    /// print_lap_times prints the lap times of every entry to the console
    /// output, sorted by laps completed and best lap.
    pub fn print_lap_times(&self) {
        let mut standings: Vec<&VehicleSummary> = self.vehicles.iter().collect();
        standings.sort_by(|a, b| {
            b.laps_completed
                .cmp(&a.laps_completed)
                .then(match (a.best_lap_time, b.best_lap_time) {
                    (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(std::cmp::Ordering::Equal),
                    (Some(_), None) => std::cmp::Ordering::Less,
                    (None, Some(_)) => std::cmp::Ordering::Greater,
                    (None, None) => std::cmp::Ordering::Equal,
                })
        });

        println!(
            "RESULT: {} after {:.1}s ({} ticks)",
            self.track_name, self.session_time, self.ticks
        );
        for (position, vehicle) in standings.iter().enumerate() {
            let mut line = String::new();
            write!(
                &mut line,
                "{:2}. #{:<3} {:4} ({}) laps: {:2}",
                position + 1,
                vehicle.number,
                vehicle.class,
                vehicle.license,
                vehicle.laps_completed
            )
            .unwrap();
            match vehicle.best_lap_time {
                Some(best) => write!(&mut line, ", best: {:8.3}s", best).unwrap(),
                None => write!(&mut line, ", best:     --  ").unwrap(),
            }
            write!(&mut line, ", fuel: {:5.2}L", vehicle.fuel_remaining).unwrap();
            println!("{}", line);
        }
    }

    /// write_lap_times_to_file writes the per-lap times of every entry to a
    /// text file. Returns the path of the written file.
    pub fn write_lap_times_to_file(
        &self,
        path: Option<&std::path::Path>,
    ) -> anyhow::Result<String> {
        let mut content = String::new();
        writeln!(
            &mut content,
            "RESULT: {} after {:.1}s",
            self.track_name, self.session_time
        )?;
        for vehicle in &self.vehicles {
            writeln!(
                &mut content,
                "#{:<3} {:4} ({})",
                vehicle.number, vehicle.class, vehicle.license
            )?;
            for (lap, record) in vehicle.laps.iter().enumerate() {
                writeln!(
                    &mut content,
                    "{:3}, {:8.3}s, sectors: {:7.3}s {:7.3}s {:7.3}s",
                    lap + 1,
                    record.lap_time,
                    record.sector_times[0],
                    record.sector_times[1],
                    record.sector_times[2]
                )?;
            }
        }

        let out_dir = std::path::Path::new("output");
        std::fs::create_dir_all(out_dir)?;
        let out_path = if let Some(p) = path {
            p.to_path_buf()
        } else {
            out_dir.join("last_session.txt")
        };
        std::fs::write(&out_path, content)?;

        Ok(out_path.to_string_lossy().into_owned())
    }
}
