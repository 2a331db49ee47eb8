use crate::core::race::Race;
use crate::core::tires::TireState;
use crate::core::vehicle::RgbColor;

/// Per-tire readout carried by the snapshot.
#[derive(Debug, Clone, Copy)]
pub struct TireSnapshot {
    pub temperature: f64,
    pub pressure: f64,
    pub wear: f64,
}

impl From<&TireState> for TireSnapshot {
    fn from(tire: &TireState) -> TireSnapshot {
        TireSnapshot {
            temperature: tire.temperature,
            pressure: tire.pressure,
            wear: tire.wear,
        }
    }
}

/// Everything a display needs to draw one vehicle, decoupled from the
/// engine's internal state.
#[derive(Debug, Clone)]
pub struct VehicleSnapshot {
    /// running-order position, 1-based
    pub position: usize,
    pub number: u32,
    pub license: String,
    pub nationality: String,
    pub class: &'static str,
    pub color: RgbColor,
    pub x: f64,
    pub y: f64,
    pub heading: f64,
    pub speed: f64,
    pub gear: u8,
    pub rpm: f64,
    pub throttle: f64,
    pub brake: f64,
    pub is_braking: bool,
    pub segment_index: usize,
    pub progress: f64,
    pub lap_time: f64,
    pub laps_completed: u32,
    pub best_lap_time: Option<f64>,
    /// laps completed plus the fraction of the running lap
    pub race_progress: f64,
    pub fuel: f64,
    pub tires: [TireSnapshot; 4],
}

#[derive(Debug, Clone, Copy)]
pub struct EnvironmentSnapshot {
    pub air_temp: f64,
    pub track_temp: f64,
    pub cloud_cover: f64,
    pub rain_intensity: f64,
    pub yellow_flag: bool,
    pub blue_flag: bool,
    pub red_flag: bool,
    pub black_flag: bool,
}

/// One frame of the running race, ordered by the current running order.
#[derive(Debug, Clone)]
pub struct RaceSnapshot {
    /// (s) simulated time
    pub time: f64,
    pub tick: u64,
    pub vehicles: Vec<VehicleSnapshot>,
    pub environment: EnvironmentSnapshot,
}

impl RaceSnapshot {
    /// This function freezes the current race state into a frame that can
    /// be handed across a channel without borrowing the engine.
    pub fn record(race: &Race) -> RaceSnapshot {
        let order = race.running_order();

        let vehicles = order
            .iter()
            .enumerate()
            .map(|(position, &idx)| {
                let vehicle = &race.vehicles[idx];
                let pos = vehicle.kinematics.resolve(&race.track);
                let corners = vehicle.tires.corners();

                VehicleSnapshot {
                    position: position + 1,
                    number: vehicle.pars.number,
                    license: vehicle.pars.license.clone(),
                    nationality: vehicle.pars.nationality.clone(),
                    class: vehicle.pars.class.as_str(),
                    color: vehicle.color,
                    x: pos.x,
                    y: pos.y,
                    heading: pos.heading,
                    speed: vehicle.kinematics.speed,
                    gear: vehicle.driver.gear,
                    rpm: vehicle.driver.rpm,
                    throttle: vehicle.driver.throttle,
                    brake: vehicle.driver.brake,
                    is_braking: vehicle.driver.brake > 50.0,
                    segment_index: vehicle.kinematics.segment_index,
                    progress: vehicle.kinematics.progress,
                    lap_time: vehicle.laps.lap_time,
                    laps_completed: vehicle.laps.laps_completed,
                    best_lap_time: vehicle.laps.best_lap_time,
                    race_progress: vehicle.laps.laps_completed as f64
                        + vehicle.lap_fraction(&race.track),
                    fuel: vehicle.fuel,
                    tires: [
                        TireSnapshot::from(corners[0]),
                        TireSnapshot::from(corners[1]),
                        TireSnapshot::from(corners[2]),
                        TireSnapshot::from(corners[3]),
                    ],
                }
            })
            .collect();

        RaceSnapshot {
            time: race.cur_time,
            tick: race.tick_count,
            vehicles,
            environment: EnvironmentSnapshot {
                air_temp: race.environment.air_temp,
                track_temp: race.environment.track_temp,
                cloud_cover: race.environment.cloud_cover,
                rain_intensity: race.environment.rain_intensity,
                yellow_flag: race.environment.flags.yellow,
                blue_flag: race.environment.flags.blue,
                red_flag: race.environment.flags.red,
                black_flag: race.environment.flags.black,
            },
        }
    }

    /// The vehicle currently leading the running order.
    pub fn leader(&self) -> Option<&VehicleSnapshot> {
        self.vehicles.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::race::Race;
    use crate::pre::read_sim_pars::default_endurance;

    #[test]
    fn snapshot_positions_follow_the_running_order() {
        let pars = default_endurance();
        let mut race = Race::new(&pars).unwrap();
        for _ in 0..100 {
            race.advance(100.0);
        }

        let snapshot = RaceSnapshot::record(&race);

        assert_eq!(snapshot.vehicles.len(), race.vehicles.len());
        for (idx, vehicle) in snapshot.vehicles.iter().enumerate() {
            assert_eq!(vehicle.position, idx + 1);
        }
        for pair in snapshot.vehicles.windows(2) {
            assert!(pair[0].speed >= pair[1].speed);
        }
        assert_eq!(
            snapshot.leader().map(|leader| leader.number),
            Some(snapshot.vehicles[0].number)
        );
    }

    #[test]
    fn snapshot_carries_the_simulated_clock() {
        let pars = default_endurance();
        let mut race = Race::new(&pars).unwrap();
        for _ in 0..10 {
            race.advance(100.0);
        }

        let snapshot = RaceSnapshot::record(&race);

        assert_eq!(snapshot.tick, 10);
        assert!((snapshot.time - 1.0).abs() < 1e-9);
    }
}
