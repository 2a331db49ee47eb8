use crate::core::driver::DriverPars;
use crate::core::environment::RaceEnvironment;
use crate::core::track::{Track, TrackError};
use crate::core::vehicle::{RgbColor, Vehicle};
use crate::pre::read_sim_pars::SimPars;
use css_color_parser::Color as CssColor;
use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;

/// Everything that can go wrong while assembling a race from its
/// parameter file.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    Track(#[from] TrackError),
    #[error("vehicle {number} has unparseable color {value:?}")]
    InvalidColor { number: u32, value: String },
    #[error("roster is empty")]
    EmptyRoster,
    #[error("roster holds {count} vehicles but at most {max} are allowed")]
    TooManyVehicles { count: usize, max: usize },
    #[error("gear speed table holds {table_len} entries but max_gear is {max_gear}")]
    GearTableMismatch { table_len: usize, max_gear: u8 },
    #[error("braking zone on segment {segment} targets gear {target_gear} above max_gear {max_gear}")]
    ZoneGearOutOfRange {
        segment: usize,
        target_gear: u8,
        max_gear: u8,
    },
}

/// The complete simulation state. The race owns the only RNG, so two races
/// built from identical parameters (seed included) evolve identically.
pub struct Race {
    pub track: Track,
    pub vehicles: Vec<Vehicle>,
    pub environment: RaceEnvironment,
    pub driver_pars: DriverPars,
    pub cur_time: f64,
    pub tick_count: u64,
    rng: StdRng,
}

impl Race {
    /// This function creates a race out of the given parameters. All
    /// cross-parameter validation happens here, before the first tick runs.
    pub fn new(pars: &SimPars) -> Result<Race, SetupError> {
        let track = Track::new(&pars.track_pars)?;

        if pars.roster.is_empty() {
            return Err(SetupError::EmptyRoster);
        }
        if pars.roster.len() > pars.session_pars.max_vehicles {
            return Err(SetupError::TooManyVehicles {
                count: pars.roster.len(),
                max: pars.session_pars.max_vehicles,
            });
        }

        let driver_pars = pars.driver_pars.clone();
        if driver_pars.gear_speeds.len() != driver_pars.max_gear as usize + 1 {
            return Err(SetupError::GearTableMismatch {
                table_len: driver_pars.gear_speeds.len(),
                max_gear: driver_pars.max_gear,
            });
        }
        for idx in 0..track.segment_count() {
            if let Some(zone) = track.zone(idx) {
                if zone.target_gear > driver_pars.max_gear {
                    return Err(SetupError::ZoneGearOutOfRange {
                        segment: zone.segment_index,
                        target_gear: zone.target_gear,
                        max_gear: driver_pars.max_gear,
                    });
                }
            }
        }

        // livery colors are resolved once, never per tick
        let mut vehicles = Vec::with_capacity(pars.roster.len());
        for vehicle_pars in &pars.roster {
            let css: CssColor =
                vehicle_pars
                    .color
                    .parse()
                    .map_err(|_| SetupError::InvalidColor {
                        number: vehicle_pars.number,
                        value: vehicle_pars.color.clone(),
                    })?;
            let color = RgbColor {
                r: css.r,
                g: css.g,
                b: css.b,
            };
            vehicles.push(Vehicle::new(vehicle_pars.clone(), color, &driver_pars));
        }

        Ok(Race {
            environment: RaceEnvironment::new(&pars.environment_pars),
            rng: StdRng::seed_from_u64(pars.session_pars.seed),
            track,
            vehicles,
            driver_pars,
            cur_time: 0.0,
            tick_count: 0,
        })
    }

    /// The method advances the whole simulation by one tick of `dt_ms`.
    /// The environment goes first, then every vehicle in roster order, so
    /// the RNG consumption order is fixed and runs stay reproducible.
    pub fn advance(&mut self, dt_ms: f64) {
        self.environment.tick(dt_ms, &mut self.rng);
        for vehicle in self.vehicles.iter_mut() {
            vehicle.tick(&self.track, &self.driver_pars, dt_ms, &mut self.rng);
        }
        self.cur_time += dt_ms / 1000.0;
        self.tick_count += 1;
    }

    /// Laps completed by the race leader.
    pub fn leader_laps(&self) -> u32 {
        self.vehicles
            .iter()
            .map(|vehicle| vehicle.laps.laps_completed)
            .max()
            .unwrap_or(0)
    }

    /// The method returns the indices of the roster sorted into the current
    /// running order. Positions are ranked by instantaneous speed, which is
    /// a deliberate approximation: it produces a lively order board without
    /// carrying a full gap model.
    pub fn running_order(&self) -> Vec<usize> {
        let speeds: Vec<f64> = self
            .vehicles
            .iter()
            .map(|vehicle| vehicle.kinematics.speed)
            .collect();
        helpers::general::argsort(&speeds, helpers::general::SortOrder::Descending)
    }
}
