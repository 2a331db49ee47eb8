use crate::core::driver::{DriverModel, DriverPars, DriverState};
use crate::core::kinematics::KinematicState;
use crate::core::laps::LapTracker;
use crate::core::tires::TireSet;
use crate::core::track::Track;
use rand::rngs::StdRng;
use serde::Deserialize;

/// (s) Laps closed faster than this are treated as grid-start artifacts.
pub const MIN_LAP_TIME_S: f64 = 10.0;

/// (L/s) Fuel burn rate at full throttle.
const FUEL_FLOW: f64 = 0.005;

/// Competition class of an entry. The class scales how hard the detailed
/// driver leans on the throttle.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum CarClass {
    #[serde(rename = "GTP")]
    Gtp,
    #[serde(rename = "LMP2")]
    Lmp2,
    #[serde(rename = "GT3")]
    Gt3,
}

impl CarClass {
    pub fn throttle_scale(&self) -> f64 {
        match self {
            CarClass::Gtp => 1.0,
            CarClass::Lmp2 => 0.97,
            CarClass::Gt3 => 0.93,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CarClass::Gtp => "GTP",
            CarClass::Lmp2 => "LMP2",
            CarClass::Gt3 => "GT3",
        }
    }
}

/// Livery color resolved once during setup from the roster's CSS string.
#[derive(Debug, Clone, Copy)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// * `number` - Car number painted on the entry
/// * `license` - Driver license identifier
/// * `nationality` - Three letter country code
/// * `class` - Competition class
/// * `color` - Livery color as a CSS color string
/// * `model` - Driver model the entry runs
/// * `start_progress` - (-) Grid slot as a fraction of the first segment
/// * `fuel` - (L) Fuel on board at the start
/// * `pace_offset` - (-) Braking spread of the simplified model
#[derive(Debug, Deserialize, Clone)]
pub struct VehiclePars {
    pub number: u32,
    pub license: String,
    pub nationality: String,
    pub class: CarClass,
    pub color: String,
    #[serde(default)]
    pub model: DriverModel,
    #[serde(default)]
    pub start_progress: f64,
    pub fuel: f64,
    #[serde(default)]
    pub pace_offset: f64,
}

/// One entry of the field, owning its kinematic, driver, lap and tire state.
#[derive(Debug, Clone)]
pub struct Vehicle {
    pub pars: VehiclePars,
    pub color: RgbColor,
    pub kinematics: KinematicState,
    pub driver: DriverState,
    pub laps: LapTracker,
    pub tires: TireSet,
    pub fuel: f64,
}

impl Vehicle {
    pub fn new(pars: VehiclePars, color: RgbColor, driver_pars: &DriverPars) -> Vehicle {
        Vehicle {
            kinematics: KinematicState::at_start(pars.start_progress),
            driver: DriverState::new(driver_pars),
            laps: LapTracker::new(MIN_LAP_TIME_S),
            tires: TireSet::new(60.0, 1.8),
            fuel: pars.fuel,
            color,
            pars,
        }
    }

    /// The method advances the vehicle by one tick: driver controls first,
    /// then movement along the track, then lap, tire and fuel accounting.
    pub fn tick(&mut self, track: &Track, driver_pars: &DriverPars, dt_ms: f64, rng: &mut StdRng) {
        let zone = track.zone(self.kinematics.segment_index);
        let progress = self.kinematics.progress;
        let speed = self.kinematics.speed;

        self.kinematics.speed = match self.pars.model {
            DriverModel::Detailed => self.driver.tick_detailed(
                driver_pars,
                self.pars.class.throttle_scale(),
                zone,
                progress,
                speed,
                rng,
            ),
            DriverModel::Simplified => self.driver.tick_simplified(
                driver_pars,
                zone,
                progress,
                speed,
                self.pars.pace_offset,
                rng,
            ),
        };

        let sector = track.sector_of(self.kinematics.segment_index);
        let crossed_start = self.kinematics.advance(track, dt_ms);

        let dt_s = dt_ms / 1000.0;
        self.laps.tick(dt_s, sector);
        if crossed_start {
            self.laps.on_crossing();
        }

        self.tires.tick(self.driver.throttle, self.driver.brake, rng);
        self.fuel = (self.fuel - FUEL_FLOW * dt_s * self.driver.throttle / 100.0).max(0.0);
    }

    /// Fraction of the lap completed, for the race-progress readout.
    pub fn lap_fraction(&self, track: &Track) -> f64 {
        track.lap_fraction(self.kinematics.segment_index, self.kinematics.progress)
    }
}
