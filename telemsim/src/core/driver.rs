use crate::core::track::BrakingZone;
use helpers::general::lin_interp;
use rand::rngs::StdRng;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::Deserialize;

/// Which driver model a vehicle runs. The detailed model produces full
/// cockpit telemetry (throttle/brake/RPM with a rev-match shift lock); the
/// simplified model only keeps speed, gear and a braking flag plausible.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum DriverModel {
    Detailed,
    Simplified,
}

impl Default for DriverModel {
    fn default() -> Self {
        DriverModel::Simplified
    }
}

/// * `gear_speeds` - (km/h) Per-gear top speed; index 0 is the base of gear 1
/// * `max_gear` - Highest gear, must equal `gear_speeds.len() - 1`
/// * `max_speed` - (km/h) Hard speed cap
/// * `rpm_floor` - (1/min) Idle RPM
/// * `rpm_ceiling` - (1/min) Redline
/// * `rev_match_flare` - (1/min) RPM pinned while the shift lock is active
/// * `rev_match_ticks` - Tick count the shift lock stays armed after a downshift
/// * `throttle_ceiling` - Throttle relaxation target in percent
/// * `throttle_ceiling_top` - Throttle relaxation target in the top gears
/// * `top_gear_threshold` - Gear from which `throttle_ceiling_top` applies
#[derive(Debug, Deserialize, Clone)]
pub struct DriverPars {
    pub gear_speeds: Vec<f64>,
    pub max_gear: u8,
    pub max_speed: f64,
    pub rpm_floor: f64,
    pub rpm_ceiling: f64,
    pub rev_match_flare: f64,
    pub rev_match_ticks: u32,
    pub throttle_ceiling: f64,
    pub throttle_ceiling_top: f64,
    pub top_gear_threshold: u8,
}

impl DriverPars {
    /// The method returns the top speed of the given gear (gear 0 is the
    /// base of gear 1). Gears beyond the table fall back to the speed cap.
    pub fn gear_speed(&self, gear: u8) -> f64 {
        self.gear_speeds
            .get(gear as usize)
            .copied()
            .unwrap_or(self.max_speed)
    }
}

// longitudinal model constants of the detailed driver (per tick)
const ACCEL_GAIN: f64 = 12.0;
const BRAKE_GAIN: f64 = 18.0;
const DRAG_COEFF: f64 = 0.005;
const THROTTLE_SMOOTHING: f64 = 0.15;
const BRAKE_SMOOTHING: f64 = 0.3;
const RPM_SMOOTHING: f64 = 0.35;
const RPM_JITTER_STD: f64 = 35.0;
const UPSHIFT_MARGIN: f64 = 10.0;

/// Per-vehicle throttle/brake/gear/RPM state. While `rev_match_timer > 0`
/// the RPM is pinned to the flare value and the exponential throttle/RPM
/// relaxation is suppressed; this is the one lock in the state machine.
#[derive(Debug, Clone)]
pub struct DriverState {
    pub throttle: f64,
    pub brake: f64,
    pub gear: u8,
    pub rpm: f64,
    pub rev_match_timer: u32,
}

impl DriverState {
    pub fn new(pars: &DriverPars) -> DriverState {
        DriverState {
            throttle: 0.0,
            brake: 0.0,
            gear: 1,
            rpm: pars.rpm_floor,
            rev_match_timer: 0,
        }
    }

    /// One control step of the detailed model. Reads the vehicle position
    /// (to react to braking zones) and the previous speed, and returns the
    /// new speed after longitudinal integration.
    pub fn tick_detailed(
        &mut self,
        pars: &DriverPars,
        class_throttle_scale: f64,
        zone: Option<&BrakingZone>,
        progress: f64,
        speed: f64,
        rng: &mut StdRng,
    ) -> f64 {
        self.rev_match_timer = self.rev_match_timer.saturating_sub(1);
        let mut shifted_down = false;

        // default decay: brake relaxes toward 0, throttle toward the class
        // ceiling, suppressed while the shift lock is armed
        if self.rev_match_timer == 0 {
            self.brake = (self.brake - 15.0).max(0.0);
            let base_ceiling = if self.gear >= pars.top_gear_threshold {
                pars.throttle_ceiling_top
            } else {
                pars.throttle_ceiling
            };
            let ceiling = base_ceiling * class_throttle_scale;
            self.throttle = (self.throttle + (ceiling - self.throttle) * THROTTLE_SMOOTHING)
                .clamp(0.0, 100.0);
        }

        // managed braking once past the zone's trigger fraction
        if let Some(zone) = zone {
            if progress > zone.brake_start {
                let brake_target = zone.brake_target + rng.gen::<f64>() * 5.0;
                self.brake =
                    (self.brake + (brake_target - self.brake) * BRAKE_SMOOTHING).min(100.0);
                self.throttle = (self.throttle - 50.0).max(0.0);

                if self.gear > zone.target_gear {
                    let next = self
                        .gear
                        .saturating_sub(zone.downshift_step)
                        .max(zone.target_gear);
                    if next != self.gear {
                        self.gear = next;
                        self.rev_match_timer = pars.rev_match_ticks;
                        shifted_down = true;
                    }
                }
            }
        }

        if self.rev_match_timer > 0 {
            self.rpm = pars.rev_match_flare;
        }

        // longitudinal integration with drag and a little pedal noise
        let accel = (self.throttle / 100.0) * ACCEL_GAIN;
        let braking = (self.brake / 100.0) * BRAKE_GAIN;
        let drag = DRAG_COEFF * speed * speed / 100.0;
        let new_speed =
            (speed + accel - braking - drag + (rng.gen::<f64>() - 0.5)).clamp(0.0, pars.max_speed);

        // upshift near the current gear's top speed under load
        if self.gear < pars.max_gear
            && new_speed >= pars.gear_speed(self.gear) - UPSHIFT_MARGIN
            && self.throttle > 50.0
        {
            self.gear += 1;
        }

        // RPM tracking resumes only once the shift lock has expired
        if !shifted_down && self.rev_match_timer == 0 {
            let target = self.target_rpm(pars, new_speed);
            let jitter = match Normal::new(0.0, RPM_JITTER_STD) {
                Ok(dist) => dist.sample(rng),
                Err(_) => 0.0,
            };
            self.rpm = (self.rpm + (target - self.rpm) * RPM_SMOOTHING + jitter)
                .clamp(pars.rpm_floor - 500.0, pars.rpm_ceiling + 500.0);
            if !self.rpm.is_finite() {
                self.rpm = pars.rpm_floor;
            }
        }

        new_speed
    }

    /// One control step of the simplified model used for the rest of the
    /// field: gentle acceleration toward the cap, zone-triggered
    /// deceleration down to the corner speed, gear and RPM derived from
    /// speed. `pace_offset` spreads the field a little by roster slot.
    pub fn tick_simplified(
        &mut self,
        pars: &DriverPars,
        zone: Option<&BrakingZone>,
        progress: f64,
        speed: f64,
        pace_offset: f64,
        rng: &mut StdRng,
    ) -> f64 {
        let mut accel = 1.2 + rng.gen::<f64>() * 0.3;
        let mut braking = false;

        if let Some(zone) = zone {
            if progress >= zone.brake_start && speed > zone.min_corner_speed {
                accel = -14.0 * zone.braking_power * (1.0 + pace_offset);
                braking = true;
            } else if speed < zone.min_corner_speed * 1.05 {
                accel = 0.4;
            }
        }

        if !braking && speed >= pars.max_speed {
            accel = 0.0;
        }

        let new_speed = (speed + accel).clamp(0.0, pars.max_speed);

        self.gear = (((new_speed / 55.0).floor() as u8) + 1).clamp(1, pars.max_gear);
        self.brake = if braking { 80.0 } else { 0.0 };
        self.throttle = if braking {
            0.0
        } else {
            (new_speed / pars.max_speed * 100.0).min(100.0)
        };
        self.rpm = self.target_rpm(pars, new_speed);
        self.rev_match_timer = 0;

        new_speed
    }

    /// The method maps the speed into the current gear's band and scales it
    /// into [rpm_floor, rpm_ceiling]. A collapsed band or a non-finite
    /// result falls back to the floor instead of propagating.
    fn target_rpm(&self, pars: &DriverPars, speed: f64) -> f64 {
        let lower = pars.gear_speed(self.gear - 1);
        let upper = pars.gear_speed(self.gear);

        let target = if upper - lower > 0.0 {
            lin_interp(speed, &[lower, upper], &[pars.rpm_floor, pars.rpm_ceiling])
        } else {
            pars.rpm_floor
        };

        if target.is_finite() && target >= pars.rpm_floor {
            target
        } else {
            pars.rpm_floor
        }
    }
}
