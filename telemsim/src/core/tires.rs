use rand::rngs::StdRng;
use rand::Rng;

/// (degC) Tire temperature never cools below ambient pit-lane level.
pub const TIRE_TEMP_FLOOR: f64 = 20.0;

/// State of a single tire corner.
#[derive(Debug, Clone, Copy)]
pub struct TireState {
    /// (degC) surface temperature
    pub temperature: f64,
    /// (bar) inflation pressure
    pub pressure: f64,
    /// (-) accumulated wear in [0, 1]
    pub wear: f64,
}

impl TireState {
    pub fn new(temperature: f64, pressure: f64) -> TireState {
        TireState {
            temperature,
            pressure,
            wear: 0.0,
        }
    }

    /// The method advances the tire by one tick. Temperature is driven up by
    /// throttle and down by braking, pressure does a small random walk and
    /// wear grows monotonically with pedal usage.
    pub fn tick(&mut self, throttle: f64, brake: f64, rng: &mut StdRng) {
        let delta = 0.4 * (throttle / 100.0) - 0.2 * (brake / 100.0)
            + (rng.gen::<f64>() - 0.5) * 0.1;
        self.temperature = (self.temperature + delta).max(TIRE_TEMP_FLOOR);
        self.pressure += (rng.gen::<f64>() - 0.5) * 0.01;
        self.wear = (self.wear + 1e-4 * (throttle / 100.0) + 5e-5 * (brake / 100.0)).min(1.0);
    }
}

/// The four corners of a vehicle.
#[derive(Debug, Clone, Copy)]
pub struct TireSet {
    pub front_left: TireState,
    pub front_right: TireState,
    pub rear_left: TireState,
    pub rear_right: TireState,
}

impl TireSet {
    pub fn new(temperature: f64, pressure: f64) -> TireSet {
        TireSet {
            front_left: TireState::new(temperature, pressure),
            front_right: TireState::new(temperature, pressure),
            rear_left: TireState::new(temperature, pressure),
            rear_right: TireState::new(temperature, pressure),
        }
    }

    pub fn tick(&mut self, throttle: f64, brake: f64, rng: &mut StdRng) {
        self.front_left.tick(throttle, brake, rng);
        self.front_right.tick(throttle, brake, rng);
        self.rear_left.tick(throttle, brake, rng);
        self.rear_right.tick(throttle, brake, rng);
    }

    pub fn corners(&self) -> [&TireState; 4] {
        [
            &self.front_left,
            &self.front_right,
            &self.rear_left,
            &self.rear_right,
        ]
    }
}
