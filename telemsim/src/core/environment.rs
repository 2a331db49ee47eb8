use rand::rngs::StdRng;
use rand::Rng;
use serde::Deserialize;

/// * `air_temp` - (degC) Initial air temperature
/// * `track_temp` - (degC) Initial track surface temperature
/// * `cloud_cover` - (-) Initial cloud cover in [0, 1]
/// * `flag_probability` - Chance per tick that a flag window opens
/// * `flag_window_ms` - (ms) Duration a flag stays shown once raised
/// * `rain_threshold` - Cloud cover above which rain can start
/// * `rain_probability` - Chance per tick that rain starts above the threshold
#[derive(Debug, Deserialize, Clone)]
pub struct EnvironmentPars {
    pub air_temp: f64,
    pub track_temp: f64,
    pub cloud_cover: f64,
    #[serde(default = "EnvironmentPars::def_flag_probability")]
    pub flag_probability: f64,
    #[serde(default = "EnvironmentPars::def_flag_window_ms")]
    pub flag_window_ms: f64,
    #[serde(default = "EnvironmentPars::def_rain_threshold")]
    pub rain_threshold: f64,
    #[serde(default = "EnvironmentPars::def_rain_probability")]
    pub rain_probability: f64,
}

impl EnvironmentPars {
    fn def_flag_probability() -> f64 {
        0.005
    }
    fn def_flag_window_ms() -> f64 {
        5000.0
    }
    fn def_rain_threshold() -> f64 {
        0.7
    }
    fn def_rain_probability() -> f64 {
        0.01
    }
}

/// Flags currently shown by race control. At most one is set at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FlagState {
    pub yellow: bool,
    pub blue: bool,
    pub red: bool,
    pub black: bool,
}

impl FlagState {
    pub fn any(&self) -> bool {
        self.yellow || self.blue || self.red || self.black
    }
}

/// Shared weather and race-control state, advanced once per tick before
/// the field.
#[derive(Debug, Clone)]
pub struct RaceEnvironment {
    pars: EnvironmentPars,
    pub air_temp: f64,
    pub track_temp: f64,
    pub cloud_cover: f64,
    pub rain_intensity: f64,
    pub flags: FlagState,
    flag_timer_ms: f64,
}

impl RaceEnvironment {
    pub fn new(pars: &EnvironmentPars) -> RaceEnvironment {
        RaceEnvironment {
            pars: pars.clone(),
            air_temp: pars.air_temp,
            track_temp: pars.track_temp,
            cloud_cover: pars.cloud_cover.clamp(0.0, 1.0),
            rain_intensity: 0.0,
            flags: FlagState::default(),
            flag_timer_ms: 0.0,
        }
    }

    /// The method advances weather and flags by one tick of `dt_ms`.
    pub fn tick(&mut self, dt_ms: f64, rng: &mut StdRng) {
        self.air_temp += (rng.gen::<f64>() - 0.5) * 0.01;
        self.track_temp += (rng.gen::<f64>() - 0.5) * 0.02;
        self.cloud_cover = (self.cloud_cover + (rng.gen::<f64>() - 0.5) * 0.001).clamp(0.0, 1.0);

        // rain only exists while the sky is overcast enough
        if self.cloud_cover > self.pars.rain_threshold {
            if self.rain_intensity > 0.0 {
                self.rain_intensity =
                    (self.rain_intensity + (rng.gen::<f64>() - 0.5) * 0.01).clamp(0.0, 1.0);
            } else if rng.gen::<f64>() < self.pars.rain_probability {
                self.rain_intensity = 0.05;
            }
        } else {
            self.rain_intensity = 0.0;
        }

        if self.flags.any() {
            self.flag_timer_ms -= dt_ms;
            if self.flag_timer_ms <= 0.0 {
                self.flags = FlagState::default();
                self.flag_timer_ms = 0.0;
            }
        } else if rng.gen::<f64>() < self.pars.flag_probability {
            self.flag_timer_ms = self.pars.flag_window_ms;
            match rng.gen_range(0..4u8) {
                0 => self.flags.yellow = true,
                1 => self.flags.blue = true,
                2 => self.flags.red = true,
                _ => self.flags.black = true,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn pars() -> EnvironmentPars {
        EnvironmentPars {
            air_temp: 22.0,
            track_temp: 31.0,
            cloud_cover: 0.3,
            flag_probability: 0.005,
            flag_window_ms: 5000.0,
            rain_threshold: 0.7,
            rain_probability: 0.01,
        }
    }

    #[test]
    fn no_rain_below_the_cloud_threshold() {
        let mut pars = pars();
        pars.rain_probability = 1.0;
        let mut env = RaceEnvironment::new(&pars);
        let mut rng = StdRng::seed_from_u64(4);

        for _ in 0..200 {
            env.tick(100.0, &mut rng);
            assert_eq!(env.rain_intensity, 0.0);
        }
    }

    #[test]
    fn overcast_sky_starts_rain_when_forced() {
        let mut pars = pars();
        pars.cloud_cover = 0.95;
        pars.rain_probability = 1.0;
        pars.flag_probability = 0.0;
        let mut env = RaceEnvironment::new(&pars);
        let mut rng = StdRng::seed_from_u64(5);

        env.tick(100.0, &mut rng);

        assert!(env.rain_intensity > 0.0);
    }

    #[test]
    fn flag_shows_for_the_full_window_then_clears() {
        let mut pars = pars();
        pars.flag_probability = 1.0;
        let mut env = RaceEnvironment::new(&pars);
        let mut rng = StdRng::seed_from_u64(6);

        env.tick(100.0, &mut rng);
        assert!(env.flags.any());
        let raised = env.flags;

        // 5000 ms window at 100 ms per tick: 49 more ticks stay raised
        for _ in 0..49 {
            env.tick(100.0, &mut rng);
            assert_eq!(env.flags, raised);
        }

        env.tick(100.0, &mut rng);
        // the window expired; the forced probability may raise a fresh flag
        // on a later tick but this one only clears
        assert!(!env.flags.any());
    }

    #[test]
    fn flags_never_appear_when_suppressed() {
        let mut pars = pars();
        pars.flag_probability = 0.0;
        let mut env = RaceEnvironment::new(&pars);
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..1000 {
            env.tick(100.0, &mut rng);
            assert!(!env.flags.any());
        }
    }

    #[test]
    fn cloud_cover_stays_in_unit_range() {
        let pars = pars();
        let mut env = RaceEnvironment::new(&pars);
        let mut rng = StdRng::seed_from_u64(8);

        for _ in 0..5000 {
            env.tick(100.0, &mut rng);
            assert!((0.0..=1.0).contains(&env.cloud_cover));
            assert!((0.0..=1.0).contains(&env.rain_intensity));
        }
    }
}
