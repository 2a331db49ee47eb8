use serde::Serialize;

/// A single completed lap with its three sector splits.
#[derive(Debug, Clone, Serialize)]
pub struct LapRecord {
    /// (s) total lap time
    pub lap_time: f64,
    /// (s) time spent in each of the three sectors
    pub sector_times: [f64; 3],
}

/// Per-vehicle lap accounting. Time accrues every tick; a start/finish
/// crossing closes the running lap, unless the lap is implausibly short
/// (grid vehicles start just behind the line and cross it immediately).
#[derive(Debug, Clone)]
pub struct LapTracker {
    pub lap_time: f64,
    pub laps_completed: u32,
    pub best_lap_time: Option<f64>,
    pub history: Vec<LapRecord>,
    sector_acc: [f64; 3],
    min_lap_time: f64,
}

impl LapTracker {
    pub fn new(min_lap_time: f64) -> LapTracker {
        LapTracker {
            lap_time: 0.0,
            laps_completed: 0,
            best_lap_time: None,
            history: Vec::new(),
            sector_acc: [0.0; 3],
            min_lap_time,
        }
    }

    /// The method accrues one tick of `dt_s` onto the running lap and the
    /// sector the vehicle currently occupies.
    pub fn tick(&mut self, dt_s: f64, sector: usize) {
        self.lap_time += dt_s;
        self.sector_acc[sector.min(2)] += dt_s;
    }

    /// Called when the vehicle crosses start/finish. Returns true if a lap
    /// was recorded; a crossing below the plausibility threshold only keeps
    /// the clock running.
    pub fn on_crossing(&mut self) -> bool {
        if self.lap_time < self.min_lap_time {
            return false;
        }

        let record = LapRecord {
            lap_time: self.lap_time,
            sector_times: self.sector_acc,
        };
        self.best_lap_time = Some(match self.best_lap_time {
            Some(best) => best.min(record.lap_time),
            None => record.lap_time,
        });
        self.history.push(record);
        self.laps_completed += 1;
        self.lap_time = 0.0;
        self.sector_acc = [0.0; 3];
        true
    }
}
