use crate::core::race::Race;
use crate::interfaces::snapshot::RaceSnapshot;
use crate::post::summary::SessionSummary;
use crate::pre::read_sim_pars::SimPars;
use anyhow::Context;
use flume::{Receiver, Sender};
use std::thread::sleep;
use std::time::{Duration, Instant};

/// Commands a consumer can send back into a running session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    Pause,
    Resume,
    Stop,
}

/// run_session creates and simulates a race on the basis of the inserted parameters, and returns
/// a summary for post-processing.
///
/// With a sender attached the session runs in real time (scaled by
/// `realtime_factor`) and publishes a snapshot after every tick; without one
/// it runs as fast as the machine allows. Either way the session ends once
/// the leader has completed the configured lap count, or on a Stop command.
pub fn run_session(
    sim_pars: &SimPars,
    tx: Option<&Sender<RaceSnapshot>>,
    control: Option<&Receiver<SessionCommand>>,
    realtime_factor: f64,
    print_debug: bool,
) -> anyhow::Result<SessionSummary> {
    let mut race = Race::new(sim_pars).context("Could not set up the race!")?;
    let dt_ms = sim_pars.session_pars.tick_period_ms;
    let target_laps = sim_pars.session_pars.target_laps;

    let sim_realtime = tx.is_some();
    let mut paused = false;
    let mut stopped = false;
    let mut t_race_update_print = 0.0;
    let mut last_printed_lap = 0u32;

    while race.leader_laps() < target_laps && !stopped {
        let t_start = Instant::now();

        if let Some(control) = control {
            while let Ok(command) = control.try_recv() {
                match command {
                    SessionCommand::Pause => paused = true,
                    SessionCommand::Resume => paused = false,
                    SessionCommand::Stop => stopped = true,
                }
            }
        }

        if !paused && !stopped {
            race.advance(dt_ms);

            if print_debug && race.cur_time > t_race_update_print + 0.9999 {
                println!(
                    "INFO: Simulating... Current session time is {:.3}s, leader lap is {}",
                    race.cur_time,
                    race.leader_laps() + 1
                );
                t_race_update_print = race.cur_time;
            }
            if print_debug && race.leader_laps() > last_printed_lap {
                println!("INFO: Leader completed lap {}", race.leader_laps());
                last_printed_lap = race.leader_laps();
            }

            if let Some(tx) = tx {
                tx.send(RaceSnapshot::record(&race))
                    .context("Failed to send race snapshot to the consumer!")?;
            }
        }

        if sim_realtime {
            // sleep until the tick is finished in real-time as well (calculation in ms)
            let t_sleep =
                (dt_ms / realtime_factor) as i64 - t_start.elapsed().as_millis() as i64;

            if t_sleep > 0 {
                sleep(Duration::from_millis(t_sleep as u64));
            } else if !paused {
                println!("WARNING: Could not keep up with real-time!")
            }
        }
    }

    Ok(SessionSummary::from_race(&race))
}
