use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser, Clone)]
#[clap(
    version = "0.1.0",
    name = "telemsim",
    about = "A time-discrete vehicle telemetry simulator"
)]
pub struct SimOpts {
    // FLAGS ---------------------------------------------------------------------------------------
    /// Activate debug printing (only for headless mode)
    #[clap(short, long)]
    pub debug: bool,

    /// Run in real time and print live telemetry snapshots instead of simulating as fast as possible
    #[clap(short, long)]
    pub realtime: bool,

    /// Export a lap time chart after the session
    #[clap(long)]
    pub plot: bool,

    // OPTIONS -------------------------------------------------------------------------------------
    /// Set number of simulation runs (only for headless mode, ignored in real-time mode)
    #[clap(short, long, default_value = "1")]
    pub no_sim_runs: u32,

    /// Set path to the simulation parameter file (OPTIONAL: if not set, uses a built-in endurance session)
    #[clap(short, long)]
    pub parfile_path: Option<PathBuf>,

    /// Set real-time factor (only relevant in real-time mode)
    #[clap(long, default_value = "1.0")]
    pub realtime_factor: f64,

    /// Set tick period in milliseconds, should be in the range [1.0, 1000.0]
    #[clap(short, long, default_value = "100.0")]
    pub tick_period_ms: f64,

    /// Set the leader lap count that ends the session
    #[clap(short = 'l', long, default_value = "3")]
    pub target_laps: u32,

    /// Set the RNG seed
    #[clap(short, long, default_value = "42")]
    pub seed: u64,
}
