use clap::Parser;
use plotters::prelude::*;
use rayon::prelude::*;
use std::thread;
use std::time::Instant;
use telemsim::core::session::run_session;
use telemsim::post::summary::SessionSummary;
use telemsim::pre::read_sim_pars::{default_endurance, read_sim_pars, SimPars};
use telemsim::pre::sim_opts::SimOpts;

/// Exports a lap time chart of the finished session as a PNG in output/.
fn export_lap_time_plot(summary: &SessionSummary) -> anyhow::Result<String> {
    let out_dir = std::path::Path::new("output");
    std::fs::create_dir_all(out_dir)?;
    let ts = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)?
        .as_secs();
    let filename = format!("lap_times_{}.png", ts);
    let out_path = out_dir.join(filename);

    let max_laps = summary
        .vehicles
        .iter()
        .map(|vehicle| vehicle.laps.len())
        .max()
        .unwrap_or(0);
    if max_laps == 0 {
        anyhow::bail!("No completed laps to plot!");
    }

    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;
    for vehicle in &summary.vehicles {
        for record in &vehicle.laps {
            if record.lap_time < y_min {
                y_min = record.lap_time;
            }
            if record.lap_time > y_max {
                y_max = record.lap_time;
            }
        }
    }
    let margin = (y_max - y_min).max(1.0) * 0.05;
    y_min -= margin;
    y_max += margin;

    let root = BitMapBackend::new(&out_path, (1280, 720)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Lap times - {}", summary.track_name),
            ("sans-serif", 24).into_font(),
        )
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(1u32..max_laps as u32 + 1, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Lap")
        .y_desc("s")
        .label_style(("sans-serif", 16))
        .axis_desc_style(("sans-serif", 16))
        .draw()?;

    let palette = Palette99::pick;
    for (i, vehicle) in summary.vehicles.iter().enumerate() {
        let series: Vec<(u32, f64)> = vehicle
            .laps
            .iter()
            .enumerate()
            .map(|(lap, record)| (lap as u32 + 1, record.lap_time))
            .collect();
        chart
            .draw_series(LineSeries::new(series.into_iter(), palette(i)))?
            .label(format!("#{} ({})", vehicle.number, vehicle.class))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], palette(i)));
    }

    chart
        .configure_series_labels()
        .border_style(&BLACK)
        .background_style(&WHITE.mix(0.8))
        .label_font(("sans-serif", 16))
        .position(plotters::chart::SeriesLabelPosition::UpperRight)
        .draw()?;

    root.present()?;
    Ok(out_path.to_string_lossy().into_owned())
}

fn main() -> anyhow::Result<()> {
    // PRE-PROCESSING ------------------------------------------------------------------------------
    // get simulation options from the command line arguments
    let sim_opts: SimOpts = SimOpts::parse();

    // get simulation parameters
    let mut sim_pars: SimPars = if let Some(parfile_path) = &sim_opts.parfile_path {
        println!("INFO: Reading simulation parameters from {:?}", parfile_path);
        read_sim_pars(parfile_path)?
    } else {
        println!("INFO: No parameter file given, using the built-in endurance session");
        default_endurance()
    };

    // command line options override the parameter file
    sim_pars.session_pars.tick_period_ms = sim_opts.tick_period_ms;
    sim_pars.session_pars.target_laps = sim_opts.target_laps;
    sim_pars.session_pars.seed = sim_opts.seed;

    println!(
        "INFO: Simulating {} over {} laps with a tick period of {:.1}ms",
        sim_pars.track_pars.name, sim_pars.session_pars.target_laps, sim_pars.session_pars.tick_period_ms
    );

    // EXECUTION -----------------------------------------------------------------------------------
    if !sim_opts.realtime {
        // HEADLESS CASE - run as fast as possible, optionally many times in parallel
        println!("INFO: Running {} simulation run(s)...", sim_opts.no_sim_runs);
        let t_start = Instant::now();

        let summaries: Vec<anyhow::Result<SessionSummary>> = (0..sim_opts.no_sim_runs)
            .into_par_iter()
            .map(|run| {
                let mut run_pars = sim_pars.clone();
                run_pars.session_pars.seed = sim_pars.session_pars.seed + run as u64;
                run_session(&run_pars, None, None, 1.0, sim_opts.debug && run == 0)
            })
            .collect();

        println!("INFO: Execution time: {}ms", t_start.elapsed().as_millis());

        let mut first_summary = None;
        for (run, summary) in summaries.into_iter().enumerate() {
            let summary = summary?;
            if sim_opts.no_sim_runs > 1 {
                println!(
                    "INFO: Run {} (seed {})",
                    run,
                    sim_pars.session_pars.seed + run as u64
                );
            }
            summary.print_lap_times();
            if first_summary.is_none() {
                first_summary = Some(summary);
            }
        }

        if let Some(summary) = first_summary {
            match summary.write_lap_times_to_file(None) {
                Ok(path) => println!("INFO: Lap times written to {}", path),
                Err(e) => eprintln!("WARNING: Could not write lap times: {}", e),
            }
            if sim_opts.plot {
                match export_lap_time_plot(&summary) {
                    Ok(path) => println!("INFO: Lap time chart written to {}", path),
                    Err(e) => eprintln!("WARNING: Could not export the lap time chart: {}", e),
                }
            }
        }
    } else {
        // REAL-TIME CASE - simulate in real time and print live snapshots
        println!("INFO: Running in real time (factor {})...", sim_opts.realtime_factor);

        let (tx, rx) = flume::unbounded();
        let sim_pars_thread = sim_pars.clone();
        let realtime_factor = sim_opts.realtime_factor;

        let sim_handle = thread::spawn(move || {
            run_session(&sim_pars_thread, Some(&tx), None, realtime_factor, false)
        });

        // print the order board roughly once per simulated second
        let ticks_per_board = (1000.0 / sim_pars.session_pars.tick_period_ms).max(1.0) as u64;
        for snapshot in rx.iter() {
            if snapshot.tick % ticks_per_board != 0 {
                continue;
            }
            println!("INFO: t={:7.1}s", snapshot.time);
            for vehicle in &snapshot.vehicles {
                println!(
                    "  P{:<2} #{:<3} {:4} lap {:2} | {:5.1} km/h gear {} {:5.0} rpm{}",
                    vehicle.position,
                    vehicle.number,
                    vehicle.class,
                    vehicle.laps_completed + 1,
                    vehicle.speed,
                    vehicle.gear,
                    vehicle.rpm,
                    if vehicle.is_braking { " [BRK]" } else { "" }
                );
            }
            let env = &snapshot.environment;
            if env.rain_intensity > 0.0 {
                println!("  WEATHER: rain at {:.0}%", env.rain_intensity * 100.0);
            }
            if env.yellow_flag {
                println!("  FLAG: yellow");
            } else if env.blue_flag {
                println!("  FLAG: blue");
            } else if env.red_flag {
                println!("  FLAG: red");
            } else if env.black_flag {
                println!("  FLAG: black");
            }
        }

        let summary = match sim_handle.join() {
            Ok(result) => result?,
            Err(_) => anyhow::bail!("Simulation thread panicked!"),
        };
        summary.print_lap_times();
    }

    Ok(())
}
