use anyhow::Result;
use clap::Parser;
use hemoflow_common::SimulationConfig;
use hemoflow_engine::export::{self, OutputFormat};
use hemoflow_engine::SimulationEngine;
use log::{debug, error, info, trace, warn};
use std::path::PathBuf;
use std::time::Instant;

/// Headless runner: drives the engine for a fixed number of ticks and saves the outputs.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the TOML configuration
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Number of ticks to run (overrides run.ticks)
    #[arg(short, long)]
    ticks: Option<u64>,

    /// Environment identifier, e.g. "Delhi" (overrides parameters.environment and its AQI)
    #[arg(short, long)]
    environment: Option<String>,

    /// Stenosis severity in percent (overrides parameters.stenosis_severity)
    #[arg(short, long)]
    stenosis: Option<f64>,

    /// Resume from a checkpoint written by a previous run
    #[arg(long)]
    resume: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Initialize the logger
    env_logger::init();
    let args = Args::parse();

    info!("Starting Hemodynamics Engine...");

    // --- Load Configuration ---
    let config = if args.config.exists() {
        SimulationConfig::load(&args.config)?
    } else {
        warn!("Config file '{}' not found, using defaults.", args.config.display());
        SimulationConfig::default()
    };
    let total_ticks = args.ticks.unwrap_or(config.run.ticks);
    let status_interval_secs = config.run.status_interval_secs;
    let output = config.output.clone();

    if config.solver.parallel_columns {
        info!("Using {} Rayon threads for the column sweep.", rayon::current_num_threads());
    }

    // --- Initialize Engine ---
    let mut engine = SimulationEngine::new(config)?;
    if let Some(path) = &args.resume {
        engine.restore(export::load_checkpoint(path)?);
    }
    if let Some(name) = &args.environment {
        if engine.environments().lookup(name).is_none() {
            warn!("Environment '{}' is not in the table; pollutant inputs default to zero.", name);
        }
        engine.select_environment(name);
    }
    if let Some(severity) = args.stenosis {
        let params = engine.parameters().clone().with_stenosis(severity);
        engine.set_parameters(params);
    }
    debug!("Simulation Parameters: {:#?}", engine.parameters());
    info!(
        "Environment: {} (AQI {}, {}), alert level {}.",
        engine.environment().name,
        engine.parameters().aqi,
        engine.environment().status,
        engine.environment().alert().label()
    );

    // --- Simulation Loop ---
    info!("Starting simulation loop for {} ticks...", total_ticks);
    let start_time = Instant::now();
    let mut previous_print_time = start_time;
    engine.start();

    for tick in 0..total_ticks {
        let tick_start_time = Instant::now();
        engine.tick();
        let tick_duration = tick_start_time.elapsed();

        let current_time = Instant::now();
        let should_print_status =
            current_time.duration_since(previous_print_time).as_secs_f64() >= status_interval_secs;
        let is_last_tick = tick + 1 == total_ticks;

        if should_print_status || is_last_tick {
            if let Some(result) = engine.latest_result() {
                info!(
                    "Tick [{}/{}] (t = {:.3} s) | Peak u: {:.4} m/s | Flow: {:.3} L/min | Risk: {:.2} | History: {} | Tick Time: {:6.3} ms",
                    tick + 1,
                    total_ticks,
                    result.time,
                    result.peak_velocity,
                    result.flow_rate,
                    result.risk_index,
                    engine.history().len(),
                    tick_duration.as_secs_f64() * 1000.0
                );
            }
            previous_print_time = current_time;
        } else {
            trace!(
                "Tick [{}/{}] completed in {:.3} ms",
                tick + 1,
                total_ticks,
                tick_duration.as_secs_f64() * 1000.0
            );
        }
    }
    engine.stop();

    let total_duration = start_time.elapsed();
    info!(
        "Simulation finished in {:.3} seconds ({} sub-steps, {:.3} s simulated).",
        total_duration.as_secs_f64(),
        engine.sub_steps(),
        engine.time()
    );
    if engine.has_diverged() {
        warn!("The velocity field diverged during this run; saved metrics contain non-finite values.");
    }
    if let Some(result) = engine.latest_result() {
        info!(
            "Final state: O2 {:.2} mL/min | CO2 {:.2} mL/min | RQ {:.2} | Wall stress {:.3} Pa | High risk: {}",
            result.o2_consumption,
            result.co2_production,
            result.respiratory_quotient(),
            result.wall_stress,
            result.is_high_risk()
        );
    }

    // --- Save Recorded Data ---
    info!("Saving recorded data...");
    if output.save_history {
        let format = OutputFormat::from_config(output.format.as_deref());
        let history = engine.history().to_vec();
        match export::save(&output.base_filename, "history", &history, format) {
            Ok(path) => info!("{} history points saved to {}", history.len(), path.display()),
            Err(e) => error!("Error saving history: {:#}", e),
        }
    } else {
        info!("Skipping saving history as per config (save_history is false).");
    }

    if output.save_result {
        match engine.latest_result() {
            Some(result) => {
                if let Err(e) = export::save_result(&output.base_filename, result) {
                    error!("Error saving result: {:#}", e);
                }
            }
            None => warn!("No result was published; nothing to save."),
        }
    }

    if output.save_field {
        if let Err(e) = export::save_field_csv(&output.base_filename, engine.field()) {
            error!("Error saving velocity field: {:#}", e);
        }
    }

    if output.save_checkpoint {
        let path = format!("{}_checkpoint.bin", output.base_filename);
        export::save_checkpoint(&path, &engine.checkpoint())?;
    }

    info!("Simulation Complete.");
    Ok(())
}
