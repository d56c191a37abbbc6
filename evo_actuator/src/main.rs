//! # EVO Actuator Driver Binary
//!
//! Starts the bus worker with the logging transport and streams setpoint
//! commands at it, reporting how many completed and how many were preempted.
//!
//! # Usage
//!
//! ```bash
//! # Defaults (16 targets, no calibration)
//! evo_actuator
//!
//! # Config file, 100 commands 1 ms apart
//! evo_actuator --config config/actuator.toml --commands 100 --interval-ms 1
//!
//! # Verbose JSON logs
//! evo_actuator -v --json
//! ```

#![deny(warnings)]

use clap::Parser;
use evo_actuator::actuator::LoggingActuator;
use evo_actuator::command::ActuatorCommand;
use evo_actuator::config::DriverConfig;
use evo_actuator::{ActuatorDriver, OutcomeTally};
use evo_coord::config::LogLevel;
use evo_coord::target_set::DynTargetSet;
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// EVO Actuator Driver - calibrated, preemptable command hand-off
#[derive(Parser, Debug)]
#[command(name = "evo_actuator")]
#[command(author = "RTS007")]
#[command(version)]
#[command(about = "Actuator driver with calibration store and preemptable command slot")]
#[command(long_about = None)]
struct Args {
    /// Path to the driver configuration (actuator.toml). Defaults apply if omitted.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Number of setpoint commands to submit
    #[arg(short = 'n', long, default_value_t = 20)]
    commands: u32,

    /// Delay between submissions in milliseconds
    #[arg(long, default_value_t = 1)]
    interval_ms: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = run() {
        error!("actuator driver failed: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = DriverConfig::load_or_default(args.config.as_deref());
    let log_level = config
        .as_ref()
        .map(|c| c.shared.log_level)
        .unwrap_or_default();
    setup_tracing(&args, log_level);
    let config = config?;

    info!("EVO actuator driver v{} starting...", env!("CARGO_PKG_VERSION"));

    let mut driver = ActuatorDriver::start(&config, Box::new(LoggingActuator::new()))?;

    let running = driver.running_flag();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        running.store(false, Ordering::SeqCst);
    })?;

    let targets = DynTargetSet::all(config.target_count);
    let interval = Duration::from_millis(args.interval_ms);
    let mut completions = Vec::with_capacity(args.commands as usize);
    for i in 0..args.commands {
        if !driver.is_running() {
            info!("Driver stopped, {} of {} commands submitted", i, args.commands);
            break;
        }
        let setpoint = f64::from(i);
        completions.push(driver.submit(ActuatorCommand::new(targets.clone(), setpoint))?);
        thread::sleep(interval);
    }

    let mut tally = OutcomeTally::default();
    for completion in &completions {
        tally.record(completion.wait());
    }
    info!(
        completed = tally.completed,
        preempted = tally.preempted,
        abandoned = tally.abandoned,
        "All {} commands resolved",
        tally.total()
    );

    driver.shutdown()?;
    info!("EVO actuator driver shutdown complete");
    Ok(())
}

/// Setup tracing subscriber from CLI arguments and the configured level.
fn setup_tracing(args: &Args, level: LogLevel) {
    let directive = if args.verbose {
        LogLevel::Debug.as_directive()
    } else {
        level.as_directive()
    };

    let filter = EnvFilter::from_default_env().add_directive(
        directive
            .parse()
            .unwrap_or_else(|_| tracing::Level::INFO.into()),
    );

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
