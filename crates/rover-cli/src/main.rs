//! `rover` – headless autonomous run against the simulated rover.
//!
//! 1. Loads `~/.rover/config.toml` (or `$ROVER_CONFIG`), writing the defaults
//!    on first run.
//! 2. Builds the simulated chassis, lift, hook and mineral detector.
//! 3. Starts the autonomous window and runs the mission to completion.
//! 4. **Ctrl-C** ends the scan loop early; the rover still shuts down cleanly.

mod config;

use std::process::ExitCode;
use std::time::Duration;

use colored::Colorize;
use rover_hal::sim::{SimActuator, SimChassis, SimDetector};
use rover_hal::{HardwareBuilder, RoverHardware, SharedRunSignal, TimedRunSignal, TracingSink};
use rover_runtime::AutonomousSequencer;
use rover_types::{MissionReport, RoverError};
use tracing::warn;

fn main() -> ExitCode {
    let _otel = rover_runtime::init_tracing("rover");

    print_banner();

    let cfg = load_config();

    let signal = SharedRunSignal::new();
    let ctrlc_signal = signal.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        println!();
        println!("{}", "⚠  Ctrl-C received – ending the scan loop …".yellow().bold());
        ctrlc_signal.request_stop();
    }) {
        warn!(error = %e, "Failed to install Ctrl-C handler; the run will only end when the period expires");
    }

    let hardware = match build_sim_hardware(&cfg, &signal) {
        Ok(hw) => hw,
        Err(e) => {
            println!("{}: {}", "Hardware error".red(), e);
            return ExitCode::FAILURE;
        }
    };

    println!(
        "  Gold mineral placed {} · autonomous window {} s\n",
        cfg.sim.gold_position.to_string().bold(),
        cfg.sim.autonomous_period_ms / 1000
    );

    let mut sequencer = AutonomousSequencer::new(hardware, cfg.mission);
    signal.start();

    match sequencer.run() {
        Ok(report) => {
            print_report(&report);
            ExitCode::SUCCESS
        }
        Err(e) => {
            print_failure(&e);
            ExitCode::FAILURE
        }
    }
}

fn load_config() -> config::Config {
    match config::load() {
        Ok(Some(cfg)) => {
            println!(
                "  Config loaded from {}",
                config::config_path().display().to_string().bold()
            );
            cfg
        }
        Ok(None) => {
            let mut cfg = config::Config::default();
            match config::save(&cfg) {
                Ok(()) => println!(
                    "  {} Default config written to {}",
                    "✓".green().bold(),
                    config::config_path().display().to_string().bold()
                ),
                Err(e) => println!("{}: {}", "Error saving config".red(), e),
            }
            config::apply_env_overrides(&mut cfg);
            cfg
        }
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            println!("  Using default configuration.");
            let mut cfg = config::Config::default();
            config::apply_env_overrides(&mut cfg);
            cfg
        }
    }
}

fn build_sim_hardware(
    cfg: &config::Config,
    signal: &SharedRunSignal,
) -> Result<RoverHardware, RoverError> {
    let chassis = SimChassis::new(cfg.sim.degrees_per_step, cfg.sim.ticks_per_step);
    let detector = SimDetector::new(
        cfg.sim.gold_position,
        cfg.mission.vision.target_label.clone(),
        cfg.sim.detection_every,
    );
    let period = Duration::from_millis(cfg.sim.autonomous_period_ms);

    HardwareBuilder::new()
        .with_drive(Box::new(chassis.drive()))
        .with_imu(Box::new(chassis.imu()))
        .with_lift(Box::new(SimActuator::new("lift")))
        .with_hook(Box::new(SimActuator::new("hook")))
        .with_detector(Box::new(detector))
        .with_run_signal(Box::new(TimedRunSignal::new(signal.clone(), period)))
        .with_telemetry(Box::new(TracingSink))
        .build()
}

fn print_report(report: &MissionReport) {
    println!();
    println!("{}", "  Mission complete".green().bold());
    println!("    run id       {}", report.run_id.to_string().dimmed());
    println!("    mineral      {}", report.mineral.to_string().bold());
    println!("    scan cycles  {}", report.scan_cycles);
    println!("    final phase  {}", report.final_phase);
    println!();
}

fn print_failure(err: &RoverError) {
    println!();
    println!("{}", "  Mission aborted".red().bold());
    println!("    {}", err);
    println!("    The drive was stopped and the detector released.");
    println!();
}

fn print_banner() {
    println!();
    println!("{}", r#"   ____                       "#.bold().cyan());
    println!("{}", r#"  / __ \____ _   _____  _____"#.bold().cyan());
    println!("{}", r#" / /_/ / __ \ | / / _ \/ ___/"#.bold().cyan());
    println!("{}", r#"/ _, _/ /_/ / |/ /  __/ /    "#.bold().cyan());
    println!("{}", r#"/_/ |_|\____/|___/\___/_/     "#.bold().cyan());
    println!();
    println!("  {}", "Autonomous mineral sampling · simulated rover".dimmed());
    println!();
}
