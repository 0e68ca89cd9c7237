//! Kshetra - explore a bounded region with a simulated robot
//!
//! # Usage
//!
//! ```bash
//! # Demo room with default settings (or ./kshetra.toml if present)
//! cargo run --release
//!
//! # With custom config file
//! cargo run --release -- --config kshetra.toml
//!
//! # Write the effective configuration and exit
//! cargo run --release -- --write-config kshetra.toml
//! ```

use clap::Parser;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use kshetra::{
    ExplorationContext, KshetraConfig, Result, SimulatedRobot, TaskExecutor, TaskOutcome,
};

const DEFAULT_CONFIG: &str = "kshetra.toml";

#[derive(Parser, Debug)]
#[command(name = "kshetra", version, about = "Bounded-region frontier exploration")]
struct Args {
    /// Configuration file (default: kshetra.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level override (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Finish after reaching this many frontiers
    #[arg(long)]
    max_frontiers: Option<u32>,

    /// Write the effective configuration to this file and exit
    #[arg(long)]
    write_config: Option<PathBuf>,
}

fn load_config(args: &Args) -> Result<KshetraConfig> {
    let mut config = match &args.config {
        Some(path) => KshetraConfig::load(path)?,
        None if Path::new(DEFAULT_CONFIG).exists() => {
            KshetraConfig::load(Path::new(DEFAULT_CONFIG))?
        }
        None => KshetraConfig::default(),
    };

    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }
    if let Some(max) = args.max_frontiers {
        config.controller.max_frontiers = Some(max);
    }
    config.validate()?;
    Ok(config)
}

fn init_logging(level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {} - {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}

fn run(config: KshetraConfig) -> Result<TaskOutcome> {
    let controller_config = config.controller.to_controller_config();
    let robot = Arc::new(SimulatedRobot::new(
        config.simulation.to_sim_config(&controller_config.robot_frame),
    ));
    let executor = Arc::new(TaskExecutor::new(
        ExplorationContext::from_backend(Arc::clone(&robot)),
        controller_config,
    ));

    let shutdown = Arc::clone(&executor);
    if let Err(e) = ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        shutdown.shutdown();
    }) {
        log::warn!("Could not install Ctrl-C handler: {}", e);
    }

    let handle = executor.submit(config.task.into_task()?)?;
    let Some(report) = executor.join(handle) else {
        return Ok(TaskOutcome::Aborted(kshetra::AbortReason::Cancelled));
    };

    let (position, heading) = robot.pose();
    let stats = robot.stats();
    log::info!(
        "Robot at ({:.2}, {:.2}), heading {:.1}°",
        position.x,
        position.y,
        heading.to_degrees()
    );
    log::info!(
        "  Goals: {} submitted, {} succeeded, {} cancelled",
        stats.goals_submitted,
        stats.goals_succeeded,
        stats.goals_cancelled
    );
    log::info!(
        "  Frontiers: {} reached, {} left unexplored",
        report.frontiers_reached,
        robot.unexplored().len()
    );

    Ok(report.outcome)
}

fn main() -> ExitCode {
    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            init_logging("info");
            log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    init_logging(&config.logging.level);

    if let Some(path) = &args.write_config {
        return match config.to_file(path) {
            Ok(()) => {
                log::info!("Wrote configuration to {}", path.display());
                ExitCode::SUCCESS
            }
            Err(e) => {
                log::error!("{}", e);
                ExitCode::FAILURE
            }
        };
    }

    log::info!("kshetra v{}", env!("CARGO_PKG_VERSION"));
    match run(config) {
        Ok(TaskOutcome::Succeeded) => ExitCode::SUCCESS,
        Ok(outcome) => {
            log::error!("Exploration {}", outcome);
            ExitCode::FAILURE
        }
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
