use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use gridbot::config::Config;
use gridbot::workflow::{self, Report};
use gridbot::grid_file;
use machine::interpreter::hardware::SimulatedHardware;
use machine::interpreter::progress::TracingProgress;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "gridbot")]
#[command(about = "Compiles a spreadsheet grid into a robot program and runs it")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log level, or any `tracing` env filter
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Command {
    /// Parse, check and execute a grid
    Run {
        grid: PathBuf,

        #[arg(short, long)]
        config: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = HardwareKind::Sim)]
        hardware: HardwareKind,

        /// Overrides `engine.step_limit`
        #[arg(long)]
        step_limit: Option<u64>,
    },
    /// Parse and check a grid without running it
    Check {
        grid: PathBuf,

        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum HardwareKind {
    /// In-memory simulation
    Sim,
    /// The car's HTTP API
    Car,
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path).with_context(|| format!("loading config {}", path.display())),
        None => Ok(Config::default()),
    }
}

fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("received Ctrl+C, stopping after the current command");
            token.cancel();
        }
    });
    cancel
}

async fn run(grid: &Path, config: Config, hardware: HardwareKind) -> Result<Report> {
    let grid = grid_file::load(grid)?;
    let cancel = cancel_on_ctrl_c();
    let mut progress = TracingProgress;

    let report = match hardware {
        HardwareKind::Sim => {
            let mut hardware = SimulatedHardware::new();
            workflow::execute_grid(&grid, &config, &mut hardware, &mut progress, cancel).await?
        },
        #[cfg(feature = "live")]
        HardwareKind::Car => {
            let mut hardware = machine::interpreter::hardware::CarHardware::new(config.car_settings())?;
            workflow::execute_grid(&grid, &config, &mut hardware, &mut progress, cancel).await?
        },
        #[cfg(not(feature = "live"))]
        HardwareKind::Car => anyhow::bail!("built without the `live` feature, car hardware is unavailable"),
    };

    Ok(report)
}

fn check(grid: &Path, config: &Config) -> Result<()> {
    let grid = grid_file::load(grid)?;
    let (program, verification) = workflow::check(&grid, config)?;

    println!("{:#?}", program);
    for warning in &verification.warnings {
        println!("warning: {}", warning);
    }
    println!("{}", serde_json::to_string_pretty(&verification.summary)?);

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(&cli.log_level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Run { grid, config, hardware, step_limit } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(step_limit) = step_limit {
                config.engine.step_limit = step_limit;
                config.validate()?;
            }
            info!(grid = %grid.display(), ?hardware, "running grid");

            let report = run(&grid, config, hardware).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            std::process::exit(report.exit_code());
        },
        Command::Check { grid, config } => {
            let config = load_config(config.as_deref())?;
            check(&grid, &config)
        },
    }
}
