use crate::config::Config;
use crate::dashboard::{Dashboard, NullDashboard, TerminalDashboard};
use crate::error::ConfigError;
use crate::event_log::EventLog;
use crate::tower::TrafficController;
use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

mod aircraft;
mod airport;
mod config;
mod dashboard;
mod error;
mod event_log;
mod holding;
mod logging;
mod runway;
mod summary;
mod time;
mod tower;

#[derive(Parser)]
#[command(version, about = "Airport traffic control simulation")]
struct Args {
    /// Skip the setup menu and use the default airport
    #[arg(long)]
    default: bool,

    /// Path to a JSON airport setup
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Number of runways
    #[arg(short, long)]
    runways: Option<usize>,

    /// Holding area capacity
    #[arg(long)]
    capacity: Option<usize>,

    /// Log lines shown on the dashboard
    #[arg(long)]
    logs: Option<usize>,

    /// Aircraft to spawn
    #[arg(short, long)]
    aircraft: Option<u32>,

    /// Controller tick in milliseconds
    #[arg(long, value_name = "MS")]
    tick_ms: Option<u64>,

    /// Where the sorted event log is written at the end of the run
    #[arg(long, value_name = "FILE", default_value = "log.txt")]
    log_file: PathBuf,

    /// Send diagnostics to a file instead of stderr
    #[arg(long, value_name = "FILE")]
    trace_file: Option<PathBuf>,

    /// More diagnostics (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// No dashboard, print only the final statistics
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    fn has_overrides(&self) -> bool {
        self.runways.is_some()
            || self.capacity.is_some()
            || self.logs.is_some()
            || self.aircraft.is_some()
            || self.tick_ms.is_some()
    }
}

fn resolve_config(args: &Args) -> Result<Config, ConfigError> {
    let mut config = match &args.config {
        Some(path) => Config::load_from_file(path)?,
        None if args.default || args.has_overrides() || !std::io::stdin().is_terminal() => {
            Config::default()
        }
        None => config::prompt_setup()?,
    };

    if let Some(runways) = args.runways {
        config.runways = runways;
    }
    if let Some(capacity) = args.capacity {
        config.capacity = capacity;
    }
    if let Some(logs) = args.logs {
        config.log_depth = logs;
    }
    if let Some(aircraft) = args.aircraft {
        config.aircraft = aircraft;
    }
    if let Some(tick_ms) = args.tick_ms {
        config.timings.tick_ms = tick_ms;
    }
    config.validate()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    logging::init(args.verbose, args.trace_file.as_deref())?;

    let config = resolve_config(&args)?;
    info!(?config, "configuration resolved");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let events = Arc::new(EventLog::new());
    let dashboard: Box<dyn Dashboard> = if args.quiet {
        Box::new(NullDashboard)
    } else {
        Box::new(TerminalDashboard::stdout())
    };
    let mut controller = TrafficController::new(config, events.clone(), dashboard);

    let summary = runtime.block_on(async {
        let abort = CancellationToken::new();
        let trigger = abort.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                trigger.cancel();
            }
        });
        controller.run(abort).await
    });

    if args.quiet {
        println!("{}", summary);
    }
    events.save(&args.log_file, &summary);
    Ok(())
}
