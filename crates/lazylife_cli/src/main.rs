//! Operator CLI for the runtime store.
//!
//! # Responsibility
//! - Open a store file (or an in-memory store) and print its state as JSON.
//! - Provide a `demo` run that exercises the telemetry path end to end.

use clap::{Parser, Subcommand};
use lazylife_core::{
    default_log_level, init_logging, EventInput, NotificationDraft, Priority, RuntimeStore,
    StoreError,
};
use log::error;
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "lazylife", version, about = "Inspect the LazyLife runtime store")]
struct Cli {
    /// SQLite store file. Omit to use an in-memory store.
    #[arg(long)]
    db: Option<PathBuf>,
    /// Absolute directory for rolling log files. Logging is off when omitted.
    #[arg(long)]
    log_dir: Option<String>,
    #[arg(long, default_value_t = default_log_level().to_string())]
    log_level: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the current snapshot.
    Snapshot,
    /// Record a short agent run, then print the snapshot.
    Demo,
    /// Print stored deadlines.
    Deadlines,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        if let Err(err) = init_logging(&cli.log_level, log_dir) {
            eprintln!("lazylife: {err}");
            return ExitCode::FAILURE;
        }
    }

    match run(&cli) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("event=cli_run module=cli status=error error_code={}", err.code());
            eprintln!("lazylife: {err}");
            ExitCode::FAILURE
        }
    }
}

#[derive(Debug)]
enum CliError {
    Store(StoreError),
    Render(serde_json::Error),
}

impl CliError {
    fn code(&self) -> &'static str {
        match self {
            Self::Store(err) => err.code(),
            Self::Render(_) => "render_failure",
        }
    }
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::Render(err) => write!(f, "failed to render output as JSON: {err}"),
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Render(err) => Some(err),
        }
    }
}

impl From<StoreError> for CliError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Render(value)
    }
}

fn run(cli: &Cli) -> Result<String, CliError> {
    let store = RuntimeStore::new(cli.db.as_deref())?;
    match cli.command {
        Command::Snapshot => to_json(&store.get_snapshot()?),
        Command::Demo => {
            record_demo_run(&store)?;
            to_json(&store.get_snapshot()?)
        }
        Command::Deadlines => to_json(&store.get_deadlines()?),
    }
}

fn record_demo_run(store: &RuntimeStore) -> Result<(), StoreError> {
    store.mark_agent_running("orchestrator")?;
    store.mark_agent_running("food-tracking")?;

    let mut payload = Map::new();
    payload.insert("meal".to_string(), Value::from("lunch"));
    store.record_event(
        EventInput::new("demo-food-nudge", "food-tracking", "food.nudge").with_payload(payload),
    )?;
    store.record_event(
        EventInput::new("demo-orchestrator", "orchestrator", "orchestrator.plan-ready")
            .with_priority(Priority::Low),
    )?;
    store.push_notification(&NotificationDraft::new(
        "Lunch reminder",
        "You skipped breakfast; plan a proper lunch.",
        Priority::Medium,
        "food-tracking",
    ))?;
    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, CliError> {
    Ok(serde_json::to_string_pretty(value)?)
}
