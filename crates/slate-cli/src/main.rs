#![forbid(unsafe_code)]

//! slate: a file-backed tracker for hierarchical, time-scheduled work items.
//!
//! Each invocation loads the store from its flat file, performs exactly one
//! store operation, saves on mutation, and renders the outcome. Access
//! history is kept in a sidecar file next to the store so that `show`
//! accesses survive across invocations.

mod cmd;
mod config;
mod output;

use clap::{Parser, Subcommand};
use output::OutputMode;
use slate_core::model::RecordId;
use slate_core::{RecordStore, StoreError, persist};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "slate: file-backed work item tracker",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Path to the store file (overrides SLATE_FILE and slate.toml).
    #[arg(long, global = true)]
    file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Operate on standalone items.
    #[command(subcommand)]
    Item(cmd::item::ItemCommand),

    /// Operate on grouping items.
    #[command(subcommand)]
    Group(cmd::group::GroupCommand),

    /// Operate on child items.
    #[command(subcommand)]
    Child(cmd::child::ChildCommand),

    /// Show the recency-ordered access history.
    History,

    /// List scheduled records ordered by start time.
    Prioritized,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Human
    };

    if let Err(err) = run(&cli, mode) {
        match err.downcast_ref::<StoreError>() {
            Some(store_err) => output::render_error(
                mode,
                store_err.code(),
                &store_err.to_string(),
                store_err.hint(),
            ),
            None => output::render_error(mode, "E9001", &format!("{err:#}"), None),
        }
        std::process::exit(1);
    }
}

fn run(cli: &Cli, mode: OutputMode) -> anyhow::Result<()> {
    let path = config::resolve_store_path(cli.file.as_deref())?;
    tracing::debug!(path = %path.display(), "store path resolved");
    let mut store = persist::load(&path).map_err(StoreError::from)?;
    replay_history(&mut store, &read_history_sidecar(&path));

    let mutated = match &cli.command {
        Commands::Item(command) => cmd::item::run(&mut store, command, mode)?,
        Commands::Group(command) => cmd::group::run(&mut store, command, mode)?,
        Commands::Child(command) => cmd::child::run(&mut store, command, mode)?,
        Commands::History => {
            cmd::views::history(&store, mode)?;
            false
        }
        Commands::Prioritized => {
            cmd::views::prioritized(&store, mode)?;
            false
        }
    };

    if mutated {
        persist::save(&store, &path).map_err(StoreError::from)?;
    }
    write_history_sidecar(&store, &path)?;
    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn history_path(store_path: &Path) -> PathBuf {
    store_path.with_extension("history")
}

fn read_history_sidecar(store_path: &Path) -> Vec<u64> {
    std::fs::read_to_string(history_path(store_path))
        .map(|text| text.lines().filter_map(|line| line.trim().parse().ok()).collect())
        .unwrap_or_default()
}

/// Re-record past accesses in their stored order. Ids that no longer
/// resolve are dropped silently.
fn replay_history(store: &mut RecordStore, ids: &[u64]) {
    for &raw in ids {
        let id = RecordId(raw);
        if store.standalone(id).is_ok() || store.group(id).is_ok() {
            continue;
        }
        let _ = store.child(id);
    }
}

fn write_history_sidecar(store: &RecordStore, store_path: &Path) -> anyhow::Result<()> {
    let mut out = String::new();
    for record in store.history() {
        out.push_str(&record.id().to_string());
        out.push('\n');
    }
    std::fs::write(history_path(store_path), out)
        .map_err(|err| StoreError::Persistence(err.to_string()))?;
    Ok(())
}
