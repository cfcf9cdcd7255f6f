//! `slots` CLI: run availability queries against a schedule snapshot.
//!
//! ## Usage
//!
//! ```sh
//! # Free hour-long slots for user 1 over the next week (snapshot on stdin)
//! slots free-slots --user 1 --duration 60 < snapshot.json
//!
//! # Conflicts for a proposed meeting
//! slots --snapshot snapshot.json conflicts --user 1 \
//!     --start 2025-01-06T09:30 --end 2025-01-06T10:30
//!
//! # Group searches with a fixed "now" and custom heuristics
//! slots --snapshot snapshot.json --config planner.toml --now 2025-01-06T08:00 \
//!     group-analysis --group 1 --duration 60
//! slots --snapshot snapshot.json common-slots --group 1 --duration 30
//!
//! # Suggested start times for a new task
//! slots --snapshot snapshot.json suggest --user 1 --duration 45 --priority high
//! ```
//!
//! Results are printed to stdout as pretty JSON; logs go to stderr.

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDateTime};
use clap::{Parser, Subcommand};
use serde::Serialize;
use slot_engine::{
    parse_timestamp, Clock, EntityId, FixedClock, GroupId, MemoryStore, Planner, PlannerConfig,
    Snapshot, SystemClock,
};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_LEVEL: &str = "info";
const FREE_SLOT_DEFAULT_DAYS: i64 = 7;
const CONFLICT_DEFAULT_MINUTES: i64 = 60;

#[derive(Parser)]
#[command(
    name = "slots",
    version,
    about = "Free-slot, conflict and group availability queries"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Snapshot JSON with users, groups, tasks and events (reads stdin if omitted)
    #[arg(short, long, global = true)]
    snapshot: Option<PathBuf>,

    /// TOML file overriding working hours and group heuristics
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Treat this local timestamp as the current time
    #[arg(long, global = true, value_parser = parse_timestamp)]
    now: Option<NaiveDateTime>,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Find free working-hours slots for a user
    FreeSlots {
        #[arg(short, long)]
        user: EntityId,
        /// Slot length in minutes
        #[arg(short, long)]
        duration: i64,
        /// Range start (defaults to now)
        #[arg(long, value_parser = parse_timestamp)]
        from: Option<NaiveDateTime>,
        /// Range end (defaults to seven days after the range start)
        #[arg(long, value_parser = parse_timestamp)]
        to: Option<NaiveDateTime>,
    },
    /// List a user's commitments overlapping a window
    Conflicts {
        #[arg(short, long)]
        user: EntityId,
        /// Window start (defaults to now)
        #[arg(long, value_parser = parse_timestamp)]
        start: Option<NaiveDateTime>,
        /// Window end (defaults to one hour after the start)
        #[arg(long, value_parser = parse_timestamp)]
        end: Option<NaiveDateTime>,
    },
    /// Check fixed candidate times where a quorum of the group is free
    GroupAnalysis {
        #[arg(short, long)]
        group: GroupId,
        #[arg(short, long)]
        duration: i64,
    },
    /// Intersect group members' own free slots
    CommonSlots {
        #[arg(short, long)]
        group: GroupId,
        #[arg(short, long)]
        duration: i64,
    },
    /// Suggest start times for a new task
    Suggest {
        #[arg(short, long)]
        user: EntityId,
        #[arg(short, long)]
        duration: i64,
        /// low, medium or high; anything else is treated as medium
        #[arg(short, long, default_value = "medium")]
        priority: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match cli.config.as_deref() {
        Some(path) => PlannerConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => PlannerConfig::default(),
    };
    init_logging(cli.debug, config.logging.level.as_deref());
    if let Some(path) = cli.config.as_deref() {
        tracing::info!(path = %path.display(), "Loaded planner config");
    }

    let snapshot_json = read_snapshot(cli.snapshot.as_deref())?;
    let snapshot = Snapshot::from_json(&snapshot_json).context("Failed to parse snapshot")?;
    let store = MemoryStore::from_snapshot(snapshot);

    let now = cli.now.unwrap_or_else(|| SystemClock.now());
    let planner = Planner::with_clock(&store, FixedClock(now)).with_config(config);

    match cli.command {
        Commands::FreeSlots {
            user,
            duration,
            from,
            to,
        } => {
            let from = from.unwrap_or(now);
            let to = to.unwrap_or(from + Duration::days(FREE_SLOT_DEFAULT_DAYS));
            let slots = planner
                .find_free_slots(user, duration, from, to)
                .context("Failed to find free slots")?;
            print_json(&slots)?;
        }
        Commands::Conflicts { user, start, end } => {
            let start = start.unwrap_or(now);
            let end = end.unwrap_or(start + Duration::minutes(CONFLICT_DEFAULT_MINUTES));
            let conflicts = planner
                .check_conflicts(user, start, end)
                .context("Failed to check conflicts")?;
            print_json(&conflicts)?;
        }
        Commands::GroupAnalysis { group, duration } => {
            let slots = planner
                .analyze_group_schedule(group, duration)
                .context("Failed to analyze group schedule")?;
            print_json(&slots)?;
        }
        Commands::CommonSlots { group, duration } => {
            let slots = planner
                .find_common_slots(group, duration)
                .context("Failed to find common slots")?;
            print_json(&slots)?;
        }
        Commands::Suggest {
            user,
            duration,
            priority,
        } => {
            let suggestions = planner
                .suggest_optimal_time(user, duration, &priority)
                .context("Failed to suggest times")?;
            print_json(&suggestions)?;
        }
    }

    Ok(())
}

/// Priority: RUST_LOG > --debug > config `[logging] level` > "info".
/// Logs go to stderr so stdout carries only the JSON result.
fn init_logging(debug_flag: bool, config_level: Option<&str>) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if debug_flag {
        EnvFilter::new("debug")
    } else if let Some(level) = config_level {
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL))
    } else {
        EnvFilter::new(DEFAULT_LOG_LEVEL)
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .compact()
        .init();

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "Logging initialised");
}

fn read_snapshot(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot: {}", path.display())),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read snapshot from stdin")?;
            Ok(buf)
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize result")?;
    println!("{json}");
    Ok(())
}
