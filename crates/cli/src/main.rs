//! DispatchQ CLI - operator commands for the stand-queue engine
//!
//! This binary is the composition root: it wires the SQLite entry store,
//! the log notifier, and the location registry into a `QueueService` and
//! invokes the engine directly ("direct call" reconcile wiring).

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::sync::Arc;
use tabled::{Table, Tabled};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use dispatchq_core::application::{QueueService, RegisterRequest, RetryPolicy};
use dispatchq_core::domain::{EntryStatus, Location, LocationRegistry};
use dispatchq_core::port::notifier::LogNotifier;
use dispatchq_core::port::time_provider::SystemTimeProvider;
use dispatchq_infra_sqlite::{create_pool, run_migrations, SqliteEntryStore};

const DEFAULT_DB_PATH: &str = "~/.dispatchq/queue.db";
const DEFAULT_LOCATIONS: &str = "mall_nusantara=3,stasiun_jatinegara=6";

#[derive(Parser)]
#[command(name = "dispatchq")]
#[command(about = "DispatchQ stand-queue engine CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// SQLite database path
    #[arg(long, env = "DISPATCHQ_DB_PATH", default_value = DEFAULT_DB_PATH)]
    db_path: String,

    /// Configured locations as id=capacity pairs, comma separated
    #[arg(long, env = "DISPATCHQ_LOCATIONS", default_value = DEFAULT_LOCATIONS)]
    locations: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Register an arrival at a location
    Register {
        /// Location id (e.g. mall_nusantara)
        location: String,

        /// Vehicle plate (e.g. B1234XYZ)
        entry: String,

        /// Contact handle to notify
        #[arg(short, long)]
        registrant: String,

        /// Unit tag, display only (e.g. KM1234)
        #[arg(short, long)]
        tag: Option<String>,
    },

    /// Mark an entry departed and promote from the buffer
    Depart {
        location: String,
        entry: String,
    },

    /// Recompute vacancies and promote buffered entries
    Reconcile {
        location: String,
    },

    /// Show the queue for a location
    List {
        location: String,
    },
}

#[derive(Tabled)]
struct ReportRow {
    #[tabled(rename = "#")]
    position: usize,
    #[tabled(rename = "Plate")]
    entry_id: String,
    #[tabled(rename = "Unit")]
    tag: String,
    #[tabled(rename = "Status")]
    status: String,
}

fn init_logging() {
    let log_format = std::env::var("DISPATCHQ_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .expect("Failed to create env filter");

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }
}

/// Parse "id=capacity,id=capacity" into a registry
fn parse_locations(spec: &str) -> Result<LocationRegistry> {
    let mut locations = Vec::new();
    for pair in spec.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let Some((id, capacity)) = pair.split_once('=') else {
            bail!("invalid location spec '{pair}', expected id=capacity");
        };
        let capacity: u32 = capacity
            .trim()
            .parse()
            .with_context(|| format!("invalid capacity in '{pair}'"))?;
        locations.push(Location::new(id.trim(), capacity)?);
    }
    if locations.is_empty() {
        bail!("no locations configured");
    }
    Ok(LocationRegistry::new(locations))
}

fn colorize_status(status: EntryStatus) -> String {
    match status {
        EntryStatus::Active => status.to_string().green().to_string(),
        EntryStatus::Buffered => status.to_string().yellow().to_string(),
        EntryStatus::Departed => status.to_string().dimmed().to_string(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();

    let registry = parse_locations(&cli.locations)?;
    let db_path = shellexpand::tilde(&cli.db_path).into_owned();

    if let Some(parent) = std::path::Path::new(&db_path).parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating database directory {}", parent.display()))?;
    }

    let pool = create_pool(&db_path)
        .await
        .map_err(|e| anyhow::anyhow!("DB pool creation failed: {}", e))?;
    run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;

    let service = QueueService::new(
        Arc::new(SqliteEntryStore::new(pool)),
        Arc::new(LogNotifier),
        Arc::new(registry),
        Arc::new(SystemTimeProvider),
        RetryPolicy::default(),
    );

    match cli.command {
        Commands::Register {
            location,
            entry,
            registrant,
            tag,
        } => {
            let status = service
                .register(RegisterRequest {
                    location_id: location.clone(),
                    entry_id: entry.clone(),
                    registrant,
                    secondary_tag: tag,
                })
                .await?;

            println!(
                "Registered {} at {} with status {}",
                entry.to_uppercase().bold(),
                location,
                colorize_status(status)
            );
            if status == EntryStatus::Buffered {
                println!("{}", "Waiting for a slot; you will be notified.".yellow());
            }
        }

        Commands::Depart { location, entry } => {
            let (held, promoted) = service.depart_and_reconcile(&location, &entry).await?;
            info!(
                location = %location,
                entry = %entry,
                held = %held,
                promoted,
                "departure processed"
            );
            println!(
                "Departed {} (was {}), promoted {} from buffer",
                entry.to_uppercase().bold(),
                colorize_status(held),
                promoted
            );
        }

        Commands::Reconcile { location } => {
            let promoted = service.reconcile(&location).await?;
            println!("Promoted {promoted} buffered entries at {location}");
        }

        Commands::List { location } => {
            let report = service.list(&location).await?;
            if report.is_empty() {
                println!("No entries queued at {location}.");
                return Ok(());
            }

            let rows: Vec<ReportRow> = report
                .active
                .iter()
                .chain(report.buffered.iter())
                .map(|line| ReportRow {
                    position: line.position,
                    entry_id: line.entry_id.clone(),
                    tag: line.secondary_tag.clone().unwrap_or_default(),
                    status: colorize_status(line.status),
                })
                .collect();

            println!(
                "{} (capacity {}, {} active, {} buffered)",
                location.bold(),
                report.capacity,
                report.active.len(),
                report.buffered.len()
            );
            println!("{}", Table::new(rows));
        }
    }

    Ok(())
}
