use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use fleet_route::MemoryStore;
use gps_upload::{Config, ShiftRecord, process_upload, record, state};
use route_boundary::{Cadence, Detector, GpsPing, RouteBoundary};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry, fmt};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Assume the provider reports every MINS minutes.
    #[arg(long, global = true, value_name = "MINS")]
    fixed_cadence: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect route boundaries in a GPS export and print them as JSON.
    Detect {
        #[arg(long)]
        pings: PathBuf,
    },

    /// Register a shift in a store snapshot.
    Shift {
        #[arg(long)]
        store: PathBuf,
        #[arg(long)]
        id: String,
        #[arg(long)]
        plate: String,
        #[arg(long)]
        date: NaiveDate,
        /// Last day of an overnight shift.
        #[arg(long)]
        end_date: Option<NaiveDate>,
    },

    /// Process a GPS export for a shift and save the result to the snapshot.
    Process {
        #[arg(long)]
        store: PathBuf,
        #[arg(long)]
        shift: String,
        #[arg(long)]
        pings: PathBuf,
    },
}

#[derive(Serialize)]
struct DetectReport<'a> {
    boundary: &'a RouteBoundary,
    start: Option<&'a GpsPing>,
    end: Option<&'a GpsPing>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    Registry::default().with(filter).with(fmt::layer().with_writer(std::io::stderr)).init();

    let cli = Cli::parse();
    let mut config = Config::from_env();
    if let Some(minutes) = cli.fixed_cadence {
        config.detector.cadence = Cadence::Fixed(Duration::from_secs(minutes.saturating_mul(60)));
    }

    match cli.command {
        Commands::Detect { pings } => detect(&pings, &config).await,
        Commands::Shift { store, id, plate, date, end_date } => {
            let shift = ShiftRecord { end_date, ..ShiftRecord::new(id, plate, date) };
            register(&store, &shift, &config).await
        }
        Commands::Process { store, shift, pings } => process(&store, &shift, &pings, &config).await,
    }
}

async fn detect(path: &Path, config: &Config) -> Result<()> {
    let bytes = tokio::fs::read(path).await.with_context(|| format!("reading {}", path.display()))?;
    let pings = record::decode(&bytes)?;
    let boundary = Detector::new(config.detector.clone()).detect(&pings)?;

    let report = DetectReport {
        boundary: &boundary,
        start: boundary.start_ping(&pings),
        end: boundary.end_ping(&pings),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn register(path: &Path, shift: &ShiftRecord, config: &Config) -> Result<()> {
    let store = MemoryStore::load(path).await?;
    if state::get_shift(&shift.id, config, &store).await?.is_some() {
        warn!(shift_id = %shift.id, "replacing existing shift");
    }
    state::set_shift(shift, config, &store).await?;
    store.save(path).await?;

    info!(shift_id = %shift.id, "registered shift");
    Ok(())
}

async fn process(path: &Path, shift_id: &str, pings: &Path, config: &Config) -> Result<()> {
    let store = MemoryStore::load(path).await?;
    let csv = tokio::fs::read(pings).await.with_context(|| format!("reading {}", pings.display()))?;

    let outcome = process_upload(shift_id, &csv, config, &store).await?;
    store.save(path).await?;

    println!("{}", outcome.message());
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
