//! cbc-init - Load CBC results into the observation store
//!
//! Resolves configuration, opens (or creates) the database, loads every
//! dataset not yet loaded and optionally prints a destination report as JSON
//! for the form automation to consume.

use std::path::PathBuf;

use anyhow::{Context, Result};
use cbc_common::config::Config;
use cbc_common::db::{init_database, Dataset};
use cbc_common::query::Observations;
use cbc_common::reference::ReferenceLists;
use cbc_common::report::ReportBuilder;
use cbc_common::source::CsvSources;
use cbc_common::tracker::{DatasetOutcome, LoadOutcome, LoadReport, LoadTracker};
use clap::{Parser, ValueEnum};
use tracing::info;

/// Command-line arguments for cbc-init
#[derive(Parser, Debug)]
#[command(name = "cbc-init")]
#[command(about = "Load CBC results and species lists into the observation store")]
#[command(version)]
struct Args {
    /// Reload every dataset even if already loaded
    #[arg(short, long)]
    force: bool,

    /// Reload only these datasets (repeatable)
    #[arg(long, value_enum)]
    reload: Vec<DatasetArg>,

    /// Configuration file
    #[arg(short, long, env = "CBC_CONFIG")]
    config: Option<PathBuf>,

    /// Folder holding the database and source files
    #[arg(short, long)]
    data_folder: Option<PathBuf>,

    /// Print the assembled report for a destination
    #[arg(short, long, value_enum, default_value_t = ReportKind::None)]
    report: ReportKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DatasetArg {
    Observations,
    ExpectedSpecies,
    RealSpecies,
}

impl From<DatasetArg> for Dataset {
    fn from(arg: DatasetArg) -> Self {
        match arg {
            DatasetArg::Observations => Dataset::Observations,
            DatasetArg::ExpectedSpecies => Dataset::ExpectedSpecies,
            DatasetArg::RealSpecies => Dataset::RealSpecies,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReportKind {
    None,
    Audubon,
    Mou,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load(args.config.as_deref(), args.data_folder.as_deref())
        .context("Failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.as_str().into()),
        )
        .init();

    info!("Starting cbc-init v{}", env!("CARGO_PKG_VERSION"));
    info!("Data folder: {}", config.data_folder.display());

    let db_path = config.database_path();
    let pool = init_database(&db_path)
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;

    let sources = CsvSources::from_config(&config);
    let tracker = LoadTracker::new(pool.clone());
    let load_report = if args.reload.is_empty() {
        tracker
            .load_all(args.force, &sources)
            .await
            .context("Failed to load datasets")?
    } else {
        let mut report = LoadReport::default();
        for dataset in Dataset::ALL {
            let force = args.force || args.reload.iter().any(|d| Dataset::from(*d) == dataset);
            let outcome = tracker
                .load_dataset(dataset, force, &sources)
                .await
                .with_context(|| format!("Failed to load dataset '{}'", dataset))?;
            report.datasets.push(DatasetOutcome { dataset, outcome });
        }
        report
    };

    for entry in &load_report.datasets {
        match entry.outcome {
            LoadOutcome::Skipped => info!("  {}: already loaded", entry.dataset),
            LoadOutcome::Loaded { rows } => info!("  {}: {} rows loaded", entry.dataset, rows),
        }
    }
    info!("✓ {} rows inserted", load_report.rows_inserted());

    if args.report == ReportKind::None {
        return Ok(());
    }

    let observations = Observations::new(pool.clone());
    let references = ReferenceLists::new(pool)
        .snapshot()
        .await
        .context("Failed to read species lists")?;
    let builder = ReportBuilder::new(&observations, &references, &config);

    let json = match args.report {
        ReportKind::Audubon => serde_json::to_string_pretty(&builder.audubon().await?)?,
        ReportKind::Mou => serde_json::to_string_pretty(&builder.mou().await?)?,
        ReportKind::None => return Ok(()),
    };
    println!("{}", json);

    Ok(())
}
