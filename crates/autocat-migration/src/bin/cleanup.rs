//! autocat-cleanup — reclaim legacy local images after a completed
//! migration.
//!
//! Refuses to run while any record still references the legacy tree; run
//! `autocat-migrate` to completion first.

use anyhow::Context;
use autocat_core::Config;
use autocat_db::{AssetRecordSource, ImageSettingRepository, NewsRepository, VehicleRepository};
use autocat_migration::{init_tracing, remaining_legacy_references, CleanupRunner};
use clap::Parser;

#[derive(Parser)]
#[command(
    name = "autocat-cleanup",
    about = "Delete legacy local images once every record points at the remote store"
)]
struct Cli {
    /// Count what would be deleted without touching anything
    #[arg(long)]
    dry_run: bool,

    /// Print the report as JSON instead of a summary line
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;

    let pool = autocat_db::connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    let sources: Vec<Box<dyn AssetRecordSource>> = vec![
        Box::new(ImageSettingRepository::new(pool.clone())),
        Box::new(VehicleRepository::new(pool.clone())),
        Box::new(NewsRepository::new(pool.clone())),
    ];

    let remaining = remaining_legacy_references(&sources)
        .await
        .context("Failed to check record references")?;
    if remaining > 0 {
        eprintln!(
            "{} records still reference legacy local assets; run autocat-migrate first",
            remaining
        );
        std::process::exit(1);
    }

    let runner = CleanupRunner::new(&config.content_root);
    let report = runner
        .run(cli.dry_run)
        .await
        .context("Cleanup sweep failed")?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report);
    }

    if report.failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}
