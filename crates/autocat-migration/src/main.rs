//! autocat-migrate — one-shot migration of legacy local assets to the
//! remote store.
//!
//! Reads configuration from the environment (see `autocat_core::Config`),
//! walks every asset-bearing table, and prints a per-table report. Safe to
//! re-run: already-remote references are skipped.

use anyhow::Context;
use autocat_core::Config;
use autocat_db::{AssetRecordSource, ImageSettingRepository, NewsRepository, VehicleRepository};
use autocat_migration::{init_tracing, MigrationRunner};
use autocat_processing::CompressionPolicy;
use autocat_storage::{LocalStore, RemoteStore};
use clap::Parser;
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "autocat-migrate",
    about = "Move legacy local images to the remote asset store"
)]
struct Cli {
    /// Classify and check records without transferring anything
    #[arg(long)]
    dry_run: bool,

    /// Restrict the run to one table: image_settings, vehicles, news_articles
    #[arg(long)]
    table: Option<String>,

    /// Print the full per-item report as JSON instead of a summary line
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

    let remote = Arc::new(
        RemoteStore::new(config.remote_store.clone()).context("Failed to build remote store")?,
    );
    let local = LocalStore::new(&config.content_root);
    let policy = CompressionPolicy::for_target(config.remote_store.upload_ceiling_bytes);
    let runner = MigrationRunner::new(remote, local, policy);

    let sources: Vec<Box<dyn AssetRecordSource>> = vec![
        Box::new(ImageSettingRepository::new(pool.clone())),
        Box::new(VehicleRepository::new(pool.clone())),
        Box::new(NewsRepository::new(pool.clone())),
    ];

    let mut exit_code = 0;
    for source in &sources {
        if let Some(ref table) = cli.table {
            if source.name() != table {
                continue;
            }
        }

        let report = runner
            .run(source.as_ref(), cli.dry_run)
            .await
            .with_context(|| format!("Migration of {} failed", source.name()))?;

        if cli.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            println!("{}", report);
        }

        if report.failed > 0 || report.missing > 0 {
            exit_code = 1;
        }
    }

    std::process::exit(exit_code);
}
