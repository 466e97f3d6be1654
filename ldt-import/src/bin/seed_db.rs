//! ldt-seed - load demonstration data into a tracker database

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use ldt_common::config::{log_directive, TomlConfig};
use ldt_common::db::init::init_database;
use ldt_import::seed::seed_demo;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "ldt-seed")]
#[command(about = "Insert demonstration commitments, thematics and deliberation threads")]
#[command(version)]
struct Args {
    /// SQLite database file
    #[arg(long, env = "LDT_DATABASE")]
    database: Option<PathBuf>,

    /// Configuration file
    #[arg(long, env = "LDT_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = TomlConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_directive(&config).into()),
        )
        .init();

    let db_path = config.database_path(args.database.as_deref());
    info!("Database path: {}", db_path.display());

    let pool = init_database(&db_path)
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;

    match seed_demo(&pool).await.context("Seeding failed")? {
        Some(summary) => println!(
            "Seed complete: {} commitment(s), {} milestone(s), {} thematic(s).",
            summary.commitments, summary.milestones, summary.thematics
        ),
        None => println!("Database already contains commitments; nothing seeded."),
    }

    pool.close().await;
    Ok(())
}
