//! ldt-import - validate and import draft laws from a spreadsheet
//!
//! The report goes to stdout; diagnostics go to stderr through tracing. The
//! database is only opened when there is something to write.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use ldt_common::config::{log_directive, TomlConfig};
use ldt_common::db::init::init_database;
use ldt_import::{ColumnMap, ImportOptions, Importer};
use sqlx::SqlitePool;
use tokio::sync::OnceCell;
use tracing::info;

/// Command-line arguments for ldt-import
#[derive(Parser, Debug)]
#[command(name = "ldt-import")]
#[command(about = "Import draft laws from a spreadsheet or CSV file")]
#[command(version)]
struct Args {
    /// Spreadsheet (.xlsx, .xlsm, .xls, .ods) or .csv file
    path: PathBuf,

    /// Worksheet name (defaults to the first sheet)
    #[arg(long)]
    sheet: Option<String>,

    /// Validate and report rows without writing to the database
    #[arg(long)]
    dry_run: bool,

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
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_directive(&config).into()),
        )
        .init();

    info!("Starting ldt-import v{}", env!("CARGO_PKG_VERSION"));

    let columns = ColumnMap::with_overrides(&config.import.columns)
        .map_err(anyhow::Error::msg)
        .context("Invalid [import.columns] configuration")?;
    let db_path = config.database_path(args.database.as_deref());
    let options = ImportOptions {
        sheet: args.sheet.or(config.import.sheet),
        dry_run: args.dry_run,
    };
    let store: OnceCell<SqlitePool> = OnceCell::new();
    let (store_ref, db_path) = (&store, db_path.as_path());

    let importer = Importer::new(columns);
    let stdout = std::io::stdout();
    let report = importer
        .run_with_store(&args.path, &options, &mut stdout.lock(), move || async move {
            info!("Database path: {}", db_path.display());
            store_ref
                .get_or_try_init(|| init_database(db_path))
                .await
                .cloned()
        })
        .await;

    if let Some(pool) = store.get() {
        pool.close().await;
    }
    report?;
    Ok(())
}
