//! Database initialization
//!
//! Opens (or creates) the SQLite file and brings the schema up to date:
//! - `CREATE TABLE IF NOT EXISTS` for every table
//! - versioned migrations tracked in `schema_version`
//!
//! Safe to call on every startup.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // Single writer, a handful of readers for the web server
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(5000));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .min_connections(1)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_schema(&pool).await?;
    crate::db::migrations::run_migrations(&pool).await?;

    Ok(pool)
}

/// Create every table (idempotent)
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_schema_version_table(pool).await?;

    // Commitments and their owned records
    create_institution_table(pool).await?;
    create_commitment_table(pool).await?;
    create_milestone_table(pool).await?;
    create_kpi_table(pool).await?;
    create_context_table(pool).await?;
    create_resources_table(pool).await?;
    create_attachment_table(pool).await?;
    create_agent_tables(pool).await?;

    // Thematic groupings and deliberation
    create_thematic_tables(pool).await?;
    create_polis_thread_table(pool).await?;

    // Legislation
    create_draft_law_table(pool).await?;
    create_draft_law_commitment_link_table(pool).await?;

    Ok(())
}

async fn execute(pool: &SqlitePool, sql: &str) -> Result<()> {
    sqlx::query(sql).execute(pool).await?;
    Ok(())
}

async fn create_schema_version_table(pool: &SqlitePool) -> Result<()> {
    execute(
        pool,
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .await
}

async fn create_institution_table(pool: &SqlitePool) -> Result<()> {
    execute(
        pool,
        r#"
        CREATE TABLE IF NOT EXISTS institution (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            kind TEXT NOT NULL,
            party TEXT
        )
        "#,
    )
    .await
}

async fn create_commitment_table(pool: &SqlitePool) -> Result<()> {
    execute(
        pool,
        r#"
        CREATE TABLE IF NOT EXISTS commitment (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            ministry TEXT NOT NULL,
            summary TEXT,
            body TEXT,
            start_date TEXT,
            end_date TEXT,
            budget INTEGER,
            institution_id INTEGER REFERENCES institution(id) ON DELETE SET NULL
        )
        "#,
    )
    .await
}

async fn create_milestone_table(pool: &SqlitePool) -> Result<()> {
    execute(
        pool,
        r#"
        CREATE TABLE IF NOT EXISTS milestone (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            commitment_id INTEGER NOT NULL REFERENCES commitment(id) ON DELETE CASCADE,
            title TEXT NOT NULL,
            summary TEXT NOT NULL DEFAULT '',
            body TEXT NOT NULL DEFAULT '',
            due_date TEXT,
            completion_date TEXT,
            budget INTEGER NOT NULL DEFAULT 0,
            notes TEXT NOT NULL DEFAULT ''
        )
        "#,
    )
    .await
}

async fn create_kpi_table(pool: &SqlitePool) -> Result<()> {
    execute(
        pool,
        r#"
        CREATE TABLE IF NOT EXISTS kpi (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            commitment_id INTEGER NOT NULL REFERENCES commitment(id) ON DELETE CASCADE,
            kpi_type TEXT NOT NULL,
            value REAL NOT NULL,
            unit TEXT NOT NULL
        )
        "#,
    )
    .await
}

async fn create_context_table(pool: &SqlitePool) -> Result<()> {
    execute(
        pool,
        r#"
        CREATE TABLE IF NOT EXISTS context (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            commitment_id INTEGER NOT NULL REFERENCES commitment(id) ON DELETE CASCADE,
            title TEXT NOT NULL,
            subtitle TEXT,
            body TEXT
        )
        "#,
    )
    .await
}

async fn create_resources_table(pool: &SqlitePool) -> Result<()> {
    execute(
        pool,
        r#"
        CREATE TABLE IF NOT EXISTS resources (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            context_id INTEGER NOT NULL REFERENCES context(id) ON DELETE CASCADE,
            title TEXT NOT NULL,
            url TEXT NOT NULL
        )
        "#,
    )
    .await
}

async fn create_attachment_table(pool: &SqlitePool) -> Result<()> {
    execute(
        pool,
        r#"
        CREATE TABLE IF NOT EXISTS attachment (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            commitment_id INTEGER NOT NULL REFERENCES commitment(id) ON DELETE CASCADE,
            title TEXT NOT NULL,
            file_url TEXT
        )
        "#,
    )
    .await
}

async fn create_agent_tables(pool: &SqlitePool) -> Result<()> {
    execute(
        pool,
        r#"
        CREATE TABLE IF NOT EXISTS agent (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            gov_level TEXT NOT NULL
        )
        "#,
    )
    .await?;

    execute(
        pool,
        r#"
        CREATE TABLE IF NOT EXISTS commitment_agent (
            commitment_id INTEGER NOT NULL REFERENCES commitment(id) ON DELETE CASCADE,
            agent_id INTEGER NOT NULL REFERENCES agent(id) ON DELETE CASCADE,
            PRIMARY KEY (commitment_id, agent_id)
        )
        "#,
    )
    .await
}

async fn create_thematic_tables(pool: &SqlitePool) -> Result<()> {
    execute(
        pool,
        r#"
        CREATE TABLE IF NOT EXISTS thematic (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            slug TEXT NOT NULL UNIQUE,
            description TEXT
        )
        "#,
    )
    .await?;

    execute(
        pool,
        r#"
        CREATE TABLE IF NOT EXISTS commitment_thematic (
            commitment_id INTEGER NOT NULL REFERENCES commitment(id) ON DELETE CASCADE,
            thematic_id INTEGER NOT NULL REFERENCES thematic(id) ON DELETE CASCADE,
            PRIMARY KEY (commitment_id, thematic_id)
        )
        "#,
    )
    .await
}

async fn create_polis_thread_table(pool: &SqlitePool) -> Result<()> {
    execute(
        pool,
        r#"
        CREATE TABLE IF NOT EXISTS polis_thread (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            thematic_id INTEGER NOT NULL REFERENCES thematic(id) ON DELETE CASCADE,
            summary TEXT,
            polis_url TEXT NOT NULL
        )
        "#,
    )
    .await
}

/// Create the draft_law table
///
/// `law_type` and `law_status` hold canonical vocabulary text, never raw
/// spreadsheet input.
async fn create_draft_law_table(pool: &SqlitePool) -> Result<()> {
    execute(
        pool,
        r#"
        CREATE TABLE IF NOT EXISTS draft_law (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            law_number INTEGER NOT NULL CHECK (law_number >= 0),
            law_type TEXT NOT NULL,
            law_deposit_date TEXT,
            law_evacuation_date TEXT,
            law_status TEXT NOT NULL,
            law_title TEXT NOT NULL,
            law_content TEXT NOT NULL,
            law_authors TEXT,
            law_search TEXT NOT NULL DEFAULT '',
            imported_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .await
}

/// Create the draft law ↔ commitment join table
///
/// The composite primary key is what rejects duplicate links.
async fn create_draft_law_commitment_link_table(pool: &SqlitePool) -> Result<()> {
    execute(
        pool,
        r#"
        CREATE TABLE IF NOT EXISTS draft_law_commitment_link (
            draft_law_id INTEGER NOT NULL REFERENCES draft_law(id) ON DELETE CASCADE,
            commitment_id INTEGER NOT NULL REFERENCES commitment(id) ON DELETE CASCADE,
            PRIMARY KEY (draft_law_id, commitment_id)
        )
        "#,
    )
    .await
}
