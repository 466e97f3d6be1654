//! Database schema migrations
//!
//! Versioned, idempotent schema changes applied after the `CREATE TABLE IF NOT
//! EXISTS` pass. The applied version is tracked in `schema_version`.
//!
//! # Migration Guidelines
//!
//! 1. **Never modify existing migrations** - databases in the field already ran them
//! 2. **Always add new migrations** - one function per schema change
//! 3. **Check before altering** - every migration must be safe to run twice
//! 4. **Use ALTER TABLE** - prefer it over DROP/CREATE to preserve data

use crate::Result;
use sqlx::{Row, SqlitePool};
use tracing::{info, warn};

/// Current schema version
///
/// **IMPORTANT:** Increment this when adding new migrations
pub const CURRENT_SCHEMA_VERSION: i32 = 3;

/// Get current schema version from database
///
/// Returns 0 if schema_version table doesn't exist or has no rows
pub async fn get_schema_version(pool: &SqlitePool) -> Result<i32> {
    let table_exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM sqlite_master
            WHERE type='table' AND name='schema_version'
        )
        "#,
    )
    .fetch_one(pool)
    .await?;

    if !table_exists {
        return Ok(0);
    }

    let version: Option<i32> =
        sqlx::query_scalar("SELECT version FROM schema_version ORDER BY version DESC LIMIT 1")
            .fetch_optional(pool)
            .await?;

    Ok(version.unwrap_or(0))
}

async fn set_schema_version(pool: &SqlitePool, version: i32) -> Result<()> {
    sqlx::query("INSERT OR IGNORE INTO schema_version (version) VALUES (?)")
        .bind(version)
        .execute(pool)
        .await?;

    Ok(())
}

/// Run all pending migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    let current_version = get_schema_version(pool).await?;

    if current_version == CURRENT_SCHEMA_VERSION {
        info!("Database schema is up to date (v{})", current_version);
        return Ok(());
    }

    if current_version > CURRENT_SCHEMA_VERSION {
        warn!(
            "Database schema version ({}) is newer than code version ({})",
            current_version, CURRENT_SCHEMA_VERSION
        );
        return Ok(());
    }

    info!(
        "Running database migrations: v{} -> v{}",
        current_version, CURRENT_SCHEMA_VERSION
    );

    if current_version < 1 {
        migrate_v1(pool).await?;
        set_schema_version(pool, 1).await?;
        info!("✓ Migration v1 completed");
    }

    if current_version < 2 {
        migrate_v2(pool).await?;
        set_schema_version(pool, 2).await?;
        info!("✓ Migration v2 completed");
    }

    if current_version < 3 {
        migrate_v3(pool).await?;
        set_schema_version(pool, 3).await?;
        info!("✓ Migration v3 completed");
    }

    Ok(())
}

/// Migration v1: lookup indexes for the draft-law listing and link queries
async fn migrate_v1(pool: &SqlitePool) -> Result<()> {
    info!("Running migration v1: draft law indexes");

    for sql in [
        "CREATE INDEX IF NOT EXISTS idx_draft_law_number ON draft_law(law_number)",
        "CREATE INDEX IF NOT EXISTS idx_draft_law_status ON draft_law(law_status)",
        "CREATE INDEX IF NOT EXISTS idx_link_commitment ON draft_law_commitment_link(commitment_id)",
    ] {
        sqlx::query(sql).execute(pool).await?;
    }

    Ok(())
}

/// Migration v2: add `imported_at` to draft_law tables created before it existed
///
/// SQLite refuses a non-constant default in ADD COLUMN, so upgraded databases
/// get a nullable column and pre-existing rows keep NULL.
async fn migrate_v2(pool: &SqlitePool) -> Result<()> {
    info!("Running migration v2: draft_law.imported_at");

    let has_column: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM pragma_table_info('draft_law') WHERE name = 'imported_at'",
    )
    .fetch_one(pool)
    .await?;

    if has_column > 0 {
        info!("  imported_at column already exists - skipping");
        return Ok(());
    }

    sqlx::query("ALTER TABLE draft_law ADD COLUMN imported_at TIMESTAMP")
        .execute(pool)
        .await?;

    info!("  ✓ Added imported_at column to draft_law table");
    Ok(())
}

/// Migration v3: `draft_law.law_search` for Unicode case-insensitive search
///
/// Existing rows are backfilled from their title and authors.
async fn migrate_v3(pool: &SqlitePool) -> Result<()> {
    info!("Running migration v3: draft_law.law_search");

    let has_column: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM pragma_table_info('draft_law') WHERE name = 'law_search'",
    )
    .fetch_one(pool)
    .await?;

    if has_column == 0 {
        sqlx::query("ALTER TABLE draft_law ADD COLUMN law_search TEXT NOT NULL DEFAULT ''")
            .execute(pool)
            .await?;
        info!("  ✓ Added law_search column to draft_law table");
    }

    let mut tx = pool.begin().await?;
    let rows = sqlx::query("SELECT id, law_title, law_authors FROM draft_law WHERE law_search = ''")
        .fetch_all(&mut *tx)
        .await?;
    for row in &rows {
        let id: i64 = row.try_get("id")?;
        let title: String = row.try_get("law_title")?;
        let authors: Option<String> = row.try_get("law_authors")?;
        sqlx::query("UPDATE draft_law SET law_search = ? WHERE id = ?")
            .bind(crate::db::draft_laws::search_text(&title, authors.as_deref()))
            .bind(id)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    if !rows.is_empty() {
        info!("  ✓ Backfilled law_search for {} draft law(s)", rows.len());
    }
    Ok(())
}
