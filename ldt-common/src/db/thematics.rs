//! Thematic groupings and their deliberation threads

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};

use crate::db::commitments::commitment_from_row;
use crate::db::models::{PolisThread, Thematic, ThematicDetail};
use crate::Result;

pub(crate) fn thematic_from_row(row: &SqliteRow) -> Result<Thematic> {
    Ok(Thematic {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        slug: row.try_get("slug")?,
        description: row.try_get("description")?,
    })
}

pub async fn insert_thematic(
    conn: &mut SqliteConnection,
    name: &str,
    slug: &str,
    description: Option<&str>,
) -> Result<i64> {
    let result = sqlx::query("INSERT INTO thematic (name, slug, description) VALUES (?, ?, ?)")
        .bind(name)
        .bind(slug)
        .bind(description)
        .execute(&mut *conn)
        .await?;
    Ok(result.last_insert_rowid())
}

/// Place a commitment under a thematic (idempotent)
pub async fn link_thematic(conn: &mut SqliteConnection, commitment_id: i64, thematic_id: i64) -> Result<()> {
    sqlx::query("INSERT OR IGNORE INTO commitment_thematic (commitment_id, thematic_id) VALUES (?, ?)")
        .bind(commitment_id)
        .bind(thematic_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn insert_polis_thread(
    conn: &mut SqliteConnection,
    thematic_id: i64,
    summary: Option<&str>,
    polis_url: &str,
) -> Result<i64> {
    let result = sqlx::query("INSERT INTO polis_thread (thematic_id, summary, polis_url) VALUES (?, ?, ?)")
        .bind(thematic_id)
        .bind(summary)
        .bind(polis_url)
        .execute(&mut *conn)
        .await?;
    Ok(result.last_insert_rowid())
}

/// All thematics, alphabetically
pub async fn list_thematics(pool: &SqlitePool) -> Result<Vec<Thematic>> {
    let rows = sqlx::query("SELECT id, name, slug, description FROM thematic ORDER BY name")
        .fetch_all(pool)
        .await?;
    rows.iter().map(thematic_from_row).collect()
}

/// Thematic by slug with its commitments and deliberation threads
pub async fn get_thematic_detail(pool: &SqlitePool, slug: &str) -> Result<Option<ThematicDetail>> {
    let row = sqlx::query("SELECT id, name, slug, description FROM thematic WHERE slug = ?")
        .bind(slug)
        .fetch_optional(pool)
        .await?;
    let Some(thematic) = row.as_ref().map(thematic_from_row).transpose()? else {
        return Ok(None);
    };

    let commitments = sqlx::query(
        r#"
        SELECT c.id, c.title, c.ministry, c.summary, c.body, c.start_date, c.end_date,
               c.budget, c.institution_id
        FROM commitment c
        JOIN commitment_thematic ct ON ct.commitment_id = c.id
        WHERE ct.thematic_id = ?
        ORDER BY c.id
        "#,
    )
    .bind(thematic.id)
    .fetch_all(pool)
    .await?
    .iter()
    .map(commitment_from_row)
    .collect::<Result<Vec<_>>>()?;

    let polis_threads = sqlx::query(
        "SELECT id, thematic_id, summary, polis_url FROM polis_thread WHERE thematic_id = ? ORDER BY id",
    )
    .bind(thematic.id)
    .fetch_all(pool)
    .await?
    .iter()
    .map(|row| -> Result<_> {
        Ok(PolisThread {
            id: row.try_get("id")?,
            thematic_id: row.try_get("thematic_id")?,
            summary: row.try_get("summary")?,
            polis_url: row.try_get("polis_url")?,
        })
    })
    .collect::<Result<Vec<_>>>()?;

    Ok(Some(ThematicDetail {
        thematic,
        commitments,
        polis_threads,
    }))
}
