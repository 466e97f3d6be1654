//! Table listing and generic row browsing
//!
//! Only tables named in [`BROWSABLE_TABLES`] can be listed or browsed. Table
//! and column names are checked against that list and the live schema before
//! being spliced into SQL.

use serde::Serialize;
use serde_json::{json, Value};
use sqlx::{Column, Row, SqlitePool, ValueRef};

use crate::{Error, Result};

/// Tables exposed through the generic browser
pub const BROWSABLE_TABLES: &[&str] = &[
    "agent",
    "attachment",
    "commitment",
    "commitment_agent",
    "commitment_thematic",
    "context",
    "draft_law",
    "draft_law_commitment_link",
    "institution",
    "kpi",
    "milestone",
    "polis_thread",
    "resources",
    "thematic",
];

/// Table name and row count
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableInfo {
    pub name: String,
    pub row_count: i64,
}

/// One page of raw table content
#[derive(Debug, Clone, Serialize)]
pub struct TablePage {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

fn check_table(name: &str) -> Result<&'static str> {
    BROWSABLE_TABLES
        .iter()
        .copied()
        .find(|t| *t == name)
        .ok_or_else(|| Error::NotFound(format!("table {name}")))
}

/// Browsable tables with their row counts, alphabetically
pub async fn list_tables(pool: &SqlitePool) -> Result<Vec<TableInfo>> {
    let mut infos = Vec::with_capacity(BROWSABLE_TABLES.len());
    for name in BROWSABLE_TABLES {
        infos.push(TableInfo {
            name: (*name).to_string(),
            row_count: count_rows(pool, name).await?,
        });
    }
    Ok(infos)
}

/// Row count of a browsable table
pub async fn count_rows(pool: &SqlitePool, name: &str) -> Result<i64> {
    let table = check_table(name)?;
    let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Column names in declaration order
pub async fn table_columns(pool: &SqlitePool, name: &str) -> Result<Vec<String>> {
    let table = check_table(name)?;
    // PRAGMA table_info: (cid, name, type, notnull, dflt_value, pk)
    let rows = sqlx::query(&format!("PRAGMA table_info({table})"))
        .fetch_all(pool)
        .await?;
    rows.iter()
        .map(|row| row.try_get::<String, _>(1).map_err(Error::from))
        .collect()
}

/// Fetch a page of rows, optionally ordered by one of the table's columns
pub async fn fetch_table_page(
    pool: &SqlitePool,
    name: &str,
    sort: Option<&str>,
    descending: bool,
    limit: i64,
    offset: i64,
) -> Result<TablePage> {
    let table = check_table(name)?;
    let columns = table_columns(pool, table).await?;

    let mut sql = format!("SELECT * FROM {table}");
    if let Some(sort) = sort {
        let column = columns
            .iter()
            .find(|c| c.as_str() == sort)
            .ok_or_else(|| Error::InvalidInput(format!("unknown column {sort:?} in {table}")))?;
        sql.push_str(&format!(
            " ORDER BY {column} {}",
            if descending { "DESC" } else { "ASC" }
        ));
    }
    sql.push_str(" LIMIT ? OFFSET ?");

    let rows = sqlx::query(&sql)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

    let columns = match rows.first() {
        Some(first) => first.columns().iter().map(|c| c.name().to_string()).collect(),
        None => columns,
    };

    let rows = rows
        .iter()
        .map(|row| (0..row.len()).map(|i| cell_to_json(row, i)).collect())
        .collect();

    Ok(TablePage { columns, rows })
}

fn cell_to_json(row: &sqlx::sqlite::SqliteRow, index: usize) -> Value {
    match row.try_get_raw(index) {
        Ok(raw) if raw.is_null() => Value::Null,
        Ok(_) => row
            .try_get::<i64, _>(index)
            .map(|v| json!(v))
            .or_else(|_| row.try_get::<f64, _>(index).map(|v| json!(v)))
            .or_else(|_| row.try_get::<String, _>(index).map(Value::String))
            .unwrap_or(Value::Null),
        Err(_) => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init::init_database;

    #[tokio::test]
    async fn lists_every_browsable_table() {
        let dir = tempfile::tempdir().unwrap();
        let pool = init_database(&dir.path().join("tables.db")).await.unwrap();

        let tables = list_tables(&pool).await.unwrap();
        assert_eq!(tables.len(), BROWSABLE_TABLES.len());
        assert!(tables.iter().all(|t| t.row_count == 0));
        assert!(tables.windows(2).all(|w| w[0].name < w[1].name));
    }

    #[tokio::test]
    async fn rejects_unlisted_tables_and_columns() {
        let dir = tempfile::tempdir().unwrap();
        let pool = init_database(&dir.path().join("tables.db")).await.unwrap();

        assert!(matches!(
            count_rows(&pool, "schema_version").await,
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            fetch_table_page(&pool, "draft_law", Some("id; DROP TABLE draft_law"), false, 10, 0).await,
            Err(Error::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn empty_table_reports_schema_columns() {
        let dir = tempfile::tempdir().unwrap();
        let pool = init_database(&dir.path().join("tables.db")).await.unwrap();

        let page = fetch_table_page(&pool, "thematic", Some("name"), true, 10, 0)
            .await
            .unwrap();
        assert_eq!(page.columns, vec!["id", "name", "slug", "description"]);
        assert!(page.rows.is_empty());
    }
}
