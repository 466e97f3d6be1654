//! Draft law persistence
//!
//! Batch inserts run inside one transaction: either every record of an import
//! is stored or none is. Listing supports the filters used by the browsing UI.

use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::db::models::{DraftLaw, DraftLawDetail, NewDraftLaw};
use crate::vocabulary::{LawKind, LawStatus, Vocabulary};
use crate::{Error, Result};

const DRAFT_LAW_COLUMNS: &str = "id, law_number, law_type, law_deposit_date, \
     law_evacuation_date, law_status, law_title, law_content, law_authors";

/// Listing filters; `None` means "any"
#[derive(Debug, Clone, Default)]
pub struct DraftLawFilter {
    pub status: Option<LawStatus>,
    pub kind: Option<LawKind>,
    /// Case-insensitive match on title, authors or law number
    pub search: Option<String>,
}

/// Columns the listing may be ordered by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortColumn {
    #[default]
    Id,
    LawNumber,
    DepositDate,
    EvacuationDate,
    Status,
    Title,
}

impl SortColumn {
    fn sql(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::LawNumber => "law_number",
            Self::DepositDate => "law_deposit_date",
            Self::EvacuationDate => "law_evacuation_date",
            Self::Status => "law_status",
            Self::Title => "law_title",
        }
    }
}

impl FromStr for SortColumn {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "id" => Ok(Self::Id),
            "law_number" => Ok(Self::LawNumber),
            "law_deposit_date" | "deposit_date" => Ok(Self::DepositDate),
            "law_evacuation_date" | "evacuation_date" => Ok(Self::EvacuationDate),
            "law_status" | "status" => Ok(Self::Status),
            "law_title" | "title" => Ok(Self::Title),
            other => Err(Error::InvalidInput(format!("cannot sort by {other:?}"))),
        }
    }
}

/// Ordering for [`list_draft_laws`]
#[derive(Debug, Clone, Copy, Default)]
pub struct DraftLawSort {
    pub column: SortColumn,
    pub descending: bool,
}

pub(crate) fn draft_law_from_row(row: &SqliteRow) -> Result<DraftLaw> {
    let law_number: i64 = row.try_get("law_number")?;
    let law_number = u32::try_from(law_number)
        .map_err(|_| Error::Internal(format!("law_number out of range: {law_number}")))?;
    let kind: String = row.try_get("law_type")?;
    let status: String = row.try_get("law_status")?;

    Ok(DraftLaw {
        id: row.try_get("id")?,
        law_number,
        kind: kind.parse()?,
        deposit_date: row.try_get("law_deposit_date")?,
        evacuation_date: row.try_get("law_evacuation_date")?,
        status: status.parse()?,
        title: row.try_get("law_title")?,
        content: row.try_get("law_content")?,
        authors: row.try_get("law_authors")?,
    })
}

/// Lower-cased title and authors, matched by the listing's free-text search
///
/// SQLite's `lower()` only folds ASCII, so the text is folded here with full
/// Unicode case mapping and stored alongside the record.
pub(crate) fn search_text(title: &str, authors: Option<&str>) -> String {
    format!("{}\n{}", title, authors.unwrap_or_default()).to_lowercase()
}

/// Insert one draft law on an open connection or transaction
pub async fn insert_draft_law(conn: &mut SqliteConnection, law: &NewDraftLaw) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO draft_law (
            law_number, law_type, law_deposit_date, law_evacuation_date,
            law_status, law_title, law_content, law_authors, law_search
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(i64::from(law.law_number))
    .bind(law.kind.as_str())
    .bind(law.deposit_date)
    .bind(law.evacuation_date)
    .bind(law.status.as_str())
    .bind(&law.title)
    .bind(&law.content)
    .bind(&law.authors)
    .bind(search_text(&law.title, law.authors.as_deref()))
    .execute(&mut *conn)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Insert a batch of draft laws in a single transaction
///
/// Returns the new ids in input order. On any failure the transaction is
/// dropped uncommitted and nothing from the batch remains in the store.
pub async fn insert_draft_laws(pool: &SqlitePool, laws: &[NewDraftLaw]) -> Result<Vec<i64>> {
    let mut tx = pool.begin().await?;
    let mut ids = Vec::with_capacity(laws.len());

    for law in laws {
        let id = insert_draft_law(&mut tx, law).await?;
        debug!(id, law_number = law.law_number, "inserted draft law");
        ids.push(id);
    }

    tx.commit().await?;
    info!("Committed {} draft law(s)", ids.len());
    Ok(ids)
}

/// Number of stored draft laws
pub async fn count_draft_laws(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM draft_law")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Load a draft law by id
pub async fn get_draft_law(pool: &SqlitePool, id: i64) -> Result<Option<DraftLaw>> {
    let sql = format!("SELECT {DRAFT_LAW_COLUMNS} FROM draft_law WHERE id = ?");
    let row = sqlx::query(&sql).bind(id).fetch_optional(pool).await?;
    row.as_ref().map(draft_law_from_row).transpose()
}

/// Load a draft law together with its linked commitments
pub async fn get_draft_law_detail(pool: &SqlitePool, id: i64) -> Result<Option<DraftLawDetail>> {
    let Some(draft_law) = get_draft_law(pool, id).await? else {
        return Ok(None);
    };
    let commitments = crate::db::links::commitments_for_draft_law(pool, id).await?;
    Ok(Some(DraftLawDetail {
        draft_law,
        commitments,
    }))
}

fn push_filter(builder: &mut QueryBuilder<'_, Sqlite>, filter: &DraftLawFilter) {
    builder.push(" WHERE 1 = 1");

    if let Some(status) = filter.status {
        builder.push(" AND law_status = ").push_bind(status.as_str());
    }
    if let Some(kind) = filter.kind {
        builder.push(" AND law_type = ").push_bind(kind.as_str());
    }
    if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search.to_lowercase());
        builder
            .push(" AND (law_search LIKE ")
            .push_bind(pattern.clone())
            .push(" OR CAST(law_number AS TEXT) LIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

/// Number of draft laws matching a filter
pub async fn count_filtered_draft_laws(pool: &SqlitePool, filter: &DraftLawFilter) -> Result<i64> {
    let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM draft_law");
    push_filter(&mut count, filter);
    let total: i64 = count.build_query_scalar().fetch_one(pool).await?;
    Ok(total)
}

/// Filtered, ordered page of draft laws
pub async fn list_draft_laws(
    pool: &SqlitePool,
    filter: &DraftLawFilter,
    sort: DraftLawSort,
    limit: i64,
    offset: i64,
) -> Result<Vec<DraftLaw>> {
    let mut select = QueryBuilder::<Sqlite>::new(format!("SELECT {DRAFT_LAW_COLUMNS} FROM draft_law"));
    push_filter(&mut select, filter);
    select
        .push(" ORDER BY ")
        .push(sort.column.sql())
        .push(if sort.descending { " DESC" } else { " ASC" })
        .push(", id ASC LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);

    let rows = select.build().fetch_all(pool).await?;
    rows.iter().map(draft_law_from_row).collect()
}
