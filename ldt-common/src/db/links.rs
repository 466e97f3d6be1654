//! Draft law ↔ commitment association
//!
//! Links are plain join rows keyed by (draft_law_id, commitment_id). The
//! composite primary key enforces uniqueness: linking an existing pair is
//! rejected with [`Error::DuplicateLink`], never silently accepted. Neither
//! linked entity is modified.

use serde::Serialize;
use sqlx::SqlitePool;
use tracing::info;

use crate::db::commitments::commitment_from_row;
use crate::db::draft_laws::draft_law_from_row;
use crate::db::models::{Commitment, DraftLaw};
use crate::{Error, Result};

/// Outcome of a successful link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LinkResult {
    pub draft_law_id: i64,
    pub commitment_id: i64,
}

/// Record that a draft law implements or relates to a commitment
pub async fn link_draft_law(
    pool: &SqlitePool,
    draft_law_id: i64,
    commitment_id: i64,
) -> Result<LinkResult> {
    let result = sqlx::query(
        "INSERT INTO draft_law_commitment_link (draft_law_id, commitment_id) VALUES (?, ?)",
    )
    .bind(draft_law_id)
    .bind(commitment_id)
    .execute(pool)
    .await;

    match result {
        Ok(_) => {
            info!(draft_law_id, commitment_id, "linked draft law to commitment");
            Ok(LinkResult {
                draft_law_id,
                commitment_id,
            })
        }
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            Err(Error::DuplicateLink {
                draft_law_id,
                commitment_id,
            })
        }
        Err(sqlx::Error::Database(db_err)) if db_err.is_foreign_key_violation() => {
            Err(Error::NotFound(format!(
                "draft law {draft_law_id} or commitment {commitment_id}"
            )))
        }
        Err(e) => Err(e.into()),
    }
}

/// Remove a link; `NotFound` if the pair was not linked
pub async fn unlink_draft_law(pool: &SqlitePool, draft_law_id: i64, commitment_id: i64) -> Result<()> {
    let result = sqlx::query(
        "DELETE FROM draft_law_commitment_link WHERE draft_law_id = ? AND commitment_id = ?",
    )
    .bind(draft_law_id)
    .bind(commitment_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!(
            "link between draft law {draft_law_id} and commitment {commitment_id}"
        )));
    }

    info!(draft_law_id, commitment_id, "unlinked draft law from commitment");
    Ok(())
}

/// Commitments a draft law is linked to, ordered by id
pub async fn commitments_for_draft_law(pool: &SqlitePool, draft_law_id: i64) -> Result<Vec<Commitment>> {
    let rows = sqlx::query(
        r#"
        SELECT c.id, c.title, c.ministry, c.summary, c.body, c.start_date, c.end_date,
               c.budget, c.institution_id
        FROM commitment c
        JOIN draft_law_commitment_link l ON l.commitment_id = c.id
        WHERE l.draft_law_id = ?
        ORDER BY c.id
        "#,
    )
    .bind(draft_law_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(commitment_from_row).collect()
}

/// Draft laws linked to a commitment, ordered by law number
pub async fn draft_laws_for_commitment(pool: &SqlitePool, commitment_id: i64) -> Result<Vec<DraftLaw>> {
    let rows = sqlx::query(
        r#"
        SELECT d.id, d.law_number, d.law_type, d.law_deposit_date, d.law_evacuation_date,
               d.law_status, d.law_title, d.law_content, d.law_authors
        FROM draft_law d
        JOIN draft_law_commitment_link l ON l.draft_law_id = d.id
        WHERE l.commitment_id = ?
        ORDER BY d.law_number, d.id
        "#,
    )
    .bind(commitment_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(draft_law_from_row).collect()
}
