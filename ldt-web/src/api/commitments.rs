//! Commitment listing and detail

use axum::{
    extract::{Path, Query, State},
    Json,
};
use ldt_common::db::commitments;
use ldt_common::db::{Commitment, CommitmentDetail};
use ldt_common::Ministry;
use serde::Deserialize;

use super::parse_optional;
use crate::pagination::{calculate_pagination, Page};
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct CommitmentQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    /// Ministry abbreviation, e.g. `MMTP`
    pub ministry: Option<String>,
}

fn default_page() -> i64 {
    1
}

/// GET /api/commitments
pub async fn list_commitments(
    State(state): State<AppState>,
    Query(query): Query<CommitmentQuery>,
) -> ApiResult<Json<Page<Commitment>>> {
    let ministry: Option<Ministry> = parse_optional(query.ministry.as_deref())?;

    let total = commitments::count_commitments(&state.db, ministry).await?;
    let pagination = calculate_pagination(total, query.page, state.page_size);
    let items =
        commitments::list_commitments(&state.db, ministry, pagination.page_size, pagination.offset)
            .await?;

    Ok(Json(Page::new(items, pagination, total)))
}

/// GET /api/commitments/:id
pub async fn get_commitment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<CommitmentDetail>> {
    commitments::get_commitment_detail(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("commitment {id}")))
}
