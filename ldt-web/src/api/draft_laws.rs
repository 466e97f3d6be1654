//! Draft law listing, detail and commitment links

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use ldt_common::db::draft_laws::{self, DraftLawFilter, DraftLawSort, SortColumn};
use ldt_common::db::{link_draft_law, unlink_draft_law, DraftLaw, DraftLawDetail, LinkResult};
use serde::Deserialize;
use tracing::debug;

use super::{is_descending, parse_optional};
use crate::pagination::{calculate_pagination, Page};
use crate::{ApiError, ApiResult, AppState};

/// Query parameters for the draft law listing
#[derive(Debug, Default, Deserialize)]
pub struct DraftLawQuery {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    pub page: i64,
    /// Canonical status text
    pub status: Option<String>,
    /// Canonical kind text
    pub kind: Option<String>,
    /// Free-text search on title, authors or law number
    pub q: Option<String>,
    pub sort: Option<String>,
    /// "asc" or "desc"
    pub order: Option<String>,
}

fn default_page() -> i64 {
    1
}

impl DraftLawQuery {
    fn filter(&self) -> ApiResult<DraftLawFilter> {
        Ok(DraftLawFilter {
            status: parse_optional(self.status.as_deref())?,
            kind: parse_optional(self.kind.as_deref())?,
            search: self
                .q
                .as_deref()
                .map(str::trim)
                .filter(|q| !q.is_empty())
                .map(str::to_string),
        })
    }

    fn sort(&self) -> ApiResult<DraftLawSort> {
        Ok(DraftLawSort {
            column: parse_optional::<SortColumn>(self.sort.as_deref())?.unwrap_or_default(),
            descending: is_descending(self.order.as_deref()),
        })
    }
}

/// GET /api/draft-laws
pub async fn list_draft_laws(
    State(state): State<AppState>,
    Query(query): Query<DraftLawQuery>,
) -> ApiResult<Json<Page<DraftLaw>>> {
    let filter = query.filter()?;
    let sort = query.sort()?;

    let total = draft_laws::count_filtered_draft_laws(&state.db, &filter).await?;
    let pagination = calculate_pagination(total, query.page, state.page_size);
    let items = draft_laws::list_draft_laws(
        &state.db,
        &filter,
        sort,
        pagination.page_size,
        pagination.offset,
    )
    .await?;

    debug!(total, page = pagination.page, "Listed draft laws");
    Ok(Json(Page::new(items, pagination, total)))
}

/// GET /api/draft-laws/:id
pub async fn get_draft_law(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<DraftLawDetail>> {
    draft_laws::get_draft_law_detail(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("draft law {id}")))
}

/// POST /api/draft-laws/:id/commitments/:commitment_id
pub async fn link_commitment(
    State(state): State<AppState>,
    Path((id, commitment_id)): Path<(i64, i64)>,
) -> ApiResult<(StatusCode, Json<LinkResult>)> {
    let link = link_draft_law(&state.db, id, commitment_id).await?;
    Ok((StatusCode::CREATED, Json(link)))
}

/// DELETE /api/draft-laws/:id/commitments/:commitment_id
pub async fn unlink_commitment(
    State(state): State<AppState>,
    Path((id, commitment_id)): Path<(i64, i64)>,
) -> ApiResult<StatusCode> {
    unlink_draft_law(&state.db, id, commitment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
