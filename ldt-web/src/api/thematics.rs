//! Thematics and their deliberation threads

use axum::{
    extract::{Path, State},
    Json,
};
use ldt_common::db::thematics;
use ldt_common::db::{Thematic, ThematicDetail};

use crate::{ApiError, ApiResult, AppState};

/// GET /api/thematics
pub async fn list_thematics(State(state): State<AppState>) -> ApiResult<Json<Vec<Thematic>>> {
    Ok(Json(thematics::list_thematics(&state.db).await?))
}

/// GET /api/thematics/:slug
pub async fn get_thematic(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<ThematicDetail>> {
    thematics::get_thematic_detail(&state.db, &slug)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("thematic {slug}")))
}
