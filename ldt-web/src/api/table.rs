//! Generic table browsing with pagination and sorting
//!
//! Only whitelisted tables are reachable; see
//! [`ldt_common::db::tables::BROWSABLE_TABLES`].

use axum::{
    extract::{Path, Query, State},
    Json,
};
use ldt_common::db::tables::{self, TableInfo};
use serde::{Deserialize, Serialize};

use super::is_descending;
use crate::pagination::calculate_pagination;
use crate::{ApiResult, AppState};

/// Query parameters for table viewing
#[derive(Debug, Deserialize)]
pub struct TableQuery {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    pub page: i64,

    /// Column to sort by (optional)
    pub sort: Option<String>,

    /// Sort order: "asc" or "desc"
    pub order: Option<String>,
}

fn default_page() -> i64 {
    1
}

/// Table data response
#[derive(Debug, Serialize)]
pub struct TableDataResponse {
    pub table_name: String,
    pub total_rows: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<serde_json::Value>>,
}

/// GET /api/tables
pub async fn list_tables(State(state): State<AppState>) -> ApiResult<Json<Vec<TableInfo>>> {
    Ok(Json(tables::list_tables(&state.db).await?))
}

/// GET /api/table/:name
pub async fn get_table_data(
    State(state): State<AppState>,
    Path(table_name): Path<String>,
    Query(query): Query<TableQuery>,
) -> ApiResult<Json<TableDataResponse>> {
    let total_rows = tables::count_rows(&state.db, &table_name).await?;
    let pagination = calculate_pagination(total_rows, query.page, state.page_size);

    let page = tables::fetch_table_page(
        &state.db,
        &table_name,
        query.sort.as_deref(),
        is_descending(query.order.as_deref()),
        pagination.page_size,
        pagination.offset,
    )
    .await?;

    Ok(Json(TableDataResponse {
        table_name,
        total_rows,
        page: pagination.page,
        page_size: pagination.page_size,
        total_pages: pagination.total_pages,
        columns: page.columns,
        rows: page.rows,
    }))
}
