//! ldt-web library - browsing UI and JSON API for the tracker store

use axum::Router;
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod pagination;

pub use error::{ApiError, ApiResult};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Rows per page in every listing
    pub page_size: i64,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, page_size: i64) -> Self {
        Self {
            db,
            page_size: page_size.max(1),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let api = Router::new()
        .route("/api/vocabularies", get(api::get_vocabularies))
        .route("/api/draft-laws", get(api::list_draft_laws))
        .route("/api/draft-laws/:id", get(api::get_draft_law))
        .route(
            "/api/draft-laws/:id/commitments/:commitment_id",
            post(api::link_commitment).delete(api::unlink_commitment),
        )
        .route("/api/commitments", get(api::list_commitments))
        .route("/api/commitments/:id", get(api::get_commitment))
        .route("/api/thematics", get(api::list_thematics))
        .route("/api/thematics/:slug", get(api::get_thematic))
        .route("/api/tables", get(api::list_tables))
        .route("/api/table/:name", get(api::get_table_data));

    let ui = Router::new()
        .route("/", get(api::serve_index))
        .route("/static/app.js", get(api::serve_app_js))
        .route("/static/app.css", get(api::serve_app_css))
        .merge(api::health_routes());

    Router::new()
        .merge(api)
        .merge(ui)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
