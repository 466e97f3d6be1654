//! HTTP API handlers for ldt-web

pub mod commitments;
pub mod draft_laws;
pub mod health;
pub mod table;
pub mod thematics;
pub mod ui;
pub mod vocabularies;

pub use commitments::{get_commitment, list_commitments};
pub use draft_laws::{get_draft_law, link_commitment, list_draft_laws, unlink_commitment};
pub use health::health_routes;
pub use table::{get_table_data, list_tables};
pub use thematics::{get_thematic, list_thematics};
pub use ui::{serve_app_css, serve_app_js, serve_index};
pub use vocabularies::get_vocabularies;

use crate::ApiError;

/// Parse an optional query value into a vocabulary or other `FromStr` type
///
/// Empty strings are treated as absent so that `?status=` means "any".
pub(crate) fn parse_optional<T>(value: Option<&str>) -> Result<Option<T>, ApiError>
where
    T: std::str::FromStr<Err = ldt_common::Error>,
{
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => v.parse().map(Some).map_err(ApiError::from),
        None => Ok(None),
    }
}

/// `true` for `order=desc` (any case); everything else sorts ascending
pub(crate) fn is_descending(order: Option<&str>) -> bool {
    order.is_some_and(|o| o.eq_ignore_ascii_case("desc"))
}
