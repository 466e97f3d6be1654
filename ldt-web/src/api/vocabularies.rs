//! Controlled vocabularies for the UI's filter dropdowns

use axum::Json;
use ldt_common::vocabulary::{entries, Governance, KpiType, VocabularyEntry};
use ldt_common::{LawKind, LawStatus, Ministry};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct VocabulariesResponse {
    pub kinds: Vec<VocabularyEntry>,
    pub statuses: Vec<VocabularyEntry>,
    pub ministries: Vec<VocabularyEntry>,
    pub governance_levels: Vec<VocabularyEntry>,
    pub kpi_types: Vec<VocabularyEntry>,
}

/// GET /api/vocabularies
pub async fn get_vocabularies() -> Json<VocabulariesResponse> {
    Json(VocabulariesResponse {
        kinds: entries::<LawKind>(),
        statuses: entries::<LawStatus>(),
        ministries: entries::<Ministry>(),
        governance_levels: entries::<Governance>(),
        kpi_types: entries::<KpiType>(),
    })
}
