//! Database models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::vocabulary::{Governance, KpiType, LawKind, LawStatus, Ministry};

/// A draft law ready to be inserted (no identity yet)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDraftLaw {
    pub law_number: u32,
    pub kind: LawKind,
    pub deposit_date: Option<NaiveDate>,
    pub evacuation_date: Option<NaiveDate>,
    pub status: LawStatus,
    pub title: String,
    pub content: String,
    pub authors: Option<String>,
}

/// A stored draft law
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftLaw {
    pub id: i64,
    pub law_number: u32,
    pub kind: LawKind,
    pub deposit_date: Option<NaiveDate>,
    pub evacuation_date: Option<NaiveDate>,
    pub status: LawStatus,
    pub title: String,
    pub content: String,
    pub authors: Option<String>,
}

impl DraftLaw {
    pub fn from_new(id: i64, law: NewDraftLaw) -> Self {
        Self {
            id,
            law_number: law.law_number,
            kind: law.kind,
            deposit_date: law.deposit_date,
            evacuation_date: law.evacuation_date,
            status: law.status,
            title: law.title,
            content: law.content,
            authors: law.authors,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Institution {
    pub id: i64,
    pub name: String,
    pub kind: String,
    pub party: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCommitment {
    pub title: String,
    pub ministry: Ministry,
    pub summary: Option<String>,
    pub body: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub budget: Option<i64>,
    pub institution_id: Option<i64>,
}

/// A government initiative/pledge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commitment {
    pub id: i64,
    pub title: String,
    pub ministry: Ministry,
    pub summary: Option<String>,
    pub body: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub budget: Option<i64>,
    pub institution_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub id: i64,
    pub commitment_id: i64,
    pub title: String,
    pub summary: String,
    pub body: String,
    pub due_date: Option<NaiveDate>,
    pub completion_date: Option<NaiveDate>,
    pub budget: i64,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kpi {
    pub id: i64,
    pub commitment_id: i64,
    pub kpi_type: KpiType,
    pub value: f64,
    pub unit: String,
}

/// Relevant study attached to a context entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: i64,
    pub context_id: i64,
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Context {
    pub id: i64,
    pub commitment_id: i64,
    pub title: String,
    pub subtitle: Option<String>,
    pub body: Option<String>,
    pub resources: Vec<Resource>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: i64,
    pub name: String,
    pub gov_level: Governance,
}

/// Supporting document for a commitment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: i64,
    pub commitment_id: i64,
    pub title: String,
    pub file_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thematic {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
}

/// Deliberation thread attached to a thematic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolisThread {
    pub id: i64,
    pub thematic_id: i64,
    pub summary: Option<String>,
    pub polis_url: String,
}

/// Commitment with everything it owns or is linked to
#[derive(Debug, Clone, Serialize)]
pub struct CommitmentDetail {
    #[serde(flatten)]
    pub commitment: Commitment,
    pub institution: Option<Institution>,
    pub milestones: Vec<Milestone>,
    pub kpis: Vec<Kpi>,
    pub context: Vec<Context>,
    pub attachments: Vec<Attachment>,
    pub agents: Vec<Agent>,
    pub thematics: Vec<Thematic>,
    pub draft_laws: Vec<DraftLaw>,
}

/// Draft law with the commitments it implements
#[derive(Debug, Clone, Serialize)]
pub struct DraftLawDetail {
    #[serde(flatten)]
    pub draft_law: DraftLaw,
    pub commitments: Vec<Commitment>,
}

/// Thematic with its commitments and deliberation threads
#[derive(Debug, Clone, Serialize)]
pub struct ThematicDetail {
    #[serde(flatten)]
    pub thematic: Thematic,
    pub commitments: Vec<Commitment>,
    pub polis_threads: Vec<PolisThread>,
}
