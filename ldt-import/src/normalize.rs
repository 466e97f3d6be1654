//! Field normalizers: raw cell values → typed values
//!
//! All functions here are pure. Enumerated fields are resolved through
//! ordered trigger tables: the cell text is lower-cased, trimmed and stripped
//! of Latin accents, then each [`Trigger`] is tested in turn and the first one
//! whose clauses all match wins. Only when no trigger fires is the raw text
//! compared against the vocabulary's canonical values.

use chrono::NaiveDate;
use ldt_common::vocabulary::{LawKind, LawStatus, Vocabulary};
use thiserror::Error;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::source::CellValue;

/// Date layout accepted in text cells
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Why a single field could not be normalized
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("{field} must be in dd/mm/yyyy format (got {raw:?})")]
    InvalidDateFormat { field: &'static str, raw: String },

    #[error("{field}: unknown value {raw:?}")]
    UnknownEnumValue { field: &'static str, raw: String },

    #[error("{field}: value is required")]
    MissingValue { field: &'static str },

    #[error("{field}: {raw:?} is out of range")]
    OutOfRange { field: &'static str, raw: String },
}

impl FieldError {
    /// Logical field the error refers to
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidDateFormat { field, .. }
            | Self::UnknownEnumValue { field, .. }
            | Self::MissingValue { field }
            | Self::OutOfRange { field, .. } => field,
        }
    }
}

/// One entry of an ordered trigger table
///
/// `clauses` are AND-ed; the substrings inside a clause are OR-ed.
#[derive(Debug, Clone, Copy)]
pub struct Trigger<T: 'static> {
    pub clauses: &'static [&'static [&'static str]],
    pub value: T,
}

impl<T: Copy> Trigger<T> {
    /// Test against text already passed through [`fold_text`]
    pub fn matches(&self, folded: &str) -> bool {
        self.clauses
            .iter()
            .all(|alternatives| alternatives.iter().any(|needle| folded.contains(needle)))
    }
}

/// First trigger matching `folded`
pub fn first_match<T: Copy>(triggers: &[Trigger<T>], folded: &str) -> Option<T> {
    triggers.iter().find(|t| t.matches(folded)).map(|t| t.value)
}

pub const KIND_TRIGGERS: &[Trigger<LawKind>] = &[
    Trigger {
        clauses: &[&["projet", "draft"]],
        value: LawKind::ProjetDeLoi,
    },
    Trigger {
        clauses: &[&["proposition", "proposal"]],
        value: LawKind::PropositionDeLoi,
    },
];

/// Status triggers; order is significant
///
/// Vote-rejected precedes vote-accepted so a cell mentioning both resolves to
/// the rejection.
pub const STATUS_TRIGGERS: &[Trigger<LawStatus>] = &[
    Trigger {
        clauses: &[&["avise", "conference"]],
        value: LawStatus::AviseParConferencePreside,
    },
    Trigger {
        clauses: &[&["cree", "creat"]],
        value: LawStatus::Created,
    },
    Trigger {
        clauses: &[&["attente", "dispens"]],
        value: LawStatus::EnAttenteDispenseSecond,
    },
    Trigger {
        clauses: &[&["commission"]],
        value: LawStatus::EnCommission,
    },
    Trigger {
        clauses: &[&["evac", "conjoint"]],
        value: LawStatus::EvacueConjointement,
    },
    Trigger {
        clauses: &[&["fusion"]],
        value: LawStatus::Fusionne,
    },
    Trigger {
        clauses: &[&["publi"]],
        value: LawStatus::Publie,
    },
    Trigger {
        clauses: &[&["retir"]],
        value: LawStatus::Retire,
    },
    Trigger {
        clauses: &[&["vide", "empty"]],
        value: LawStatus::Vide,
    },
    Trigger {
        clauses: &[&["vote"], &["refus", "reject", "rejet"]],
        value: LawStatus::VoteRefuse,
    },
    Trigger {
        clauses: &[&["vote"], &["accept"]],
        value: LawStatus::VoteAccepte,
    },
];

/// Short codes found in older exports, matched against the whole folded text
pub const STATUS_ABBREVIATIONS: &[(&str, LawStatus)] = &[
    ("rafu", LawStatus::Retire),
    ("refu", LawStatus::VoteRefuse),
    ("acce", LawStatus::VoteAccepte),
];

/// Lower-case, trim and strip combining accents (`Créé` → `cree`)
pub fn fold_text(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}

/// Text of a non-blank cell, `None` when empty or whitespace only
fn present_text(value: Option<&CellValue>) -> Option<String> {
    value
        .and_then(CellValue::as_text)
        .filter(|text| !text.trim().is_empty())
}

/// Parse an optional calendar date
///
/// Typed date cells pass through; text must be `dd/mm/yyyy`.
pub fn normalize_date(field: &'static str, value: Option<&CellValue>) -> Result<Option<NaiveDate>, FieldError> {
    match value {
        None | Some(CellValue::Empty) => Ok(None),
        Some(CellValue::Date(date)) => Ok(Some(*date)),
        Some(CellValue::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(CellValue::Text(text)) => Some(text.trim())
            .filter(|t| has_date_shape(t))
            .and_then(|t| NaiveDate::parse_from_str(t, DATE_FORMAT).ok())
            .map(Some)
            .ok_or_else(|| FieldError::InvalidDateFormat {
                field,
                raw: text.clone(),
            }),
        Some(other) => Err(FieldError::InvalidDateFormat {
            field,
            raw: other.as_text().unwrap_or_default(),
        }),
    }
}

/// `d/m/yyyy` digit groups: day and month 1-2 digits, year exactly 4
///
/// chrono's `%Y` alone also takes short and signed years.
fn has_date_shape(text: &str) -> bool {
    let groups: Vec<&str> = text.split('/').collect();
    let digits = |s: &str, min: usize, max: usize| {
        (min..=max).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_digit())
    };
    matches!(groups.as_slice(), [d, m, y] if digits(d, 1, 2) && digits(m, 1, 2) && digits(y, 4, 4))
}

/// Keep only the digits of a cell and parse them
///
/// `112/A` → 112. No digits at all is `None`, not an error.
pub fn normalize_integer(field: &'static str, value: Option<&CellValue>) -> Result<Option<u32>, FieldError> {
    let Some(text) = present_text(value) else {
        return Ok(None);
    };

    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return Ok(None);
    }

    digits
        .parse::<u32>()
        .map(Some)
        .map_err(|_| FieldError::OutOfRange { field, raw: text })
}

fn normalize_enum<T: Vocabulary>(
    field: &'static str,
    value: Option<&CellValue>,
    triggers: &[Trigger<T>],
    abbreviations: &[(&str, T)],
) -> Result<Option<T>, FieldError> {
    let Some(raw) = present_text(value) else {
        return Ok(None);
    };

    let folded = fold_text(&raw);
    let resolved = first_match(triggers, &folded)
        .or_else(|| {
            abbreviations
                .iter()
                .find(|(code, _)| *code == folded)
                .map(|(_, v)| *v)
        })
        .or_else(|| T::from_literal(raw.trim()));

    match resolved {
        Some(v) => Ok(Some(v)),
        None => Err(FieldError::UnknownEnumValue { field, raw }),
    }
}

/// Resolve free text to a [`LawKind`]
pub fn normalize_kind(field: &'static str, value: Option<&CellValue>) -> Result<Option<LawKind>, FieldError> {
    normalize_enum(field, value, KIND_TRIGGERS, &[])
}

/// Resolve free text to a [`LawStatus`]
pub fn normalize_status(field: &'static str, value: Option<&CellValue>) -> Result<Option<LawStatus>, FieldError> {
    normalize_enum(field, value, STATUS_TRIGGERS, STATUS_ABBREVIATIONS)
}
