//! Record builder: field map → validated [`NewDraftLaw`]

use std::collections::BTreeMap;

use ldt_common::db::models::NewDraftLaw;
use thiserror::Error;

use crate::normalize::{normalize_date, normalize_integer, normalize_kind, normalize_status, FieldError};
use crate::source::{CellValue, FieldMap};

pub const LAW_NUMBER: &str = "law_number";
pub const LAW_TYPE: &str = "law_type";
pub const LAW_DEPOSIT_DATE: &str = "law_deposit_date";
pub const LAW_EVACUATION_DATE: &str = "law_evacuation_date";
pub const LAW_STATUS: &str = "law_status";
pub const LAW_TITLE: &str = "law_title";
pub const LAW_CONTENT: &str = "law_content";
pub const LAW_AUTHORS: &str = "law_authors";

/// Every logical column, in the order fields are validated
pub const LOGICAL_COLUMNS: [&str; 8] = [
    LAW_NUMBER,
    LAW_TYPE,
    LAW_DEPOSIT_DATE,
    LAW_EVACUATION_DATE,
    LAW_STATUS,
    LAW_TITLE,
    LAW_CONTENT,
    LAW_AUTHORS,
];

/// A row that could not be turned into a draft law
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{error}")]
pub struct ValidationFailure {
    pub row_number: usize,
    pub error: FieldError,
}

impl ValidationFailure {
    pub fn field(&self) -> &'static str {
        self.error.field()
    }
}

/// Maps logical columns to the header text used in the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    headers: BTreeMap<&'static str, String>,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            headers: LOGICAL_COLUMNS
                .iter()
                .map(|c| (*c, (*c).to_string()))
                .collect(),
        }
    }
}

impl ColumnMap {
    /// Default map with overrides from `[import.columns]`
    ///
    /// Keys that are not logical column names are returned as an error.
    pub fn with_overrides(overrides: &BTreeMap<String, String>) -> Result<Self, String> {
        let mut map = Self::default();
        for (logical, header) in overrides {
            let Some(column) = LOGICAL_COLUMNS.iter().find(|c| **c == logical.as_str()) else {
                return Err(format!(
                    "unknown import column {logical:?} (expected one of {})",
                    LOGICAL_COLUMNS.join(", ")
                ));
            };
            map.headers.insert(*column, header.trim().to_string());
        }
        Ok(map)
    }

    /// Header text for a logical column
    pub fn header<'a>(&'a self, logical: &'a str) -> &'a str {
        self.headers.get(logical).map(String::as_str).unwrap_or(logical)
    }

    fn cell<'a>(&self, fields: &'a FieldMap, logical: &str) -> Option<&'a CellValue> {
        fields.get(self.header(logical))
    }

    fn trimmed_text(&self, fields: &FieldMap, logical: &str) -> String {
        self.cell(fields, logical)
            .and_then(CellValue::as_text)
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    }
}

fn required<T>(field: &'static str, value: Option<T>) -> Result<T, FieldError> {
    value.ok_or(FieldError::MissingValue { field })
}

/// Build one draft law, stopping at the first invalid field
pub fn build(row_number: usize, fields: &FieldMap, columns: &ColumnMap) -> Result<NewDraftLaw, ValidationFailure> {
    build_fields(fields, columns).map_err(|error| ValidationFailure { row_number, error })
}

fn build_fields(fields: &FieldMap, columns: &ColumnMap) -> Result<NewDraftLaw, FieldError> {
    let law_number = required(
        LAW_NUMBER,
        normalize_integer(LAW_NUMBER, columns.cell(fields, LAW_NUMBER))?,
    )?;
    let kind = required(LAW_TYPE, normalize_kind(LAW_TYPE, columns.cell(fields, LAW_TYPE))?)?;
    let deposit_date = normalize_date(LAW_DEPOSIT_DATE, columns.cell(fields, LAW_DEPOSIT_DATE))?;
    let evacuation_date = normalize_date(LAW_EVACUATION_DATE, columns.cell(fields, LAW_EVACUATION_DATE))?;
    let status = required(
        LAW_STATUS,
        normalize_status(LAW_STATUS, columns.cell(fields, LAW_STATUS))?,
    )?;

    let title = columns.trimmed_text(fields, LAW_TITLE);
    let content = columns.trimmed_text(fields, LAW_CONTENT);
    let authors = Some(columns.trimmed_text(fields, LAW_AUTHORS)).filter(|a| !a.is_empty());

    Ok(NewDraftLaw {
        law_number,
        kind,
        deposit_date,
        evacuation_date,
        status,
        title,
        content,
        authors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ldt_common::vocabulary::{LawKind, LawStatus};

    fn row(cells: &[(&str, CellValue)]) -> FieldMap {
        cells.iter().cloned().collect()
    }

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn well_formed() -> FieldMap {
        row(&[
            (LAW_NUMBER, text("112/A")),
            (LAW_TYPE, text("Projet de loi")),
            (LAW_STATUS, text("Cree")),
            (LAW_TITLE, text("  Test  ")),
            (LAW_DEPOSIT_DATE, text("01/03/2023")),
        ])
    }

    #[test]
    fn builds_reference_row() {
        let law = build(2, &well_formed(), &ColumnMap::default()).unwrap();
        assert_eq!(law.law_number, 112);
        assert_eq!(law.kind, LawKind::ProjetDeLoi);
        assert_eq!(law.status, LawStatus::Created);
        assert_eq!(law.deposit_date, NaiveDate::from_ymd_opt(2023, 3, 1));
        assert_eq!(law.evacuation_date, None);
        assert_eq!(law.title, "Test");
        assert_eq!(law.content, "");
        assert_eq!(law.authors, None);
    }

    #[test]
    fn missing_required_fields() {
        let columns = ColumnMap::default();
        for missing in [LAW_NUMBER, LAW_TYPE, LAW_STATUS] {
            let fields: FieldMap = well_formed()
                .iter()
                .filter(|(k, _)| *k != missing)
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect();
            let failure = build(7, &fields, &columns).unwrap_err();
            assert_eq!(failure.row_number, 7);
            assert_eq!(failure.error, FieldError::MissingValue { field: missing });
        }
    }

    #[test]
    fn number_without_digits_is_missing() {
        let mut fields = well_formed();
        fields.insert(LAW_NUMBER, text("n/a"));
        let failure = build(3, &fields, &ColumnMap::default()).unwrap_err();
        assert_eq!(failure.field(), LAW_NUMBER);
    }

    #[test]
    fn first_invalid_field_is_reported() {
        let mut fields = well_formed();
        fields.insert(LAW_DEPOSIT_DATE, text("2023-03-01"));
        fields.insert(LAW_STATUS, text("nonsense"));
        let failure = build(4, &fields, &ColumnMap::default()).unwrap_err();
        // deposit date is checked before status
        assert_eq!(failure.field(), LAW_DEPOSIT_DATE);
        assert!(failure.to_string().contains("law_deposit_date"));
    }

    #[test]
    fn authors_trimmed_and_blank_is_none() {
        let mut fields = well_formed();
        fields.insert(LAW_AUTHORS, text("   "));
        assert_eq!(build(2, &fields, &ColumnMap::default()).unwrap().authors, None);

        fields.insert(LAW_AUTHORS, text(" Xavier Bettel "));
        assert_eq!(
            build(2, &fields, &ColumnMap::default()).unwrap().authors.as_deref(),
            Some("Xavier Bettel")
        );
    }

    #[test]
    fn column_overrides() {
        let overrides = BTreeMap::from([
            ("law_number".to_string(), "Numéro".to_string()),
            ("law_title".to_string(), " Intitulé ".to_string()),
        ]);
        let columns = ColumnMap::with_overrides(&overrides).unwrap();
        assert_eq!(columns.header(LAW_NUMBER), "Numéro");
        assert_eq!(columns.header(LAW_TITLE), "Intitulé");
        assert_eq!(columns.header(LAW_STATUS), LAW_STATUS);

        let fields = row(&[
            ("Numéro", CellValue::Float(8100.0)),
            (LAW_TYPE, text("Proposition de loi")),
            (LAW_STATUS, text("Publié")),
            ("Intitulé", text("Congé parental")),
        ]);
        let law = build(2, &fields, &columns).unwrap();
        assert_eq!(law.law_number, 8100);
        assert_eq!(law.title, "Congé parental");

        let bad = BTreeMap::from([("law_summary".to_string(), "x".to_string())]);
        assert!(ColumnMap::with_overrides(&bad).is_err());
    }
}
