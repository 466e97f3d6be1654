//! Import orchestrator
//!
//! One pass over a document: every row goes through the record builder, the
//! summary is written, and then (unless this is a dry run or nothing is
//! valid) all valid records are stored in a single transaction.

use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};

use ldt_common::db::draft_laws::insert_draft_laws;
use ldt_common::db::models::NewDraftLaw;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::builder::{build, ColumnMap, ValidationFailure};
use crate::source::RowSource;
use crate::ImportError;

/// Per-run options
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Worksheet to read; first sheet when `None`
    pub sheet: Option<String>,
    /// Validate and report without writing
    pub dry_run: bool,
}

/// A skipped row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowWarning {
    pub row_number: usize,
    pub message: String,
}

impl From<ValidationFailure> for RowWarning {
    fn from(failure: ValidationFailure) -> Self {
        Self {
            row_number: failure.row_number,
            message: failure.error.to_string(),
        }
    }
}

/// What happened after validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ImportOutcome {
    DryRun,
    NothingToInsert,
    Inserted { ids: Vec<i64> },
}

/// Validated content of a document, not yet persisted
#[derive(Debug, Clone)]
pub struct ImportBatch {
    pub source: PathBuf,
    pub rows_processed: usize,
    pub valid: Vec<NewDraftLaw>,
    pub warnings: Vec<RowWarning>,
}

impl ImportBatch {
    /// Outcome reached without touching the store, if any
    ///
    /// An empty batch is "nothing to insert" even in dry-run mode.
    pub fn outcome_without_store(&self, dry_run: bool) -> Option<ImportOutcome> {
        if self.valid.is_empty() {
            Some(ImportOutcome::NothingToInsert)
        } else if dry_run {
            Some(ImportOutcome::DryRun)
        } else {
            None
        }
    }

    /// Store every valid record in one transaction
    pub async fn persist(&self, pool: &SqlitePool) -> Result<Vec<i64>, ImportError> {
        insert_draft_laws(pool, &self.valid)
            .await
            .map_err(ImportError::PersistenceFailure)
    }

    /// Processed/warnings/valid lines
    pub fn write_summary(&self, out: &mut impl Write) -> std::io::Result<()> {
        writeln!(
            out,
            "Processed {} row(s) from {}.",
            self.rows_processed,
            self.source.display()
        )?;
        if !self.warnings.is_empty() {
            writeln!(out, "Warnings for skipped rows:")?;
            for warning in &self.warnings {
                writeln!(out, "  - Row {}: {}", warning.row_number, warning.message)?;
            }
        }
        writeln!(out, "{} row(s) are valid.", self.valid.len())
    }

    pub fn into_report(self, outcome: ImportOutcome) -> ImportReport {
        ImportReport {
            source: self.source,
            rows_processed: self.rows_processed,
            valid_count: self.valid.len(),
            warnings: self.warnings,
            outcome,
        }
    }
}

/// Final line for an outcome
pub fn write_outcome(out: &mut impl Write, outcome: &ImportOutcome) -> std::io::Result<()> {
    match outcome {
        ImportOutcome::NothingToInsert => writeln!(out, "No valid draft laws to insert."),
        ImportOutcome::DryRun => writeln!(out, "Dry run enabled; nothing was written to the database."),
        ImportOutcome::Inserted { ids } => {
            writeln!(out, "Inserted {} draft law(s) into the database.", ids.len())
        }
    }
}

/// Result of a complete run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub source: PathBuf,
    pub rows_processed: usize,
    pub valid_count: usize,
    pub warnings: Vec<RowWarning>,
    #[serde(flatten)]
    pub outcome: ImportOutcome,
}

/// Draft-law importer
#[derive(Debug, Clone, Default)]
pub struct Importer {
    columns: ColumnMap,
}

impl Importer {
    pub fn new(columns: ColumnMap) -> Self {
        Self { columns }
    }

    /// Read and validate every row of a document
    ///
    /// Fails only when the document cannot be read; invalid rows become
    /// warnings.
    pub fn validate(&self, path: &Path, sheet: Option<&str>) -> Result<ImportBatch, ImportError> {
        if !path.exists() {
            return Err(ImportError::SourceNotFound(path.to_path_buf()));
        }
        let source_path = std::fs::canonicalize(path)?;
        let source = RowSource::open(&source_path, sheet)?;

        let mut batch = ImportBatch {
            source: source_path,
            rows_processed: 0,
            valid: Vec::new(),
            warnings: Vec::new(),
        };

        for row in source {
            let row = row?;
            batch.rows_processed += 1;
            match build(row.row_number, &row.fields, &self.columns) {
                Ok(law) => batch.valid.push(law),
                Err(failure) => {
                    debug!(row = failure.row_number, field = failure.field(), "Skipping row: {}", failure);
                    batch.warnings.push(failure.into());
                }
            }
        }

        info!(
            "Validated {}: {} row(s), {} valid, {} skipped",
            batch.source.display(),
            batch.rows_processed,
            batch.valid.len(),
            batch.warnings.len()
        );
        Ok(batch)
    }

    /// Validate, report and (unless dry run) persist into `pool`
    pub async fn run(
        &self,
        pool: &SqlitePool,
        path: &Path,
        options: &ImportOptions,
        out: &mut impl Write,
    ) -> Result<ImportReport, ImportError> {
        self.run_with_store(path, options, out, move || async move { Ok(pool.clone()) })
            .await
    }

    /// Validate, report and (unless dry run) persist
    ///
    /// `open_store` is only called when there are valid rows to write, so a
    /// dry run or an all-invalid document never touches the database. The
    /// summary is written to `out` before the store is opened, so it is
    /// visible even when persistence fails.
    pub async fn run_with_store<F, Fut>(
        &self,
        path: &Path,
        options: &ImportOptions,
        out: &mut impl Write,
        open_store: F,
    ) -> Result<ImportReport, ImportError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ldt_common::Result<SqlitePool>>,
    {
        let batch = self.validate(path, options.sheet.as_deref())?;
        batch.write_summary(out)?;
        out.flush()?;

        let outcome = match batch.outcome_without_store(options.dry_run) {
            Some(outcome) => outcome,
            None => {
                let pool = open_store().await.map_err(ImportError::StoreUnavailable)?;
                match batch.persist(&pool).await {
                    Ok(ids) => ImportOutcome::Inserted { ids },
                    Err(e) => {
                        warn!("Import of {} rolled back: {}", batch.source.display(), e);
                        return Err(e);
                    }
                }
            }
        };

        write_outcome(out, &outcome)?;
        Ok(batch.into_report(outcome))
    }
}
