//! Draft-law import pipeline
//!
//! Row source → field normalizers → record builder → importer. The pipeline
//! is sequential and stores a document's valid rows in one transaction.

use std::path::PathBuf;

use thiserror::Error;

pub mod builder;
pub mod importer;
pub mod normalize;
pub mod seed;
pub mod source;

pub use builder::{build, ColumnMap, ValidationFailure};
pub use importer::{ImportBatch, ImportOptions, ImportOutcome, ImportReport, Importer, RowWarning};
pub use normalize::FieldError;
pub use source::{CellValue, FieldMap, RowSource, SourceRow};

/// Failures that stop an import run
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Document {0} was not found")]
    SourceNotFound(PathBuf),

    #[error("Worksheet '{sheet}' not found in file {path}")]
    SheetNotFound { sheet: String, path: PathBuf },

    #[error("Cannot read {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },

    #[error("Cannot open the database: {0}")]
    StoreUnavailable(#[source] ldt_common::Error),

    /// The batch was rolled back; nothing from it was stored
    #[error("Failed to store draft laws: {0}")]
    PersistenceFailure(#[source] ldt_common::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
