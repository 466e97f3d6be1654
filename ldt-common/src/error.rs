//! Common error types for the tracker

use thiserror::Error;

/// Common result type for store and configuration operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the import tool and the web server
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The (draft law, commitment) pair is already linked
    #[error("Draft law {draft_law_id} is already linked to commitment {commitment_id}")]
    DuplicateLink {
        draft_law_id: i64,
        commitment_id: i64,
    },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
