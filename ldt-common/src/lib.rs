//! # Lux Democracy Tracker common library
//!
//! Shared code for the import tool and the web server:
//! - Error type
//! - Configuration loading and database path resolution
//! - Controlled vocabularies (law kinds, statuses, ministries, ...)
//! - SQLite schema bootstrap, models and repositories

pub mod config;
pub mod db;
pub mod error;
pub mod vocabulary;

pub use error::{Error, Result};
pub use vocabulary::{LawKind, LawStatus, Ministry, Vocabulary};
