//! SQLite store: bootstrap, models and repositories

pub mod commitments;
pub mod draft_laws;
pub mod init;
pub mod links;
pub mod migrations;
pub mod models;
pub mod tables;
pub mod thematics;

pub use init::*;
pub use links::{link_draft_law, unlink_draft_law, LinkResult};
pub use migrations::*;
pub use models::*;
