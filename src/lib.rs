//! # Docgraph - Documentation Graph Exporter
//!
//! Exports an already-resolved, in-memory documentation model (classes,
//! namespaces, files, groups, pages, directories and their members) into a
//! relational SQLite graph with stable cross-reference identities.
//!
//! Docgraph provides:
//! - A stable identity registry mapping symbolic reference keys and file
//!   paths to integer ids (lookup-or-create, never reassigned)
//! - Declaration/definition merging: a member observed twice with
//!   complementary halves collapses into one row
//! - Six deduplicated relation graphs: inclusion, containment, inheritance,
//!   reimplementation, cross-reference, membership
//! - A shared parameter pool reused across overloads
//! - One atomic export transaction: consumers never observe a partial graph

pub mod kinds;
pub mod model;
pub mod render;
pub mod config;
pub mod export;
pub mod query;

// Re-exports for convenient access
pub use kinds::{CompoundKind, MemberKind, Protection, Virtuality, XrefContext};
pub use model::{Compound, DocModel, Member};
pub use export::{ExportSession, Exporter};
pub use query::QueryEngine;
pub use render::{PlainRenderer, Rendered, TextRenderer};

/// Result type alias for Docgraph operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Docgraph operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Model error: {0}")]
    Model(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Export error: {0}")]
    Export(String),
}
