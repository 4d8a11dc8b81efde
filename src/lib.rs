//! # Rowlite - Typed Row Mapping over Embedded SQLite
//!
//! A lightweight object-relational mapping layer over a single SQLite file.
//!
//! Rowlite provides:
//! - Registration-time schema descriptors (no runtime reflection)
//! - Dynamic SQL generation for create/insert/update/delete/select/count
//! - Row materialization back into typed entities
//! - A side write path for blob-valued columns
//!
//! The SQL text builder embeds values as quoted literals for compatibility
//! with the legacy wire behavior it reimplements; it performs no quote
//! escaping. See [`query`] for the exact rules and failure modes.

pub mod blob;
pub mod config;
pub mod database;
pub mod query;
pub mod schema;
pub mod value;

// Re-exports for convenient access
pub use database::Database;
pub use schema::{ColumnDef, ColumnType, Entity, TableSchema};
pub use value::Value;

/// Result type alias for Rowlite operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Rowlite operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no open connection: call Database::open() first")]
    NoConnection,

    #[error("unknown column: {0}")]
    UnknownColumn(String),

    #[error("cannot convert {from} cell into {to}")]
    Conversion {
        from: &'static str,
        to: &'static str,
    },

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
