//! # context-store - Context-scoped record persistence
//!
//! Stores opaque string payloads tagged with an owning context id and a type
//! discriminator, and exposes them through typed operations only.
//!
//! context-store provides:
//! - `ContextRecordStore`: read, insert, delete, bulk-replace and enumerate records
//! - Create-if-absent schema and a prepared statement set rebuilt on every reconnect
//! - A connection provider that hands fresh SQLite connections to its listeners
//! - A small CLI (`ctxstore`) for inspecting and editing a store

pub mod record;
pub mod storage;
pub mod provider;
pub mod config;
pub mod output;
pub mod ui;

// Re-exports for convenient access
pub use record::{ContextRecord, MAX_DATA_LENGTH};
pub use storage::ContextRecordStore;
pub use provider::{Database, DatabaseConfig, ReconnectListener};

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, PersistenceError>;

/// The single error kind raised for any backing-store fault
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Store is not connected to a database")]
    Disconnected,

    #[error("Payload of {length} characters exceeds the {limit} character limit")]
    PayloadTooLong { length: usize, limit: usize },

    #[error("Store lock poisoned by a panicked caller")]
    Poisoned,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
