//! Storage Layer - SQLite-backed persistence
//!
//! System of record is a single table:
//! - CONTEXT_DATA(DATAID, CONTEXTID, TYPE, DATA)
//!
//! `schema` creates it when absent, `statements` holds the prepared query set,
//! `codec` maps rows to records and `store` exposes the typed operations.

pub mod schema;
mod statements;
mod codec;
pub mod store;

pub use store::ContextRecordStore;
