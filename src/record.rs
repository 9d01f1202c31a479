//! Context records - the sole persisted entity
//!
//! A record is an opaque payload scoped by `(context_id, data_type)`.
//! Records are never updated in place: a replace is a delete followed by
//! fresh inserts, each of which receives a new id.

use serde::{Deserialize, Serialize};

/// Maximum payload length in characters
pub const MAX_DATA_LENGTH: usize = 1_048_576;

/// Well-known type discriminators used by context-aware applications.
///
/// The store never interprets these values; any `i32` is a valid type.
pub mod data_type {
    /// Context name
    pub const NAME: i32 = 1;
    /// Free-form context description
    pub const DESCRIPTION: i32 = 2;
    /// URL pattern included in the context
    pub const INCLUDE: i32 = 3;
    /// URL pattern excluded from the context
    pub const EXCLUDE: i32 = 4;
    /// Whether the context is in scope
    pub const IN_SCOPE: i32 = 5;
    /// Technology included in the context
    pub const INCLUDE_TECH: i32 = 6;
    /// Technology excluded from the context
    pub const EXCLUDE_TECH: i32 = 7;

    /// Resolve a symbolic name (as accepted by the CLI) to its discriminator
    pub fn from_name(name: &str) -> Option<i32> {
        match name.to_lowercase().as_str() {
            "name" => Some(NAME),
            "description" | "desc" => Some(DESCRIPTION),
            "include" | "incl" => Some(INCLUDE),
            "exclude" | "excl" => Some(EXCLUDE),
            "in_scope" | "inscope" | "scope" => Some(IN_SCOPE),
            "include_tech" => Some(INCLUDE_TECH),
            "exclude_tech" => Some(EXCLUDE_TECH),
            _ => None,
        }
    }

    /// Symbolic name of a well-known discriminator, if any
    pub fn name_of(value: i32) -> Option<&'static str> {
        match value {
            NAME => Some("name"),
            DESCRIPTION => Some("description"),
            INCLUDE => Some("include"),
            EXCLUDE => Some("exclude"),
            IN_SCOPE => Some("in_scope"),
            INCLUDE_TECH => Some("include_tech"),
            EXCLUDE_TECH => Some("exclude_tech"),
            _ => None,
        }
    }
}

/// A persisted record attached to a context.
///
/// Only the store constructs records with a real `id`; callers receive them
/// from `insert`, `read` and the enumeration operations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContextRecord {
    /// Store-generated identifier (starts at 1, never reused)
    pub id: i64,
    /// Owning context
    pub context_id: i32,
    /// Category of data within the context
    #[serde(rename = "type")]
    pub data_type: i32,
    /// Opaque payload
    pub data: String,
}

impl ContextRecord {
    pub(crate) fn new(id: i64, context_id: i32, data_type: i32, data: impl Into<String>) -> Self {
        Self {
            id,
            context_id,
            data_type,
            data: data.into(),
        }
    }

    /// The `(context_id, data_type)` scope this record belongs to
    pub fn scope(&self) -> (i32, i32) {
        (self.context_id, self.data_type)
    }

    /// Human-readable label for the type discriminator
    pub fn type_label(&self) -> String {
        match data_type::name_of(self.data_type) {
            Some(name) => name.to_string(),
            None => self.data_type.to_string(),
        }
    }
}
