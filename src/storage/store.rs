//! ContextRecordStore - typed access to the context data table
//!
//! The store owns at most one connection at a time, behind a single mutex.
//! Every operation holds the guard for its full duration, so the statement
//! cache and the connection's session state are never shared between callers.
//! A new connection arrives through `attach` (usually from the provider's
//! reconnect notification), which creates the table if needed and rebuilds
//! the statement set before any operation can observe the connection.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use rusqlite::{Connection, OptionalExtension, params};

use super::{codec, schema, statements};
use crate::provider::ReconnectListener;
use crate::record::{ContextRecord, MAX_DATA_LENGTH};
use crate::{PersistenceError, Result};

/// Connection lifecycle of a store
enum StoreState {
    /// No usable connection; every operation fails fast
    Disconnected,
    /// Schema ensured and statement set prepared on this connection
    Ready(Connection),
}

/// SQLite-backed store for context records
pub struct ContextRecordStore {
    state: Mutex<StoreState>,
}

impl Default for ContextRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextRecordStore {
    /// Create a store with no connection. Operations fail until `attach` succeeds.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(StoreState::Disconnected),
        }
    }

    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let store = Self::new();
        store.attach(Connection::open(path)?)?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let store = Self::new();
        store.attach(Connection::open_in_memory()?)?;
        Ok(store)
    }

    // ========== Connection Lifecycle ==========

    /// Take ownership of a fresh connection.
    ///
    /// Any previous connection is dropped first. The table is created if absent
    /// and every statement is recompiled; on failure the store stays
    /// disconnected and the error is returned to the caller that reconnected.
    /// A successful attach also clears a poisoned guard.
    pub fn attach(&self, conn: Connection) -> Result<()> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        self.state.clear_poison();
        *state = StoreState::Disconnected;

        if let Err(e) = schema::ensure_schema(&conn).and_then(|_| statements::prepare_all(&conn)) {
            tracing::warn!("Reconnect failed, store left disconnected: {}", e);
            return Err(e);
        }

        *state = StoreState::Ready(conn);
        tracing::info!("Context store connected");
        Ok(())
    }

    /// Release the current connection, if any, and return it to the caller
    pub fn detach(&self) -> Option<Connection> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        match std::mem::replace(&mut *state, StoreState::Disconnected) {
            StoreState::Ready(conn) => {
                tracing::info!("Context store disconnected");
                Some(conn)
            }
            StoreState::Disconnected => None,
        }
    }

    /// Whether the store currently holds a prepared connection
    pub fn is_connected(&self) -> bool {
        self.lock()
            .map(|state| matches!(*state, StoreState::Ready(_)))
            .unwrap_or(false)
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>> {
        self.state.lock().map_err(|_| PersistenceError::Poisoned)
    }

    /// Run `op` with exclusive use of the connection
    fn with_connection<T>(&self, op: impl FnOnce(&mut Connection) -> Result<T>) -> Result<T> {
        let mut state = self.lock()?;
        match &mut *state {
            StoreState::Ready(conn) => op(conn),
            StoreState::Disconnected => Err(PersistenceError::Disconnected),
        }
    }

    // ========== Record Operations ==========

    /// Get a record by id. `Ok(None)` when no row matches.
    pub fn read(&self, id: i64) -> Result<Option<ContextRecord>> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare_cached(statements::READ)?;
            let record = stmt.query_row([id], codec::row_to_record).optional()?;
            Ok(record)
        })
    }

    /// Insert a record and return it as stored, including its generated id
    pub fn insert(&self, context_id: i32, data_type: i32, data: &str) -> Result<ContextRecord> {
        self.with_connection(|conn| insert_row(conn, context_id, data_type, data))
    }

    /// Delete every record matching the exact triple. Matching nothing is not an error.
    pub fn delete(&self, context_id: i32, data_type: i32, data: &str) -> Result<()> {
        self.with_connection(|conn| {
            let removed = conn
                .prepare_cached(statements::DELETE)?
                .execute(params![context_id, data_type, data])?;
            tracing::debug!("Deleted {} record(s) from scope ({}, {})", removed, context_id, data_type);
            Ok(())
        })
    }

    /// Delete every record in the `(context_id, data_type)` scope
    pub fn delete_all_data_for_context_and_type(&self, context_id: i32, data_type: i32) -> Result<()> {
        self.with_connection(|conn| {
            delete_scope(conn, context_id, data_type)?;
            Ok(())
        })
    }

    /// Delete every record owned by a context
    pub fn delete_all_data_for_context(&self, context_id: i32) -> Result<()> {
        self.with_connection(|conn| {
            let removed = conn
                .prepare_cached(statements::DELETE_ALL_FOR_CONTEXT)?
                .execute([context_id])?;
            tracing::debug!("Deleted {} record(s) for context {}", removed, context_id);
            Ok(())
        })
    }

    // ========== Enumeration ==========

    /// All records, in insertion order.
    ///
    /// Synchronized like every other operation, so it never observes a
    /// half-finished `set_data`.
    pub fn get_all_data(&self) -> Result<Vec<ContextRecord>> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare_cached(statements::SELECT_ALL)?;
            Ok(codec::collect_records(&mut stmt, [])?)
        })
    }

    /// All records owned by a context, in insertion order
    pub fn get_data_for_context(&self, context_id: i32) -> Result<Vec<ContextRecord>> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare_cached(statements::SELECT_FOR_CONTEXT)?;
            Ok(codec::collect_records(&mut stmt, [context_id])?)
        })
    }

    /// All records in the `(context_id, data_type)` scope, in insertion order
    pub fn get_data_for_context_and_type(
        &self,
        context_id: i32,
        data_type: i32,
    ) -> Result<Vec<ContextRecord>> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare_cached(statements::SELECT_FOR_CONTEXT_AND_TYPE)?;
            Ok(codec::collect_records(&mut stmt, params![context_id, data_type])?)
        })
    }

    // ========== Bulk Operations ==========

    /// Replace the whole `(context_id, data_type)` scope with `data_list`.
    ///
    /// Runs in one transaction: either the scope holds exactly the new entries
    /// (inserted in list order) or, on error, its previous contents.
    pub fn set_data<S: AsRef<str>>(
        &self,
        context_id: i32,
        data_type: i32,
        data_list: &[S],
    ) -> Result<Vec<ContextRecord>> {
        self.with_connection(|conn| {
            let tx = conn.transaction()?;
            delete_scope(&tx, context_id, data_type)?;

            let mut records = Vec::with_capacity(data_list.len());
            for data in data_list {
                records.push(insert_row(&tx, context_id, data_type, data.as_ref())?);
            }

            tx.commit()?;
            Ok(records)
        })
    }
}

impl ReconnectListener for ContextRecordStore {
    fn reconnect(&self, conn: Connection) -> Result<()> {
        self.attach(conn)
    }

    fn disconnect(&self) {
        self.detach();
    }
}

/// SQLite's `length()` stops at the first NUL, so the table CHECK alone
/// cannot bound every payload.
fn check_payload_length(data: &str) -> Result<()> {
    let length = data.chars().count();
    if length > MAX_DATA_LENGTH {
        return Err(PersistenceError::PayloadTooLong {
            length,
            limit: MAX_DATA_LENGTH,
        });
    }
    Ok(())
}

fn insert_row(conn: &Connection, context_id: i32, data_type: i32, data: &str) -> Result<ContextRecord> {
    check_payload_length(data)?;
    let mut stmt = conn.prepare_cached(statements::INSERT)?;
    let record = stmt.query_row(params![context_id, data_type, data], codec::row_to_record)?;
    tracing::debug!("Inserted record {} into scope ({}, {})", record.id, context_id, data_type);
    Ok(record)
}

fn delete_scope(conn: &Connection, context_id: i32, data_type: i32) -> Result<usize> {
    let removed = conn
        .prepare_cached(statements::DELETE_ALL_FOR_CONTEXT_AND_TYPE)?
        .execute(params![context_id, data_type])?;
    tracing::debug!("Deleted {} record(s) from scope ({}, {})", removed, context_id, data_type);
    Ok(removed)
}
