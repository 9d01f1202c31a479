//! Statement set - one precompiled query per store operation
//!
//! Statements live in the connection's prepared-statement cache and are
//! rebuilt whenever the store is handed a new connection. Operations fetch
//! them back with `prepare_cached`, so no statement outlives its connection.

use rusqlite::Connection;
use crate::Result;

/// Column list shared by every SELECT and RETURNING clause; order matches the codec
macro_rules! record_cols {
    () => {
        "DATAID, CONTEXTID, TYPE, DATA"
    };
}

pub(crate) const READ: &str =
    concat!("SELECT ", record_cols!(), " FROM CONTEXT_DATA WHERE DATAID = ?1");

/// Insert that hands back the generated row in the same step, so the id can
/// never belong to another caller's write.
pub(crate) const INSERT: &str = concat!(
    "INSERT INTO CONTEXT_DATA (CONTEXTID, TYPE, DATA) VALUES (?1, ?2, ?3) RETURNING ",
    record_cols!()
);

pub(crate) const DELETE: &str =
    "DELETE FROM CONTEXT_DATA WHERE CONTEXTID = ?1 AND TYPE = ?2 AND DATA = ?3";

pub(crate) const DELETE_ALL_FOR_CONTEXT: &str = "DELETE FROM CONTEXT_DATA WHERE CONTEXTID = ?1";

pub(crate) const DELETE_ALL_FOR_CONTEXT_AND_TYPE: &str =
    "DELETE FROM CONTEXT_DATA WHERE CONTEXTID = ?1 AND TYPE = ?2";

pub(crate) const SELECT_ALL: &str =
    concat!("SELECT ", record_cols!(), " FROM CONTEXT_DATA ORDER BY DATAID");

pub(crate) const SELECT_FOR_CONTEXT: &str = concat!(
    "SELECT ",
    record_cols!(),
    " FROM CONTEXT_DATA WHERE CONTEXTID = ?1 ORDER BY DATAID"
);

pub(crate) const SELECT_FOR_CONTEXT_AND_TYPE: &str = concat!(
    "SELECT ",
    record_cols!(),
    " FROM CONTEXT_DATA WHERE CONTEXTID = ?1 AND TYPE = ?2 ORDER BY DATAID"
);

/// Every statement the store uses
pub(crate) const ALL: &[&str] = &[
    READ,
    INSERT,
    DELETE,
    DELETE_ALL_FOR_CONTEXT,
    DELETE_ALL_FOR_CONTEXT_AND_TYPE,
    SELECT_ALL,
    SELECT_FOR_CONTEXT,
    SELECT_FOR_CONTEXT_AND_TYPE,
];

/// Compile the full statement set against `conn`.
///
/// Fails if any statement does not prepare (e.g. the table is missing), which
/// aborts the reconnect that asked for it.
pub(crate) fn prepare_all(conn: &Connection) -> Result<()> {
    conn.flush_prepared_statement_cache();
    conn.set_prepared_statement_cache_capacity(ALL.len());
    for sql in ALL {
        conn.prepare_cached(sql)?;
    }
    tracing::debug!("Prepared {} statements", ALL.len());
    Ok(())
}
