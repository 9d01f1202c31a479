//! Database schema definitions
//!
//! The table shape is fixed for compatibility with existing data. There is no
//! versioning: the only lifecycle step is creating the table when it is absent.

use rusqlite::Connection;
use crate::Result;

/// Name of the backing table
pub const TABLE_NAME: &str = "CONTEXT_DATA";

/// SQL to create the context data table.
///
/// `AUTOINCREMENT` keeps ids monotonic and never reused, even after the
/// highest row is deleted. The CHECK mirrors `MAX_DATA_LENGTH`.
pub const CREATE_CONTEXT_DATA_TABLE: &str = r#"
CREATE TABLE CONTEXT_DATA (
    DATAID INTEGER PRIMARY KEY AUTOINCREMENT,
    CONTEXTID INTEGER NOT NULL,
    TYPE INTEGER NOT NULL,
    DATA TEXT DEFAULT '' CHECK (length(DATA) <= 1048576)
)
"#;

/// SQL to create the scope index used by the per-context queries
pub const CREATE_SCOPE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_context_data_scope ON CONTEXT_DATA(CONTEXTID, TYPE)";

/// Check whether a table exists (names compare case-insensitively, as in SQL)
pub fn has_table(conn: &Connection, name: &str) -> Result<bool> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1 COLLATE NOCASE)",
        [name],
        |row| row.get(0),
    )?;
    Ok(exists)
}

/// Create the context data table if it is absent.
///
/// Returns `true` when the table was created by this call.
pub fn ensure_schema(conn: &Connection) -> Result<bool> {
    if has_table(conn, TABLE_NAME)? {
        return Ok(false);
    }

    tracing::info!("Creating table {}", TABLE_NAME);
    conn.execute(CREATE_CONTEXT_DATA_TABLE, [])?;
    conn.execute(CREATE_SCOPE_INDEX, [])?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creates_table_on_fresh_db() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(!has_table(&conn, TABLE_NAME).unwrap());

        assert!(ensure_schema(&conn).unwrap());
        assert!(has_table(&conn, TABLE_NAME).unwrap());
        assert!(has_table(&conn, "context_data").unwrap());
    }

    #[test]
    fn test_existing_table_is_left_alone() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        conn.execute(
            "INSERT INTO CONTEXT_DATA (CONTEXTID, TYPE, DATA) VALUES (1, 2, 'kept')",
            [],
        )
        .unwrap();

        assert!(!ensure_schema(&conn).unwrap());

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM CONTEXT_DATA", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_defaults_and_first_id() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        conn.execute("INSERT INTO CONTEXT_DATA (CONTEXTID, TYPE) VALUES (4, 5)", [])
            .unwrap();

        let (id, data): (i64, String) = conn
            .query_row("SELECT DATAID, DATA FROM CONTEXT_DATA", [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .unwrap();
        assert_eq!(id, 1);
        assert_eq!(data, "");
    }

    #[test]
    fn test_required_columns_reject_null() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();

        let result = conn.execute("INSERT INTO CONTEXT_DATA (TYPE, DATA) VALUES (1, 'x')", []);
        assert!(result.is_err());
    }
}
