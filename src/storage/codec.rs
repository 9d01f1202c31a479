//! Row-to-record mapping for the context data table

use crate::record::ContextRecord;

/// Helper to convert a row to a ContextRecord.
///
/// Expects the column order `DATAID, CONTEXTID, TYPE, DATA`. A NULL payload
/// (written by older schemas without the default) decodes as empty.
pub(crate) fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<ContextRecord> {
    let data: Option<String> = row.get(3)?;
    Ok(ContextRecord::new(
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        data.unwrap_or_default(),
    ))
}

/// Collect every row of a query through `row_to_record`, failing on the first bad row
pub(crate) fn collect_records(
    stmt: &mut rusqlite::Statement<'_>,
    params: impl rusqlite::Params,
) -> rusqlite::Result<Vec<ContextRecord>> {
    stmt.query_map(params, row_to_record)?.collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::schema;
    use rusqlite::Connection;

    fn seeded() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        schema::ensure_schema(&conn).unwrap();
        conn.execute_batch(
            "INSERT INTO CONTEXT_DATA (CONTEXTID, TYPE, DATA) VALUES (1, 3, 'a');
             INSERT INTO CONTEXT_DATA (CONTEXTID, TYPE, DATA) VALUES (1, 4, NULL);",
        )
        .unwrap();
        conn
    }

    #[test]
    fn test_maps_columns_in_order() {
        let conn = seeded();
        let record = conn
            .query_row(
                "SELECT DATAID, CONTEXTID, TYPE, DATA FROM CONTEXT_DATA WHERE DATAID = 1",
                [],
                row_to_record,
            )
            .unwrap();
        assert_eq!(record, ContextRecord::new(1, 1, 3, "a"));
    }

    #[test]
    fn test_null_payload_decodes_empty() {
        let conn = seeded();
        let mut stmt = conn
            .prepare("SELECT DATAID, CONTEXTID, TYPE, DATA FROM CONTEXT_DATA ORDER BY DATAID")
            .unwrap();
        let records = collect_records(&mut stmt, []).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].data, "");
        assert_eq!(records[1].data_type, 4);
    }

    #[test]
    fn test_type_mismatch_is_an_error() {
        let conn = Connection::open_in_memory().unwrap();
        let result = conn.query_row("SELECT 'x', 1, 2, 'd'", [], row_to_record);
        assert!(result.is_err());
    }
}
