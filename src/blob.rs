//! Blob side-store - secondary write path for binary columns
//!
//! The primary INSERT/UPDATE carries a NULL placeholder where a blob column
//! sits; the bytes collected at build time are written afterwards, one bound
//! UPDATE per column, addressed by table, column, and the row's key clause.
//! The two writes are separate commits: a failure in between leaves the row
//! without its blob content. No retry or reconciliation is attempted.

use rusqlite::{params, Connection};

use crate::Result;

/// One displaced blob payload, addressed by column name
#[derive(Debug, Clone, PartialEq)]
pub struct BlobWrite {
    pub column: &'static str,
    pub bytes: Vec<u8>,
}

impl BlobWrite {
    pub fn new(column: &'static str, bytes: Vec<u8>) -> Self {
        Self { column, bytes }
    }
}

/// Persist collected blob payloads for the row identified by `key_clause`.
///
/// Called only after the primary statement reported at least one affected
/// row. With an empty key clause the UPDATE runs unqualified and touches
/// every row of the table; keyless blob-bearing tables inherit that hazard.
pub fn store_all(
    conn: &Connection,
    table: &str,
    key_clause: &str,
    blobs: &[BlobWrite],
) -> Result<()> {
    for blob in blobs {
        let sql = if key_clause.is_empty() {
            format!("UPDATE {} SET {} = ?1", table, blob.column)
        } else {
            format!("UPDATE {} SET {} = ?1 WHERE {}", table, blob.column, key_clause)
        };

        tracing::debug!(table, column = blob.column, len = blob.bytes.len(), "blob write");
        conn.execute(&sql, params![blob.bytes])?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_all_writes_each_column() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute(
            "CREATE TABLE Asset(id INTEGER NOT NULL, icon BLOB NULL, raw BLOB NULL, PRIMARY KEY (id))",
            [],
        )
        .unwrap();
        conn.execute("INSERT INTO Asset(id,icon,raw) VALUES('3',NULL,NULL)", [])
            .unwrap();

        let blobs = vec![
            BlobWrite::new("icon", vec![1, 2, 3]),
            BlobWrite::new("raw", vec![9]),
        ];
        store_all(&conn, "Asset", "id='3'", &blobs).unwrap();

        let icon: Vec<u8> = conn
            .query_row("SELECT icon FROM Asset WHERE id='3'", [], |row| row.get(0))
            .unwrap();
        assert_eq!(icon, vec![1, 2, 3]);
    }

    #[test]
    fn test_empty_key_clause_touches_all_rows() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute("CREATE TABLE Note(body TEXT NOT NULL, data BLOB NULL)", [])
            .unwrap();
        conn.execute("INSERT INTO Note(body,data) VALUES('a',NULL)", [])
            .unwrap();
        conn.execute("INSERT INTO Note(body,data) VALUES('b',NULL)", [])
            .unwrap();

        store_all(&conn, "Note", "", &[BlobWrite::new("data", vec![7])]).unwrap();

        let hit: i64 = conn
            .query_row("SELECT COUNT(*) FROM Note WHERE data IS NOT NULL", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(hit, 2);
    }
}
