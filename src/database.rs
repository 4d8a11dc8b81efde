//! Database handle - connection lifecycle and the CRUD surface
//!
//! One [`Database`] value owns at most one live SQLite connection. All
//! operations are synchronous and nothing here is locked: a `Database` is
//! meant to be used from a single thread. The primary row write and the
//! blob side-store write are separate commits (see [`crate::blob`]).

use std::path::{Path, PathBuf};

use rusqlite::Connection;

use crate::config::DbConfig;
use crate::schema::Entity;
use crate::value::Value;
use crate::{blob, query, Error, Result};

/// File suffix every database path is normalized to
const DB_EXTENSION: &str = "sqlite";

/// Handle to one embedded database file
pub struct Database {
    path: PathBuf,
    conn: Option<Connection>,
}

impl Database {
    /// Create a handle for the given file. No connection is opened yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            conn: None,
        }
    }

    /// Create a handle from a loaded config, falling back to the default
    /// database path when the config does not name one.
    pub fn from_config(config: &DbConfig) -> Self {
        let path = config
            .database
            .clone()
            .map(PathBuf::from)
            .unwrap_or_else(crate::config::default_database_path);
        Self::new(path)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn: Some(Connection::open_in_memory()?),
        })
    }

    // ========== Lifecycle ==========

    /// Open the connection, creating the file if it does not exist.
    ///
    /// The path is normalized to a `.sqlite` suffix first. Reopening an
    /// already-open handle drops the previous connection.
    pub fn open(&mut self) -> Result<()> {
        let path = self.path.with_extension(DB_EXTENSION);
        ensure_parent_dir(&path)?;

        tracing::debug!(path = %path.display(), "opening database");
        self.conn = Some(Connection::open(&path)?);
        Ok(())
    }

    /// Close the connection. Idempotent; a failed close is logged and the
    /// handle is released regardless.
    pub fn close(&mut self) {
        if let Some(conn) = self.conn.take() {
            if let Err((_, e)) = conn.close() {
                tracing::warn!("database close failed: {e}");
            }
        }
    }

    /// Whether a live connection is held
    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    fn conn(&self) -> Result<&Connection> {
        self.conn.as_ref().ok_or(Error::NoConnection)
    }

    // ========== Schema ==========

    /// Create the entity's table if it does not exist. Safe to call
    /// repeatedly.
    pub fn create_table<E: Entity>(&self) -> Result<()> {
        let sql = E::schema().create_table_sql();
        tracing::debug!(%sql, "create table");
        self.conn()?.execute(&sql, [])?;
        Ok(())
    }

    // ========== Write Operations ==========

    /// Insert one row, returning the affected-row count. Blob columns are
    /// persisted through the side-store once the insert reports success.
    pub fn insert_row<E: Entity>(&self, entity: &E) -> Result<usize> {
        let conn = self.conn()?;
        let schema = E::schema();
        let (sql, blobs) = query::insert(&schema, entity);

        tracing::debug!(%sql, "insert");
        let affected = conn.execute(&sql, [])?;

        if affected > 0 && !blobs.is_empty() {
            let keys = query::key_clause(&schema, entity);
            blob::store_all(conn, schema.name, &keys, &blobs)?;
        }

        Ok(affected)
    }

    /// Update rows, returning the affected-row count.
    ///
    /// An empty `where_clause` targets the rows matching the entity's key
    /// values; a non-empty clause is used verbatim instead.
    pub fn update_row<E: Entity>(&self, entity: &E, where_clause: &str) -> Result<usize> {
        let conn = self.conn()?;
        let schema = E::schema();
        let (sql, blobs) = query::update(&schema, entity, where_clause);

        tracing::debug!(%sql, "update");
        let affected = conn.execute(&sql, [])?;

        if affected > 0 && !blobs.is_empty() {
            let keys = query::key_clause(&schema, entity);
            blob::store_all(conn, schema.name, &keys, &blobs)?;
        }

        Ok(affected)
    }

    /// Delete the rows matching the entity's current key values
    pub fn delete_row<E: Entity>(&self, entity: &E) -> Result<usize> {
        let schema = E::schema();
        let sql = query::delete(&schema, entity);

        tracing::debug!(%sql, "delete");
        Ok(self.conn()?.execute(&sql, [])?)
    }

    // ========== Read Operations ==========

    /// Select and materialize every row matching `where_clause` (all rows
    /// when the clause is empty), in engine order.
    pub fn select_all_rows<E: Entity>(&self, where_clause: &str) -> Result<Vec<E>> {
        let conn = self.conn()?;
        let schema = E::schema();
        let sql = query::select(&schema, where_clause);

        tracing::debug!(%sql, "select");
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;

        let mut entities = Vec::new();
        while let Some(row) = rows.next()? {
            let mut entity = E::default();
            for (idx, col) in schema.columns.iter().enumerate() {
                let cell = Value::from(row.get_ref(idx)?);
                // An empty cell leaves the field at its default
                if cell.is_null() {
                    continue;
                }
                entity.apply(col.name, cell)?;
            }
            entities.push(entity);
        }

        Ok(entities)
    }

    /// Select the first matching row, or a default-constructed entity when
    /// nothing matches
    pub fn select_one_row<E: Entity>(&self, where_clause: &str) -> Result<E> {
        let entities = self.select_all_rows(where_clause)?;
        Ok(entities.into_iter().next().unwrap_or_default())
    }

    /// Count the rows matching `where_clause` (all rows when empty)
    pub fn rows_total<E: Entity>(&self, where_clause: &str) -> Result<u64> {
        let sql = query::count(E::schema().name, where_clause);

        tracing::debug!(%sql, "count");
        let total: i64 = self.conn()?.query_row(&sql, [], |row| row.get(0))?;
        Ok(total as u64)
    }

    /// Scalar maximum of one declared column, `Value::Null` when the table
    /// is empty or no row matches
    pub fn column_max_value<E: Entity>(&self, column: &str, where_clause: &str) -> Result<Value> {
        let schema = E::schema();
        if schema.column(column).is_none() {
            return Err(Error::UnknownColumn(column.to_string()));
        }

        let sql = query::max(schema.name, column, where_clause);
        tracing::debug!(%sql, "max");
        let value = self
            .conn()?
            .query_row(&sql, [], |row| row.get_ref(0).map(Value::from))?;
        Ok(value)
    }
}

impl Drop for Database {
    fn drop(&mut self) {
        self.close();
    }
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
