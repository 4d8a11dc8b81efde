//! Schema descriptors - registration-time table metadata
//!
//! An [`Entity`] declares its table once, as an ordered list of
//! [`ColumnDef`]s. Column order is declaration order and drives every
//! generated statement, so output is deterministic across runs.

use crate::{Result, Value};

/// Storage class a declared field maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Real,
    Text,
    Blob,
}

impl ColumnType {
    /// SQL type name used in CREATE TABLE statements
    pub fn sql_name(self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Text => "TEXT",
            ColumnType::Blob => "BLOB",
        }
    }
}

/// One persisted column: name, storage class, nullability, key membership.
///
/// A field without a `ColumnDef` is invisible to the mapper: never written,
/// never read back.
#[derive(Debug, Clone)]
pub struct ColumnDef {
    pub name: &'static str,
    pub ty: ColumnType,
    pub nullable: bool,
    pub key: bool,
}

impl ColumnDef {
    pub fn new(name: &'static str, ty: ColumnType) -> Self {
        Self {
            name,
            ty,
            nullable: false,
            key: false,
        }
    }

    /// Mark the column nullable (the host field is an `Option`)
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Mark the column as part of the primary key
    pub fn key(mut self) -> Self {
        self.key = true;
        self
    }
}

/// Resolved metadata for one mapped table
#[derive(Debug, Clone)]
pub struct TableSchema {
    pub name: &'static str,
    pub columns: Vec<ColumnDef>,
}

impl TableSchema {
    pub fn new(name: &'static str, columns: Vec<ColumnDef>) -> Self {
        Self { name, columns }
    }

    /// Key columns in declaration order
    pub fn key_columns(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns.iter().filter(|c| c.key)
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Build the idempotent CREATE TABLE statement for this schema.
    ///
    /// The PRIMARY KEY clause is appended only when at least one column is
    /// marked key; otherwise the trailing separator is trimmed and the
    /// statement closes without it.
    pub fn create_table_sql(&self) -> String {
        let mut sql = String::new();
        sql.push_str("CREATE TABLE IF NOT EXISTS ");
        sql.push_str(self.name);
        sql.push('(');

        for column in &self.columns {
            sql.push_str(column.name);
            sql.push(' ');
            sql.push_str(column.ty.sql_name());
            sql.push_str(if column.nullable { " NULL" } else { " NOT NULL" });
            sql.push(',');
        }

        let keys: Vec<&str> = self.key_columns().map(|c| c.name).collect();
        if keys.is_empty() {
            sql.pop();
            sql.push(')');
        } else {
            sql.push_str("PRIMARY KEY (");
            sql.push_str(&keys.join(","));
            sql.push_str("))");
        }

        sql
    }
}

/// A mapped entity: a default-constructible type with a declared schema and
/// by-name access to its column values.
///
/// `schema()` is re-derived on every operation rather than cached; the
/// descriptor is cheap and keeping it call-local avoids any registration
/// state on the database handle.
pub trait Entity: Default {
    /// Table metadata; the table name is the type name, case-preserving
    fn schema() -> TableSchema;

    /// Current value of the named column, `Value::Null` for unset options
    fn value_of(&self, column: &str) -> Value;

    /// Assign a fetched cell to the named column.
    ///
    /// Only called for populated cells; an empty cell leaves the field at
    /// its default. Implementations unwrap option fields to the underlying
    /// type before converting.
    fn apply(&mut self, column: &str, value: Value) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyed_schema() -> TableSchema {
        TableSchema::new(
            "Player",
            vec![
                ColumnDef::new("id", ColumnType::Integer).key(),
                ColumnDef::new("name", ColumnType::Text),
                ColumnDef::new("score", ColumnType::Real).nullable(),
                ColumnDef::new("avatar", ColumnType::Blob).nullable(),
            ],
        )
    }

    #[test]
    fn test_create_table_with_key() {
        let sql = keyed_schema().create_table_sql();
        assert_eq!(
            sql,
            "CREATE TABLE IF NOT EXISTS Player(id INTEGER NOT NULL,\
             name TEXT NOT NULL,score REAL NULL,avatar BLOB NULL,\
             PRIMARY KEY (id))"
        );
    }

    #[test]
    fn test_create_table_composite_key() {
        let schema = TableSchema::new(
            "Membership",
            vec![
                ColumnDef::new("user_id", ColumnType::Integer).key(),
                ColumnDef::new("group_id", ColumnType::Integer).key(),
                ColumnDef::new("role", ColumnType::Text),
            ],
        );
        assert!(
            schema
                .create_table_sql()
                .ends_with("PRIMARY KEY (user_id,group_id))")
        );
    }

    #[test]
    fn test_create_table_without_key_trims_separator() {
        let schema = TableSchema::new(
            "LogLine",
            vec![
                ColumnDef::new("message", ColumnType::Text),
                ColumnDef::new("level", ColumnType::Integer),
            ],
        );
        assert_eq!(
            schema.create_table_sql(),
            "CREATE TABLE IF NOT EXISTS LogLine(message TEXT NOT NULL,level INTEGER NOT NULL)"
        );
    }

    #[test]
    fn test_column_lookup() {
        let schema = keyed_schema();
        assert_eq!(schema.column("score").unwrap().ty, ColumnType::Real);
        assert!(schema.column("missing").is_none());
    }
}
