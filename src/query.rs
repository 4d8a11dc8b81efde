//! SQL text generation for the CRUD surface
//!
//! Statements are built as literal text: every non-null value is rendered
//! textually and wrapped in single quotes (numbers included, SQLite column
//! affinity coerces them back), and NULL is emitted bare. No quote escaping
//! is performed - a value containing `'` corrupts the statement and the
//! engine rejects it. That behavior is kept for compatibility with the wire
//! format this crate reimplements and is asserted by tests, not hidden.
//!
//! Blob-valued columns never travel through literal text: the row statement
//! carries a NULL placeholder at their position and the bytes are collected
//! into [`BlobWrite`]s for the side-store (see [`crate::blob`]).

use crate::blob::BlobWrite;
use crate::schema::{ColumnType, Entity, TableSchema};
use crate::value::Value;

/// Render a value as an SQL literal. No escaping.
pub fn literal(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Integer(n) => format!("'{n}'"),
        Value::Real(n) => format!("'{n}'"),
        Value::Text(s) => format!("'{s}'"),
        // Blobs are routed through the side-store, never through text
        Value::Blob(_) => "NULL".to_string(),
    }
}

/// Key-equality conjunction for the entity's current key values, in
/// declaration order: `k1='v1' AND k2='v2'`.
///
/// Empty when the schema declares no key, which leaves the callers below
/// with a dangling `WHERE ` the engine rejects. Known edge case, preserved.
pub fn key_clause<E: Entity>(schema: &TableSchema, entity: &E) -> String {
    schema
        .key_columns()
        .map(|col| format!("{}={}", col.name, literal(&entity.value_of(col.name))))
        .collect::<Vec<_>>()
        .join(" AND ")
}

/// Build the INSERT statement plus the blob payloads it displaced
pub fn insert<E: Entity>(schema: &TableSchema, entity: &E) -> (String, Vec<BlobWrite>) {
    let mut blobs = Vec::new();
    let mut names = Vec::with_capacity(schema.columns.len());
    let mut values = Vec::with_capacity(schema.columns.len());

    for col in &schema.columns {
        names.push(col.name);
        values.push(row_literal(col.name, col.ty, entity, &mut blobs));
    }

    let sql = format!(
        "INSERT INTO {}({}) VALUES({})",
        schema.name,
        names.join(","),
        values.join(",")
    );
    (sql, blobs)
}

/// Build the UPDATE statement plus the blob payloads it displaced.
///
/// An empty (or whitespace) `where_clause` derives the predicate from the
/// entity's key values; anything else passes through verbatim.
pub fn update<E: Entity>(
    schema: &TableSchema,
    entity: &E,
    where_clause: &str,
) -> (String, Vec<BlobWrite>) {
    let mut blobs = Vec::new();
    let assignments: Vec<String> = schema
        .columns
        .iter()
        .map(|col| {
            format!(
                "{}={}",
                col.name,
                row_literal(col.name, col.ty, entity, &mut blobs)
            )
        })
        .collect();

    let predicate = if where_clause.trim().is_empty() {
        key_clause(schema, entity)
    } else {
        where_clause.to_string()
    };

    let sql = format!(
        "UPDATE {} SET {} WHERE {}",
        schema.name,
        assignments.join(","),
        predicate
    );
    (sql, blobs)
}

/// Build the DELETE statement keyed on the entity's current key values
pub fn delete<E: Entity>(schema: &TableSchema, entity: &E) -> String {
    format!(
        "DELETE FROM {} WHERE {}",
        schema.name,
        key_clause(schema, entity)
    )
}

/// Build the SELECT statement over all declared columns
pub fn select(schema: &TableSchema, where_clause: &str) -> String {
    let names: Vec<&str> = schema.columns.iter().map(|c| c.name).collect();
    let mut sql = format!("SELECT {} FROM {}", names.join(","), schema.name);
    push_where(&mut sql, where_clause);
    sql
}

/// Build the COUNT(*) statement
pub fn count(table: &str, where_clause: &str) -> String {
    let mut sql = format!("SELECT COUNT(*) FROM {table}");
    push_where(&mut sql, where_clause);
    sql
}

/// Build the scalar MAX statement for one column
pub fn max(table: &str, column: &str, where_clause: &str) -> String {
    let mut sql = format!("SELECT MAX({column}) FROM {table}");
    push_where(&mut sql, where_clause);
    sql
}

fn push_where(sql: &mut String, where_clause: &str) {
    if !where_clause.trim().is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(where_clause);
    }
}

/// Literal for one row position; a populated blob cell becomes a NULL
/// placeholder and its bytes are captured for the side-store.
fn row_literal<E: Entity>(
    name: &'static str,
    ty: ColumnType,
    entity: &E,
    blobs: &mut Vec<BlobWrite>,
) -> String {
    let value = entity.value_of(name);
    if ty == ColumnType::Blob {
        if let Value::Blob(bytes) = value {
            blobs.push(BlobWrite::new(name, bytes));
        }
        return "NULL".to_string();
    }
    literal(&value)
}
