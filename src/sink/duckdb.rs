//! DuckDB-backed sink store
//!
//! Tables are created lazily from the first row written to them, with the
//! conflict key as primary key. Upserts are single multi-row
//! `INSERT ... ON CONFLICT DO UPDATE` statements, so each chunk commits or
//! fails as a unit.

use super::SinkStore;
use crate::error::{Error, Result};
use crate::map::{FlatRow, Scalar};
use crate::types::SinkTable;
use duckdb::{params_from_iter, Connection};
use std::path::Path;

/// Sink store backed by a DuckDB database
pub struct DuckDbStore {
    conn: Connection,
}

impl DuckDbStore {
    /// Open (or create) a database file
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref())
            .map_err(|e| Error::sink(format!("Failed to open DuckDB database: {e}")))?;
        Ok(Self { conn })
    }

    /// In-memory database, used by tests and probes
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::sink(format!("Failed to create DuckDB connection: {e}")))?;
        Ok(Self { conn })
    }

    /// The underlying connection, for ad-hoc queries over synced data
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn ensure_table(&self, name: &str, template: &FlatRow, conflict_key: &str) -> Result<()> {
        let columns: Vec<String> = template
            .columns()
            .iter()
            .map(|(column, value)| {
                if *column == conflict_key {
                    format!("\"{column}\" {} PRIMARY KEY", sql_type(value))
                } else {
                    format!("\"{column}\" {}", sql_type(value))
                }
            })
            .collect();

        let ddl = format!(
            "CREATE TABLE IF NOT EXISTS \"{name}\" ({})",
            columns.join(", ")
        );
        self.conn.execute_batch(&ddl)?;
        Ok(())
    }
}

impl SinkStore for DuckDbStore {
    fn upsert(&mut self, table: &SinkTable, conflict_key: &str, rows: &[FlatRow]) -> Result<usize> {
        let Some(first) = rows.first() else {
            return Ok(0);
        };

        let layout = first.column_names();
        if rows.iter().any(|row| row.column_names() != layout) {
            return Err(Error::sink(format!(
                "Rows for table {table} do not share a column layout"
            )));
        }

        let name = table.name();
        self.ensure_table(&name, first, conflict_key)?;

        let sql = upsert_sql(&name, &layout, conflict_key, rows.len());
        let params: Vec<duckdb::types::Value> = rows
            .iter()
            .flat_map(|row| row.columns().iter().map(|(_, value)| to_db_value(value)))
            .collect();

        self.conn.execute(&sql, params_from_iter(params))?;
        Ok(rows.len())
    }

    fn count(&self, table: &SinkTable) -> Result<usize> {
        let sql = format!("SELECT COUNT(*) FROM \"{}\"", table.name());
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn keys(&self, table: &SinkTable) -> Result<Vec<String>> {
        let sql = format!(
            "SELECT \"id\" FROM \"{}\" ORDER BY \"id\"",
            table.name()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let keys = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, duckdb::Error>>()?;
        Ok(keys)
    }
}

fn upsert_sql(table: &str, columns: &[&'static str], conflict_key: &str, row_count: usize) -> String {
    let column_list = columns
        .iter()
        .map(|column| format!("\"{column}\""))
        .collect::<Vec<_>>()
        .join(", ");

    let row_placeholders = format!(
        "({})",
        columns.iter().map(|_| "?").collect::<Vec<_>>().join(", ")
    );
    let values = vec![row_placeholders; row_count].join(", ");

    let updates: Vec<String> = columns
        .iter()
        .filter(|column| **column != conflict_key)
        .map(|column| format!("\"{column}\" = excluded.\"{column}\""))
        .collect();

    if updates.is_empty() {
        format!(
            "INSERT INTO \"{table}\" ({column_list}) VALUES {values} \
             ON CONFLICT (\"{conflict_key}\") DO NOTHING"
        )
    } else {
        format!(
            "INSERT INTO \"{table}\" ({column_list}) VALUES {values} \
             ON CONFLICT (\"{conflict_key}\") DO UPDATE SET {}",
            updates.join(", ")
        )
    }
}

fn sql_type(value: &Scalar) -> &'static str {
    match value {
        Scalar::Text(_) => "TEXT",
        Scalar::Int(_) => "BIGINT",
        Scalar::Float(_) => "DOUBLE",
        Scalar::Bool(_) => "BOOLEAN",
    }
}

fn to_db_value(value: &Scalar) -> duckdb::types::Value {
    match value {
        Scalar::Text(text) => duckdb::types::Value::Text(text.clone()),
        Scalar::Int(number) => duckdb::types::Value::BigInt(*number),
        Scalar::Float(number) => duckdb::types::Value::Double(*number),
        Scalar::Bool(flag) => duckdb::types::Value::Boolean(*flag),
    }
}
