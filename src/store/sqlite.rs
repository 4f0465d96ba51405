use rusqlite::{Connection, OptionalExtension, Transaction};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::schema_gen::{generate_create_table, generate_indexes};
use super::{Row, Table, TableStore, Value};
use crate::error::{Error, Result};
use crate::schema::TableSchema;

/// A table store backed by one SQLite file per namespace
pub struct SqliteStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl SqliteStore {
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let label = db_path.display().to_string();
        let conn = Connection::open(db_path).map_err(|e| Error::store(&label, e))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA cache_size = -64000;",
        )
        .map_err(|e| Error::store(&label, e))?;
        disable_foreign_keys(&conn).map_err(|e| Error::store(&label, e))?;

        Ok(Self {
            conn,
            path: Some(db_path.to_path_buf()),
        })
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| Error::store(":memory:", e))?;
        disable_foreign_keys(&conn).map_err(|e| Error::store(":memory:", e))?;
        Ok(Self { conn, path: None })
    }

    /// Whether SQLite is enforcing foreign keys on this connection
    pub fn foreign_keys_enforced(&self) -> Result<bool> {
        self.conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get::<_, i64>(0))
            .map(|on| on != 0)
            .map_err(|e| Error::store("pragma", e))
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn has_table(&self, name: &str) -> Result<bool> {
        self.conn
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [name],
                |_| Ok(()),
            )
            .optional()
            .map(|found| found.is_some())
            .map_err(|e| Error::store(name, e))
    }

    fn write(&mut self, table: &Table, replace: bool) -> rusqlite::Result<()> {
        let schema = table.schema;
        let tx = self.conn.transaction()?;

        if replace {
            tx.execute(&format!("DROP TABLE IF EXISTS \"{}\"", schema.name), [])?;
        }
        let exists = tx
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [schema.name],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if !exists {
            create_table(&tx, schema)?;
        }

        insert_rows(&tx, schema, &table.rows)?;
        tx.commit()
    }
}

/// Tables are replaced one at a time, parents and children independently, so
/// SQLite must not enforce the declared foreign keys. The bundled build turns
/// enforcement on by default.
fn disable_foreign_keys(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = OFF;")
}

fn create_table(tx: &Transaction, schema: &TableSchema) -> rusqlite::Result<()> {
    tx.execute(&generate_create_table(schema), [])?;
    for index_sql in generate_indexes(schema) {
        tx.execute(&index_sql, [])?;
    }
    Ok(())
}

fn insert_rows(tx: &Transaction, schema: &TableSchema, rows: &[Row]) -> rusqlite::Result<()> {
    let columns: Vec<String> = schema
        .columns
        .iter()
        .map(|c| format!("\"{}\"", c.name))
        .collect();
    let placeholders: Vec<&str> = columns.iter().map(|_| "?").collect();
    let insert_sql = format!(
        "INSERT INTO \"{}\" ({}) VALUES ({})",
        schema.name,
        columns.join(", "),
        placeholders.join(", ")
    );

    let mut stmt = tx.prepare_cached(&insert_sql)?;
    for row in rows {
        for (idx, col) in schema.columns.iter().enumerate() {
            row.get(col.name).bind_to(idx + 1, &mut stmt)?;
        }
        stmt.raw_execute()?;
    }
    Ok(())
}

impl TableStore for SqliteStore {
    fn read_full(&self, schema: &'static TableSchema) -> Result<Table> {
        let columns: Vec<String> = schema
            .columns
            .iter()
            .map(|c| format!("\"{}\"", c.name))
            .collect();
        let order = if schema.has_key() {
            schema
                .primary_key
                .iter()
                .map(|c| format!("\"{}\"", c))
                .collect::<Vec<_>>()
                .join(", ")
        } else {
            "rowid".to_string()
        };
        let sql = format!(
            "SELECT {} FROM \"{}\" ORDER BY {}",
            columns.join(", "),
            schema.name,
            order
        );

        let read = || -> rusqlite::Result<Vec<Row>> {
            let mut stmt = self.conn.prepare(&sql)?;
            let rows = stmt.query_map([], |sql_row| {
                let mut row = Row::new();
                for (idx, col) in schema.columns.iter().enumerate() {
                    let raw = sql_row.get_ref(idx)?;
                    let value = Value::from_sql(col.col_type, raw).map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(idx, raw.data_type(), e.into())
                    })?;
                    row.set(col.name, value);
                }
                Ok(row)
            })?;
            rows.collect()
        };

        let rows = read().map_err(|e| Error::store(schema.name, e))?;
        debug!(table = schema.name, rows = rows.len(), "read table");
        Ok(Table::new(schema, rows))
    }

    fn replace_all(&mut self, table: &Table) -> Result<()> {
        self.write(table, true)
            .map_err(|e| Error::store(table.name(), e))?;
        debug!(table = table.name(), rows = table.len(), "replaced table");
        Ok(())
    }

    fn append(&mut self, table: &Table) -> Result<()> {
        self.write(table, false)
            .map_err(|e| Error::store(table.name(), e))?;
        debug!(table = table.name(), rows = table.len(), "appended to table");
        Ok(())
    }
}
