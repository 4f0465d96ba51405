//! Tabular storage for canonical datasets and environment extracts.

mod memory;
mod schema_gen;
mod sqlite;
mod value;

pub use memory::MemoryStore;
pub use schema_gen::{generate_create_table, generate_indexes};
pub use sqlite::SqliteStore;
pub use value::{parse_timestamp, Value, TIMESTAMP_FORMAT};

use std::collections::{BTreeSet, HashMap};
use tracing::warn;

use crate::error::{Error, Result};
use crate::schema::{SchemaRegistry, TableSchema};

static NULL: Value = Value::Null;

/// One row of a table, keyed by canonical column name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    values: HashMap<String, Value>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter, handy for fixtures
    pub fn with(mut self, column: &str, value: Value) -> Self {
        self.set(column, value);
        self
    }

    pub fn set(&mut self, column: &str, value: Value) {
        self.values.insert(column.to_string(), value);
    }

    /// Missing columns read as null
    pub fn get(&self, column: &str) -> &Value {
        self.values.get(column).unwrap_or(&NULL)
    }

    pub fn text(&self, column: &str) -> Option<&str> {
        self.get(column).as_text()
    }

    /// Primary key of this row, `None` for keyless tables or null keys
    pub fn key(&self, schema: &TableSchema) -> Option<String> {
        if !schema.has_key() {
            return None;
        }
        let parts = schema
            .primary_key
            .iter()
            .map(|col| self.text(col))
            .collect::<Option<Vec<_>>>()?;
        Some(parts.join("|"))
    }
}

/// An in-memory table: rows plus the schema they follow
#[derive(Debug, Clone)]
pub struct Table {
    pub schema: &'static TableSchema,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(schema: &'static TableSchema, rows: Vec<Row>) -> Self {
        Self { schema, rows }
    }

    pub fn empty(schema: &'static TableSchema) -> Self {
        Self::new(schema, Vec::new())
    }

    pub fn name(&self) -> &'static str {
        self.schema.name
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Primary keys present in this table
    pub fn keys(&self) -> BTreeSet<String> {
        self.rows
            .iter()
            .filter_map(|row| row.key(self.schema))
            .collect()
    }

    /// Order rows by primary key; keyless tables keep their order
    pub fn sort_by_key(&mut self) {
        if self.schema.has_key() {
            let schema = self.schema;
            self.rows.sort_by_cached_key(|row| row.key(schema));
        }
    }
}

/// Storage for whole tables.
///
/// Reads return every row ordered by primary key; writes replace or extend a
/// table wholesale.
pub trait TableStore {
    fn read_full(&self, schema: &'static TableSchema) -> Result<Table>;

    fn replace_all(&mut self, table: &Table) -> Result<()>;

    fn append(&mut self, table: &Table) -> Result<()>;
}

/// Replace every given table, parents first. Every write is attempted even
/// after a failure; any failure turns the batch into `PartialWrite`.
pub fn write_all<S: TableStore + ?Sized>(
    store: &mut S,
    registry: &SchemaRegistry,
    tables: &[Table],
) -> Result<()> {
    for table in tables {
        registry.get(table.name())?;
    }

    let mut failed = Vec::new();
    for schema in registry.write_order()? {
        let Some(table) = tables.iter().find(|t| t.name() == schema.name) else {
            continue;
        };
        if let Err(e) = store.replace_all(table) {
            warn!(table = schema.name, error = %e, "table write failed");
            failed.push((schema.name, e.to_string()));
        }
    }

    if failed.is_empty() {
        Ok(())
    } else {
        Err(Error::PartialWrite { failed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AREAS, MATCHES, TEAM_RELATIONS};

    #[test]
    fn test_row_key_and_missing_columns() {
        let row = Row::new().with("match_id", Value::text("M1"));
        assert_eq!(row.key(&MATCHES).as_deref(), Some("M1"));
        assert!(row.get("score").is_null());
        assert_eq!(row.key(&TEAM_RELATIONS), None);
    }

    /// Fails every write to one table
    struct FlakyStore {
        inner: MemoryStore,
        broken: &'static str,
    }

    impl TableStore for FlakyStore {
        fn read_full(&self, schema: &'static TableSchema) -> Result<Table> {
            self.inner.read_full(schema)
        }

        fn replace_all(&mut self, table: &Table) -> Result<()> {
            if table.name() == self.broken {
                return Err(Error::store(table.name(), rusqlite::Error::InvalidQuery));
            }
            self.inner.replace_all(table)
        }

        fn append(&mut self, table: &Table) -> Result<()> {
            self.inner.append(table)
        }
    }

    #[test]
    fn test_write_all_attempts_every_table() {
        let mut store = FlakyStore {
            inner: MemoryStore::new(),
            broken: "matches",
        };
        let tables = vec![
            Table::empty(&MATCHES),
            Table::empty(&TEAM_RELATIONS),
            Table::empty(&AREAS),
        ];

        let err = write_all(&mut store, &SchemaRegistry::football(), &tables).unwrap_err();
        match err {
            Error::PartialWrite { failed } => {
                assert_eq!(failed.len(), 1);
                assert_eq!(failed[0].0, "matches");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(store.inner.table_names(), vec!["areas", "team_relations"]);
    }

    #[test]
    fn test_sort_by_key() {
        let mut table = Table::new(
            &MATCHES,
            vec![
                Row::new().with("match_id", Value::text("M2")),
                Row::new().with("match_id", Value::text("M1")),
            ],
        );
        table.sort_by_key();
        assert_eq!(table.rows[0].text("match_id"), Some("M1"));
        assert_eq!(table.keys().len(), 2);
    }
}
