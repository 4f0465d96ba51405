use std::collections::HashMap;

use super::{Table, TableStore};
use crate::error::{Error, Result};
use crate::schema::TableSchema;

/// Table store that keeps everything in process memory.
///
/// Each instance is independent, so several extracts can be built side by
/// side without touching disk.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: HashMap<&'static str, Table>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from tables, as if each had been written with `replace_all`
    pub fn with_tables(tables: impl IntoIterator<Item = Table>) -> Self {
        let mut store = Self::new();
        for table in tables {
            store.put(table);
        }
        store
    }

    pub fn get(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    pub fn table_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.tables.keys().copied().collect();
        names.sort_unstable();
        names
    }

    fn put(&mut self, mut table: Table) {
        table.sort_by_key();
        self.tables.insert(table.name(), table);
    }
}

impl TableStore for MemoryStore {
    fn read_full(&self, schema: &'static TableSchema) -> Result<Table> {
        self.tables
            .get(schema.name)
            .cloned()
            .ok_or_else(|| Error::UnknownTable(schema.name.to_string()))
    }

    fn replace_all(&mut self, table: &Table) -> Result<()> {
        self.put(table.clone());
        Ok(())
    }

    fn append(&mut self, table: &Table) -> Result<()> {
        let mut merged = self
            .tables
            .remove(table.name())
            .unwrap_or_else(|| Table::empty(table.schema));
        merged.rows.extend(table.rows.iter().cloned());
        self.put(merged);
        Ok(())
    }
}
