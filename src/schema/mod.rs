pub mod dependencies;
pub mod tables;
pub mod types;

pub use dependencies::*;
pub use tables::*;
pub use types::*;

use crate::error::{Error, Result};

/// The set of tables an engine run works with, constructed by the caller
/// and passed in explicitly.
pub struct SchemaRegistry {
    tables: Vec<&'static TableSchema>,
    resolver: DependencyResolver,
}

impl SchemaRegistry {
    pub fn new(tables: &[&'static TableSchema]) -> Self {
        Self {
            tables: tables.to_vec(),
            resolver: DependencyResolver::new(tables),
        }
    }

    /// Registry over the canonical football tables
    pub fn football() -> Self {
        Self::new(ALL_TABLES)
    }

    pub fn tables(&self) -> &[&'static TableSchema] {
        &self.tables
    }

    pub fn get(&self, name: &str) -> Result<&'static TableSchema> {
        self.tables
            .iter()
            .find(|t| t.name == name)
            .copied()
            .ok_or_else(|| Error::UnknownTable(name.to_string()))
    }

    pub fn resolver(&self) -> &DependencyResolver {
        &self.resolver
    }

    /// All tables, parents before children
    pub fn write_order(&self) -> Result<Vec<&'static TableSchema>> {
        self.resolver
            .all_tables_ordered()
            .map_err(Error::InvalidSchema)
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::football()
    }
}
