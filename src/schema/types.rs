use std::collections::HashSet;

/// Column data type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    Real,
    Boolean,
    /// Date or date-time, stored as `YYYY-MM-DD HH:MM:SS` text
    Timestamp,
}

/// Column definition
#[derive(Debug, Clone)]
pub struct Column {
    pub name: &'static str,
    pub col_type: ColumnType,
    pub nullable: bool,
    /// Override raw field name (default: same as the column name)
    pub raw_field: Option<&'static str>,
}

impl Column {
    /// Create an optional (nullable) column
    pub const fn new(name: &'static str, col_type: ColumnType) -> Self {
        Self {
            name,
            col_type,
            nullable: true,
            raw_field: None,
        }
    }

    /// Create a required (non-nullable) column
    pub const fn required(name: &'static str, col_type: ColumnType) -> Self {
        Self {
            name,
            col_type,
            nullable: false,
            raw_field: None,
        }
    }

    /// Set the raw field name (for when the external table names it differently)
    pub const fn raw(self, field: &'static str) -> Self {
        Self {
            raw_field: Some(field),
            ..self
        }
    }

    /// Field to read from a raw record
    pub fn source_field(&self) -> &'static str {
        self.raw_field.unwrap_or(self.name)
    }
}

/// Foreign key reference
#[derive(Debug, Clone)]
pub struct ForeignKey {
    pub column: &'static str,
    pub references_table: &'static str,
    pub references_column: &'static str,
}

impl ForeignKey {
    pub const fn new(
        column: &'static str,
        references_table: &'static str,
        references_column: &'static str,
    ) -> Self {
        Self {
            column,
            references_table,
            references_column,
        }
    }
}

/// Table schema definition
#[derive(Debug, Clone)]
pub struct TableSchema {
    pub name: &'static str,
    /// Raw external table the canonical rows are built from
    pub raw_source: &'static str,
    pub columns: &'static [Column],
    /// Empty for tables without a surrogate key (lineups, relations)
    pub primary_key: &'static [&'static str],
    pub foreign_keys: &'static [ForeignKey],
}

impl TableSchema {
    /// Get all tables this table depends on (FK parents)
    pub fn dependencies(&self) -> HashSet<&'static str> {
        self.foreign_keys
            .iter()
            .map(|fk| fk.references_table)
            .collect()
    }

    pub fn column(&self, name: &str) -> Option<&'static Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn foreign_key(&self, column: &str) -> Option<&'static ForeignKey> {
        self.foreign_keys.iter().find(|fk| fk.column == column)
    }

    /// Foreign keys pointing at `table`
    pub fn foreign_keys_to(&self, table: &str) -> Vec<&'static ForeignKey> {
        self.foreign_keys
            .iter()
            .filter(|fk| fk.references_table == table)
            .collect()
    }

    /// A link table relates rows of a single other table to each other
    /// (e.g. team hierarchy): it has several FKs, all to the same target.
    pub fn link_target(&self) -> Option<&'static str> {
        let first = self.foreign_keys.first()?;
        let all_same = self
            .foreign_keys
            .iter()
            .all(|fk| fk.references_table == first.references_table);
        (self.foreign_keys.len() > 1 && all_same).then_some(first.references_table)
    }

    pub fn has_key(&self) -> bool {
        !self.primary_key.is_empty()
    }
}
