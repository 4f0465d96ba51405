//! Referential closure checks over a set of tables.

use std::collections::{BTreeSet, HashMap};

use super::select::KeySet;
use crate::error::{Error, Result};
use crate::store::Table;

/// Values of one foreign key that have no row in the target table
#[derive(Debug, Clone, PartialEq)]
pub struct Dangling {
    pub table: &'static str,
    pub column: &'static str,
    pub target: &'static str,
    pub values: BTreeSet<String>,
    /// Rows carrying one of `values`
    pub rows: usize,
}

/// Every foreign key of every table, checked against the keys of its target
/// among `tables`. A target missing from `tables` has no keys.
pub fn dangling_references(tables: &[Table]) -> Vec<Dangling> {
    let keys: HashMap<&str, KeySet> = tables.iter().map(|t| (t.name(), t.keys())).collect();
    let no_keys = KeySet::new();

    let mut report = Vec::new();
    for table in tables {
        for fk in table.schema.foreign_keys {
            let target_keys = keys.get(fk.references_table).unwrap_or(&no_keys);
            let mut dangling = Dangling {
                table: table.name(),
                column: fk.column,
                target: fk.references_table,
                values: BTreeSet::new(),
                rows: 0,
            };

            for row in &table.rows {
                if let Some(value) = row.text(fk.column) {
                    if !target_keys.contains(value) {
                        dangling.values.insert(value.to_string());
                        dangling.rows += 1;
                    }
                }
            }

            if dangling.rows > 0 {
                report.push(dangling);
            }
        }
    }
    report
}

/// Fail on the first foreign key that does not resolve
pub fn verify_closure(tables: &[Table]) -> Result<()> {
    match dangling_references(tables).into_iter().next() {
        None => Ok(()),
        Some(d) => Err(Error::UnresolvableForeignKey {
            table: d.table,
            column: d.column,
            value: d.values.into_iter().next().unwrap_or_default(),
            target: d.target,
        }),
    }
}
