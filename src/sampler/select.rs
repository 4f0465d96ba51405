//! Set operations over tables, driven by the foreign keys each schema declares.
//!
//! Every operation consumes a table and returns the retained rows in their
//! input order, so steps compose without copying.

use chrono::{Duration, NaiveDateTime};
use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::store::{Row, Table};

pub type KeySet = BTreeSet<String>;

/// Keep the rows matching `keep`
pub fn filter(mut table: Table, mut keep: impl FnMut(&Row) -> bool) -> Table {
    table.rows.retain(|row| keep(row));
    table
}

/// Rows whose primary key is in `keys`. Keys without a row are ignored.
pub fn by_keys(table: Table, keys: &KeySet) -> Table {
    let schema = table.schema;
    filter(table, |row| {
        row.key(schema).is_some_and(|key| keys.contains(&key))
    })
}

/// Rows where every foreign key into `target` resolves into `keys`.
/// Null references do not point anywhere and never disqualify a row.
pub fn referencing(table: Table, target: &str, keys: &KeySet) -> Table {
    let fks = table.schema.foreign_keys_to(target);
    debug_assert!(!fks.is_empty(), "{} has no FK to {}", table.name(), target);
    filter(table, |row| {
        fks.iter().all(|fk| match row.text(fk.column) {
            Some(value) => keys.contains(value),
            None => row.get(fk.column).is_null(),
        })
    })
}

/// Distinct non-null values of every foreign key into `target`, across all
/// roles (e.g. both home and away team)
pub fn referenced_keys(table: &Table, target: &str) -> KeySet {
    let fks = table.schema.foreign_keys_to(target);
    table
        .rows
        .iter()
        .flat_map(|row| fks.iter().filter_map(move |fk| row.text(fk.column)))
        .map(str::to_string)
        .collect()
}

/// Rows of a link table whose endpoints are all selected. A partially
/// resolvable link is dropped.
pub fn links_within(table: Table, keys: &KeySet) -> Result<Table> {
    match table.schema.link_target() {
        Some(target) => Ok(referencing(table, target, keys)),
        None => Err(Error::InvalidSchema(format!(
            "{} is not a link table",
            table.name()
        ))),
    }
}

/// Rows with a value in `column`
pub fn with_value(table: Table, column: &str) -> Table {
    filter(table, |row| !row.get(column).is_null())
}

/// Open interval of timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub after: NaiveDateTime,
    pub before: NaiveDateTime,
}

impl TimeWindow {
    /// `(min - lookback, max)` over `column` of `table`; `None` when the
    /// table has no timestamps
    pub fn anchored(table: &Table, column: &str, lookback: Duration) -> Option<Self> {
        let dates = table
            .rows
            .iter()
            .filter_map(|row| row.get(column).as_timestamp());
        let (min, max) = dates.fold(None, |acc: Option<(NaiveDateTime, NaiveDateTime)>, ts| {
            Some(match acc {
                None => (ts, ts),
                Some((lo, hi)) => (lo.min(ts), hi.max(ts)),
            })
        })?;
        Some(Self {
            after: min - lookback,
            before: max,
        })
    }

    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        self.after < ts && ts < self.before
    }
}

/// Rows whose `column` lies strictly inside `window`; nothing survives
/// without a window
pub fn within(table: Table, column: &str, window: Option<TimeWindow>) -> Table {
    filter(table, |row| match (window, row.get(column).as_timestamp()) {
        (Some(window), Some(ts)) => window.contains(ts),
        _ => false,
    })
}
