use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rusqlite::types::ValueRef;

use crate::schema::ColumnType;

/// Text representation of timestamps inside a store. Fractional seconds are
/// written only when present and are optional when parsing.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// A single cell of a canonical row
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Real(f64),
    Text(String),
    Bool(bool),
    Timestamp(NaiveDateTime),
}

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            Value::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    pub fn bind_to(&self, idx: usize, stmt: &mut rusqlite::Statement) -> rusqlite::Result<()> {
        match self {
            Value::Null => stmt.raw_bind_parameter(idx, rusqlite::types::Null)?,
            Value::Real(f) => stmt.raw_bind_parameter(idx, f)?,
            Value::Text(s) => stmt.raw_bind_parameter(idx, s.as_str())?,
            Value::Bool(b) => stmt.raw_bind_parameter(idx, i64::from(*b))?,
            Value::Timestamp(ts) => {
                stmt.raw_bind_parameter(idx, ts.format(TIMESTAMP_FORMAT).to_string())?
            }
        }
        Ok(())
    }

    /// Read a stored cell back according to its declared column type
    pub fn from_sql(col_type: ColumnType, raw: ValueRef<'_>) -> Result<Self, String> {
        let value = match (col_type, raw) {
            (_, ValueRef::Null) => Value::Null,
            (ColumnType::Real, ValueRef::Real(f)) => Value::Real(f),
            (ColumnType::Real, ValueRef::Integer(i)) => Value::Real(i as f64),
            (ColumnType::Boolean, ValueRef::Integer(i)) => Value::Bool(i != 0),
            (ColumnType::Text, ValueRef::Text(t)) => {
                Value::Text(String::from_utf8_lossy(t).into_owned())
            }
            (ColumnType::Timestamp, ValueRef::Text(t)) => {
                let s = String::from_utf8_lossy(t);
                parse_timestamp(&s)
                    .map(Value::Timestamp)
                    .ok_or_else(|| format!("bad timestamp {:?}", s))?
            }
            (col_type, other) => {
                return Err(format!(
                    "{:?} cannot hold {:?}",
                    col_type,
                    other.data_type()
                ))
            }
        };
        Ok(value)
    }
}

/// Parse `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS[.fff]` or RFC 3339
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(ts) = NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT) {
        return Some(ts);
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(ts);
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.naive_utc())
}
