use chrono::{DateTime, Utc};
use serde_json::{Map, Value as Json};
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{Error, Result};
use crate::schema::{ColumnType, TableSchema};
use crate::store::{parse_timestamp, Row, Value};

/// One record of a raw external table
pub type RawRecord = Map<String, Json>;

/// Raw records of one external table, with where each came from
pub struct RawTable {
    pub name: String,
    pub records: Vec<(usize, RawRecord)>,
}

/// Read every `*.jsonl` part of `<root>/<name>/`, in file name order
pub fn read_raw_table(root: &Path, name: &str) -> Result<RawTable> {
    let dir = root.join(name);
    if !dir.is_dir() {
        return Err(Error::MissingReference { path: dir });
    }

    let mut parts: Vec<_> = fs::read_dir(&dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("jsonl"))
        .collect();
    parts.sort();

    let mut records = Vec::new();
    let mut line_no = 0;
    for part in parts {
        let reader = BufReader::new(File::open(&part)?);
        for line in reader.lines() {
            let line = line?;
            line_no += 1;
            if line.trim().is_empty() {
                continue;
            }

            let json: Json = serde_json::from_str(&line)?;
            match json {
                Json::Object(record) => records.push((line_no, record)),
                other => {
                    return Err(Error::invalid_record(
                        name,
                        line_no,
                        format!("expected an object, got {}", other),
                    ))
                }
            }
        }
    }

    Ok(RawTable {
        name: name.to_string(),
        records,
    })
}

/// Map a raw record onto a canonical row, renaming and coercing each column
pub fn map_record(
    record: &RawRecord,
    schema: &TableSchema,
    source: &str,
    line: usize,
) -> Result<Row> {
    map_record_with(record, &RawRecord::new(), schema, source, line)
}

/// Like [`map_record`], with `derived` fields taking precedence over the
/// record's own
pub fn map_record_with(
    record: &RawRecord,
    derived: &RawRecord,
    schema: &TableSchema,
    source: &str,
    line: usize,
) -> Result<Row> {
    let mut row = Row::new();

    for col in schema.columns {
        let field = col.source_field();
        let raw = derived
            .get(field)
            .or_else(|| record.get(field))
            .unwrap_or(&Json::Null);
        let value = extract_value(raw, col.col_type).ok_or_else(|| {
            Error::invalid_record(
                source,
                line,
                format!("cannot read {} as {:?} for {}", raw, col.col_type, col.name),
            )
        })?;

        if value.is_null() && !col.nullable {
            return Err(Error::invalid_record(
                source,
                line,
                format!("missing required field {:?} ({})", field, col.name),
            ));
        }
        row.set(col.name, value);
    }

    Ok(row)
}

/// Coerce a JSON value to a column type. `None` means the value is present
/// but cannot be represented.
pub fn extract_value(json: &Json, col_type: ColumnType) -> Option<Value> {
    match json {
        Json::Null => Some(Value::Null),
        Json::String(s) if s.trim().is_empty() && col_type != ColumnType::Text => {
            Some(Value::Null)
        }
        v => match col_type {
            ColumnType::Text => json_text(v).map(Value::Text),
            ColumnType::Real => match v {
                Json::Number(n) => n.as_f64().map(Value::Real),
                Json::String(s) => s.trim().parse().ok().map(Value::Real),
                _ => None,
            },
            ColumnType::Boolean => match v {
                Json::Bool(b) => Some(Value::Bool(*b)),
                Json::Number(n) => match n.as_i64() {
                    Some(0) => Some(Value::Bool(false)),
                    Some(1) => Some(Value::Bool(true)),
                    _ => None,
                },
                Json::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                    "true" | "1" => Some(Value::Bool(true)),
                    "false" | "0" => Some(Value::Bool(false)),
                    _ => None,
                },
                _ => None,
            },
            ColumnType::Timestamp => match v {
                Json::String(s) => parse_timestamp(s).map(Value::Timestamp),
                // Epoch milliseconds
                Json::Number(n) => n
                    .as_i64()
                    .and_then(DateTime::<Utc>::from_timestamp_millis)
                    .map(|dt| Value::Timestamp(dt.naive_utc())),
                _ => None,
            },
        },
    }
}

/// Text form of a scalar; whole floats lose their `.0` so numeric ids stay ids
pub fn json_text(json: &Json) -> Option<String> {
    match json {
        Json::String(s) => Some(s.clone()),
        Json::Bool(b) => Some(b.to_string()),
        Json::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else {
                let f = n.as_f64()?;
                if f.fract() == 0.0 && f.abs() < 1e15 {
                    Some(format!("{}", f as i64))
                } else {
                    Some(f.to_string())
                }
            }
        }
        _ => None,
    }
}
