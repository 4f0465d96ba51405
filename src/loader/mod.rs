//! Normalization of raw external tables into the canonical dataset.

pub mod raw;

use serde_json::Value as Json;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::schema::{
    SchemaRegistry, TableSchema, AREAS, COMPETITIONS, CONTINENTS, COUNTRIES, MATCHES,
    MATCH_LINEUPS, PLAYERS, PLAYER_TRANSFERS, PLAYER_VALUES, SEASONS, TEAMS, TEAM_RELATIONS,
};
use crate::store::{write_all, Row, Table, TableStore, Value};
use raw::{json_text, map_record, map_record_with, read_raw_table, RawRecord, RawTable};

/// Raw external tables expected under the data root
pub const RAW_SOURCES: &[&str] = &[
    "countries",
    "season_info",
    "player_info",
    "match_info",
    "player_transfers",
    "team_info",
    "match_lineups",
    "player_values",
    "team_relations",
];

/// `base` value marking a cup competition
pub const CUP_MARKER: &str = "pokalwettbewerb";

const CONTINENT_NAMES: &[(&str, &str)] = &[("amerika", "America"), ("europa", "Europe")];

/// All raw tables, read up front so a missing one aborts before any write
pub struct RawDataset {
    tables: BTreeMap<String, RawTable>,
}

impl RawDataset {
    pub fn read(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            return Err(Error::MissingReference {
                path: root.to_path_buf(),
            });
        }

        let mut tables = BTreeMap::new();
        for name in RAW_SOURCES {
            let table = read_raw_table(root, name)?;
            info!(source = *name, records = table.records.len(), "read raw table");
            tables.insert(name.to_string(), table);
        }
        Ok(Self { tables })
    }

    pub fn from_tables(tables: impl IntoIterator<Item = RawTable>) -> Result<Self> {
        let tables: BTreeMap<_, _> = tables.into_iter().map(|t| (t.name.clone(), t)).collect();
        if let Some(missing) = RAW_SOURCES.iter().find(|name| !tables.contains_key(**name)) {
            return Err(Error::MissingReference {
                path: PathBuf::from(*missing),
            });
        }
        Ok(Self { tables })
    }

    fn get(&self, name: &str) -> &RawTable {
        &self.tables[name]
    }
}

/// Rows written per canonical table
#[derive(Debug, Clone, Default)]
pub struct LoadSummary {
    pub tables: Vec<(&'static str, usize)>,
}

impl LoadSummary {
    pub fn total_rows(&self) -> usize {
        self.tables.iter().map(|(_, n)| n).sum()
    }
}

/// Read the raw tables under `root`, normalize them and fully replace the
/// canonical tables in `store`.
pub fn load<S: TableStore + ?Sized>(
    root: &Path,
    store: &mut S,
    registry: &SchemaRegistry,
) -> Result<LoadSummary> {
    let raw = RawDataset::read(root)?;
    let tables = normalize(&raw)?;

    let summary = LoadSummary {
        tables: tables.iter().map(|t| (t.name(), t.len())).collect(),
    };
    write_all(store, registry, &tables)?;

    info!(
        tables = summary.tables.len(),
        rows = summary.total_rows(),
        "canonical dataset loaded"
    );
    Ok(summary)
}

/// Build every canonical table from the raw dataset
pub fn normalize(raw: &RawDataset) -> Result<Vec<Table>> {
    let countries = raw.get("countries");
    let season_info = raw.get("season_info");

    let country_table = map_plain(&COUNTRIES, countries)?;

    Ok(vec![
        continents(countries)?,
        areas(season_info, &country_table),
        country_table,
        competitions(season_info)?,
        map_plain(&SEASONS, season_info)?,
        map_plain(&PLAYERS, raw.get("player_info"))?,
        map_plain(&TEAMS, raw.get("team_info"))?,
        team_relations(raw.get("team_relations"))?,
        matches(raw.get("match_info"))?,
        lineups(raw.get("match_lineups"))?,
        map_plain(&PLAYER_TRANSFERS, raw.get("player_transfers"))?,
        map_plain(&PLAYER_VALUES, raw.get("player_values"))?,
    ])
}

/// Map borrowed raw records, each with its derived fields
fn map_all<'a>(
    schema: &'static TableSchema,
    raw: &RawTable,
    records: impl IntoIterator<Item = (usize, &'a RawRecord, RawRecord)>,
) -> Result<Table> {
    let rows = records
        .into_iter()
        .map(|(line, record, extra)| map_record_with(record, &extra, schema, &raw.name, line))
        .collect::<Result<Vec<_>>>()?;
    Ok(Table::new(schema, rows))
}

fn map_plain(schema: &'static TableSchema, raw: &RawTable) -> Result<Table> {
    let rows = raw
        .records
        .iter()
        .map(|(line, record)| map_record(record, schema, &raw.name, *line))
        .collect::<Result<Vec<_>>>()?;
    Ok(Table::new(schema, rows))
}

fn derived(field: &str, value: impl Into<Json>) -> RawRecord {
    let mut map = RawRecord::new();
    map.insert(field.to_string(), value.into());
    map
}

fn field_text(record: &RawRecord, field: &str) -> Option<String> {
    record.get(field).and_then(json_text)
}

/// One continent per distinct country continent code
fn continents(countries: &RawTable) -> Result<Table> {
    let mut codes = BTreeSet::new();
    for (line, record) in &countries.records {
        let code = field_text(record, "continent").ok_or_else(|| {
            Error::invalid_record(&countries.name, *line, "missing continent")
        })?;
        codes.insert(code);
    }

    let rows = codes
        .into_iter()
        .map(|code| {
            let name = CONTINENT_NAMES
                .iter()
                .find(|(c, _)| *c == code)
                .map(|(_, name)| Value::text(*name))
                .unwrap_or(Value::Null);
            Row::new()
                .with("continent_id", Value::Text(code))
                .with("name", name)
        })
        .collect();
    Ok(Table::new(&CONTINENTS, rows))
}

/// Every area code seen in seasons or countries, including regions with no
/// country of their own
fn areas(season_info: &RawTable, countries: &Table) -> Table {
    let mut codes: BTreeSet<String> = season_info
        .records
        .iter()
        .filter_map(|(_, record)| field_text(record, "country"))
        .collect();
    codes.extend(countries.keys());

    let rows = codes
        .into_iter()
        .map(|code| Row::new().with("area_id", Value::Text(code)))
        .collect();
    Table::new(&AREAS, rows)
}

/// One competition per comp_id, described by its first season record
fn competitions(season_info: &RawTable) -> Result<Table> {
    let mut first: BTreeMap<String, (usize, &RawRecord)> = BTreeMap::new();
    for (line, record) in &season_info.records {
        let comp_id = field_text(record, "comp_id").ok_or_else(|| {
            Error::invalid_record(&season_info.name, *line, "missing comp_id")
        })?;
        first.entry(comp_id).or_insert((*line, record));
    }

    let records = first.into_values().map(|(line, record)| {
        let is_cup = field_text(record, "base").as_deref() == Some(CUP_MARKER);
        let kind = if is_cup { "cup" } else { "league" };
        (line, record, derived("kind", kind))
    });
    map_all(&COMPETITIONS, season_info, records)
}

/// Seasons are keyed globally as `<comp_id>-<season_id>`
fn matches(match_info: &RawTable) -> Result<Table> {
    let mut records = Vec::with_capacity(match_info.records.len());
    for (line, record) in &match_info.records {
        let (Some(comp), Some(season)) = (
            field_text(record, "comp_id"),
            field_text(record, "season_id"),
        ) else {
            return Err(Error::invalid_record(
                &match_info.name,
                *line,
                "missing comp_id or season_id",
            ));
        };
        records.push((*line, record, derived("season", format!("{comp}-{season}"))));
    }
    map_all(&MATCHES, match_info, records)
}

fn lineups(match_lineups: &RawTable) -> Result<Table> {
    let records = match_lineups.records.iter().map(|(line, record)| {
        let starter = field_text(record, "starter").as_deref() == Some("starter");
        (*line, record, derived("starter", starter))
    });
    map_all(&MATCH_LINEUPS, match_lineups, records)
}

/// Relations with either side unknown are dropped
fn team_relations(raw: &RawTable) -> Result<Table> {
    let complete = |record: &RawRecord| {
        TEAM_RELATIONS
            .columns
            .iter()
            .all(|col| field_text(record, col.source_field()).is_some())
    };
    let records: Vec<_> = raw
        .records
        .iter()
        .filter(|(_, record)| complete(record))
        .map(|(line, record)| (*line, record, RawRecord::new()))
        .collect();

    let dropped = raw.records.len() - records.len();
    if dropped > 0 {
        warn!(dropped, "skipped team relations with a missing side");
    }
    map_all(&TEAM_RELATIONS, raw, records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_table(name: &str, records: Vec<Json>) -> RawTable {
        RawTable {
            name: name.to_string(),
            records: records
                .into_iter()
                .enumerate()
                .map(|(i, r)| match r {
                    Json::Object(map) => (i + 1, map),
                    _ => unreachable!(),
                })
                .collect(),
        }
    }

    fn season_info() -> RawTable {
        raw_table(
            "season_info",
            vec![
                json!({"uid": "GB1-2020", "comp_id": "GB1", "season_id": "2020",
                       "name": "Premier League", "country": "ENG", "base": "erste liga"}),
                json!({"uid": "GB1-2021", "comp_id": "GB1", "season_id": "2021",
                       "name": "Premier League", "country": "ENG", "base": "erste liga"}),
                json!({"uid": "CL-2020", "comp_id": "CL", "season_id": "2020",
                       "name": "Champions League", "country": "UEFA", "base": CUP_MARKER}),
            ],
        )
    }

    #[test]
    fn test_competition_kind_and_area() {
        let table = competitions(&season_info()).unwrap();
        assert_eq!(table.len(), 2);

        let cl = &table.rows[0];
        assert_eq!(cl.text("comp_id"), Some("CL"));
        assert_eq!(cl.text("kind"), Some("cup"));
        assert_eq!(cl.text("area"), Some("UEFA"));
        assert_eq!(table.rows[1].text("kind"), Some("league"));
    }

    #[test]
    fn test_areas_cover_regions_without_country() {
        let countries = raw_table(
            "countries",
            vec![json!({"country_id": "ENG", "name": "England", "continent": "europa"}),
                 json!({"country_id": "BRA", "name": "Brazil", "continent": "amerika"})],
        );
        let country_table = map_plain(&COUNTRIES, &countries).unwrap();
        assert_eq!(country_table.rows[0].text("area"), Some("ENG"));

        let table = areas(&season_info(), &country_table);
        let keys: Vec<_> = table.keys().into_iter().collect();
        assert_eq!(keys, vec!["BRA", "ENG", "UEFA"]);

        let continents = continents(&countries).unwrap();
        assert_eq!(continents.rows[0].text("continent_id"), Some("amerika"));
        assert_eq!(continents.rows[0].text("name"), Some("America"));
    }

    #[test]
    fn test_match_season_key_is_synthesized() {
        let raw = raw_table(
            "match_info",
            vec![json!({"match_id": 1, "comp_id": "GB1", "season_id": 2020, "score": "2:1",
                        "date": "2020-09-12", "home-tm_id": 11, "away-tm_id": 12})],
        );
        let table = matches(&raw).unwrap();
        assert_eq!(table.rows[0].text("season"), Some("GB1-2020"));
        assert_eq!(table.rows[0].text("home"), Some("11"));
    }

    #[test]
    fn test_lineup_starter_flag_and_relation_nulls() {
        let raw = raw_table(
            "match_lineups",
            vec![
                json!({"side": "home", "starter": "starter", "country": "ENG",
                       "name": "A", "tm_id": 1, "match_id": 9}),
                json!({"side": "home", "starter": "sub", "country": "ENG",
                       "name": "B", "tm_id": 2, "match_id": 9}),
            ],
        );
        let table = lineups(&raw).unwrap();
        assert_eq!(table.rows[0].get("starter"), &Value::Bool(true));
        assert_eq!(table.rows[1].get("starter"), &Value::Bool(false));

        let rels = raw_table(
            "team_relations",
            vec![
                json!({"child_team_id": 2, "parent_team_id": 1}),
                json!({"child_team_id": 3, "parent_team_id": null}),
            ],
        );
        assert_eq!(team_relations(&rels).unwrap().len(), 1);
    }

    #[test]
    fn test_missing_raw_source_is_reported() {
        let result = RawDataset::from_tables(vec![season_info()]);
        assert!(matches!(result, Err(Error::MissingReference { .. })));
    }
}
