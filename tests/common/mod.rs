//! Shared fixtures for the integration tests.
//!
//! `write_raw_fixture` lays out a small raw dataset the way the external data
//! root looks on disk. `synthetic_store` builds a larger canonical dataset
//! directly, for properties that need many rows.

#![allow(dead_code)]

use serde_json::{json, Value as Json};
use std::fs;
use std::path::Path;

use football_extract::loader::load;
use football_extract::schema::{
    SchemaRegistry, AREAS, COMPETITIONS, CONTINENTS, COUNTRIES, MATCHES, MATCH_LINEUPS, PLAYERS,
    PLAYER_TRANSFERS, PLAYER_VALUES, SEASONS, TEAMS, TEAM_RELATIONS,
};
use football_extract::store::{parse_timestamp, MemoryStore, Row, Table, Value};

/// Season holding the scenario matches M1..M3
pub const SEASON: &str = "GB1-2020";

fn write_jsonl(root: &Path, source: &str, records: &[Json]) {
    let dir = root.join(source);
    fs::create_dir_all(&dir).unwrap();
    let body: Vec<String> = records.iter().map(|r| r.to_string()).collect();
    fs::write(dir.join("part-0.jsonl"), body.join("\n") + "\n").unwrap();
}

/// Raw tables for the scenario:
///
/// - GB1-2020 has M1 (T1 v T2), M2 (T1 v T3) and M3 (T5 v T2); T5 has no name
/// - M6 (GB1-2020) and transfer X6 reference T9, which has no team record
/// - GB1-2021 has M4, CL-2020 has M5
/// - relations T2->T1 and T6->T1 resolve once T1, T2, T6 are selected;
///   T4->T1 and T5->T2 never do
pub fn write_raw_fixture(root: &Path) {
    write_jsonl(
        root,
        "countries",
        &[
            json!({"country_id": "ENG", "name": "England", "continent": "europa"}),
            json!({"country_id": "BRA", "name": "Brazil", "continent": "amerika"}),
        ],
    );
    write_jsonl(
        root,
        "season_info",
        &[
            json!({"uid": "GB1-2020", "comp_id": "GB1", "season_id": "2020",
                   "name": "Premier League", "country": "ENG", "base": "erste liga"}),
            json!({"uid": "GB1-2021", "comp_id": "GB1", "season_id": "2021",
                   "name": "Premier League", "country": "ENG", "base": "erste liga"}),
            json!({"uid": "CL-2020", "comp_id": "CL", "season_id": "2020",
                   "name": "Champions League", "country": "UEFA", "base": "pokalwettbewerb"}),
        ],
    );
    write_jsonl(
        root,
        "team_info",
        &[
            json!({"team_id": "T1", "name": "Arsenal", "country": "ENG", "founded": 1886,
                   "squad_size": 25, "mean_age": 24.1}),
            json!({"team_id": "T2", "name": "Chelsea", "country": "ENG", "squad_size": 27}),
            json!({"team_id": "T3", "name": "Everton", "country": "ENG"}),
            json!({"team_id": "T4", "name": "Arsenal U21", "country": "ENG"}),
            json!({"team_id": "T5", "name": null, "country": "ENG"}),
            json!({"team_id": "T6", "name": "Santos", "country": "BRA", "address": "Vila Belmiro"}),
        ],
    );
    write_jsonl(
        root,
        "team_relations",
        &[
            json!({"child_team_id": "T2", "parent_team_id": "T1"}),
            json!({"child_team_id": "T4", "parent_team_id": "T1"}),
            json!({"child_team_id": "T5", "parent_team_id": "T2"}),
            json!({"child_team_id": "T6", "parent_team_id": "T1"}),
            json!({"child_team_id": "T3", "parent_team_id": null}),
        ],
    );
    write_jsonl(
        root,
        "player_info",
        &[
            json!({"tm_player_id": 1, "name": "P One", "broad_position": "Attack",
                   "place_of_birth_country": "ENG", "dob": "1995-02-01", "height": 1.82,
                   "citizenship-0": "England"}),
            json!({"tm_player_id": 2, "name": "P Two", "broad_position": "Defender",
                   "place_of_birth_country": "BRA", "citizenship-0": "Brazil",
                   "citizenship-1": "Portugal"}),
            json!({"tm_player_id": 3, "name": "P Three", "broad_position": "Midfield"}),
            json!({"tm_player_id": 4, "name": "P Four", "broad_position": "Goalkeeper"}),
            json!({"tm_player_id": 5, "name": "P Five", "broad_position": "Attack"}),
            json!({"tm_player_id": 6, "name": "P Six", "broad_position": "Attack"}),
        ],
    );
    write_jsonl(
        root,
        "match_info",
        &[
            json!({"match_id": "M1", "comp_id": "GB1", "season_id": "2020", "score": "2:1",
                   "date": "2020-09-01", "home-tm_id": "T1", "away-tm_id": "T2"}),
            json!({"match_id": "M2", "comp_id": "GB1", "season_id": "2020", "score": "0:0",
                   "date": "2020-10-01", "home-tm_id": "T1", "away-tm_id": "T3"}),
            json!({"match_id": "M3", "comp_id": "GB1", "season_id": "2020", "score": "1:3",
                   "date": "2020-11-01", "home-tm_id": "T5", "away-tm_id": "T2"}),
            json!({"match_id": "M4", "comp_id": "GB1", "season_id": "2021", "score": "1:1",
                   "date": "2021-09-01", "home-tm_id": "T2", "away-tm_id": "T4"}),
            json!({"match_id": "M5", "comp_id": "CL", "season_id": "2020", "score": "4:0",
                   "date": "2020-10-20", "home-tm_id": "T1", "away-tm_id": "T6"}),
            json!({"match_id": "M6", "comp_id": "GB1", "season_id": "2020", "score": "3:0",
                   "date": "2020-09-10", "home-tm_id": "T1", "away-tm_id": "T9"}),
        ],
    );
    let lineup = |match_id: &str, player: u32, side: &str, starter: &str| {
        json!({"match_id": match_id, "tm_id": player, "name": format!("P{}", player),
               "side": side, "starter": starter, "country": "ENG"})
    };
    write_jsonl(
        root,
        "match_lineups",
        &[
            lineup("M1", 1, "home", "starter"),
            lineup("M1", 2, "away", "starter"),
            lineup("M2", 1, "home", "starter"),
            lineup("M2", 3, "away", "sub"),
            lineup("M3", 4, "home", "starter"),
            lineup("M3", 2, "away", "starter"),
            lineup("M4", 5, "home", "starter"),
            lineup("M5", 6, "away", "starter"),
        ],
    );
    write_jsonl(
        root,
        "player_transfers",
        &[
            json!({"transfer_id": "X1", "tm_player_id": 1, "left": "T3", "joined": "T1",
                   "date": "2020-01-15", "is_loan": false, "is_end_of_loan": false,
                   "transfer_fee": 12000000}),
            json!({"transfer_id": "X2", "tm_player_id": 2, "left": "T2", "joined": "T6",
                   "date": "2018-01-01", "is_loan": true, "is_end_of_loan": false}),
            json!({"transfer_id": "X3", "tm_player_id": 3, "left": "T3", "joined": "T2",
                   "date": "2021-06-01", "is_loan": false, "is_end_of_loan": false}),
            json!({"transfer_id": "X4", "tm_player_id": 4, "left": "T5", "joined": "T2",
                   "date": "2020-06-01", "is_loan": false, "is_end_of_loan": false}),
            json!({"transfer_id": "X5", "tm_player_id": 1, "left": "T1", "joined": "T6",
                   "date": "2020-09-15", "is_loan": true, "is_end_of_loan": false}),
            json!({"transfer_id": "X6", "tm_player_id": 2, "left": "T9", "joined": "T2",
                   "date": "2020-07-01", "is_loan": false, "is_end_of_loan": true}),
        ],
    );
    write_jsonl(
        root,
        "player_values",
        &[
            json!({"mv_id": "V1", "tm_player_id": 1, "date": "2020-03-01", "value": 15000000}),
            json!({"mv_id": "V2", "tm_player_id": 2, "date": "2019-01-01", "value": 500000}),
            json!({"mv_id": "V3", "tm_player_id": 3, "date": "2020-09-20", "value": 2000000}),
            json!({"mv_id": "V4", "tm_player_id": 4, "date": "2020-05-01", "value": 100000}),
        ],
    );
}

/// The raw fixture, loaded into a fresh in-memory canonical store
pub fn fixture_store() -> MemoryStore {
    let dir = tempfile::tempdir().unwrap();
    write_raw_fixture(dir.path());
    let mut store = MemoryStore::new();
    load(dir.path(), &mut store, &SchemaRegistry::football()).unwrap();
    store
}

fn text(s: impl Into<String>) -> Value {
    Value::Text(s.into())
}

fn date(day: i64) -> Value {
    let start = parse_timestamp("2018-01-01").unwrap();
    Value::Timestamp(start + chrono::Duration::days(day))
}

/// A larger canonical dataset: 3 seasons x 40 matches, 24 teams (every
/// seventh nameless), 4 players per team, transfers and valuations spread
/// over four years.
pub fn synthetic_store() -> MemoryStore {
    let countries = Table::new(
        &COUNTRIES,
        vec![Row::new()
            .with("country_id", text("ENG"))
            .with("name", text("England"))
            .with("continent", text("europa"))
            .with("area", text("ENG"))],
    );
    let continents = Table::new(
        &CONTINENTS,
        vec![Row::new()
            .with("continent_id", text("europa"))
            .with("name", text("Europe"))],
    );
    let areas = Table::new(&AREAS, vec![Row::new().with("area_id", text("ENG"))]);
    let competitions = Table::new(
        &COMPETITIONS,
        vec![Row::new()
            .with("comp_id", text("GB1"))
            .with("name", text("Premier League"))
            .with("area", text("ENG"))
            .with("kind", text("league"))],
    );

    let season_ids = ["GB1-2018", "GB1-2019", "GB1-2020"];
    let seasons = Table::new(
        &SEASONS,
        season_ids
            .iter()
            .map(|id| {
                Row::new()
                    .with("season_id", text(*id))
                    .with("competition", text("GB1"))
                    .with("year_id", text(&id[4..]))
            })
            .collect(),
    );

    let team_count = 24;
    let teams = Table::new(
        &TEAMS,
        (0..team_count)
            .map(|t| {
                let name = if t % 7 == 3 {
                    Value::Null
                } else {
                    text(format!("Team {}", t))
                };
                Row::new()
                    .with("team_id", text(format!("T{:02}", t)))
                    .with("name", name)
                    .with("country", text("ENG"))
            })
            .collect(),
    );

    let players_per_team = 4;
    let players = Table::new(
        &PLAYERS,
        (0..team_count * players_per_team)
            .map(|p| {
                Row::new()
                    .with("pid", text(format!("P{:03}", p)))
                    .with("name", text(format!("Player {}", p)))
                    .with("broad_position", text("Midfield"))
                    .with("place_of_birth_country", text("ENG"))
            })
            .collect(),
    );

    let mut matches = Vec::new();
    let mut lineups = Vec::new();
    for (s, season) in season_ids.iter().enumerate() {
        for m in 0..40 {
            let home = (m * 5 + s) % team_count;
            let away = (home + 1 + m % 11) % team_count;
            let match_id = format!("M{}-{:02}", s, m);
            matches.push(
                Row::new()
                    .with("match_id", text(&match_id))
                    .with("score", text("1:0"))
                    .with("date", date((s * 365 + m * 7) as i64))
                    .with("home", text(format!("T{:02}", home)))
                    .with("away", text(format!("T{:02}", away)))
                    .with("season", text(*season)),
            );
            for (side, team) in [("home", home), ("away", away)] {
                for k in 0..2 {
                    let pid = format!("P{:03}", team * players_per_team + k);
                    lineups.push(
                        Row::new()
                            .with("side", text(side))
                            .with("starter", Value::Bool(k == 0))
                            .with("player_name", text(&pid))
                            .with("player", text(&pid))
                            .with("match", text(&match_id)),
                    );
                }
            }
        }
    }

    let mut transfers = Vec::new();
    let mut values = Vec::new();
    for p in 0..team_count * players_per_team {
        let team = p / players_per_team;
        for k in 0..3 {
            let day = ((p * 37 + k * 211) % 1460) as i64;
            transfers.push(
                Row::new()
                    .with("transfer_id", text(format!("X{:03}-{}", p, k)))
                    .with("date", date(day))
                    .with("is_loan", Value::Bool(k == 1))
                    .with("is_end_of_loan", Value::Bool(false))
                    .with("player", text(format!("P{:03}", p)))
                    .with("left", text(format!("T{:02}", (team + k + 1) % team_count)))
                    .with("joined", text(format!("T{:02}", team))),
            );
            values.push(
                Row::new()
                    .with("mv_id", text(format!("V{:03}-{}", p, k)))
                    .with("date", date(day + 30))
                    .with("value", Value::Real(1_000_000.0 * (k + 1) as f64))
                    .with("player", text(format!("P{:03}", p))),
            );
        }
    }

    let relations = (1..team_count)
        .map(|t| {
            Row::new()
                .with("child", text(format!("T{:02}", t)))
                .with("parent", text(format!("T{:02}", t / 2)))
        })
        .collect();

    MemoryStore::with_tables([
        continents,
        countries,
        areas,
        competitions,
        seasons,
        players,
        teams,
        Table::new(&TEAM_RELATIONS, relations),
        Table::new(&MATCHES, matches),
        Table::new(&MATCH_LINEUPS, lineups),
        Table::new(&PLAYER_TRANSFERS, transfers),
        Table::new(&PLAYER_VALUES, values),
    ])
}
