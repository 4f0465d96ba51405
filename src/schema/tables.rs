//! Table schema definitions for the canonical football dataset

use super::types::*;

// =============================================================================
// Reference Tables (retained in full by every extract)
// =============================================================================

pub static CONTINENTS: TableSchema = TableSchema {
    name: "continents",
    raw_source: "countries",
    columns: &[
        Column::required("continent_id", ColumnType::Text).raw("continent"),
        Column::new("name", ColumnType::Text),
    ],
    primary_key: &["continent_id"],
    foreign_keys: &[],
};

/// Country or region
pub static AREAS: TableSchema = TableSchema {
    name: "areas",
    raw_source: "season_info",
    columns: &[Column::required("area_id", ColumnType::Text)],
    primary_key: &["area_id"],
    foreign_keys: &[],
};

pub static COUNTRIES: TableSchema = TableSchema {
    name: "countries",
    raw_source: "countries",
    columns: &[
        Column::required("country_id", ColumnType::Text),
        Column::required("name", ColumnType::Text),
        Column::required("continent", ColumnType::Text),
        Column::required("area", ColumnType::Text).raw("country_id"),
    ],
    primary_key: &["country_id"],
    foreign_keys: &[
        ForeignKey::new("continent", "continents", "continent_id"),
        ForeignKey::new("area", "areas", "area_id"),
    ],
};

// =============================================================================
// Competition Structure
// =============================================================================

pub static COMPETITIONS: TableSchema = TableSchema {
    name: "competitions",
    raw_source: "season_info",
    columns: &[
        Column::required("comp_id", ColumnType::Text),
        Column::required("name", ColumnType::Text),
        Column::required("area", ColumnType::Text).raw("country"),
        Column::required("kind", ColumnType::Text),
    ],
    primary_key: &["comp_id"],
    foreign_keys: &[ForeignKey::new("area", "areas", "area_id")],
};

pub static SEASONS: TableSchema = TableSchema {
    name: "seasons",
    raw_source: "season_info",
    columns: &[
        Column::required("season_id", ColumnType::Text).raw("uid"),
        Column::required("competition", ColumnType::Text).raw("comp_id"),
        Column::required("year_id", ColumnType::Text).raw("season_id"),
    ],
    primary_key: &["season_id"],
    foreign_keys: &[ForeignKey::new("competition", "competitions", "comp_id")],
};

// =============================================================================
// People and Clubs
// =============================================================================

pub static PLAYERS: TableSchema = TableSchema {
    name: "players",
    raw_source: "player_info",
    columns: &[
        Column::required("pid", ColumnType::Text).raw("tm_player_id"),
        Column::required("name", ColumnType::Text),
        Column::new("preferred_foot", ColumnType::Text),
        Column::new("place_of_birth", ColumnType::Text),
        Column::required("broad_position", ColumnType::Text),
        Column::new("specific_position", ColumnType::Text),
        Column::new("date_of_birth", ColumnType::Timestamp).raw("dob"),
        Column::new("national_team_name", ColumnType::Text),
        Column::new("national_team_nation", ColumnType::Text),
        Column::new("national_app_kind", ColumnType::Text),
        Column::new("place_of_birth_country", ColumnType::Text),
        Column::new("citizenship_1", ColumnType::Text).raw("citizenship-0"),
        Column::new("citizenship_2", ColumnType::Text).raw("citizenship-1"),
        Column::new("full_name", ColumnType::Text),
        Column::new("height", ColumnType::Real),
    ],
    primary_key: &["pid"],
    foreign_keys: &[ForeignKey::new(
        "place_of_birth_country",
        "countries",
        "country_id",
    )],
};

/// `name` is nullable here: nameless teams exist in the raw data but never
/// make it into an extract.
pub static TEAMS: TableSchema = TableSchema {
    name: "teams",
    raw_source: "team_info",
    columns: &[
        Column::required("team_id", ColumnType::Text),
        Column::new("name", ColumnType::Text),
        Column::new("founded", ColumnType::Real),
        Column::new("stadium", ColumnType::Real),
        Column::new("members", ColumnType::Real),
        Column::new("address", ColumnType::Text),
        Column::new("country", ColumnType::Text),
        Column::new("squad_size", ColumnType::Real),
        Column::new("mean_age", ColumnType::Real),
    ],
    primary_key: &["team_id"],
    foreign_keys: &[ForeignKey::new("country", "countries", "country_id")],
};

pub static TEAM_RELATIONS: TableSchema = TableSchema {
    name: "team_relations",
    raw_source: "team_relations",
    columns: &[
        Column::required("child", ColumnType::Text).raw("child_team_id"),
        Column::required("parent", ColumnType::Text).raw("parent_team_id"),
    ],
    primary_key: &[],
    foreign_keys: &[
        ForeignKey::new("child", "teams", "team_id"),
        ForeignKey::new("parent", "teams", "team_id"),
    ],
};

// =============================================================================
// Matches
// =============================================================================

pub static MATCHES: TableSchema = TableSchema {
    name: "matches",
    raw_source: "match_info",
    columns: &[
        Column::required("match_id", ColumnType::Text),
        Column::required("score", ColumnType::Text),
        Column::required("date", ColumnType::Timestamp),
        Column::required("home", ColumnType::Text).raw("home-tm_id"),
        Column::required("away", ColumnType::Text).raw("away-tm_id"),
        Column::required("season", ColumnType::Text),
    ],
    primary_key: &["match_id"],
    foreign_keys: &[
        ForeignKey::new("home", "teams", "team_id"),
        ForeignKey::new("away", "teams", "team_id"),
        ForeignKey::new("season", "seasons", "season_id"),
    ],
};

pub static MATCH_LINEUPS: TableSchema = TableSchema {
    name: "match_lineups",
    raw_source: "match_lineups",
    columns: &[
        Column::required("side", ColumnType::Text),
        Column::required("starter", ColumnType::Boolean),
        Column::new("country", ColumnType::Text),
        Column::required("player_name", ColumnType::Text).raw("name"),
        Column::required("player", ColumnType::Text).raw("tm_id"),
        Column::required("match", ColumnType::Text).raw("match_id"),
    ],
    primary_key: &[],
    foreign_keys: &[
        ForeignKey::new("player", "players", "pid"),
        ForeignKey::new("match", "matches", "match_id"),
    ],
};

// =============================================================================
// Value Records (sampled together under one fraction)
// =============================================================================

pub static PLAYER_TRANSFERS: TableSchema = TableSchema {
    name: "player_transfers",
    raw_source: "player_transfers",
    columns: &[
        Column::required("transfer_id", ColumnType::Text),
        Column::required("date", ColumnType::Timestamp),
        Column::required("is_loan", ColumnType::Boolean),
        Column::required("is_end_of_loan", ColumnType::Boolean),
        Column::new("transfer_fee", ColumnType::Real),
        Column::required("player", ColumnType::Text).raw("tm_player_id"),
        Column::required("left", ColumnType::Text),
        Column::required("joined", ColumnType::Text),
    ],
    primary_key: &["transfer_id"],
    foreign_keys: &[
        ForeignKey::new("player", "players", "pid"),
        ForeignKey::new("left", "teams", "team_id"),
        ForeignKey::new("joined", "teams", "team_id"),
    ],
};

pub static PLAYER_VALUES: TableSchema = TableSchema {
    name: "player_values",
    raw_source: "player_values",
    columns: &[
        Column::required("mv_id", ColumnType::Text),
        Column::required("date", ColumnType::Timestamp),
        Column::required("value", ColumnType::Real),
        Column::required("player", ColumnType::Text).raw("tm_player_id"),
    ],
    primary_key: &["mv_id"],
    foreign_keys: &[ForeignKey::new("player", "players", "pid")],
};

// =============================================================================
// Table Registry
// =============================================================================

/// All canonical tables, parents before children
pub static ALL_TABLES: &[&TableSchema] = &[
    &CONTINENTS,
    &AREAS,
    &COUNTRIES,
    &COMPETITIONS,
    &SEASONS,
    &PLAYERS,
    &TEAMS,
    &TEAM_RELATIONS,
    &MATCHES,
    &MATCH_LINEUPS,
    &PLAYER_TRANSFERS,
    &PLAYER_VALUES,
];

/// Get a table schema by name
pub fn get_table(name: &str) -> Option<&'static TableSchema> {
    ALL_TABLES.iter().find(|t| t.name == name).copied()
}

/// Get all table names
pub fn table_names() -> Vec<&'static str> {
    ALL_TABLES.iter().map(|t| t.name).collect()
}
