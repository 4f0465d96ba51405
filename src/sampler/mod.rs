//! Environment extraction: a reduced, referentially closed copy of the
//! canonical dataset.
//!
//! Seasons are the root. Matches of the chosen seasons are sampled, and
//! everything else is narrowed to what the sampled matches (and the value
//! records of their players) reference:
//!
//! ```text
//! seasons -> competitions
//!    `-> matches (sampled) -> lineups -> players -> transfers, values (sampled)
//!           `------------------ teams <-------------' (left/joined)
//!                                 `-> team_relations (both ends selected)
//! continents, countries, areas: kept whole
//! ```

pub mod closure;
pub mod sample;
pub mod select;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::schema::SchemaRegistry;
use crate::store::{write_all, Table, TableStore};
use closure::verify_closure;
use sample::{check_fraction, sample_fraction};
use select::{
    by_keys, links_within, referenced_keys, referencing, with_value, within, KeySet, TimeWindow,
};

/// Seed for match retention
pub const MATCH_SEED: u64 = 4206969;
/// Seed for transfer and valuation retention
pub const VALUE_SEED: u64 = 2323;
/// Value records older than this before the first sampled match are dropped
pub const VALUE_LOOKBACK_DAYS: i64 = 365;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplingSeeds {
    pub matches: u64,
    pub values: u64,
}

impl Default for SamplingSeeds {
    fn default() -> Self {
        Self {
            matches: MATCH_SEED,
            values: VALUE_SEED,
        }
    }
}

/// What to extract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvParams {
    pub season_sample: BTreeSet<String>,
    pub match_fraction: f64,
    pub value_fraction: f64,
    #[serde(default)]
    pub seeds: SamplingSeeds,
}

impl EnvParams {
    pub fn new<I, S>(season_sample: I, match_fraction: f64, value_fraction: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            season_sample: season_sample.into_iter().map(Into::into).collect(),
            match_fraction,
            value_fraction,
            seeds: SamplingSeeds::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_fraction("match_fraction", self.match_fraction)?;
        check_fraction("value_fraction", self.value_fraction)?;
        Ok(())
    }
}

/// Row counts of a finished extract
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractSummary {
    pub tables: Vec<(&'static str, usize)>,
    /// Derived tables that ended up with no rows
    pub empty_tables: Vec<&'static str>,
    /// Matches and transfers dropped because a team they reference is invalid
    pub dropped_for_invalid_teams: usize,
}

impl ExtractSummary {
    pub fn rows(&self, table: &str) -> Option<usize> {
        self.tables
            .iter()
            .find(|(name, _)| *name == table)
            .map(|(_, n)| *n)
    }
}

/// The selected tables of one run, closed under every foreign key
#[derive(Debug, Clone)]
pub struct Extract {
    pub tables: Vec<Table>,
    pub summary: ExtractSummary,
}

impl Extract {
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name() == name)
    }
}

/// Build an extract from `source` and fully replace its tables in `dest`.
pub fn create_env<S, D>(
    source: &S,
    dest: &mut D,
    registry: &SchemaRegistry,
    params: &EnvParams,
) -> Result<ExtractSummary>
where
    S: TableStore + ?Sized,
    D: TableStore + ?Sized,
{
    let extract = build_extract(source, registry, params)?;
    write_all(dest, registry, &extract.tables)?;

    info!(
        tables = extract.tables.len(),
        rows = extract.summary.tables.iter().map(|(_, n)| n).sum::<usize>(),
        "environment written"
    );
    Ok(extract.summary)
}

/// Compute the extract without writing it.
pub fn build_extract<S: TableStore + ?Sized>(
    source: &S,
    registry: &SchemaRegistry,
    params: &EnvParams,
) -> Result<Extract> {
    params.validate()?;
    let read = |name: &str| -> Result<Table> { source.read_full(registry.get(name)?) };
    let lookback = Duration::days(VALUE_LOOKBACK_DAYS);

    // Seasons and their competitions
    let seasons = by_keys(read("seasons")?, &params.season_sample);
    let competitions = by_keys(
        read("competitions")?,
        &referenced_keys(&seasons, "competitions"),
    );
    debug!(seasons = seasons.len(), competitions = competitions.len(), "seeded");

    // Matches of those seasons, then sampled
    let matches = referencing(read("matches")?, "seasons", &seasons.keys());
    let mut matches = sample_fraction(matches, params.match_fraction, params.seeds.matches);

    let mut lineups = referencing(read("match_lineups")?, "matches", &matches.keys());
    let mut players = by_keys(read("players")?, &referenced_keys(&lineups, "players"));

    let value_family = |table: Table, players: &KeySet, window: Option<TimeWindow>| {
        let table = within(referencing(table, "players", players), "date", window);
        sample_fraction(table, params.value_fraction, params.seeds.values)
    };
    let window = TimeWindow::anchored(&matches, "date", lookback);
    let mut transfers = value_family(read("player_transfers")?, &players.keys(), window);
    let mut values = value_family(read("player_values")?, &players.keys(), window);

    // Teams reached from matches and transfers; nameless ones are invalid
    let mut team_keys = referenced_keys(&matches, "teams");
    team_keys.extend(referenced_keys(&transfers, "teams"));
    let mut teams = with_value(by_keys(read("teams")?, &team_keys), "name");

    let valid_teams = teams.keys();
    let mut dropped_for_invalid_teams = 0;
    if valid_teams.len() < team_keys.len() {
        let (match_count, transfer_count) = (matches.len(), transfers.len());
        matches = referencing(matches, "teams", &valid_teams);
        transfers = referencing(transfers, "teams", &valid_teams);
        dropped_for_invalid_teams =
            match_count - matches.len() + transfer_count - transfers.len();
        warn!(
            invalid_teams = team_keys.len() - valid_teams.len(),
            dropped_matches = match_count - matches.len(),
            dropped_transfers = transfer_count - transfers.len(),
            "dropping rows that reference invalid teams"
        );

        // Narrow everything that hung off the dropped rows. Nothing is
        // resampled, so each table only shrinks.
        lineups = referencing(lineups, "matches", &matches.keys());
        players = by_keys(players, &referenced_keys(&lineups, "players"));
        let window = TimeWindow::anchored(&matches, "date", lookback);
        transfers = within(referencing(transfers, "players", &players.keys()), "date", window);
        values = within(referencing(values, "players", &players.keys()), "date", window);

        team_keys = referenced_keys(&matches, "teams");
        team_keys.extend(referenced_keys(&transfers, "teams"));
        teams = by_keys(teams, &team_keys);
    }

    let relations = links_within(read("team_relations")?, &teams.keys())?;

    let derived = vec![
        competitions,
        seasons,
        players,
        teams,
        relations,
        matches,
        lineups,
        transfers,
        values,
    ];
    let empty_tables: Vec<_> = derived
        .iter()
        .filter(|t| t.is_empty())
        .map(|t| t.name())
        .collect();
    for name in &empty_tables {
        warn!(table = *name, "selection is empty");
    }

    // Reference tables are small and may be referenced from anywhere
    let mut tables = vec![read("continents")?, read("countries")?, read("areas")?];
    tables.extend(derived);

    verify_closure(&tables)?;

    let summary = ExtractSummary {
        tables: tables.iter().map(|t| (t.name(), t.len())).collect(),
        empty_tables,
        dropped_for_invalid_teams,
    };
    Ok(Extract { tables, summary })
}
