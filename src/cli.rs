use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::DATA_ROOT_ENV;

#[derive(Parser, Debug)]
#[command(name = "football-extract")]
#[command(version, about = "Build the canonical football dataset and sample environments from it")]
pub struct Cli {
    /// Directory holding the canonical and environment stores
    #[arg(short, long, global = true)]
    pub store_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Normalize the raw external tables into the canonical dataset
    Load {
        /// Directory containing one sub-directory per raw table
        #[arg(short, long, env = DATA_ROOT_ENV)]
        data_root: PathBuf,
    },

    /// Sample a referentially consistent environment from the canonical dataset
    CreateEnv {
        /// JSON file with environment definitions
        #[arg(short, long, conflicts_with_all = ["seasons", "match_fraction", "value_fraction"])]
        config: Option<PathBuf>,

        /// Environment to build (all definitions in --config when omitted)
        #[arg(short, long)]
        name: Option<String>,

        /// Season keys to keep (comma-separated)
        #[arg(long, value_delimiter = ',', requires = "match_fraction")]
        seasons: Option<Vec<String>>,

        /// Share of the seasons' matches to keep
        #[arg(long)]
        match_fraction: Option<f64>,

        /// Share of transfers and valuations to keep
        #[arg(long, default_value_t = 1.0)]
        value_fraction: f64,
    },

    /// Report foreign keys that do not resolve
    Check {
        /// Environment to check (the canonical dataset when omitted)
        #[arg(short, long)]
        env: Option<String>,

        /// Only check these tables and their parents (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        tables: Option<Vec<String>>,
    },

    /// List all tables in dependency order
    ListTables,
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
