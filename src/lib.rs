pub mod cli;
pub mod config;
pub mod error;
pub mod loader;
pub mod sampler;
pub mod schema;
pub mod store;

pub use cli::{Cli, Commands};
pub use error::{Error, Result};
pub use sampler::{build_extract, create_env, EnvParams, ExtractSummary, SamplingSeeds};
pub use schema::SchemaRegistry;
pub use store::{MemoryStore, SqliteStore, TableStore};
