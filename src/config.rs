use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::sampler::EnvParams;

/// Environment variable naming the raw external data root
pub const DATA_ROOT_ENV: &str = "FOOTBALL_VALUE_DATA_ROOT";

/// Where canonical and environment stores live on disk
pub struct StoreLayout {
    root: PathBuf,
}

impl StoreLayout {
    pub fn new(custom_dir: Option<PathBuf>) -> Result<Self> {
        let root = match custom_dir {
            Some(dir) => dir,
            None => {
                let proj_dirs = ProjectDirs::from("", "", "football-extract").ok_or_else(|| {
                    io::Error::new(io::ErrorKind::NotFound, "could not determine data directory")
                })?;
                proj_dirs.data_dir().to_path_buf()
            }
        };

        fs::create_dir_all(root.join("envs"))?;

        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path to the canonical dataset
    pub fn canonical_db(&self) -> PathBuf {
        self.root.join("canonical.sqlite")
    }

    /// Path to a named environment extract
    pub fn env_db(&self, name: &str) -> PathBuf {
        self.root.join("envs").join(format!("{}.sqlite", name))
    }

    /// Names of the environments already written, sorted
    pub fn env_names(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(self.root.join("envs"))? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some("sqlite") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

/// A named environment in the definitions file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvDefinition {
    pub name: String,
    #[serde(flatten)]
    pub params: EnvParams,
}

/// Environment definitions, read from JSON:
///
/// ```json
/// { "envs": [ { "name": "dev", "season_sample": ["GB1-2020"],
///               "match_fraction": 0.2, "value_fraction": 0.5 } ] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvConfig {
    pub envs: Vec<EnvDefinition>,
}

impl EnvConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        for env in &config.envs {
            validate_env_name(&env.name)?;
            env.params.validate()?;
        }
        Ok(config)
    }

    /// One environment by name, or all of them
    pub fn select(&self, name: Option<&str>) -> Result<Vec<&EnvDefinition>> {
        match name {
            None => Ok(self.envs.iter().collect()),
            Some(name) => self
                .envs
                .iter()
                .find(|env| env.name == name)
                .map(|env| vec![env])
                .ok_or_else(|| Error::UnknownEnv(name.to_string())),
        }
    }
}

/// Environment names become file names
pub fn validate_env_name(name: &str) -> Result<()> {
    let ok = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if ok {
        Ok(())
    } else {
        Err(Error::UnknownEnv(format!("invalid environment name {:?}", name)))
    }
}
