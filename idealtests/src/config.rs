use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::evaluator::{FitnessTransform, NonPassedPolicy, ZeroDurationPolicy};
use crate::metrics::COVERAGE;
use crate::operators::selection::AccumulationRule;
use crate::operators::sorting::{RankOrder, SortStrategy};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to open config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config '{path}': {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Single-objective ranking settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    /// Field to rank by; mappings are summed
    pub key: String,
    pub strategy: SortStrategy,
    pub order: RankOrder,
    /// Seed for pivot selection; unseeded runs draw from the thread rng
    pub seed: Option<u64>,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            key: COVERAGE.to_string(),
            strategy: SortStrategy::Quick,
            order: RankOrder::Ascending,
            seed: None,
        }
    }
}

/// Tournament selection settings
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    pub fitness: FitnessTransform,
    pub zero_duration: ZeroDurationPolicy,
    pub non_passed: NonPassedPolicy,
    pub accumulation: AccumulationRule,
    /// Evaluate duels on the rayon pool
    pub parallel: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ranking: RankingConfig,
    pub selection: SelectionConfig,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}
