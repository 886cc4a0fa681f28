//! Environment configuration

use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::deliberation::state::DEFAULT_MAX_ROUNDS;

pub const ENV_WORKING_DIR: &str = "PARLIAMENT_WORKING_DIR";
pub const ENV_MAX_ROUNDS: &str = "PARLIAMENT_MAX_ROUNDS";
pub const ENV_SEED: &str = "PARLIAMENT_SEED";

/// Defaults shared by every command. Command-line flags override these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParliamentConfig {
    /// Directory holding session, ledger and bill
    pub working_dir: PathBuf,
    /// Scheduled rounds written into new sessions
    pub max_rounds: u32,
    /// Fixed RNG seed for reproducible draws
    pub seed: Option<u64>,
}

impl Default for ParliamentConfig {
    fn default() -> Self {
        Self {
            working_dir: PathBuf::from("./parliament"),
            max_rounds: DEFAULT_MAX_ROUNDS,
            seed: None,
        }
    }
}

impl ParliamentConfig {
    /// Load from `PARLIAMENT_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup. Unparsable values are logged
    /// and the default is kept.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(dir) = lookup(ENV_WORKING_DIR) {
            config.working_dir = PathBuf::from(dir);
        }
        if let Some(max) = lookup(ENV_MAX_ROUNDS) {
            match max.trim().parse() {
                Ok(n) => config.max_rounds = n,
                Err(_) => warn!(value = %max, "Ignoring invalid {}", ENV_MAX_ROUNDS),
            }
        }
        if let Some(seed) = lookup(ENV_SEED) {
            match seed.trim().parse() {
                Ok(n) => config.seed = Some(n),
                Err(_) => warn!(value = %seed, "Ignoring invalid {}", ENV_SEED),
            }
        }

        config
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        if seed.is_some() {
            self.seed = seed;
        }
        self
    }

    /// Random source for temperature draws: seeded when configured.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}
