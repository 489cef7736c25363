//! Configuration system for Spellbook.
//!
//! Load generation settings from TOML or YAML files to control the size
//! bound, recursion limit, per-solve timeout and seed parallelism without
//! code changes.
//!
//! # Examples
//!
//! Load configuration from TOML string:
//!
//! ```
//! use spellbook_config::{GenerationConfig, ThreadCount};
//! use std::time::Duration;
//!
//! let config = GenerationConfig::from_toml_str(r#"
//!     max_cards_in_combo = 8
//!     solve_timeout_millis = 2500
//!
//!     [thread_count]
//!     count = 4
//! "#).unwrap();
//!
//! assert_eq!(config.max_cards_in_combo, 8);
//! assert_eq!(config.solve_timeout(), Duration::from_millis(2500));
//! assert_eq!(config.thread_count, ThreadCount::Count(4));
//! ```
//!
//! Use default config when file is missing:
//!
//! ```
//! use spellbook_config::GenerationConfig;
//!
//! let config = GenerationConfig::load("spellbook.toml").unwrap_or_default();
//! assert_eq!(config.recursion_limit, 20);
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use spellbook_core::SpellbookError;
use thiserror::Error;

/// Largest card set a variant may have.
pub const DEFAULT_MAX_CARDS_IN_COMBO: usize = 10;

/// Production-chain depth at which requirement depths give up.
pub const DEFAULT_RECURSION_LIMIT: usize = 20;

/// Wall-clock budget of a single solve call.
pub const DEFAULT_SOLVE_TIMEOUT_MILLIS: u64 = 5_000;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<ConfigError> for SpellbookError {
    fn from(err: ConfigError) -> Self {
        SpellbookError::Config(err.to_string())
    }
}

/// Settings of one variant generation pass.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct GenerationConfig {
    /// Upper bound on the number of cards in any variant.
    pub max_cards_in_combo: usize,

    /// Depth limit of the requirement-depth traversal. Each producing combo
    /// below the seed adds two levels.
    pub recursion_limit: usize,

    /// Timeout of each individual solve, in milliseconds.
    pub solve_timeout_millis: u64,

    /// Worker threads for seed enumeration.
    pub thread_count: ThreadCount,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_cards_in_combo: DEFAULT_MAX_CARDS_IN_COMBO,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
            solve_timeout_millis: DEFAULT_SOLVE_TIMEOUT_MILLIS,
            thread_count: ThreadCount::Auto,
        }
    }
}

impl GenerationConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if file doesn't exist, contains invalid TOML or fails
    /// [`validate`](Self::validate).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Renders the configuration as TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_cards_in_combo == 0 {
            return Err(ConfigError::Invalid(
                "max_cards_in_combo must be at least 1".to_string(),
            ));
        }
        if self.solve_timeout_millis == 0 {
            return Err(ConfigError::Invalid(
                "solve_timeout_millis must be positive".to_string(),
            ));
        }
        if self.thread_count == ThreadCount::Count(0) {
            return Err(ConfigError::Invalid(
                "thread_count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Sets the card bound.
    pub fn with_max_cards(mut self, max_cards: usize) -> Self {
        self.max_cards_in_combo = max_cards;
        self
    }

    /// Sets the recursion limit.
    pub fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit;
        self
    }

    /// Sets the per-solve timeout.
    pub fn with_timeout_millis(mut self, millis: u64) -> Self {
        self.solve_timeout_millis = millis;
        self
    }

    /// Sets the seed worker count.
    pub fn with_thread_count(mut self, thread_count: ThreadCount) -> Self {
        self.thread_count = thread_count;
        self
    }

    /// Returns the per-solve timeout as a Duration.
    pub fn solve_timeout(&self) -> Duration {
        Duration::from_millis(self.solve_timeout_millis)
    }
}

/// Worker thread count for seed enumeration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreadCount {
    /// One worker per available core.
    #[default]
    Auto,

    /// Enumerate seeds on the calling thread.
    None,

    /// Specific number of workers.
    Count(usize),
}

impl ThreadCount {
    /// Resolves to a concrete worker count for `seed_count` seeds.
    pub fn resolve(&self, seed_count: usize) -> usize {
        let workers = match self {
            ThreadCount::Auto => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            ThreadCount::None => 1,
            ThreadCount::Count(n) => *n,
        };
        workers.min(seed_count).max(1)
    }
}

#[cfg(test)]
mod tests;
