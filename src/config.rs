//! Engine configuration
//!
//! Loaded from YAML with every field optional, then overridden by
//! `BLOBS_*` environment variables:
//!
//! | variable | field |
//! |---|---|
//! | `BLOBS_LAYOUT_SCALE` | `layout.scale` |
//! | `BLOBS_LAYOUT_SEED` | `layout.seed` |
//! | `BLOBS_EVENT_CAPACITY` | `events.capacity` |
//! | `BLOBS_SEARCH_LIMIT` | `query.search_limit` |

use crate::graph::Bounds;
use crate::query::{DEFAULT_SEARCH_LIMIT, QUICK_SEARCH_DEFAULT_LIMIT};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub layout: LayoutSettings,
    pub events: EventSettings,
    pub query: QuerySettings,
    /// Bounds reported before the first layout
    pub initial_bounds: Bounds,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            layout: LayoutSettings::default(),
            events: EventSettings::default(),
            query: QuerySettings::default(),
            initial_bounds: Bounds::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    /// Side of the square the detail layout is scaled into
    pub scale: f64,
    /// Side of the square used for the coarse (tier 0) layout
    pub coarse_scale: f64,
    /// Seed for the initial random placement
    pub seed: u64,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            scale: 1000.0,
            coarse_scale: 500.0,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventSettings {
    /// Events buffered per subscriber before it starts lagging
    pub capacity: usize,
}

impl Default for EventSettings {
    fn default() -> Self {
        Self { capacity: 1024 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuerySettings {
    pub search_limit: usize,
    pub quick_search_limit: usize,
    pub similar_limit: usize,
    pub full_graph_limit: usize,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            search_limit: DEFAULT_SEARCH_LIMIT,
            quick_search_limit: QUICK_SEARCH_DEFAULT_LIMIT,
            similar_limit: 10,
            full_graph_limit: 1000,
        }
    }
}

impl EngineConfig {
    /// Parse YAML; missing fields keep their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML file and apply environment overrides.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_yaml_str(&content)?;
        config.apply_env()?;
        Ok(config)
    }

    /// Apply `BLOBS_*` environment variable overrides.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup (the environment in production).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(scale) = parse_var(&lookup, "BLOBS_LAYOUT_SCALE")? {
            self.layout.scale = scale;
        }
        if let Some(seed) = parse_var(&lookup, "BLOBS_LAYOUT_SEED")? {
            self.layout.seed = seed;
        }
        if let Some(capacity) = parse_var(&lookup, "BLOBS_EVENT_CAPACITY")? {
            self.events.capacity = capacity;
        }
        if let Some(limit) = parse_var(&lookup, "BLOBS_SEARCH_LIMIT")? {
            self.query.search_limit = limit;
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.layout.scale.is_finite() && self.layout.scale > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "layout.scale must be positive, got {}",
                self.layout.scale
            )));
        }
        if !(self.layout.coarse_scale.is_finite() && self.layout.coarse_scale > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "layout.coarse_scale must be positive, got {}",
                self.layout.coarse_scale
            )));
        }
        if self.events.capacity == 0 {
            return Err(ConfigError::Invalid("events.capacity must be at least 1".to_string()));
        }
        let b = &self.initial_bounds;
        if b.min_x > b.max_x || b.min_y > b.max_y {
            return Err(ConfigError::Invalid("initial_bounds min exceeds max".to_string()));
        }
        Ok(())
    }

    /// YAML rendering of the defaults, suitable as a starting config file
    pub fn default_yaml() -> String {
        serde_yaml::to_string(&Self::default()).unwrap_or_default()
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid(format!("{key}: cannot parse {raw:?}"))),
    }
}
