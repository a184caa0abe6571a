// Runtime configuration
// Environment variables with defaults; the CLI may override individual fields.

use crate::engine::CivicEngine;
use crate::tie_break::TieBreak;
use crate::{db, loader};
use anyhow::{anyhow, Context, Result};
use rusqlite::Connection;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

pub const ENV_DATA_DIR: &str = "CIVIC_DATA_DIR";
pub const ENV_DATABASE: &str = "CIVIC_DATABASE";
pub const ENV_TIE_BREAK: &str = "CIVIC_TIE_BREAK";
pub const ENV_SUGGEST_LIMIT: &str = "CIVIC_SUGGEST_LIMIT";
pub const ENV_SUGGEST_MAX_LIMIT: &str = "CIVIC_SUGGEST_MAX_LIMIT";
pub const ENV_BIND_ADDR: &str = "CIVIC_BIND_ADDR";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineConfig {
    /// Directory with the CSV reference tables
    pub data_dir: PathBuf,

    /// SQLite database; preferred over `data_dir` when set
    pub database: Option<PathBuf>,

    pub tie_break: TieBreak,

    /// Autocomplete limit when the caller gives none
    pub suggest_limit: usize,

    /// Hard cap on any requested autocomplete limit
    pub suggest_max_limit: usize,

    pub bind_addr: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            data_dir: PathBuf::from("data"),
            database: None,
            tie_break: TieBreak::TableOrder,
            suggest_limit: 10,
            suggest_max_limit: 50,
            bind_addr: "0.0.0.0:5000".to_string(),
        }
    }
}

impl EngineConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key → value source (environment, tests)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = EngineConfig::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(dir) = get(ENV_DATA_DIR) {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(db) = get(ENV_DATABASE) {
            config.database = Some(PathBuf::from(db));
        }
        if let Some(policy) = get(ENV_TIE_BREAK) {
            config.tie_break = policy
                .parse()
                .map_err(|e: String| anyhow!("Invalid {}: {}", ENV_TIE_BREAK, e))?;
        }
        if let Some(limit) = get(ENV_SUGGEST_LIMIT) {
            config.suggest_limit = limit
                .parse()
                .with_context(|| format!("Invalid {}: '{}'", ENV_SUGGEST_LIMIT, limit))?;
        }
        if let Some(limit) = get(ENV_SUGGEST_MAX_LIMIT) {
            config.suggest_max_limit = limit
                .parse()
                .with_context(|| format!("Invalid {}: '{}'", ENV_SUGGEST_MAX_LIMIT, limit))?;
        }
        if let Some(addr) = get(ENV_BIND_ADDR) {
            config.bind_addr = addr;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.suggest_max_limit == 0 {
            return Err(anyhow!("{} must be at least 1", ENV_SUGGEST_MAX_LIMIT));
        }
        if self.suggest_limit > self.suggest_max_limit {
            return Err(anyhow!(
                "{} ({}) exceeds {} ({})",
                ENV_SUGGEST_LIMIT,
                self.suggest_limit,
                ENV_SUGGEST_MAX_LIMIT,
                self.suggest_max_limit
            ));
        }
        Ok(())
    }

    /// Run the load phase: SQLite when configured, CSV directory otherwise.
    /// Any failure here must stop the process before it serves a query.
    pub fn load_engine(&self) -> Result<CivicEngine> {
        let store = match &self.database {
            Some(path) => {
                if !path.is_file() {
                    return Err(anyhow!("Database not found at {}", path.display()));
                }
                let conn = Connection::open(path)
                    .with_context(|| format!("Failed to open database {}", path.display()))?;
                db::load_store(&conn)
                    .with_context(|| format!("Failed to load reference data from {}", path.display()))?
            }
            None => loader::load_store(&self.data_dir).with_context(|| {
                format!("Failed to load reference data from {}", self.data_dir.display())
            })?,
        };

        Ok(CivicEngine::new(Arc::new(store)).with_tie_break(self.tie_break))
    }

    /// Requested limit (or the default), capped at the maximum
    pub fn effective_limit(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.suggest_limit)
            .min(self.suggest_max_limit)
    }
}
