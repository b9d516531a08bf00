// src/config.rs
//
// Runtime configuration
//
// PRINCIPLES:
// - Credentials and connection parameters come from outside the
//   pipeline (config file and environment), never from code
// - Every knob has a working default except the provider key

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Top-level application configuration.
///
/// Loaded from a JSON file (see `AppConfig::load`), then overridden by
/// environment variables:
/// - `CRICSTATS_DB_PATH`
/// - `CRICSTATS_API_KEY`
/// - `CRICSTATS_API_HOST`
/// - `CRICSTATS_CALL_BUDGET`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub provider: ProviderConfig,
    pub ingest: IngestOptions,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database file location. Defaults to the platform data directory.
    pub path: Option<PathBuf>,
}

impl DatabaseConfig {
    /// Resolve the database file path, creating the parent directory.
    ///
    /// Path structure when unset: {APP_DATA}/cricstats/cricstats.db
    pub fn resolve(&self) -> AppResult<PathBuf> {
        if let Some(path) = &self.path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            return Ok(path.clone());
        }

        let data_dir = dirs::data_dir()
            .ok_or_else(|| AppError::Config("Could not determine app data directory".to_string()))?;
        let app_dir = data_dir.join("cricstats");
        std::fs::create_dir_all(&app_dir)?;
        Ok(app_dir.join("cricstats.db"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Provider key, sent as the x-rapidapi-key header.
    pub api_key: String,
    /// Provider host, sent as the x-rapidapi-host header.
    pub api_host: String,
    /// Base URL all endpoint paths are appended to.
    pub base_url: String,
    /// Transport timeout. The upstream default is implicit otherwise;
    /// here it is explicit and configurable.
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_host: "cricbuzz-cricket.p.rapidapi.com".to_string(),
            base_url: "https://cricbuzz-cricket.p.rapidapi.com".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestOptions {
    /// Maximum upstream calls a single run may attempt.
    pub call_budget: u32,
    /// Backfill runs halt once remaining budget drops to this margin.
    pub budget_margin: u32,
    /// Maximum matches examined per run by the toss backfill stage.
    pub toss_backfill_limit: usize,
    /// Maximum matches examined per run by the scorecard stage.
    pub scorecard_match_limit: usize,
    /// Matches ingested per year during historical backfill.
    pub historical_matches_per_year: usize,
    /// Years swept by the historical backfill subcommand.
    pub historical_years: Vec<i32>,
    /// Years swept by the world-cup backfill subcommand.
    pub world_cup_years: Vec<i32>,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            call_budget: 200,
            budget_margin: 20,
            toss_backfill_limit: 20,
            scorecard_match_limit: 15,
            historical_matches_per_year: 20,
            historical_years: vec![2022, 2023, 2024],
            world_cup_years: vec![2011, 2015, 2019, 2022, 2023, 2024],
        }
    }
}

impl AppConfig {
    /// Load configuration from `path` if it exists, otherwise start
    /// from defaults. Environment overrides are applied either way.
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let mut config = match path {
            Some(path) if path.exists() => {
                let raw = std::fs::read_to_string(path)?;
                serde_json::from_str(&raw)?
            }
            Some(path) => {
                return Err(AppError::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )))
            }
            None => Self::default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("CRICSTATS_DB_PATH") {
            self.database.path = Some(PathBuf::from(path));
        }
        if let Ok(key) = std::env::var("CRICSTATS_API_KEY") {
            self.provider.api_key = key;
        }
        if let Ok(host) = std::env::var("CRICSTATS_API_HOST") {
            self.provider.api_host = host;
        }
        if let Ok(budget) = std::env::var("CRICSTATS_CALL_BUDGET") {
            if let Ok(budget) = budget.parse() {
                self.ingest.call_budget = budget;
            }
        }
    }
}
