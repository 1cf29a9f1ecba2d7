//! Main application configuration
//!
//! This module defines the primary configuration structures for the fragstats
//! assistant, including TOML file loading, environment overrides and validation.

use crate::config::rating::RatingSettings;
use crate::config::teams::TeamSettings;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub data: DataSettings,
    pub teams: TeamSettings,
    pub rating: RatingSettings,
    pub tracker: TrackerSettings,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Service name for logging and metrics
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Port for health check endpoint
    pub health_port: u16,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_seconds: u64,
    /// Maximum commands evaluated at once
    pub max_concurrent_operations: usize,
    /// Token a message must contain to be treated as a command
    pub mention: String,
}

/// Locations of the roster and round history
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    /// JSON array of `{"id", "name", "score"}`
    pub roster_path: PathBuf,
    /// JSON array of `{"winners", "losers"}` in chronological order
    pub rounds_path: PathBuf,
}

/// Game activity detection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerSettings {
    pub enabled: bool,
    pub poll_interval_seconds: u64,
    /// Quiet period after which a running game counts as finished
    pub inactivity_timeout_seconds: u64,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "fragstats".to_string(),
            log_level: "info".to_string(),
            health_port: 8080,
            shutdown_timeout_seconds: 30,
            max_concurrent_operations: 16,
            mention: "@fragstats".to_string(),
        }
    }
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            roster_path: PathBuf::from("data/roster.json"),
            rounds_path: PathBuf::from("data/rounds.json"),
        }
    }
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            poll_interval_seconds: 10,
            inactivity_timeout_seconds: 120, // 2 minutes
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file; missing sections take defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Override fields from `FRAGSTATS_*` environment variables
    pub fn apply_env(&mut self) -> Result<()> {
        // Service settings
        if let Ok(name) = env::var("FRAGSTATS_SERVICE_NAME") {
            self.service.name = name;
        }
        if let Ok(log_level) = env::var("FRAGSTATS_LOG_LEVEL") {
            self.service.log_level = log_level;
        }
        if let Ok(port) = env::var("FRAGSTATS_HEALTH_PORT") {
            self.service.health_port = port
                .parse()
                .map_err(|_| anyhow!("Invalid FRAGSTATS_HEALTH_PORT value: {}", port))?;
        }
        if let Ok(timeout) = env::var("FRAGSTATS_SHUTDOWN_TIMEOUT_SECONDS") {
            self.service.shutdown_timeout_seconds = timeout.parse().map_err(|_| {
                anyhow!("Invalid FRAGSTATS_SHUTDOWN_TIMEOUT_SECONDS value: {}", timeout)
            })?;
        }
        if let Ok(max_ops) = env::var("FRAGSTATS_MAX_CONCURRENT_OPERATIONS") {
            self.service.max_concurrent_operations = max_ops.parse().map_err(|_| {
                anyhow!("Invalid FRAGSTATS_MAX_CONCURRENT_OPERATIONS value: {}", max_ops)
            })?;
        }
        if let Ok(mention) = env::var("FRAGSTATS_MENTION") {
            self.service.mention = mention;
        }

        // Data sources
        if let Ok(path) = env::var("FRAGSTATS_ROSTER_PATH") {
            self.data.roster_path = PathBuf::from(path);
        }
        if let Ok(path) = env::var("FRAGSTATS_ROUNDS_PATH") {
            self.data.rounds_path = PathBuf::from(path);
        }

        // Team balancing
        if let Ok(exponent) = env::var("FRAGSTATS_SKILL_EXPONENT") {
            self.teams.skill_exponent = exponent
                .parse()
                .map_err(|_| anyhow!("Invalid FRAGSTATS_SKILL_EXPONENT value: {}", exponent))?;
        }
        if let Ok(max) = env::var("FRAGSTATS_MAX_ROSTER_SIZE") {
            self.teams.max_roster_size = max
                .parse()
                .map_err(|_| anyhow!("Invalid FRAGSTATS_MAX_ROSTER_SIZE value: {}", max))?;
        }
        if let Ok(weight) = env::var("FRAGSTATS_DEFAULT_GUEST_WEIGHT") {
            self.teams.default_guest_weight = weight
                .parse()
                .map_err(|_| anyhow!("Invalid FRAGSTATS_DEFAULT_GUEST_WEIGHT value: {}", weight))?;
        }

        // Rating
        if let Ok(model) = env::var("FRAGSTATS_RATING_MODEL") {
            self.rating.model = model
                .parse()
                .map_err(|_| anyhow!("Invalid FRAGSTATS_RATING_MODEL value: {}", model))?;
        }
        if let Ok(k) = env::var("FRAGSTATS_CONSERVATIVE_K") {
            self.rating.conservative_k = k
                .parse()
                .map_err(|_| anyhow!("Invalid FRAGSTATS_CONSERVATIVE_K value: {}", k))?;
        }

        // Tracker
        if let Ok(enabled) = env::var("FRAGSTATS_TRACKER_ENABLED") {
            self.tracker.enabled = enabled
                .parse()
                .map_err(|_| anyhow!("Invalid FRAGSTATS_TRACKER_ENABLED value: {}", enabled))?;
        }
        if let Ok(timeout) = env::var("FRAGSTATS_INACTIVITY_TIMEOUT_SECONDS") {
            self.tracker.inactivity_timeout_seconds = timeout.parse().map_err(|_| {
                anyhow!("Invalid FRAGSTATS_INACTIVITY_TIMEOUT_SECONDS value: {}", timeout)
            })?;
        }

        Ok(())
    }

    /// Get shutdown timeout as Duration
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.service.shutdown_timeout_seconds)
    }

    /// Get tracker poll interval as Duration
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.tracker.poll_interval_seconds)
    }

    /// Get tracker inactivity timeout as chrono Duration
    pub fn inactivity_timeout(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.tracker.inactivity_timeout_seconds as i64)
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    // Validate ports
    if config.service.health_port == 0 {
        return Err(anyhow!("Health port cannot be 0"));
    }

    if config.service.shutdown_timeout_seconds == 0 {
        return Err(anyhow!("Shutdown timeout must be greater than 0"));
    }
    if config.service.max_concurrent_operations == 0 {
        return Err(anyhow!("Max concurrent operations must be greater than 0"));
    }
    if config.service.mention.trim().is_empty() {
        return Err(anyhow!("Mention token cannot be empty"));
    }

    // Validate team settings
    let teams = &config.teams;
    if !teams.skill_exponent.is_finite() || teams.skill_exponent < 1.0 {
        return Err(anyhow!("Skill exponent must be at least 1"));
    }
    if teams.score_tolerance < 0.0 || teams.skill_tolerance < 0.0 {
        return Err(anyhow!("Tolerances must be non-negative"));
    }
    if !(2..=24).contains(&teams.max_roster_size) {
        return Err(anyhow!(
            "Max roster size must be between 2 and 24, got {}",
            teams.max_roster_size
        ));
    }
    if teams.default_guest_weight < 0.0 {
        return Err(anyhow!("Default guest weight must be non-negative"));
    }

    // Validate rating settings
    if !config.rating.conservative_k.is_finite() || config.rating.conservative_k < 0.0 {
        return Err(anyhow!("Conservative k must be non-negative"));
    }
    config.rating.trueskill.validate()?;
    config.rating.weng_lin.validate()?;

    // Validate tracker settings
    if config.tracker.poll_interval_seconds == 0 {
        return Err(anyhow!("Tracker poll interval must be greater than 0"));
    }
    if config.tracker.inactivity_timeout_seconds == 0 {
        return Err(anyhow!("Inactivity timeout must be greater than 0"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rating::model::RatingModelKind;
    use crate::teams::partition::ImbalancePenalty;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.teams.max_roster_size, 16);
        assert_eq!(config.teams.default_guest_weight, 1000.0);
        assert_eq!(config.rating.conservative_k, 3.0);
        assert_eq!(config.inactivity_timeout(), chrono::Duration::seconds(120));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = AppConfig::default();
        config.service.log_level = "loud".to_string();
        assert!(validate_config(&config).is_err());

        let mut config = AppConfig::default();
        config.teams.skill_exponent = 0.5;
        assert!(validate_config(&config).is_err());

        let mut config = AppConfig::default();
        config.teams.max_roster_size = 40;
        assert!(validate_config(&config).is_err());

        let mut config = AppConfig::default();
        config.rating.trueskill.beta = -1.0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let toml = r#"
            [service]
            mention = "@stats"

            [teams]
            skill_exponent = 2.0
            penalty = "flat"
            max_roster_size = 12

            [rating]
            model = "weng_lin"
            conservative_k = 2.0
        "#;

        let config: AppConfig = toml::from_str(toml).unwrap();
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.service.mention, "@stats");
        assert_eq!(config.service.health_port, 8080);
        assert_eq!(config.teams.skill_exponent, 2.0);
        assert_eq!(config.teams.penalty, ImbalancePenalty::Flat);
        assert_eq!(config.teams.default_guest_weight, 1000.0);
        assert_eq!(config.rating.model, RatingModelKind::WengLin);
        assert_eq!(config.rating.trueskill.initial_mu, 25.0);
        assert_eq!(config.tracker.inactivity_timeout_seconds, 120);
    }

    #[test]
    fn test_from_file_missing_path() {
        let err = AppConfig::from_file("/nonexistent/fragstats.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
