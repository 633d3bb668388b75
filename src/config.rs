use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use url::Url;

use crate::matcher::MatchStrategy;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub remote: RemoteServiceConfig,
    pub matcher: MatcherConfig,
    pub reconciler: ReconcilerConfig,
    pub scheduler: SchedulerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteServiceConfig {
    pub base_url: String,
    pub api_key: String,
    pub api_secret: String,
    pub page_size: usize,
    pub page_delay_ms: u64,
    pub request_timeout: u64,
    pub retry_attempts: u32,
    pub retry_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatcherConfig {
    pub strategies: Vec<MatchStrategy>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcilerConfig {
    pub batch_size: usize,
    pub batch_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    pub interval: String, // Cron expression
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default"))
            // Add environment-specific config
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add local config (ignored by git)
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables with prefix "REPRICER"
            .add_source(Environment::with_prefix("REPRICER").separator("__"))
            .build()?;

        let config: AppConfig = s.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.max_connections == 0 {
            return Err(ConfigError::Message(
                "Database max_connections must be greater than 0".into(),
            ));
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigError::Message(
                "Database min_connections cannot exceed max_connections".into(),
            ));
        }

        if Url::parse(&self.remote.base_url).is_err() {
            return Err(ConfigError::Message(
                "Invalid remote base_url format".into(),
            ));
        }

        if self.remote.api_key.trim().is_empty() || self.remote.api_secret.trim().is_empty() {
            return Err(ConfigError::Message(
                "Remote api_key and api_secret must be set".into(),
            ));
        }

        if self.remote.page_size == 0 {
            return Err(ConfigError::Message(
                "Remote page_size must be greater than 0".into(),
            ));
        }

        // The remote service rate-limits; 500ms is its documented floor.
        if self.remote.page_delay_ms < 500 {
            return Err(ConfigError::Message(
                "Remote page_delay_ms must be at least 500".into(),
            ));
        }

        if self.remote.retry_attempts == 0 {
            return Err(ConfigError::Message(
                "Remote retry_attempts must be at least 1".into(),
            ));
        }

        if self.matcher.strategies.is_empty() {
            return Err(ConfigError::Message(
                "At least one matcher strategy must be enabled".into(),
            ));
        }

        if self.reconciler.batch_size == 0 {
            return Err(ConfigError::Message(
                "Reconciler batch_size must be greater than 0".into(),
            ));
        }

        if !self.is_valid_cron(&self.scheduler.interval) {
            return Err(ConfigError::Message(
                "Invalid cron expression in scheduler.interval".into(),
            ));
        }

        Ok(())
    }

    fn is_valid_cron(&self, cron_expr: &str) -> bool {
        // Basic cron validation - should have 5 parts (minute hour day month weekday)
        let parts: Vec<&str> = cron_expr.split_whitespace().collect();
        if parts.len() != 5 {
            return false;
        }

        // Each part should be valid
        for part in parts {
            if part.is_empty() {
                return false;
            }
            // Allow numbers, ranges, lists, and wildcards
            if !part
                .chars()
                .all(|c| c.is_ascii_digit() || c == '*' || c == '-' || c == ',' || c == '/')
            {
                return false;
            }
        }

        true
    }
}
