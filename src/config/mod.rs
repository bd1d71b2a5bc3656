use std::time::Duration;
use serde::Deserialize;
use config::{Config, ConfigError, Environment, File};

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub scanner: ScannerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Timing of the QR check-in polling loop. The defaults give a one minute
/// budget: 300 ticks at 200ms.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ScannerConfig {
    pub tick_interval_ms: u64,
    pub max_ticks: u32,
    pub min_attempt_spacing_ms: u64,
    pub decode_timeout_ms: u64,
}

impl ScannerConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn min_attempt_spacing(&self) -> Duration {
        Duration::from_millis(self.min_attempt_spacing_ms)
    }

    pub fn decode_timeout(&self) -> Duration {
        Duration::from_millis(self.decode_timeout_ms)
    }
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 200,
            max_ticks: 300,
            min_attempt_spacing_ms: 150,
            decode_timeout_ms: 500,
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("database.url", "sqlite://barangay_events.db?mode=rwc")?
            .set_default("database.max_connections", 10)?

            // Add config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))

            // Environment variables: BARANGAY_EVENTS__SERVER__PORT=9000
            .add_source(Environment::with_prefix("BARANGAY_EVENTS").separator("__"))

            .build()?;

        config.try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: "sqlite://barangay_events.db?mode=rwc".to_string(),
                max_connections: 10,
            },
            scanner: ScannerConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scanner_defaults_give_a_minute_budget() {
        let scanner = ScannerConfig::default();
        assert_eq!(scanner.tick_interval() * scanner.max_ticks, Duration::from_secs(60));
        assert!(scanner.min_attempt_spacing() < scanner.tick_interval());
    }
}
