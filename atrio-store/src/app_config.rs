use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub kafka: KafkaConfig,
    pub business_rules: BusinessRules,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BusinessRules {
    /// Default hold TTL when the caller does not send one.
    pub seat_hold_seconds: u64,
    /// Upper bound a caller-supplied TTL is clamped to.
    pub max_hold_seconds: u64,
}

impl BusinessRules {
    /// Resolve the caller's requested TTL against the configured bounds.
    pub fn hold_ttl(&self, requested: Option<u64>) -> u64 {
        requested
            .unwrap_or(self.seat_hold_seconds)
            .min(self.max_hold_seconds)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct KafkaConfig {
    pub brokers: String,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Layer the per-environment file on top; optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Environment variables with an ATRIO prefix, e.g. ATRIO__SERVER__PORT=8080
            .add_source(config::Environment::with_prefix("ATRIO").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hold_ttl_resolution() {
        let rules = BusinessRules {
            seat_hold_seconds: 90,
            max_hold_seconds: 600,
        };

        assert_eq!(rules.hold_ttl(None), 90);
        assert_eq!(rules.hold_ttl(Some(300)), 300);
        assert_eq!(rules.hold_ttl(Some(7200)), 600);
    }
}
