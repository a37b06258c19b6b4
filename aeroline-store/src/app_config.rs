use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub redis: RedisConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub scheduling: SchedulingConfig,
    #[serde(default)]
    pub pagination: PaginationConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 { 5 }

/// Rate limiting is disabled when no URL is set.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct RedisConfig {
    pub url: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_seconds: u64,
    /// Staff account created at start-up when both are set.
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SchedulingConfig {
    pub min_turnaround_hours: i64,
    pub max_idle_gap_hours: i64,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            min_turnaround_hours: 3,
            max_idle_gap_hours: 24,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PaginationConfig {
    pub page_size: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self { page_size: 10 }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RateLimitConfig {
    pub requests: i64,
    pub window_seconds: i64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests: 100,
            window_seconds: 60,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Optional per-environment overrides
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // e.g. `AEROLINE__DATABASE__URL=postgres://...`
            .add_source(config::Environment::with_prefix("AEROLINE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn parse(toml: &str) -> Config {
        config::Config::builder()
            .add_source(config::File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_optional_sections_fall_back_to_defaults() {
        let config = parse(
            r#"
            [server]
            port = 8000

            [database]
            url = "postgres://localhost/aeroline"

            [auth]
            jwt_secret = "secret"
            jwt_expiration_seconds = 3600
            "#,
        );

        assert_eq!(config.database.max_connections, 5);
        assert!(config.redis.url.is_none());
        assert!(config.auth.admin_email.is_none());
        assert_eq!(config.scheduling.min_turnaround_hours, 3);
        assert_eq!(config.scheduling.max_idle_gap_hours, 24);
        assert_eq!(config.pagination.page_size, 10);
        assert_eq!(config.rate_limit.requests, 100);
    }

    #[test]
    fn test_scheduling_overrides() {
        let config = parse(
            r#"
            [server]
            port = 8000

            [database]
            url = "postgres://localhost/aeroline"

            [auth]
            jwt_secret = "secret"
            jwt_expiration_seconds = 3600

            [scheduling]
            min_turnaround_hours = 2
            max_idle_gap_hours = 48
            "#,
        );

        assert_eq!(config.scheduling.min_turnaround_hours, 2);
        assert_eq!(config.scheduling.max_idle_gap_hours, 48);
    }
}
