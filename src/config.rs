use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use tracing::warn;

const DEVELOPMENT_JWT_SECRET: &str = "development-only-secret-change-me";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set when APP_ENV=production")]
    MissingJwtSecret,

    #[error("DATABASE_URL must be set when APP_ENV=production")]
    MissingDatabaseUrl,

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// Deployment mode. Controls whether internal error details reach clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn is_development(self) -> bool {
        self == Environment::Development
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(ConfigError::InvalidValue {
                key: "APP_ENV",
                value: s.to_string(),
            }),
        }
    }
}

/// Process-wide settings, read once at startup and shared immutably.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub bind_addr: SocketAddr,
    pub api_base_path: String,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub db_acquire_timeout: Duration,
    pub request_timeout: Duration,
    pub cors_origin: String,
    pub run_migrations: bool,
}

impl AppConfig {
    /// Configuration with defaults for everything but the signing secret.
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            environment: Environment::Production,
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            api_base_path: "/api".to_string(),
            jwt_secret: jwt_secret.into(),
            token_ttl_hours: 24,
            database_url: None,
            db_max_connections: 10,
            db_acquire_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(5),
            cors_origin: "*".to_string(),
            run_migrations: false,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = match std::env::var("APP_ENV") {
            Ok(value) => value.parse()?,
            Err(_) => Environment::Production,
        };

        let jwt_secret = match std::env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ if environment.is_development() => {
                warn!("JWT_SECRET not set, using the development secret");
                DEVELOPMENT_JWT_SECRET.to_string()
            }
            _ => return Err(ConfigError::MissingJwtSecret),
        };

        let mut config = Self::new(jwt_secret);
        config.environment = environment;
        config.bind_addr = parse_var("BIND_ADDR", config.bind_addr)?;
        config.api_base_path = std::env::var("API_BASE_PATH")
            .map(|path| normalize_base_path(&path))
            .unwrap_or(config.api_base_path);
        config.token_ttl_hours = parse_var("TOKEN_TTL_HOURS", config.token_ttl_hours)?;
        config.database_url = std::env::var("DATABASE_URL").ok().filter(|url| !url.is_empty());
        config.db_max_connections = parse_var("DB_MAX_CONNECTIONS", config.db_max_connections)?;
        config.db_acquire_timeout =
            Duration::from_secs(parse_var("DB_ACQUIRE_TIMEOUT_SECS", 5u64)?);
        config.request_timeout = Duration::from_secs(parse_var("REQUEST_TIMEOUT_SECS", 5u64)?);
        config.cors_origin = std::env::var("CORS_ORIGIN").unwrap_or(config.cors_origin);
        config.run_migrations = parse_var("RUN_MIGRATIONS", config.run_migrations)?;

        config.validate()?;
        Ok(config)
    }

    /// Rejects settings the server cannot run with.
    /// In-memory storage starts empty, so it is only allowed in development.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.token_ttl_hours <= 0 {
            return Err(ConfigError::InvalidValue {
                key: "TOKEN_TTL_HOURS",
                value: self.token_ttl_hours.to_string(),
            });
        }
        if self.database_url.is_none() && !self.environment.is_development() {
            return Err(ConfigError::MissingDatabaseUrl);
        }
        Ok(())
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

fn parse_var<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        Err(_) => Ok(default),
    }
}

/// "api/" -> "/api", "/" -> ""
fn normalize_base_path(path: &str) -> String {
    let trimmed = path.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("development", Environment::Development)]
    #[case("DEV", Environment::Development)]
    #[case("production", Environment::Production)]
    #[case(" prod ", Environment::Production)]
    fn test_parse_environment(#[case] raw: &str, #[case] expected: Environment) {
        assert_eq!(raw.parse::<Environment>().unwrap(), expected);
    }

    #[test]
    fn test_parse_unknown_environment() {
        let result = "staging".parse::<Environment>();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { key: "APP_ENV", .. })
        ));
    }

    #[rstest]
    #[case("/api", "/api")]
    #[case("api/", "/api")]
    #[case("/konkor/api/", "/konkor/api")]
    #[case("/", "")]
    #[case("", "")]
    fn test_normalize_base_path(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalize_base_path(raw), expected);
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::new("secret");
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.token_ttl_hours, 24);
        assert_eq!(config.api_base_path, "/api");
        assert!(config.database_url.is_none());
        assert!(!config.run_migrations);
    }

    #[test]
    fn test_production_requires_database_url() {
        let config = AppConfig::new("secret");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingDatabaseUrl)
        ));

        let mut with_database = AppConfig::new("secret");
        with_database.database_url = Some("postgres://localhost/exam_portal".to_string());
        assert!(with_database.validate().is_ok());
    }

    #[test]
    fn test_development_allows_in_memory_storage() {
        let config = AppConfig::new("secret").with_environment(Environment::Development);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_non_positive_ttl_is_rejected() {
        let mut config = AppConfig::new("secret").with_environment(Environment::Development);
        config.token_ttl_hours = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { key: "TOKEN_TTL_HOURS", .. })
        ));
    }
}
