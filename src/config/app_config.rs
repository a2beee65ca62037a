use std::fmt;
use std::path::Path;

use serde::Deserialize;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub storage: StorageConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Overall budget for a single request, in seconds
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
}

/// Where entity collections live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Postgres,
    #[serde(alias = "in_memory", alias = "inmemory")]
    Memory,
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Falls back to `DATABASE_URL` when unset
    pub url: Option<String>,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Token signing secret, at least 32 bytes
    pub signing_key: Option<String>,
    /// File holding the signing secret; used when `signing_key` is unset
    pub signing_key_file: Option<String>,
    pub token_ttl_minutes: i64,
    /// Argon2 time cost
    pub hash_cost: u32,
    /// Account created at startup when no users exist
    pub bootstrap_login: Option<String>,
    pub bootstrap_password: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            request_timeout_secs: 60,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
            min_connections: 1,
            acquire_timeout_secs: 30,
            idle_timeout_secs: 600,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            signing_key: None,
            signing_key_file: None,
            token_ttl_minutes: 30,
            hash_cost: 3,
            bootstrap_login: None,
            bootstrap_password: None,
        }
    }
}

fn redact<T>(value: &Option<T>) -> &'static str {
    match value {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Connection URLs usually embed a password
        f.debug_struct("DatabaseConfig")
            .field("url", &redact(&self.url))
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .field("acquire_timeout_secs", &self.acquire_timeout_secs)
            .field("idle_timeout_secs", &self.idle_timeout_secs)
            .finish()
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("signing_key", &redact(&self.signing_key))
            .field("signing_key_file", &self.signing_key_file)
            .field("token_ttl_minutes", &self.token_ttl_minutes)
            .field("hash_cost", &self.hash_cost)
            .field("bootstrap_login", &self.bootstrap_login)
            .field("bootstrap_password", &redact(&self.bootstrap_password))
            .finish()
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(None)
    }

    /// Layer `config/default`, `config/local`, an optional explicit file and
    /// `APP__*` environment variables, later sources winning.
    pub fn load_from(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false));

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_json(json: &str) -> AppConfig {
        config::Config::builder()
            .add_source(config::File::from_str(json, config::FileFormat::Json))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.request_timeout_secs, 60);
        assert_eq!(config.storage.backend, StorageBackend::Postgres);
        assert_eq!(config.auth.token_ttl_minutes, 30);
        assert!(config.auth.signing_key.is_none());
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = from_json(
            r#"{
                "server": { "port": 9090 },
                "storage": { "backend": "memory" },
                "logging": { "format": "json" }
            }"#,
        );

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.auth.hash_cost, 3);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = from_json(
            r#"{
                "database": { "url": "postgres://app:hunter2@db/movies" },
                "auth": {
                    "signing_key": "super-secret-signing-key-material-123",
                    "bootstrap_login": "admin",
                    "bootstrap_password": "bootstrap-pass"
                }
            }"#,
        );

        let debug = format!("{:?}", config);
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("super-secret"));
        assert!(!debug.contains("bootstrap-pass"));
        assert!(debug.contains("admin"));
    }
}
