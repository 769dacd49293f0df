//! Configuration management using Figment
//!
//! Configuration is loaded from multiple sources with the following precedence (highest to lowest):
//! 1. `PORT` environment variable (maps to `service.port`)
//! 2. Environment variables with the `USERS_` prefix, nested with `__`
//!    (e.g. `USERS_DATABASE__URL`)
//! 3. Current working directory: ./config.toml
//! 4. XDG config directory: ~/.config/users-service/config.toml
//! 5. System directory: /etc/users-service/config.toml
//! 6. Default values

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Result;

/// Prefix for service environment variables
pub const ENV_PREFIX: &str = "USERS_";

/// Directory name used for XDG and system config lookups
const CONFIG_DIR_NAME: &str = "users-service";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Service configuration
    #[serde(default)]
    pub service: ServiceConfig,

    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Middleware configuration
    #[serde(default)]
    pub middleware: MiddlewareConfig,

    /// API documentation configuration
    #[serde(default)]
    pub docs: DocsConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service name
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level or filter directive (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Environment (dev, staging, production)
    #[serde(default = "default_environment")]
    pub environment: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            port: default_port(),
            log_level: default_log_level(),
            timeout_secs: default_timeout(),
            environment: default_environment(),
        }
    }
}

impl ServiceConfig {
    /// Request timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL
    #[serde(default = "default_database_url")]
    pub url: String,

    /// Maximum number of connections in the pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Minimum idle connections
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Connection timeout in seconds
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout_secs: u64,

    /// Maximum retry attempts for establishing the database connection
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay between retry attempts in seconds
    #[serde(default = "default_retry_delay")]
    pub retry_delay_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connection_timeout_secs: default_connection_timeout(),
            max_retries: default_max_retries(),
            retry_delay_secs: default_retry_delay(),
        }
    }
}

impl DatabaseConfig {
    /// Connection acquire timeout as a Duration
    pub fn connection_timeout(&self) -> Duration {
        Duration::from_secs(self.connection_timeout_secs)
    }
}

/// HTTP middleware configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MiddlewareConfig {
    /// Request body size limit in MB
    #[serde(default = "default_body_limit_mb")]
    pub body_limit_mb: usize,

    /// CORS mode (permissive, restrictive)
    #[serde(default = "default_cors_mode")]
    pub cors_mode: String,
}

impl Default for MiddlewareConfig {
    fn default() -> Self {
        Self {
            body_limit_mb: default_body_limit_mb(),
            cors_mode: default_cors_mode(),
        }
    }
}

impl MiddlewareConfig {
    /// Body limit in bytes
    pub fn body_limit_bytes(&self) -> usize {
        self.body_limit_mb * 1024 * 1024
    }
}

/// API documentation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocsConfig {
    /// Serve Swagger UI and the OpenAPI document
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Public base URL advertised in the OpenAPI `servers` list.
    /// Defaults to `http://localhost:{port}` when unset.
    #[serde(default)]
    pub server_url: Option<String>,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            server_url: None,
        }
    }
}

// Default value functions
fn default_service_name() -> String {
    "users-service".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_environment() -> String {
    "dev".to_string()
}

fn default_database_url() -> String {
    "sqlite://users.db?mode=rwc".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_connection_timeout() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    5
}

fn default_retry_delay() -> u64 {
    2
}

fn default_body_limit_mb() -> usize {
    1
}

fn default_cors_mode() -> String {
    "permissive".to_string()
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from all sources
    ///
    /// Searches for config files in this order (highest priority first):
    /// 1. Current working directory: ./config.toml
    /// 2. XDG config directory: ~/.config/users-service/config.toml
    /// 3. System directory: /etc/users-service/config.toml
    ///
    /// Environment variables override all file-based configs.
    pub fn load() -> Result<Self> {
        let config = Self::figment().extract()?;
        Ok(config)
    }

    /// Load configuration from a specific file
    ///
    /// This bypasses the search paths and loads directly from the given path.
    /// Environment variables still take precedence.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let config = Self::layered(&[path.as_ref().to_path_buf()]).extract()?;
        Ok(config)
    }

    /// Build the figment used by [`Config::load`]
    pub fn figment() -> Figment {
        let config_paths = Self::find_config_paths();

        tracing::debug!("Searching for config files in order:");
        for path in &config_paths {
            tracing::debug!("  - {}", path.display());
        }

        Self::layered(&config_paths)
    }

    /// Defaults, then config files (lowest priority last in `paths`), then environment
    fn layered(paths: &[PathBuf]) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        for path in paths.iter().rev() {
            if path.exists() {
                tracing::info!("Loading configuration from: {}", path.display());
                figment = figment.merge(Toml::file(path));
            }
        }

        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .merge(Env::raw().only(&["PORT"]).map(|_| "service.port".into()))
    }

    /// Find all possible config file paths, highest priority first
    fn find_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        let xdg_dirs = xdg::BaseDirectories::with_prefix(CONFIG_DIR_NAME);
        if let Some(path) = xdg_dirs.find_config_file("config.toml") {
            paths.push(path);
        }

        paths.push(PathBuf::from("/etc").join(CONFIG_DIR_NAME).join("config.toml"));

        paths
    }

    /// URL advertised in the generated API documentation
    pub fn public_url(&self) -> String {
        self.docs
            .server_url
            .clone()
            .unwrap_or_else(|| format!("http://localhost:{}", self.service.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.service.port, 5000);
        assert_eq!(config.service.log_level, "info");
        assert_eq!(config.database.url, "sqlite://users.db?mode=rwc");
        assert!(config.docs.enabled);
        assert_eq!(config.middleware.body_limit_bytes(), 1024 * 1024);
    }

    #[test]
    fn test_public_url_defaults_to_localhost_port() {
        let mut config = Config::default();
        config.service.port = 8081;
        assert_eq!(config.public_url(), "http://localhost:8081");

        config.docs.server_url = Some("https://users.example.com".to_string());
        assert_eq!(config.public_url(), "https://users.example.com");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            r#"
[service]
name = "users-test"
port = 6100

[database]
url = "sqlite::memory:"
max_connections = 1
"#
        )
        .expect("write config");

        let config = Config::load_from(file.path()).expect("config loads");
        assert_eq!(config.service.name, "users-test");
        assert_eq!(config.database.url, "sqlite::memory:");
        assert_eq!(config.database.max_connections, 1);
        // untouched sections keep their defaults
        assert_eq!(config.service.timeout_secs, 30);
        assert_eq!(config.middleware.cors_mode, "permissive");
    }

    #[test]
    fn test_port_env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "[service]\nport = 6200\n")?;
            jail.set_env("PORT", "7000");

            let config: Config = Config::layered(&[PathBuf::from("config.toml")]).extract()?;
            assert_eq!(config.service.port, 7000);
            Ok(())
        });
    }

    #[test]
    fn test_prefixed_env_nests_with_double_underscore() {
        Jail::expect_with(|jail| {
            jail.set_env("USERS_DATABASE__MAX_CONNECTIONS", "3");
            jail.set_env("USERS_SERVICE__LOG_LEVEL", "debug");

            let config: Config = Config::layered(&[]).extract()?;
            assert_eq!(config.database.max_connections, 3);
            assert_eq!(config.service.log_level, "debug");
            Ok(())
        });
    }
}
