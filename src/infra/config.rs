//! Centralized configuration (optional YAML file + environment variables + defaults).
//!
//! Precedence, lowest first: built-in defaults, the YAML file, the environment.
//! A `.env` file is loaded into the environment before anything is read.

use crate::storage::validate_ident;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = ".config.yaml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_norway::Error,
    },
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} has an invalid value '{value}'")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout: Duration,
    pub shutdown_grace: Duration,
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub connection_string: String,
    /// Postgres schema holding the product collection.
    pub name: String,
    pub max_connections: u32,
    pub connect_timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
}

// On-disk layout, kept compatible with existing `.config.yaml` files.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    #[serde(default)]
    server: FileServer,
    #[serde(default)]
    database: FileDatabase,
}

#[derive(Debug, Default, Deserialize)]
struct FileServer {
    host: Option<String>,
    port: Option<PortValue>,
}

#[derive(Debug, Default, Deserialize)]
struct FileDatabase {
    #[serde(rename = "connStr")]
    conn_str: Option<String>,
    #[serde(rename = "dbName")]
    db_name: Option<String>,
}

/// `port: 9090` and `port: ":9090"` are both accepted.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PortValue {
    Number(u16),
    Text(String),
}

impl PortValue {
    fn into_string(self) -> String {
        match self {
            PortValue::Number(n) => n.to_string(),
            PortValue::Text(s) => s,
        }
    }
}

impl AppConfig {
    /// Loads `.env`, then the YAML file named by `CONFIG_FILE` (default `.config.yaml`,
    /// skipped when absent), then applies environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        let explicit = std::env::var("CONFIG_FILE").ok();
        let path = explicit
            .clone()
            .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());
        let path = Path::new(&path);

        let file = if path.exists() || explicit.is_some() {
            read_file(path)?
        } else {
            FileConfig::default()
        };

        Self::resolve(file, |key| std::env::var(key).ok())
    }

    /// Parses a YAML document and applies overrides from `env`.
    pub fn from_yaml_str(
        yaml: &str,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let file: FileConfig =
            serde_norway::from_str(yaml).map_err(|source| ConfigError::Parse {
                path: PathBuf::from("<inline>"),
                source,
            })?;
        Self::resolve(file, env)
    }

    fn resolve(file: FileConfig, env: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = env("SERVER_HOST")
            .or(file.server.host)
            .unwrap_or_else(|| "0.0.0.0".to_string());

        let port_raw = env("SERVER_PORT").or(file.server.port.map(PortValue::into_string));
        let port = match port_raw {
            Some(raw) => parse_port(&raw)?,
            None => 3000,
        };

        let connection_string = env("DATABASE_URL")
            .or(file.database.conn_str)
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let name = env("DATABASE_NAME")
            .or(file.database.db_name)
            .unwrap_or_else(|| "products_api".to_string());
        if !validate_ident(&name) {
            return Err(ConfigError::Invalid {
                key: "DATABASE_NAME",
                value: name,
            });
        }

        let request_timeout = secs(&env, "REQUEST_TIMEOUT_SECS", 10)?;
        let connect_timeout = secs(&env, "DB_CONNECT_TIMEOUT_SECS", 10)?;
        let shutdown_grace = secs(&env, "SHUTDOWN_GRACE_SECS", 30)?;
        let max_connections = match env("DB_MAX_CONNECTIONS") {
            Some(v) => v
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::Invalid {
                    key: "DB_MAX_CONNECTIONS",
                    value: v,
                })?,
            None => 5,
        };

        Ok(Self {
            server: ServerConfig {
                host,
                port,
                request_timeout,
                shutdown_grace,
            },
            database: DatabaseConfig {
                connection_string,
                name,
                max_connections,
                connect_timeout,
            },
        })
    }
}

fn read_file(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_norway::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_port(raw: &str) -> Result<u16, ConfigError> {
    raw.trim()
        .trim_start_matches(':')
        .parse::<u16>()
        .map_err(|_| ConfigError::Invalid {
            key: "SERVER_PORT",
            value: raw.to_string(),
        })
}

fn secs(
    env: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: u64,
) -> Result<Duration, ConfigError> {
    match env(key) {
        Some(v) => v
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| ConfigError::Invalid { key, value: v }),
        None => Ok(Duration::from_secs(default)),
    }
}
