//! Connection settings.
//!
//! Values come from command-line flags (or their environment variables) and
//! from an optional YAML/JSON file; flags win. The file is looked up at the
//! explicit `--config` path, then `$MCP_JIRA_CONFIG`, then
//! `mcp_jira_server.yaml` in the working directory.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const CONFIG_ENV_VAR: &str = "MCP_JIRA_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "mcp_jira_server.yaml";
pub const DEFAULT_FIELD_CACHE_TTL_SECS: u64 = 3600;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required configuration: url (pass --url, set JIRA_URL or add it to the config file)")]
    MissingUrl,
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid YAML in {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Contents of a config file. Every key is optional at this layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FileConfig {
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub token: Option<String>,
    pub bearer_token: Option<String>,
    /// Seconds.
    pub field_cache_ttl: Option<u64>,
}

impl FileConfig {
    /// Loads from the first applicable location. A missing file is an empty
    /// config, a malformed one is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let env_path = std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from);
        Self::load_from(&config_path(explicit, env_path.as_deref()))
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            serde_json::from_str(&content).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            })
        } else {
            serde_yaml::from_str(&content).map_err(|source| ConfigError::Yaml {
                path: path.to_path_buf(),
                source,
            })
        }
    }
}

/// Which file to read: explicit path, then the environment, then the default.
pub fn config_path(explicit: Option<&Path>, env_path: Option<&Path>) -> PathBuf {
    explicit
        .or(env_path)
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Auth {
    Anonymous,
    Basic { username: String, secret: String },
    Bearer(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub token: Option<String>,
    pub bearer_token: Option<String>,
    pub field_cache_ttl: Duration,
}

impl Config {
    /// Layers `overrides` (command line) over `file`.
    pub fn resolve(overrides: FileConfig, file: FileConfig) -> Result<Self, ConfigError> {
        let url = overrides
            .url
            .or(file.url)
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::MissingUrl)?;

        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            username: overrides.username.or(file.username),
            password: overrides.password.or(file.password),
            token: overrides.token.or(file.token),
            bearer_token: overrides.bearer_token.or(file.bearer_token),
            field_cache_ttl: Duration::from_secs(
                overrides
                    .field_cache_ttl
                    .or(file.field_cache_ttl)
                    .unwrap_or(DEFAULT_FIELD_CACHE_TTL_SECS),
            ),
        })
    }

    /// Bearer token first, then username with API token, then username with
    /// password.
    pub fn auth(&self) -> Auth {
        if let Some(token) = &self.bearer_token {
            return Auth::Bearer(token.clone());
        }
        match (&self.username, self.token.as_ref().or(self.password.as_ref())) {
            (Some(username), Some(secret)) => Auth::Basic {
                username: username.clone(),
                secret: secret.clone(),
            },
            _ => Auth::Anonymous,
        }
    }
}
