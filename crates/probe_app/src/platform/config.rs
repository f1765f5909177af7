//! Startup configuration for the terminal app.
//!
//! Values come from built-in defaults, then an optional `probe.ron` in the
//! working directory, then the environment. The analysis service base URL has
//! no default; without it the app refuses to start.
//!
//! ```ron
//! (
//!     api_base_url: "http://localhost:1534/url-info",
//!     endpoint: "query",
//!     connect_timeout_secs: 10,
//!     page_size: 10,
//! )
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use probe_core::DEFAULT_PAGE_SIZE;
use probe_engine::{ClientSettings, EndpointStyle};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

pub const CONFIG_FILENAME: &str = "probe.ron";
pub const ENV_API_BASE_URL: &str = "PROBE_API_BASE_URL";
pub const ENV_API_ENDPOINT: &str = "PROBE_API_ENDPOINT";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
    #[error("PROBE_API_BASE_URL is not set (set it in the environment or in probe.ron)")]
    MissingBaseUrl,
    #[error("invalid api base url {value:?}: {reason}")]
    InvalidBaseUrl { value: String, reason: String },
    #[error("unknown endpoint style {0:?}, expected \"query\" or \"url-info\"")]
    UnknownEndpoint(String),
    #[error("page_size must be at least 1")]
    InvalidPageSize,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    api_base_url: String,
    endpoint: String,
    connect_timeout_secs: u64,
    page_size: usize,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            api_base_url: String::new(),
            endpoint: "query".to_string(),
            connect_timeout_secs: 10,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub api_base_url: Url,
    pub endpoint: EndpointStyle,
    pub connect_timeout: Duration,
    pub page_size: usize,
}

impl AppConfig {
    /// Loads `probe.ron` from the working directory (if present) and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new(CONFIG_FILENAME), |key| std::env::var(key).ok())
    }

    pub fn load_from<F>(path: &Path, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = match fs::read_to_string(path) {
            Ok(text) => ron::from_str::<FileConfig>(&text).map_err(|source| {
                ConfigError::Parse {
                    path: path.to_path_buf(),
                    source,
                }
            })?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => FileConfig::default(),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        Self::resolve(file, env)
    }

    fn resolve<F>(file: FileConfig, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base = env(ENV_API_BASE_URL)
            .filter(|value| !value.trim().is_empty())
            .unwrap_or(file.api_base_url);
        let api_base_url = parse_base_url(base.trim())?;

        let endpoint_name = env(ENV_API_ENDPOINT)
            .filter(|value| !value.trim().is_empty())
            .unwrap_or(file.endpoint);
        let endpoint = parse_endpoint(endpoint_name.trim())?;

        if file.page_size == 0 {
            return Err(ConfigError::InvalidPageSize);
        }

        Ok(Self {
            api_base_url,
            endpoint,
            connect_timeout: Duration::from_secs(file.connect_timeout_secs),
            page_size: file.page_size,
        })
    }

    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            endpoint: self.endpoint,
            connect_timeout: self.connect_timeout,
            ..ClientSettings::new(self.api_base_url.clone())
        }
    }
}

fn parse_base_url(value: &str) -> Result<Url, ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::MissingBaseUrl);
    }
    let invalid = |reason: String| ConfigError::InvalidBaseUrl {
        value: value.to_string(),
        reason,
    };
    let url = Url::parse(value).map_err(|err| invalid(err.to_string()))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(invalid(format!("unsupported scheme `{other}`"))),
    }
    if url.host_str().is_none() {
        return Err(invalid("missing host".to_string()));
    }
    Ok(url)
}

fn parse_endpoint(value: &str) -> Result<EndpointStyle, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "query" => Ok(EndpointStyle::Query),
        "url-info" | "url_info" => Ok(EndpointStyle::UrlInfo),
        _ => Err(ConfigError::UnknownEndpoint(value.to_string())),
    }
}
