//! File-based settings at ~/.iss-flyover/config.json.
//!
//! Every field is optional; anything missing falls back to the public
//! services and a 10 second timeout. CLI flags are applied on top by `main`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_IP_URL: &str = "https://api.ipify.org?format=json";
pub const DEFAULT_GEO_URL: &str = "https://ipvigilante.com";
pub const DEFAULT_PASS_URL: &str = "http://api.open-notify.org/iss-pass.json";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// open-notify accepts between 1 and 100 predictions per request.
pub const MAX_PASSES: u32 = 100;

/// Where the three upstream services live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    /// Returns `{"ip": ...}` for the caller.
    pub ip_url: String,
    /// Base URL; the IP is appended as the last path segment.
    pub geo_url: String,
    /// Base URL; `lat`, `lon` and optionally `n` are appended as query parameters.
    pub pass_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            ip_url: DEFAULT_IP_URL.into(),
            geo_url: DEFAULT_GEO_URL.into(),
            pass_url: DEFAULT_PASS_URL.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub endpoints: Endpoints,
    /// Upper bound on each request, connect through body.
    pub timeout_secs: u64,
    /// Number of passes to ask for. `None` lets the service pick.
    pub passes: Option<u32>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoints: Endpoints::default(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            passes: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl Config {
    /// Load from the default location. A missing file means defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::default_path())
    }

    /// Load from a specific path. A missing file means defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let data = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let config: Self = serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".iss-flyover")
            .join("config.json")
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout must be at least 1 second".into()));
        }
        if let Some(n) = self.passes {
            if !(1..=MAX_PASSES).contains(&n) {
                return Err(ConfigError::Invalid(format!(
                    "passes must be between 1 and {}, got {}",
                    MAX_PASSES, n
                )));
            }
        }
        for (name, url) in [
            ("ip_url", &self.endpoints.ip_url),
            ("geo_url", &self.endpoints.geo_url),
            ("pass_url", &self.endpoints.pass_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be an http(s) URL, got '{}'",
                    name, url
                )));
            }
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
