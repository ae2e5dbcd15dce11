//! Environment-backed configuration.
//!
//! Most settings have defaults. Override with `VERISTOCK_*` environment variables.

pub mod error;

#[cfg(test)]
mod tests;

pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Server configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `VERISTOCK_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `8080`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Directory for persisted enrichment records. Default: `./.data`.
    pub storage_path: PathBuf,

    /// Path to the CLIP model directory (weights + tokenizer). Stub mode when unset.
    pub clip_model_path: Option<PathBuf>,

    /// Source Aggregator base URL. Default: `http://localhost:9200`.
    pub aggregator_url: String,

    /// Timeout for one aggregator search. Default: 30s.
    pub aggregator_timeout: Duration,

    /// Timeout for one image fetch + inference pass. Default: 20s.
    pub image_timeout: Duration,
}

/// Default aggregator URL used when `VERISTOCK_AGGREGATOR_URL` is not set.
pub const DEFAULT_AGGREGATOR_URL: &str = "http://localhost:9200";

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            storage_path: PathBuf::from("./.data"),
            clip_model_path: None,
            aggregator_url: DEFAULT_AGGREGATOR_URL.to_string(),
            aggregator_timeout: Duration::from_secs(30),
            image_timeout: Duration::from_secs(20),
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "VERISTOCK_PORT";
    const ENV_BIND_ADDR: &'static str = "VERISTOCK_BIND_ADDR";
    const ENV_STORAGE_PATH: &'static str = "VERISTOCK_STORAGE_PATH";
    const ENV_CLIP_MODEL_PATH: &'static str = "VERISTOCK_CLIP_MODEL_PATH";
    const ENV_AGGREGATOR_URL: &'static str = "VERISTOCK_AGGREGATOR_URL";
    const ENV_AGGREGATOR_TIMEOUT_SECS: &'static str = "VERISTOCK_AGGREGATOR_TIMEOUT_SECS";
    const ENV_IMAGE_TIMEOUT_SECS: &'static str = "VERISTOCK_IMAGE_TIMEOUT_SECS";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let storage_path = Self::parse_path_from_env(Self::ENV_STORAGE_PATH, defaults.storage_path);
        let clip_model_path = Self::parse_optional_path_from_env(Self::ENV_CLIP_MODEL_PATH);
        let aggregator_url =
            Self::parse_string_from_env(Self::ENV_AGGREGATOR_URL, defaults.aggregator_url);
        let aggregator_timeout = Self::parse_secs_from_env(
            Self::ENV_AGGREGATOR_TIMEOUT_SECS,
            defaults.aggregator_timeout,
        );
        let image_timeout =
            Self::parse_secs_from_env(Self::ENV_IMAGE_TIMEOUT_SECS, defaults.image_timeout);

        Ok(Self {
            port,
            bind_addr,
            storage_path,
            clip_model_path,
            aggregator_url,
            aggregator_timeout,
            image_timeout,
        })
    }

    /// Validates paths and basic invariants (does not create directories).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_path.exists() && !self.storage_path.is_dir() {
            return Err(ConfigError::NotADirectory {
                path: self.storage_path.clone(),
            });
        }

        if let Some(ref path) = self.clip_model_path {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_dir() {
                return Err(ConfigError::NotADirectory { path: path.clone() });
            }
        }

        if !self.aggregator_url.starts_with("http://") && !self.aggregator_url.starts_with("https://")
        {
            return Err(ConfigError::InvalidUrl {
                var: Self::ENV_AGGREGATOR_URL,
                value: self.aggregator_url.clone(),
            });
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
        env::var(var_name).map(PathBuf::from).unwrap_or(default)
    }

    fn parse_optional_path_from_env(var_name: &str) -> Option<PathBuf> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        env::var(var_name).unwrap_or(default)
    }

    fn parse_secs_from_env(var_name: &str, default: Duration) -> Duration {
        env::var(var_name)
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(default)
    }
}
