use std::num::ParseIntError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid port value '{value}': {source}")]
    PortParseError {
        value: String,
        source: ParseIntError,
    },

    #[error("port must be non-zero, got '{value}'")]
    InvalidPort { value: String },

    #[error("invalid bind address '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        source: std::net::AddrParseError,
    },

    #[error("path not found: {}", path.display())]
    PathNotFound { path: PathBuf },

    #[error("not a directory: {}", path.display())]
    NotADirectory { path: PathBuf },

    #[error("invalid url '{value}' for {var}")]
    InvalidUrl { var: &'static str, value: String },
}
