//! Environment-driven configuration.
//!
//! All settings come from the process environment (a `.env` file is loaded by
//! `run()` before this is read). The only mandatory value is the provider
//! credential; everything else has a sensible default.

use std::env;
use thiserror::Error;

/// Default base URL of the visual-generation provider API.
pub const DEFAULT_API_BASE: &str = "https://api.napkin.ai/v1";

/// Default listening port.
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("NAPKIN_API_KEY is not set (or empty)")]
    MissingApiKey,
    #[error("PORT is not a valid port number: {0}")]
    InvalidPort(String),
}

/// Resolved server configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Bearer credential for every provider request.
    pub api_key: String,
    /// Provider API base URL, without a trailing slash.
    pub api_base: String,
    /// Externally visible base URL used to build absolute download links.
    /// When unset, links are emitted as relative paths.
    pub public_base_url: Option<String>,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = env::var("NAPKIN_API_KEY")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let api_base = env::var("NAPKIN_API_BASE")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        let public_base_url = env::var("PUBLIC_BASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(|v| v.trim_end_matches('/').to_string());

        let port = match env::var("PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            Err(_) => DEFAULT_PORT,
        };

        Ok(Self {
            api_key,
            api_base: api_base.trim_end_matches('/').to_string(),
            public_base_url,
            port,
        })
    }
}
