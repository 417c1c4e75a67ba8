//! Server settings loaded via OrthoConfig (`SIGNUP_*` environment variables
//! or matching command-line flags).

use std::net::SocketAddr;
use std::path::PathBuf;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_AVATAR_DIR: &str = "uploads";
const DEFAULT_POOL_MAX_SIZE: u32 = 10;

/// Raw configuration values. Unset values fall back to development defaults.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SIGNUP")]
pub struct ServerSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL. Without it the server keeps accounts in memory.
    pub database_url: Option<String>,
    /// Root directory for stored avatar files.
    pub avatar_dir: Option<PathBuf>,
    /// Base URL under which `/storage/{key}` resolves.
    pub public_base_url: Option<String>,
    /// Maximum pooled database connections.
    pub pool_max_size: Option<u32>,
}

/// Settings that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address {value:?}")]
    InvalidBindAddr { value: String },
    #[error("invalid public base URL {value:?}")]
    InvalidPublicBaseUrl { value: String },
    #[error("pool size must be at least 1")]
    EmptyPool,
}

impl ServerSettings {
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|_| SettingsError::InvalidBindAddr {
            value: raw.to_owned(),
        })
    }

    /// Configured database URL, ignoring blank values.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn avatar_dir(&self) -> PathBuf {
        self.avatar_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_AVATAR_DIR))
    }

    pub fn public_base_url(&self) -> Result<Url, SettingsError> {
        let raw = self
            .public_base_url
            .as_deref()
            .unwrap_or(DEFAULT_PUBLIC_BASE_URL);
        Url::parse(raw)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| SettingsError::InvalidPublicBaseUrl {
                value: raw.to_owned(),
            })
    }

    pub fn pool_max_size(&self) -> Result<u32, SettingsError> {
        match self.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE) {
            0 => Err(SettingsError::EmptyPool),
            size => Ok(size),
        }
    }
}
