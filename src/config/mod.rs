// Configuration Management Module
// Handles basket.toml loading, defaults, and validation

use crate::basket::pricing::TotalSource;
use crate::basket::UnresolvedPolicy;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Main basket server configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BasketServerConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub basket: BasketConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,

    /// Idle time after which a session is discarded
    #[serde(default = "default_session_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BasketConfig {
    /// Remove basket keys for products that left the catalog
    #[serde(default)]
    pub prune_unresolved: bool,

    #[serde(default)]
    pub total_source: TotalSource,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// TOML file with products and inventory rows
    #[serde(default)]
    pub seed_file: Option<PathBuf>,
}

// Default value functions
fn default_port() -> u16 { 8000 }
fn default_bind_addr() -> String { "0.0.0.0".to_string() }
fn default_cookie_name() -> String { "sessionid".to_string() }
fn default_session_timeout() -> u64 { 1_209_600 }
fn default_sweep_interval() -> u64 { 300 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind_addr: default_bind_addr(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            timeout_secs: default_session_timeout(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

impl BasketConfig {
    pub fn unresolved_policy(&self) -> UnresolvedPolicy {
        if self.prune_unresolved {
            UnresolvedPolicy::Prune
        } else {
            UnresolvedPolicy::Keep
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.bind_addr, self.port)
            .parse()
            .with_context(|| format!("Invalid bind address {}:{}", self.bind_addr, self.port))
    }
}

impl BasketServerConfig {
    /// Load configuration from file or use defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            info!("Loading configuration from {}", path.display());
            let contents = std::fs::read_to_string(path)
                .context("Failed to read configuration file")?;

            let config: BasketServerConfig = toml::from_str(&contents)
                .context("Failed to parse configuration file")?;

            config.validate()?;
            Ok(config)
        } else {
            warn!("Configuration file not found, using defaults");
            info!("Create basket.toml to customize configuration");
            Ok(Self::default())
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Server port cannot be 0");
        }

        self.server.socket_addr()?;

        let cookie = &self.session.cookie_name;
        if cookie.is_empty()
            || !cookie
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            anyhow::bail!("Session cookie name '{}' is not a valid token", cookie);
        }

        if self.session.timeout_secs == 0 {
            anyhow::bail!("Session timeout must be at least 1 second");
        }

        if self.session.sweep_interval_secs == 0 {
            anyhow::bail!("Session sweep interval must be at least 1 second");
        }

        if let Some(seed) = &self.catalog.seed_file {
            if !seed.exists() {
                anyhow::bail!("Catalog seed file {} does not exist", seed.display());
            }
        }

        Ok(())
    }
}
