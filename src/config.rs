//! Application configuration loaded from environment variables.

use std::fmt;
use std::net::{IpAddr, SocketAddr};

use serde::Deserialize;

use crate::error::{AppError, Result};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Server Configuration ===
    /// HTTP server port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Interface to listen on.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    // === Database (optional) ===
    /// PostgreSQL host. The connectivity check is disabled when unset.
    #[serde(default)]
    pub database_host: Option<String>,

    /// PostgreSQL port.
    #[serde(default = "default_database_port")]
    pub database_port: u16,

    /// PostgreSQL user.
    #[serde(default)]
    pub database_user: String,

    /// PostgreSQL password.
    #[serde(default)]
    pub database_password: String,

    /// PostgreSQL database name.
    #[serde(default)]
    pub database_name: String,

    // === Page ===
    /// Heading shown on the index page.
    #[serde(default = "default_site_heading")]
    pub site_heading: String,

    // === Logging ===
    /// Log filter (trace, debug, info, warn, error or a full directive).
    #[serde(default = "default_log_level")]
    pub rust_log: String,

    /// Enable verbose logging.
    #[serde(default)]
    pub verbose: bool,

    /// Emit logs as JSON lines.
    #[serde(default)]
    pub log_json: bool,
}

/// Connection settings for the database connectivity check.
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseSettings {
    /// Host name or address.
    pub host: String,
    /// TCP port.
    pub port: u16,
    /// User name.
    pub user: String,
    /// Password.
    pub password: String,
    /// Database name.
    pub name: String,
}

impl fmt::Debug for DatabaseSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("name", &self.name)
            .finish()
    }
}

fn default_port() -> u16 {
    8080
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_database_port() -> u16 {
    5432
}

fn default_site_heading() -> String {
    "davtrogr Website".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> std::result::Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Parse configuration from an explicit list of variables.
    pub fn from_vars<I>(vars: I) -> std::result::Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter(vars)
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<()> {
        self.bind_ip()?;

        if self.site_heading.trim().is_empty() {
            return Err(AppError::InvalidConfig(
                "SITE_HEADING must not be empty".to_string(),
            ));
        }

        if self.database().is_some() {
            if self.database_user.is_empty() {
                return Err(AppError::InvalidConfig(
                    "DATABASE_USER is required when DATABASE_HOST is set".to_string(),
                ));
            }
            if self.database_name.is_empty() {
                return Err(AppError::InvalidConfig(
                    "DATABASE_NAME is required when DATABASE_HOST is set".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Socket address the HTTP listener binds to.
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        Ok(SocketAddr::new(self.bind_ip()?, self.port))
    }

    /// Database settings, if the connectivity check is enabled.
    pub fn database(&self) -> Option<DatabaseSettings> {
        let host = self.database_host.as_deref().map(str::trim)?;
        if host.is_empty() {
            return None;
        }

        Some(DatabaseSettings {
            host: host.to_string(),
            port: self.database_port,
            user: self.database_user.clone(),
            password: self.database_password.clone(),
            name: self.database_name.clone(),
        })
    }

    fn bind_ip(&self) -> Result<IpAddr> {
        self.bind_address.parse().map_err(|_| {
            AppError::InvalidConfig(format!(
                "BIND_ADDRESS is not an IP address: {}",
                self.bind_address
            ))
        })
    }
}
