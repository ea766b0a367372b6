//! Application configuration

use std::env;
use std::net::SocketAddr;

use common::error::{Error, Result};

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Bind host
    pub host: String,
    /// API port
    pub port: u16,
    /// Verbose logging
    pub debug: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 10000,
            debug: false,
        }
    }
}

impl AppConfig {
    /// Create a new configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build a configuration from any variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let port = match lookup("PORT") {
            Some(port) => port
                .trim()
                .parse()
                .map_err(|e| Error::Configuration(format!("Invalid PORT={:?}: {}", port, e)))?,
            None => defaults.port,
        };

        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port,
            debug: lookup("DEBUG").map(|v| v == "1" || v == "true").unwrap_or(defaults.debug),
        })
    }

    /// Listening address
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Parse the listening address
    pub fn socket_addr(&self) -> std::result::Result<SocketAddr, std::net::AddrParseError> {
        self.addr().parse()
    }
}
