//! Application configuration loaded from TOML.
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8080
//!
//! [store]
//! backend = "local"
//! db_path = "sessions.db"
//! ```

use crate::db::LocalStore;
use crate::error::StoreError;
use crate::session::{MemoryStore, SessionStore};
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// File read when no config path is given, if it exists.
pub const DEFAULT_CONFIG_FILE: &str = "pattern_challenge.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Getters, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP listener settings.
    #[serde(default)]
    server: ServerSettings,
    /// Session storage settings.
    #[serde(default)]
    store: StoreSettings,
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Getters, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Interface to bind.
    #[serde(default = "default_host")]
    host: String,
    /// Port to bind.
    #[serde(default = "default_port")]
    port: u16,
}

/// Which session store to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackendKind {
    /// Process memory; cleared on restart.
    #[default]
    #[display("memory")]
    Memory,
    /// Local SQLite file.
    #[display("local")]
    Local,
}

/// Session storage settings.
#[derive(Debug, Clone, PartialEq, Getters, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Store implementation.
    #[serde(default)]
    backend: StoreBackendKind,
    /// Database file for the local store.
    #[serde(default = "default_db_path")]
    db_path: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_db_path() -> String {
    "pattern_challenge.db".to_string()
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: StoreBackendKind::default(),
            db_path: default_db_path(),
        }
    }
}

impl ServerSettings {
    /// Replaces host and/or port when given.
    pub fn override_with(&mut self, host: Option<String>, port: Option<u16>) {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
    }
}

impl StoreSettings {
    /// Creates settings for the given backend and database path.
    pub fn new(backend: StoreBackendKind, db_path: String) -> Self {
        Self { backend, db_path }
    }

    /// Opens the configured store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the local database cannot be opened.
    #[instrument(skip(self), fields(backend = %self.backend))]
    pub fn open_store(&self) -> Result<Arc<dyn SessionStore>, StoreError> {
        info!("Opening session store");
        Ok(match self.backend {
            StoreBackendKind::Memory => Arc::new(MemoryStore::new()),
            StoreBackendKind::Local => Arc::new(LocalStore::open(self.db_path.clone())?),
        })
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the text is not valid configuration.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))
    }

    /// Loads `path` if given, else [`DEFAULT_CONFIG_FILE`] if present, else defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a chosen file cannot be read or parsed.
    #[instrument]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::from_file(DEFAULT_CONFIG_FILE),
            None => {
                debug!("No config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Mutable server settings, for CLI overrides.
    pub fn server_mut(&mut self) -> &mut ServerSettings {
        &mut self.server
    }
}

/// Configuration error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.server().port(), &3000);
        assert_eq!(config.store().backend(), &StoreBackendKind::Memory);
    }

    #[test]
    fn partial_sections_fill_in_defaults() {
        let config = AppConfig::from_toml("[server]\nport = 8080\n[store]\nbackend = \"local\"\n").unwrap();
        assert_eq!(config.server().host(), "127.0.0.1");
        assert_eq!(*config.server().port(), 8080);
        assert_eq!(*config.store().backend(), StoreBackendKind::Local);
        assert_eq!(config.store().db_path(), "pattern_challenge.db");
    }

    #[test]
    fn unknown_backend_is_rejected() {
        assert!(AppConfig::from_toml("[store]\nbackend = \"redis\"\n").is_err());
    }

    #[test]
    fn cli_overrides_replace_only_given_values() {
        let mut config = AppConfig::default();
        config.server_mut().override_with(None, Some(9000));
        assert_eq!(config.server().host(), "127.0.0.1");
        assert_eq!(*config.server().port(), 9000);
    }
}
