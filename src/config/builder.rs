//! Configuration builder
//!
//! Merges configuration from files and CLI arguments.

use crate::config::{Config, ConfigFile};
use crate::error::ConfigError;

use std::path::Path;

/// Builder for merging configuration sources
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Load configuration from a file
    ///
    /// An explicit path must load; without one the default locations are
    /// tried and a miss keeps the defaults.
    pub fn with_file(mut self, path: Option<&Path>) -> Result<Self, ConfigError> {
        let file_config = match path {
            Some(path) => Some(ConfigFile::load(path)?),
            None => ConfigFile::load_default(),
        };

        if let Some(cfg) = file_config {
            self.config = cfg;
        }

        Ok(self)
    }

    /// Override the remote host (client side)
    pub fn with_remote_host(mut self, host: Option<String>) -> Self {
        if let Some(h) = host {
            self.config.client.host = h;
        }
        self
    }

    /// Override the port; applies to both the server and the client
    pub fn with_port(mut self, port: Option<u16>) -> Self {
        if let Some(p) = port {
            self.config.server.port = p;
            self.config.client.port = p;
        }
        self
    }

    /// Override the server listen address
    pub fn with_listen_host(mut self, host: Option<String>) -> Self {
        if let Some(h) = host {
            self.config.server.host = h;
        }
        self
    }

    /// Override with CLI timeout
    pub fn with_timeout(mut self, seconds: Option<u64>) -> Self {
        if let Some(t) = seconds {
            self.config.client.timeout_seconds = t;
        }
        self
    }

    /// Override with CLI sudo flag
    pub fn with_sudo(mut self, use_sudo: Option<bool>) -> Self {
        if let Some(s) = use_sudo {
            self.config.hardware.use_sudo = s;
        }
        self
    }

    /// Build and validate the final configuration
    pub fn build(self) -> Result<Config, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builder_defaults() {
        let config = ConfigBuilder::new().build().unwrap();
        assert_eq!(config.client.host, "127.0.0.1");
        assert!(!config.hardware.use_sudo);
    }

    #[test]
    fn test_builder_overrides() {
        let config = ConfigBuilder::new()
            .with_remote_host(Some("jetson.local".to_string()))
            .with_port(Some(8000))
            .with_timeout(Some(3))
            .with_sudo(Some(true))
            .build()
            .unwrap();

        assert_eq!(config.client.host, "jetson.local");
        assert_eq!(config.client.port, 8000);
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.client.timeout_seconds, 3);
        assert!(config.hardware.use_sudo);
    }

    #[test]
    fn test_cli_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nport = 7000\nhost = \"127.0.0.1\"").unwrap();

        let config = ConfigBuilder::new()
            .with_file(Some(file.path()))
            .unwrap()
            .with_port(Some(7100))
            .build()
            .unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 7100);
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let result = ConfigBuilder::new().with_file(Some(Path::new("/nonexistent/dvfsctl.toml")));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_build_validates() {
        let result = ConfigBuilder::new().with_timeout(Some(0)).build();
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }
}
