//! Configuration system
//!
//! Handles TOML config file parsing and CLI argument merging.

pub mod builder;
pub mod file;

pub use builder::ConfigBuilder;
pub use file::ConfigFile;

use crate::domain::FrequencyTable;
use crate::error::ConfigError;
use crate::sysfs::layout::{DEFAULT_CPU_BASE, DEFAULT_GPU_CANDIDATES, JETSON_TX2_GPU_FREQUENCIES};
use crate::sysfs::WriteMode;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default TCP port of the control server
pub const DEFAULT_PORT: u16 = 9999;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Control server settings
    pub server: ServerConfig,
    /// Remote client settings
    pub client: ClientConfig,
    /// Hardware layout and access
    pub hardware: HardwareConfig,
    /// Command routing
    pub dispatch: DispatchConfig,
}

impl Config {
    /// Check values that serde cannot
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(invalid("server.port", "must be non-zero"));
        }
        if self.client.port == 0 {
            return Err(invalid("client.port", "must be non-zero"));
        }
        if self.server.read_timeout_seconds == 0 {
            return Err(invalid("server.read_timeout_seconds", "must be positive"));
        }
        if self.client.timeout_seconds == 0 {
            return Err(invalid("client.timeout_seconds", "must be positive"));
        }
        if self.server.max_message_bytes == 0 {
            return Err(invalid("server.max_message_bytes", "must be positive"));
        }
        self.hardware.gpu_fallback_table()?;
        Ok(())
    }
}

fn invalid(key: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        message: message.to_string(),
    }
}

/// Control server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address
    pub host: String,
    /// Listen port
    pub port: u16,
    /// Per-connection read/write timeout
    pub read_timeout_seconds: u64,
    /// Longest accepted command line, newline included
    pub max_message_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            read_timeout_seconds: 10,
            max_message_bytes: 4096,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_seconds)
    }
}

/// Remote client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Server address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Connect and read timeout
    pub timeout_seconds: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            timeout_seconds: 10,
        }
    }
}

impl ClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Hardware layout configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HardwareConfig {
    /// Directory holding the `cpuN` entries
    pub cpu_base_path: PathBuf,
    /// GPU devfreq candidates, probed in order
    pub gpu_paths: Vec<PathBuf>,
    /// GPU steps in Hz, used when the hardware exposes none
    pub gpu_fallback_frequencies: Vec<u64>,
    /// Write through `sudo -n tee`
    pub use_sudo: bool,
}

impl Default for HardwareConfig {
    fn default() -> Self {
        Self {
            cpu_base_path: PathBuf::from(DEFAULT_CPU_BASE),
            gpu_paths: DEFAULT_GPU_CANDIDATES.iter().map(PathBuf::from).collect(),
            gpu_fallback_frequencies: JETSON_TX2_GPU_FREQUENCIES.to_vec(),
            use_sudo: false,
        }
    }
}

impl HardwareConfig {
    /// The fallback table, which must already be strictly ascending
    pub fn gpu_fallback_table(&self) -> Result<FrequencyTable, ConfigError> {
        FrequencyTable::strict(self.gpu_fallback_frequencies.clone())
            .map_err(|e| invalid("hardware.gpu_fallback_frequencies", &e.to_string()))
    }

    pub fn write_mode(&self) -> WriteMode {
        if self.use_sudo {
            WriteMode::Sudo
        } else {
            WriteMode::Direct
        }
    }
}

/// Where write commands with `target = "all"` are sent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllTargetRouting {
    Cpu,
    #[default]
    Gpu,
    /// CPU first, then GPU
    Both,
}

/// Command routing configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DispatchConfig {
    pub all_target: AllTargetRouting,
}
