//! Unified error types for dvfsctl
//!
//! This module defines all error types used throughout the application.
//! Uses thiserror for ergonomic error definitions.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a hardware control endpoint
    #[error("Sysfs error: {0}")]
    Sysfs(#[from] SysfsError),

    /// Error from configuration parsing/validation
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error from domain type validation
    #[error("Domain validation error: {0}")]
    Domain(#[from] DomainError),

    /// Error from a frequency or governor control operation
    #[error("Control error: {0}")]
    Control(#[from] ControlError),

    /// Error from the command protocol or transport
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// A command was executed and answered with an error response
    #[error("Command failed: {0}")]
    CommandFailed(String),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from reading or writing hardware control files
#[derive(Error, Debug)]
pub enum SysfsError {
    /// Control file does not exist
    #[error("Control file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Insufficient permissions to access the control file
    #[error("Permission denied: {}. Try running as root or enable hardware.use_sudo.", .0.display())]
    PermissionDenied(PathBuf),

    /// Control file content could not be parsed
    #[error("Cannot parse '{value}' from {}", path.display())]
    Parse { path: PathBuf, value: String },

    /// Privileged write helper failed
    #[error("Elevated write to {} failed: {reason}", path.display())]
    ElevationFailed { path: PathBuf, reason: String },

    /// Any other IO failure
    #[error("IO error on {}: {reason}", path.display())]
    Io { path: PathBuf, reason: String },
}

impl SysfsError {
    /// Classify an IO error raised while touching `path`
    pub fn from_io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        let path = path.into();
        match err.kind() {
            std::io::ErrorKind::NotFound => SysfsError::NotFound(path),
            std::io::ErrorKind::PermissionDenied => SysfsError::PermissionDenied(path),
            _ => SysfsError::Io {
                path,
                reason: err.to_string(),
            },
        }
    }
}

/// Errors from domain type validation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// No frequency steps are known for the domain
    #[error("Frequency table is empty")]
    EmptyFrequencyTable,

    /// Frequency steps are not strictly ascending
    #[error("Frequency steps must be strictly ascending without duplicates")]
    UnsortedFrequencyTable,

    /// Requested frequency cannot be turned into a hardware value
    #[error("Invalid frequency: {0}")]
    InvalidFrequency(String),

    /// Unknown command target
    #[error("Invalid target '{0}' (expected cpu, gpu or all)")]
    InvalidTarget(String),
}

/// Errors reported by frequency control operations
///
/// These are the kinds surfaced to remote callers in error responses.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ControlError {
    /// A required command parameter was not supplied
    #[error("Missing parameter: {0}")]
    MissingParameter(&'static str),

    /// The command action is not recognised
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    /// The requested domain has no hardware behind it
    #[error("Domain unavailable: {0}")]
    DomainUnavailable(String),

    /// Could not switch to the userspace governor before a frequency write
    #[error("Failed to switch {domain} to userspace governor: {reason}")]
    GovernorEnforcementFailed { domain: String, reason: String },

    /// Every write attempt failed
    #[error("Failed to apply setting to {domain}: {reason}")]
    ApplyFailed { domain: String, reason: String },

    /// A status field could not be read
    #[error("Failed to read {field} of {domain}: {reason}")]
    ReadFailed {
        domain: String,
        field: &'static str,
        reason: String,
    },
}

/// Errors from the command protocol and TCP transport
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// Message is not a valid command or response
    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    /// Message exceeded the configured size limit
    #[error("Message exceeds {0} bytes")]
    MessageTooLarge(usize),

    /// Peer closed the connection before a full message arrived
    #[error("Connection closed before a complete message was received")]
    ConnectionClosed,

    /// Could not reach the remote server
    #[error("Cannot connect to {addr}: {reason}")]
    Connect { addr: String, reason: String },

    /// Socket IO failure
    #[error("Transport IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for ProtocolError {
    fn from(err: serde_json::Error) -> Self {
        ProtocolError::InvalidMessage(err.to_string())
    }
}

/// Errors from configuration parsing and validation
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Invalid config value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
