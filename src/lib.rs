//! dvfsctl - CPU/GPU frequency control library
//!
//! This library provides frequency and governor control for the CPU cores
//! and GPU of embedded Linux boards through cpufreq/devfreq sysfs files,
//! and a line-delimited JSON command channel for remote control.
//!
//! # Modules
//!
//! - [`cli`]: Command-line interface definitions
//! - [`commands`]: Command handlers
//! - [`config`]: Configuration system
//! - [`domain`]: Domain models with validation
//! - [`error`]: Error types
//! - [`protocol`]: Command and response wire types
//! - [`services`]: Frequency control services and command dispatch
//! - [`sysfs`]: Hardware control endpoint abstraction
//! - [`transport`]: TCP server and client

pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod error;
pub mod protocol;
pub mod services;
pub mod sysfs;
pub mod transport;

#[cfg(test)]
pub mod mock;

pub use error::{AppError, Result};
