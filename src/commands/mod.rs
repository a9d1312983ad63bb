//! Command handlers
//!
//! Each command handler orchestrates the execution of a CLI command.

pub mod control;
pub mod serve;

pub use control::{run_freq, run_governor, run_status, Execution};
pub use serve::run_serve;
