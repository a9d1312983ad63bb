//! Hardware control endpoint layer
//!
//! Provides trait-based access to cpufreq/devfreq control files for testability.

pub mod layout;
pub mod local;
pub mod traits;

pub use layout::DomainPaths;
pub use local::{LocalFs, WriteMode};
pub use traits::ControlFs;
