//! Domain models for dvfsctl
//!
//! This module contains the value types shared by the control services and
//! the protocol. Types are validated on construction (fail-fast pattern).

pub mod frequency;
pub mod governor;
pub mod snapshot;

pub use frequency::{FrequencyTable, FrequencyUnit};
pub use governor::Governor;
pub use snapshot::{CpuStatus, DomainId, DomainSnapshot, FrequencySource};
