//! Service layer for frequency control operations
//!
//! Services encapsulate the control logic for CPU cores and the GPU, and the
//! dispatcher that routes protocol commands to them.

pub mod cpu_service;
pub mod dispatcher;
pub mod frequency_domain;
pub mod gpu_service;

pub use cpu_service::CpuDomainSet;
pub use dispatcher::{CommandDispatcher, DispatchState};
pub use frequency_domain::FrequencyDomain;
pub use gpu_service::GpuDomain;
