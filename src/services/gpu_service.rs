//! GPU frequency service
//!
//! Binds the GPU's devfreq directory once at startup by probing a list of
//! candidate paths, and fails every operation with `DomainUnavailable` when
//! none of them exists.

use crate::domain::{DomainId, DomainSnapshot, FrequencyTable, Governor};
use crate::error::ControlError;
use crate::services::frequency_domain::{self, FrequencyDomain};
use crate::sysfs::{ControlFs, DomainPaths};

use std::path::PathBuf;
use std::sync::Arc;

/// The GPU clock domain, if one was found
pub struct GpuDomain<F> {
    fs: Arc<F>,
    domain: Option<FrequencyDomain>,
}

impl<F: ControlFs> GpuDomain<F> {
    /// Probe `candidates` in order and bind the first that exists
    ///
    /// `fallback` is used as the step table when the bound directory has no
    /// usable `available_frequencies`.
    pub fn discover(fs: Arc<F>, candidates: &[PathBuf], fallback: &FrequencyTable) -> Self {
        let domain = candidates
            .iter()
            .find(|path| fs.exists(path))
            .map(|path| {
                FrequencyDomain::discover(
                    fs.as_ref(),
                    DomainId::Gpu,
                    DomainPaths::gpu(path),
                    Some(fallback),
                )
            });

        match &domain {
            Some(d) => log::info!("GPU controller initialised, path: {}", d.paths().dir.display()),
            None => log::warn!("No GPU control path found"),
        }

        Self { fs, domain }
    }

    pub fn is_available(&self) -> bool {
        self.domain.is_some()
    }

    pub fn domain(&self) -> Option<&FrequencyDomain> {
        self.domain.as_ref()
    }

    /// Apply a frequency request, returning the value written in Hz
    pub fn apply_frequency(&self, requested: f64) -> Result<u64, ControlError> {
        let domain = self.bound()?;
        frequency_domain::apply_frequency(self.fs.as_ref(), "gpu", &[domain], requested)
    }

    pub fn set_governor(&self, governor: &Governor) -> Result<(), ControlError> {
        let domain = self.bound()?;
        frequency_domain::set_governor(self.fs.as_ref(), "gpu", &[domain], governor)
    }

    pub fn status(&self) -> Result<DomainSnapshot, ControlError> {
        Ok(self.bound()?.snapshot(self.fs.as_ref()))
    }

    fn bound(&self) -> Result<&FrequencyDomain, ControlError> {
        self.domain
            .as_ref()
            .ok_or_else(|| ControlError::DomainUnavailable("gpu".to_string()))
    }
}
