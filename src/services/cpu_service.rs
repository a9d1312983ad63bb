//! CPU frequency service
//!
//! Owns one `FrequencyDomain` per core and fans operations out over a single
//! core or all of them.

use crate::domain::{CpuStatus, DomainId, Governor};
use crate::error::ControlError;
use crate::services::frequency_domain::{self, FrequencyDomain};
use crate::sysfs::layout::parse_core_dir;
use crate::sysfs::{ControlFs, DomainPaths};

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// All discovered CPU cores
///
/// Built once at startup; cores are not re-enumerated afterwards.
pub struct CpuDomainSet<F> {
    fs: Arc<F>,
    cores: BTreeMap<u32, FrequencyDomain>,
}

impl<F: ControlFs> CpuDomainSet<F> {
    /// Enumerate `cpuN` directories under `base`
    pub fn discover(fs: Arc<F>, base: &Path) -> Self {
        let names = match fs.list_dir(base) {
            Ok(names) => names,
            Err(e) => {
                log::error!("Cannot enumerate CPU cores: {}", e);
                Vec::new()
            }
        };

        let cores: BTreeMap<u32, FrequencyDomain> = names
            .iter()
            .filter_map(|name| parse_core_dir(name))
            .map(|core| {
                let domain = FrequencyDomain::discover(
                    fs.as_ref(),
                    DomainId::Cpu(core),
                    DomainPaths::cpu(base, core),
                    None,
                );
                (core, domain)
            })
            .collect();

        log::info!(
            "CPU controller initialised, cores: {:?}",
            cores.keys().collect::<Vec<_>>()
        );

        Self { fs, cores }
    }

    /// Core indices in ascending order
    pub fn core_ids(&self) -> Vec<u32> {
        self.cores.keys().copied().collect()
    }

    pub fn core(&self, index: u32) -> Option<&FrequencyDomain> {
        self.cores.get(&index)
    }

    pub fn len(&self) -> usize {
        self.cores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cores.is_empty()
    }

    /// Apply a frequency request to one core or to all cores
    ///
    /// Core 0 (or the selected core) stands in for the whole scope when
    /// checking the governor and resolving the request. Returns the
    /// frequency written, in kHz.
    pub fn apply_frequency(&self, requested: f64, core: Option<u32>) -> Result<u64, ControlError> {
        let (label, scope) = self.scope(core)?;
        frequency_domain::apply_frequency(self.fs.as_ref(), &label, &scope, requested)
    }

    /// Set the governor on one core or on all cores
    pub fn set_governor(&self, governor: &Governor, core: Option<u32>) -> Result<(), ControlError> {
        let (label, scope) = self.scope(core)?;
        frequency_domain::set_governor(self.fs.as_ref(), &label, &scope, governor)
    }

    /// Snapshot of every core
    pub fn status(&self) -> CpuStatus {
        self.cores
            .iter()
            .map(|(core, domain)| (*core, domain.snapshot(self.fs.as_ref())))
            .collect()
    }

    fn scope(&self, core: Option<u32>) -> Result<(String, Vec<&FrequencyDomain>), ControlError> {
        match core {
            Some(index) => {
                let label = DomainId::Cpu(index).to_string();
                let domain = self
                    .cores
                    .get(&index)
                    .ok_or_else(|| ControlError::DomainUnavailable(label.clone()))?;
                Ok((label, vec![domain]))
            }
            None if self.cores.is_empty() => Err(ControlError::DomainUnavailable("cpu".to_string())),
            None => Ok(("cpu".to_string(), self.cores.values().collect())),
        }
    }
}
