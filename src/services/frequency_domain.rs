//! Single clock domain
//!
//! A `FrequencyDomain` is one CPU core or the GPU. It owns the control paths
//! and step table bound at discovery time; current frequency and governor are
//! always read fresh from the hardware.
//!
//! The scope functions at the bottom apply a governor or frequency to a set
//! of domains at once. They hold the governor precondition and the per-domain
//! success rules shared by the CPU and GPU services.

use crate::domain::{DomainId, DomainSnapshot, FrequencySource, FrequencyTable, Governor};
use crate::error::{ControlError, SysfsError};
use crate::sysfs::{ControlFs, DomainPaths};

/// One controllable clock domain
#[derive(Debug, Clone)]
pub struct FrequencyDomain {
    id: DomainId,
    paths: DomainPaths,
    available: FrequencyTable,
    source: FrequencySource,
}

impl FrequencyDomain {
    /// Bind a domain to its control paths and read its step table
    ///
    /// When the hardware exposes no usable list, `fallback` is used instead
    /// and the domain reports `FrequencySource::Fallback`.
    pub fn discover<F: ControlFs>(
        fs: &F,
        id: DomainId,
        paths: DomainPaths,
        fallback: Option<&FrequencyTable>,
    ) -> Self {
        let hardware = match fs.read_u64_list(&paths.available) {
            Ok(steps) if !steps.is_empty() => Some(FrequencyTable::new(steps)),
            Ok(_) => {
                log::warn!("{}: {} is empty", id, paths.available.display());
                None
            }
            Err(e) => {
                log::warn!("{}: cannot read available frequencies: {}", id, e);
                None
            }
        };

        let (available, source) = match (hardware, fallback) {
            (Some(table), _) => (table, FrequencySource::Hardware),
            (None, Some(table)) => {
                log::warn!(
                    "{}: using built-in table of {} steps, not queried from hardware",
                    id,
                    table.len()
                );
                (table.clone(), FrequencySource::Fallback)
            }
            (None, None) => (FrequencyTable::default(), FrequencySource::Hardware),
        };

        log::debug!(
            "{}: bound to {} with {} steps ({})",
            id,
            paths.dir.display(),
            available.len(),
            source
        );

        Self {
            id,
            paths,
            available,
            source,
        }
    }

    pub fn id(&self) -> DomainId {
        self.id
    }

    pub fn paths(&self) -> &DomainPaths {
        &self.paths
    }

    /// Legal steps in the domain's native unit
    pub fn available_frequencies(&self) -> &FrequencyTable {
        &self.available
    }

    pub fn frequency_source(&self) -> FrequencySource {
        self.source
    }

    /// Current frequency, read from hardware
    pub fn current_frequency<F: ControlFs>(&self, fs: &F) -> Result<u64, ControlError> {
        fs.read_u64(&self.paths.current)
            .map_err(|e| self.read_failed("current frequency", e))
    }

    /// Current governor, read from hardware
    pub fn current_governor<F: ControlFs>(&self, fs: &F) -> Result<Governor, ControlError> {
        fs.read_trimmed(&self.paths.governor)
            .map(Governor::new)
            .map_err(|e| self.read_failed("governor", e))
    }

    /// Map a raw request onto one of this domain's steps
    pub fn resolve_target(&self, requested: f64) -> Result<u64, ControlError> {
        let unit = self.id.unit();
        let target = self
            .available
            .resolve(requested)
            .map_err(|e| ControlError::ApplyFailed {
                domain: self.id.to_string(),
                reason: e.to_string(),
            })?;

        if requested > 0.0 && requested < 1.0 {
            log::info!(
                "{}: frequency index {:.2} -> {} {}",
                self.id,
                requested,
                target,
                unit
            );
        } else if requested.trunc() != target as f64 {
            log::warn!(
                "{}: {} {} is not available, using nearest step {} {}",
                self.id,
                requested,
                unit,
                target,
                unit
            );
        }

        Ok(target)
    }

    /// Point-in-time status; unreadable fields become `None`
    pub fn snapshot<F: ControlFs>(&self, fs: &F) -> DomainSnapshot {
        let current_freq = self
            .current_frequency(fs)
            .map_err(|e| log::warn!("{}", e))
            .ok();
        let governor = self
            .current_governor(fs)
            .map_err(|e| log::warn!("{}", e))
            .ok();

        DomainSnapshot {
            current_freq,
            governor,
            available_freqs: self.available.clone(),
            freq_source: self.source,
            path: matches!(self.id, DomainId::Gpu)
                .then(|| self.paths.dir.display().to_string()),
        }
    }

    /// Write a frequency to the domain's write targets
    ///
    /// Targets are tried in order; the write counts as applied if any of
    /// them accepted it. Probed targets that do not exist are skipped.
    pub(crate) fn write_frequency<F: ControlFs>(&self, fs: &F, value: u64) -> Result<(), SysfsError> {
        let value = value.to_string();
        let mut accepted = false;
        let mut last_err = None;

        for target in &self.paths.freq_targets {
            if self.paths.probe_targets && !fs.exists(target) {
                continue;
            }
            match fs.write(target, &value) {
                Ok(()) => {
                    log::debug!("{}: wrote {} to {}", self.id, value, target.display());
                    accepted = true;
                }
                Err(e) => {
                    log::debug!("{}: write to {} failed: {}", self.id, target.display(), e);
                    last_err = Some(e);
                }
            }
        }

        if accepted {
            return Ok(());
        }
        Err(last_err.unwrap_or_else(|| SysfsError::NotFound(self.paths.dir.clone())))
    }

    /// Write a governor name
    pub(crate) fn write_governor<F: ControlFs>(
        &self,
        fs: &F,
        governor: &Governor,
    ) -> Result<(), SysfsError> {
        fs.write(&self.paths.governor, governor.as_str())
    }

    fn read_failed(&self, field: &'static str, err: SysfsError) -> ControlError {
        ControlError::ReadFailed {
            domain: self.id.to_string(),
            field,
            reason: err.to_string(),
        }
    }
}

/// Write a governor to every domain in scope
///
/// All-or-nothing: the first failure aborts and later domains are not
/// attempted.
pub fn set_governor<F: ControlFs>(
    fs: &F,
    label: &str,
    scope: &[&FrequencyDomain],
    governor: &Governor,
) -> Result<(), ControlError> {
    if scope.is_empty() {
        return Err(ControlError::DomainUnavailable(label.to_string()));
    }

    for domain in scope {
        if let Err(e) = domain.write_governor(fs, governor) {
            log::error!("{}: failed to set governor {}: {}", domain.id(), governor, e);
            return Err(ControlError::ApplyFailed {
                domain: domain.id().to_string(),
                reason: e.to_string(),
            });
        }
        log::info!("{}: governor set to {}", domain.id(), governor);
    }

    Ok(())
}

/// Apply a frequency request to every domain in scope
///
/// The first domain in scope is the representative: its governor decides
/// whether a switch to `userspace` is needed, and its step table resolves
/// the request. Writes are attempted on every domain independently; the call
/// succeeds if at least one domain accepted the value.
///
/// Returns the resolved frequency.
pub fn apply_frequency<F: ControlFs>(
    fs: &F,
    label: &str,
    scope: &[&FrequencyDomain],
    requested: f64,
) -> Result<u64, ControlError> {
    let Some(representative) = scope.first() else {
        return Err(ControlError::DomainUnavailable(label.to_string()));
    };

    // Resolve first so a request that can never be applied changes nothing
    let target = representative.resolve_target(requested)?;
    let unit = representative.id().unit();

    match representative.current_governor(fs) {
        Ok(governor) if governor.is_userspace() => {}
        current => {
            let current = current
                .map(|g| g.to_string())
                .unwrap_or_else(|_| "unknown".to_string());
            log::warn!("{}: governor is {}, switching to userspace", label, current);
            set_governor(fs, label, scope, &Governor::userspace()).map_err(|e| {
                ControlError::GovernorEnforcementFailed {
                    domain: label.to_string(),
                    reason: e.to_string(),
                }
            })?;
        }
    }

    let mut applied = 0usize;
    let mut last_err = None;
    for domain in scope {
        match domain.write_frequency(fs, target) {
            Ok(()) => {
                log::info!("{}: frequency set to {} {}", domain.id(), target, unit);
                applied += 1;
            }
            Err(e) => {
                log::error!("{}: failed to set frequency: {}", domain.id(), e);
                last_err = Some(e);
            }
        }
    }

    if applied == 0 {
        return Err(ControlError::ApplyFailed {
            domain: label.to_string(),
            reason: last_err.map_or_else(|| "no write attempted".to_string(), |e| e.to_string()),
        });
    }

    if applied < scope.len() {
        log::warn!(
            "{}: frequency applied to {} of {} domains",
            label,
            applied,
            scope.len()
        );
    }

    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockFs;
    use std::path::Path;

    const BASE: &str = "/sys/devices/system/cpu";

    fn cpu(fs: &MockFs, core: u32) -> FrequencyDomain {
        FrequencyDomain::discover(
            fs,
            DomainId::Cpu(core),
            DomainPaths::cpu(Path::new(BASE), core),
            None,
        )
    }

    #[test]
    fn test_discover_sorts_hardware_list() {
        let fs = MockFs::new().with_file(
            format!("{}/cpu0/cpufreq/scaling_available_frequencies", BASE),
            "800 100 400 200 400\n",
        );
        let domain = cpu(&fs, 0);
        assert_eq!(domain.available_frequencies().steps(), &[100, 200, 400, 800]);
        assert_eq!(domain.frequency_source(), FrequencySource::Hardware);
    }

    #[test]
    fn test_discover_uses_fallback() {
        let fs = MockFs::new().with_gpu("/gpu", "nvhost_podgov", None);
        let fallback = FrequencyTable::new(vec![1, 2, 3]);
        let domain = FrequencyDomain::discover(
            &fs,
            DomainId::Gpu,
            DomainPaths::gpu(Path::new("/gpu")),
            Some(&fallback),
        );
        assert_eq!(domain.available_frequencies(), &fallback);
        assert_eq!(domain.frequency_source(), FrequencySource::Fallback);
        assert_eq!(domain.snapshot(&fs).freq_source, FrequencySource::Fallback);
    }

    #[test]
    fn test_snapshot_tolerates_missing_files() {
        let fs = MockFs::new().with_file(
            format!("{}/cpu0/cpufreq/scaling_available_frequencies", BASE),
            "100 200\n",
        );
        let snapshot = cpu(&fs, 0).snapshot(&fs);
        assert_eq!(snapshot.current_freq, None);
        assert_eq!(snapshot.governor, None);
        assert_eq!(snapshot.available_freqs.steps(), &[100, 200]);
        assert_eq!(snapshot.path, None);
    }

    #[test]
    fn test_snapshot_reads_fresh_values() {
        let fs = MockFs::new().with_cpu_core(BASE, 0, "ondemand", &[100, 200]);
        let domain = cpu(&fs, 0);
        assert_eq!(domain.snapshot(&fs).current_freq, Some(100));

        let cur = Path::new(BASE).join("cpu0/cpufreq/scaling_cur_freq");
        fs.write(&cur, "200").unwrap();
        assert_eq!(domain.snapshot(&fs).current_freq, Some(200));
    }

    #[test]
    fn test_apply_switches_governor_first() {
        let fs = MockFs::new().with_cpu_core(BASE, 0, "ondemand", &[100, 200, 400]);
        let domain = cpu(&fs, 0);

        let applied = apply_frequency(&fs, "cpu0", &[&domain], 0.5).unwrap();
        assert_eq!(applied, 200);

        let writes = fs.writes();
        assert_eq!(writes.len(), 2);
        assert!(writes[0].0.ends_with("scaling_governor"));
        assert_eq!(writes[0].1, "userspace");
        assert!(writes[1].0.ends_with("scaling_setspeed"));
        assert_eq!(writes[1].1, "200");
    }

    #[test]
    fn test_apply_skips_switch_under_userspace() {
        let fs = MockFs::new().with_cpu_core(BASE, 0, "userspace", &[100, 200, 400]);
        let domain = cpu(&fs, 0);

        apply_frequency(&fs, "cpu0", &[&domain], 400.0).unwrap();
        assert!(fs.writes_to("scaling_governor").is_empty());
        assert_eq!(fs.writes_to("scaling_setspeed").len(), 1);
    }

    #[test]
    fn test_apply_aborts_when_governor_switch_fails() {
        let fs = MockFs::new().with_cpu_core(BASE, 0, "performance", &[100, 200]);
        fs.fail_writes_to(format!("{}/cpu0/cpufreq/scaling_governor", BASE));
        let domain = cpu(&fs, 0);

        let result = apply_frequency(&fs, "cpu0", &[&domain], 200.0);
        assert!(matches!(
            result,
            Err(ControlError::GovernorEnforcementFailed { .. })
        ));
        assert!(fs.writes_to("scaling_setspeed").is_empty());
    }

    #[test]
    fn test_unresolvable_request_leaves_governor_alone() {
        let fs = MockFs::new().with_cpu_core(BASE, 0, "ondemand", &[]);
        let domain = cpu(&fs, 0);

        let result = apply_frequency(&fs, "cpu0", &[&domain], 0.5);
        assert!(matches!(result, Err(ControlError::ApplyFailed { .. })));
        assert!(fs.writes().is_empty());
        assert_eq!(
            domain.current_governor(&fs).unwrap().to_string(),
            "ondemand"
        );
    }

    #[test]
    fn test_apply_partial_success() {
        let fs = MockFs::new()
            .with_cpu_core(BASE, 0, "userspace", &[100, 200])
            .with_cpu_core(BASE, 1, "userspace", &[100, 200]);
        fs.fail_writes_to(format!("{}/cpu0/cpufreq/scaling_setspeed", BASE));
        let (d0, d1) = (cpu(&fs, 0), cpu(&fs, 1));

        assert_eq!(apply_frequency(&fs, "cpu", &[&d0, &d1], 200.0), Ok(200));
        assert_eq!(fs.writes_to("scaling_setspeed").len(), 1);
    }

    #[test]
    fn test_apply_all_writes_fail() {
        let fs = MockFs::new().with_cpu_core(BASE, 0, "userspace", &[100, 200]);
        fs.fail_writes_to(format!("{}/cpu0/cpufreq/scaling_setspeed", BASE));
        let domain = cpu(&fs, 0);

        let result = apply_frequency(&fs, "cpu", &[&domain], 200.0);
        assert!(matches!(result, Err(ControlError::ApplyFailed { .. })));
    }

    #[test]
    fn test_set_governor_stops_at_first_failure() {
        let fs = MockFs::new()
            .with_cpu_core(BASE, 0, "ondemand", &[100])
            .with_cpu_core(BASE, 1, "ondemand", &[100])
            .with_cpu_core(BASE, 2, "ondemand", &[100]);
        fs.fail_writes_to(format!("{}/cpu1/cpufreq/scaling_governor", BASE));
        let domains = [cpu(&fs, 0), cpu(&fs, 1), cpu(&fs, 2)];
        let scope: Vec<&FrequencyDomain> = domains.iter().collect();

        let result = set_governor(&fs, "cpu", &scope, &Governor::new("performance"));
        assert!(matches!(result, Err(ControlError::ApplyFailed { .. })));

        let writes = fs.writes_to("scaling_governor");
        assert_eq!(writes.len(), 1);
        assert!(writes[0].0.starts_with(format!("{}/cpu0", BASE)));
    }

    #[test]
    fn test_gpu_write_tries_existing_targets() {
        let fs = MockFs::new().with_gpu("/gpu", "userspace", Some(&[100, 200]));
        fs.fail_writes_to("/gpu/min_freq");
        let domain = FrequencyDomain::discover(
            &fs,
            DomainId::Gpu,
            DomainPaths::gpu(Path::new("/gpu")),
            None,
        );

        // userspace/freq does not exist, min_freq fails, max_freq accepts
        assert!(domain.write_frequency(&fs, 200).is_ok());
        let writes = fs.writes();
        assert_eq!(writes.len(), 1);
        assert!(writes[0].0.ends_with("max_freq"));
    }

    #[test]
    fn test_empty_scope_is_unavailable() {
        let fs = MockFs::new();
        assert_eq!(
            apply_frequency(&fs, "cpu", &[], 0.5),
            Err(ControlError::DomainUnavailable("cpu".to_string()))
        );
    }
}
