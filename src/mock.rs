//! Mock implementations for testing
//!
//! Provides an in-memory control filesystem so domain and dispatcher logic can
//! be exercised without real cpufreq/devfreq hardware.

use crate::error::SysfsError;
use crate::sysfs::ControlFs;

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

/// In-memory control filesystem
#[derive(Debug, Default)]
pub struct MockFs {
    files: RwLock<BTreeMap<PathBuf, String>>,
    dirs: RwLock<BTreeSet<PathBuf>>,
    failing_writes: Mutex<HashSet<PathBuf>>,
    failing_reads: Mutex<HashSet<PathBuf>>,
    writes: Mutex<Vec<(PathBuf, String)>>,
}

impl MockFs {
    /// Create an empty filesystem
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add a file with content
    pub fn with_file(self, path: impl AsRef<Path>, content: &str) -> Self {
        self.files
            .write()
            .unwrap()
            .insert(path.as_ref().to_path_buf(), content.to_string());
        self
    }

    /// Builder: add an empty directory
    pub fn with_dir(self, path: impl AsRef<Path>) -> Self {
        self.dirs
            .write()
            .unwrap()
            .insert(path.as_ref().to_path_buf());
        self
    }

    /// Builder: add a cpufreq core under `base`
    pub fn with_cpu_core(self, base: &str, core: u32, governor: &str, freqs: &[u64]) -> Self {
        let dir = format!("{}/cpu{}/cpufreq", base, core);
        let cur = freqs.first().copied().unwrap_or_default();
        self.with_file(format!("{}/scaling_available_frequencies", dir), &join(freqs))
            .with_file(format!("{}/scaling_cur_freq", dir), &format!("{}\n", cur))
            .with_file(format!("{}/scaling_governor", dir), &format!("{}\n", governor))
            .with_file(format!("{}/scaling_setspeed", dir), "<unsupported>\n")
    }

    /// Builder: add a devfreq GPU directory
    ///
    /// `freqs = None` leaves out `available_frequencies`.
    pub fn with_gpu(self, dir: &str, governor: &str, freqs: Option<&[u64]>) -> Self {
        let fs = self
            .with_dir(dir)
            .with_file(format!("{}/cur_freq", dir), "114750000\n")
            .with_file(format!("{}/governor", dir), &format!("{}\n", governor))
            .with_file(format!("{}/min_freq", dir), "114750000\n")
            .with_file(format!("{}/max_freq", dir), "1300500000\n");
        match freqs {
            Some(freqs) => fs.with_file(format!("{}/available_frequencies", dir), &join(freqs)),
            None => fs,
        }
    }

    /// Make every write to `path` fail with a permission error
    pub fn fail_writes_to(&self, path: impl AsRef<Path>) {
        self.failing_writes
            .lock()
            .unwrap()
            .insert(path.as_ref().to_path_buf());
    }

    /// Make every read of `path` fail with a permission error
    pub fn fail_reads_from(&self, path: impl AsRef<Path>) {
        self.failing_reads
            .lock()
            .unwrap()
            .insert(path.as_ref().to_path_buf());
    }

    /// Current content of a file
    pub fn file(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files.read().unwrap().get(path.as_ref()).cloned()
    }

    /// Successful writes in order
    pub fn writes(&self) -> Vec<(PathBuf, String)> {
        self.writes.lock().unwrap().clone()
    }

    /// Successful writes whose path ends with `suffix`
    pub fn writes_to(&self, suffix: &str) -> Vec<(PathBuf, String)> {
        self.writes()
            .into_iter()
            .filter(|(p, _)| p.to_string_lossy().ends_with(suffix))
            .collect()
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.dirs.read().unwrap().iter().any(|d| d.starts_with(path))
            || self
                .files
                .read()
                .unwrap()
                .keys()
                .any(|f| f != path && f.starts_with(path))
    }
}

impl ControlFs for MockFs {
    fn exists(&self, path: &Path) -> bool {
        self.files.read().unwrap().contains_key(path) || self.is_dir(path)
    }

    fn read_to_string(&self, path: &Path) -> Result<String, SysfsError> {
        if self.failing_reads.lock().unwrap().contains(path) {
            return Err(SysfsError::PermissionDenied(path.to_path_buf()));
        }
        self.files
            .read()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| SysfsError::NotFound(path.to_path_buf()))
    }

    fn write(&self, path: &Path, value: &str) -> Result<(), SysfsError> {
        if self.failing_writes.lock().unwrap().contains(path) {
            return Err(SysfsError::PermissionDenied(path.to_path_buf()));
        }
        let mut files = self.files.write().unwrap();
        let Some(content) = files.get_mut(path) else {
            // sysfs does not create files on write
            return Err(SysfsError::NotFound(path.to_path_buf()));
        };
        *content = format!("{}\n", value);
        self.writes
            .lock()
            .unwrap()
            .push((path.to_path_buf(), value.to_string()));
        Ok(())
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<String>, SysfsError> {
        if !self.is_dir(path) {
            return Err(SysfsError::NotFound(path.to_path_buf()));
        }

        let mut names = BTreeSet::new();
        let files = self.files.read().unwrap();
        let dirs = self.dirs.read().unwrap();
        for entry in files.keys().chain(dirs.iter()) {
            if let Ok(rest) = entry.strip_prefix(path) {
                if let Some(first) = rest.components().next() {
                    names.insert(first.as_os_str().to_string_lossy().into_owned());
                }
            }
        }
        Ok(names.into_iter().collect())
    }
}

fn join(freqs: &[u64]) -> String {
    let mut out = freqs
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_list_dir() {
        let fs = MockFs::new()
            .with_cpu_core("/cpu", 0, "userspace", &[100, 200])
            .with_cpu_core("/cpu", 1, "userspace", &[100, 200])
            .with_dir("/cpu/cpuidle");

        let names = fs.list_dir(Path::new("/cpu")).unwrap();
        assert_eq!(names, vec!["cpu0", "cpu1", "cpuidle"]);
    }

    #[test]
    fn test_mock_write_requires_existing_file() {
        let fs = MockFs::new().with_file("/a", "1\n");
        assert!(fs.write(Path::new("/a"), "2").is_ok());
        assert_eq!(fs.file("/a").as_deref(), Some("2\n"));
        assert!(matches!(
            fs.write(Path::new("/b"), "2"),
            Err(SysfsError::NotFound(_))
        ));
    }

    #[test]
    fn test_mock_failing_write() {
        let fs = MockFs::new().with_file("/a", "1\n");
        fs.fail_writes_to("/a");
        assert!(matches!(
            fs.write(Path::new("/a"), "2"),
            Err(SysfsError::PermissionDenied(_))
        ));
        assert!(fs.writes().is_empty());
    }
}
