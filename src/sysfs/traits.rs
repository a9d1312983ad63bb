//! Trait definitions for hardware control endpoints
//!
//! These traits abstract over sysfs to enable testing with an in-memory fake.

use crate::error::SysfsError;
use std::path::Path;

/// Read/write access to hardware control files
///
/// Implementations must not cache reads: governors and frequencies change
/// outside this process.
pub trait ControlFs: Send + Sync {
    /// Whether a control file or directory exists
    fn exists(&self, path: &Path) -> bool;

    /// Read the full content of a control file
    fn read_to_string(&self, path: &Path) -> Result<String, SysfsError>;

    /// Write a value to a control file
    fn write(&self, path: &Path, value: &str) -> Result<(), SysfsError>;

    /// Names of the entries in a directory
    fn list_dir(&self, path: &Path) -> Result<Vec<String>, SysfsError>;

    /// Read a control file with surrounding whitespace removed
    fn read_trimmed(&self, path: &Path) -> Result<String, SysfsError> {
        Ok(self.read_to_string(path)?.trim().to_string())
    }

    /// Read a single unsigned integer
    fn read_u64(&self, path: &Path) -> Result<u64, SysfsError> {
        let raw = self.read_trimmed(path)?;
        raw.parse().map_err(|_| SysfsError::Parse {
            path: path.to_path_buf(),
            value: raw,
        })
    }

    /// Read a whitespace-separated list of unsigned integers
    fn read_u64_list(&self, path: &Path) -> Result<Vec<u64>, SysfsError> {
        self.read_to_string(path)?
            .split_whitespace()
            .map(|token| {
                token.parse().map_err(|_| SysfsError::Parse {
                    path: path.to_path_buf(),
                    value: token.to_string(),
                })
            })
            .collect()
    }
}
