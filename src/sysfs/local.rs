//! Real sysfs implementation of ControlFs
//!
//! Reads go straight through `std::fs`. Writes are either direct or, when
//! the process is not privileged, piped through `sudo -n tee`.

use crate::error::SysfsError;
use crate::sysfs::traits::ControlFs;

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

/// How control file writes are performed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Write with the permissions of the current process
    #[default]
    Direct,
    /// Pipe the value through `sudo -n tee <path>`
    Sudo,
}

/// Control file access on the local machine
#[derive(Debug, Clone, Default)]
pub struct LocalFs {
    write_mode: WriteMode,
}

impl LocalFs {
    /// Create a new local filesystem handle
    pub fn new(write_mode: WriteMode) -> Self {
        Self { write_mode }
    }

    /// Configured write mode
    pub fn write_mode(&self) -> WriteMode {
        self.write_mode
    }

    fn write_elevated(&self, path: &Path, value: &str) -> Result<(), SysfsError> {
        let elevation_failed = |reason: String| SysfsError::ElevationFailed {
            path: path.to_path_buf(),
            reason,
        };

        // The value goes through stdin, never through a shell
        let mut child = Command::new("sudo")
            .arg("-n")
            .arg("tee")
            .arg(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| elevation_failed(e.to_string()))?;

        if let Some(mut stdin) = child.stdin.take() {
            writeln!(stdin, "{}", value).map_err(|e| elevation_failed(e.to_string()))?;
        }

        let output = child
            .wait_with_output()
            .map_err(|e| elevation_failed(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(elevation_failed(if stderr.is_empty() {
                output.status.to_string()
            } else {
                stderr
            }));
        }

        Ok(())
    }
}

impl ControlFs for LocalFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_to_string(&self, path: &Path) -> Result<String, SysfsError> {
        fs::read_to_string(path).map_err(|e| SysfsError::from_io(path, e))
    }

    fn write(&self, path: &Path, value: &str) -> Result<(), SysfsError> {
        match self.write_mode {
            WriteMode::Direct => fs::write(path, value).map_err(|e| SysfsError::from_io(path, e)),
            WriteMode::Sudo => self.write_elevated(path, value),
        }
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<String>, SysfsError> {
        let entries = fs::read_dir(path).map_err(|e| SysfsError::from_io(path, e))?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| SysfsError::from_io(path, e))?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        Ok(names)
    }
}
