//! Scaling governor type

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of a kernel scaling governor
///
/// Opaque to this crate apart from the `userspace` check; any other name is
/// written to the hardware as given.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Governor(String);

impl Governor {
    /// Governor under which the kernel accepts manual frequency writes
    pub const USERSPACE: &'static str = "userspace";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn userspace() -> Self {
        Self(Self::USERSPACE.to_string())
    }

    /// Case-sensitive comparison against `userspace`
    #[inline]
    pub fn is_userspace(&self) -> bool {
        self.0 == Self::USERSPACE
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Governor {
    fn default() -> Self {
        Self::userspace()
    }
}

impl fmt::Display for Governor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Governor {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_userspace_is_case_sensitive() {
        assert!(Governor::userspace().is_userspace());
        assert!(!Governor::new("Userspace").is_userspace());
        assert!(!Governor::new("performance").is_userspace());
    }

    #[test]
    fn test_default_is_userspace() {
        assert_eq!(Governor::default().as_str(), "userspace");
    }
}
