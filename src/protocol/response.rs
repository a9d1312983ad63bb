//! Response types

use crate::domain::{CpuStatus, DomainSnapshot};
use crate::error::{ControlError, ProtocolError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Overall outcome of a command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

impl fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseStatus::Success => f.write_str("success"),
            ResponseStatus::Error => f.write_str("error"),
        }
    }
}

/// Machine-readable error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MissingParameter,
    UnknownAction,
    DomainUnavailable,
    GovernorEnforcementFailed,
    ApplyFailed,
    ReadFailed,
    /// The message could not be decoded at all
    InvalidRequest,
}

impl From<&ControlError> for ErrorKind {
    fn from(err: &ControlError) -> Self {
        match err {
            ControlError::MissingParameter(_) => ErrorKind::MissingParameter,
            ControlError::UnknownAction(_) => ErrorKind::UnknownAction,
            ControlError::DomainUnavailable(_) => ErrorKind::DomainUnavailable,
            ControlError::GovernorEnforcementFailed { .. } => ErrorKind::GovernorEnforcementFailed,
            ControlError::ApplyFailed { .. } => ErrorKind::ApplyFailed,
            ControlError::ReadFailed { .. } => ErrorKind::ReadFailed,
        }
    }
}

/// Result of a dispatched command
///
/// Every response carries `status`, `message` and the dispatch timestamp.
/// Payload fields are omitted from the wire form when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub status: ResponseStatus,
    pub message: String,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorKind>,
    /// Step actually written, in the addressed domain's unit
    ///
    /// Only set when a single domain was written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied_frequency: Option<u64>,
    /// CPU step written, in kHz
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_applied_frequency: Option<u64>,
    /// GPU step written, in Hz
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpu_applied_frequency: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_status: Option<CpuStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpu_status: Option<DomainSnapshot>,
}

impl Response {
    /// Create a success response
    pub fn success(timestamp: &str, message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Success,
            message: message.into(),
            timestamp: timestamp.to_string(),
            error: None,
            applied_frequency: None,
            cpu_applied_frequency: None,
            gpu_applied_frequency: None,
            cpu_status: None,
            gpu_status: None,
        }
    }

    /// Create an error response from a control error
    pub fn failure(timestamp: &str, err: &ControlError) -> Self {
        Self {
            status: ResponseStatus::Error,
            error: Some(ErrorKind::from(err)),
            ..Self::success(timestamp, err.to_string())
        }
    }

    /// Create an error response for a message that could not be decoded
    pub fn invalid_request(timestamp: &str, err: &ProtocolError) -> Self {
        Self {
            status: ResponseStatus::Error,
            error: Some(ErrorKind::InvalidRequest),
            ..Self::success(timestamp, err.to_string())
        }
    }

    /// Builder: attach the resolved CPU step (kHz)
    pub fn with_cpu_applied(mut self, frequency: u64) -> Self {
        self.cpu_applied_frequency = Some(frequency);
        self.sync_applied_frequency();
        self
    }

    /// Builder: attach the resolved GPU step (Hz)
    pub fn with_gpu_applied(mut self, frequency: u64) -> Self {
        self.gpu_applied_frequency = Some(frequency);
        self.sync_applied_frequency();
        self
    }

    // kHz and Hz never share one field
    fn sync_applied_frequency(&mut self) {
        self.applied_frequency = match (self.cpu_applied_frequency, self.gpu_applied_frequency) {
            (Some(freq), None) | (None, Some(freq)) => Some(freq),
            _ => None,
        };
    }

    /// Builder: attach CPU snapshots
    pub fn with_cpu_status(mut self, status: CpuStatus) -> Self {
        self.cpu_status = Some(status);
        self
    }

    /// Builder: attach a GPU snapshot
    pub fn with_gpu_status(mut self, status: Option<DomainSnapshot>) -> Self {
        self.gpu_status = status;
        self
    }

    #[inline]
    pub fn is_success(&self) -> bool {
        self.status == ResponseStatus::Success
    }

    /// Encode as a single JSON line (without the trailing newline)
    pub fn encode(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode one JSON line
    pub fn decode(input: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(input.trim())?)
    }
}
