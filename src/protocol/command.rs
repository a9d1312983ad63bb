//! Command types
//!
//! `CommandMessage` is the JSON object received over the wire. It is turned
//! into the closed `Command` enum before dispatch; unknown fields are
//! rejected by serde, unknown actions by the conversion.

use crate::domain::Governor;
use crate::error::{ControlError, DomainError, ProtocolError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which domain a command addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    /// CPU cores
    #[default]
    Cpu,
    /// The GPU
    Gpu,
    /// CPU and GPU (status queries; write routing is configurable)
    All,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Cpu => f.write_str("cpu"),
            Target::Gpu => f.write_str("gpu"),
            Target::All => f.write_str("all"),
        }
    }
}

impl FromStr for Target {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cpu" => Ok(Target::Cpu),
            "gpu" => Ok(Target::Gpu),
            "all" => Ok(Target::All),
            other => Err(DomainError::InvalidTarget(other.to_string())),
        }
    }
}

/// Wire form of a command
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommandMessage {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub target: Target,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub governor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<u32>,
}

impl CommandMessage {
    /// Decode one JSON message
    pub fn decode(input: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(input.trim())?)
    }
}

/// A validated command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Set the frequency, absolute (native unit) or as an index in (0, 1)
    SetFrequency {
        target: Target,
        frequency: f64,
        cpu: Option<u32>,
    },
    /// Read status snapshots
    GetStatus { target: Target },
    /// Set the scaling governor
    SetGovernor {
        target: Target,
        governor: Governor,
        cpu: Option<u32>,
    },
}

impl Command {
    pub const SET_FREQUENCY: &'static str = "set_frequency";
    pub const GET_STATUS: &'static str = "get_status";
    pub const SET_GOVERNOR: &'static str = "set_governor";

    /// Wire name of the action
    pub fn action(&self) -> &'static str {
        match self {
            Command::SetFrequency { .. } => Self::SET_FREQUENCY,
            Command::GetStatus { .. } => Self::GET_STATUS,
            Command::SetGovernor { .. } => Self::SET_GOVERNOR,
        }
    }

    pub fn target(&self) -> Target {
        match self {
            Command::SetFrequency { target, .. }
            | Command::GetStatus { target }
            | Command::SetGovernor { target, .. } => *target,
        }
    }

    /// Convert back to the wire form
    pub fn to_message(&self) -> CommandMessage {
        let mut message = CommandMessage {
            action: self.action().to_string(),
            target: self.target(),
            ..Default::default()
        };
        match self {
            Command::SetFrequency { frequency, cpu, .. } => {
                message.frequency = Some(*frequency);
                message.cpu = *cpu;
            }
            Command::GetStatus { .. } => {}
            Command::SetGovernor { governor, cpu, .. } => {
                message.governor = Some(governor.to_string());
                message.cpu = *cpu;
            }
        }
        message
    }

    /// Encode as a single JSON line (without the trailing newline)
    pub fn encode(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(&self.to_message())?)
    }
}

impl TryFrom<CommandMessage> for Command {
    type Error = ControlError;

    fn try_from(message: CommandMessage) -> Result<Self, Self::Error> {
        let CommandMessage {
            action,
            target,
            frequency,
            governor,
            cpu,
        } = message;

        match action.as_str() {
            Self::SET_FREQUENCY => Ok(Command::SetFrequency {
                target,
                frequency: frequency.ok_or(ControlError::MissingParameter("frequency"))?,
                cpu,
            }),
            Self::GET_STATUS => Ok(Command::GetStatus { target }),
            Self::SET_GOVERNOR => Ok(Command::SetGovernor {
                target,
                governor: governor.map(Governor::new).unwrap_or_default(),
                cpu,
            }),
            _ => Err(ControlError::UnknownAction(action)),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (target: {})", self.action(), self.target())
    }
}
