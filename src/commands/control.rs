//! Status, frequency and governor commands
//!
//! Each command is turned into a protocol `Command` and executed either
//! against local hardware or on a remote server.

use crate::cli::args::{FreqArgs, GovernorArgs, OutputFormat, TargetArg};
use crate::cli::output::print_output;
use crate::config::Config;
use crate::domain::Governor;
use crate::error::{AppError, Result};
use crate::protocol::{Command, Response};
use crate::services::CommandDispatcher;
use crate::sysfs::LocalFs;
use crate::transport::RemoteClient;

use std::sync::Arc;

/// Where a command is executed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Execution {
    Local,
    Remote,
}

/// Execute the status command
pub fn run_status(
    target: TargetArg,
    config: &Config,
    execution: Execution,
    format: OutputFormat,
) -> Result<()> {
    let command = Command::GetStatus {
        target: target.into(),
    };
    run_command(&command, config, execution, format)
}

/// Execute the freq command
pub fn run_freq(
    args: &FreqArgs,
    config: &Config,
    execution: Execution,
    format: OutputFormat,
) -> Result<()> {
    let command = Command::SetFrequency {
        target: args.target.into(),
        frequency: args.frequency,
        cpu: args.cpu,
    };
    run_command(&command, config, execution, format)
}

/// Execute the governor command
pub fn run_governor(
    args: &GovernorArgs,
    config: &Config,
    execution: Execution,
    format: OutputFormat,
) -> Result<()> {
    let command = Command::SetGovernor {
        target: args.target.into(),
        governor: Governor::new(args.name.clone()),
        cpu: args.cpu,
    };
    run_command(&command, config, execution, format)
}

fn run_command(
    command: &Command,
    config: &Config,
    execution: Execution,
    format: OutputFormat,
) -> Result<()> {
    let response = execute(command, config, execution)?;

    // JSON output carries error responses too; table output leaves them to main
    if response.is_success() || matches!(format, OutputFormat::Json) {
        print_output(&response, format)?;
    }

    if response.is_success() {
        Ok(())
    } else {
        Err(AppError::CommandFailed(response.message))
    }
}

/// Execute one command and return its response
pub fn execute(command: &Command, config: &Config, execution: Execution) -> Result<Response> {
    match execution {
        Execution::Remote => {
            let client = RemoteClient::from_config(&config.client);
            log::info!("Sending {} to {}", command, client.addr());
            Ok(client.send(command)?)
        }
        Execution::Local => {
            let fs = Arc::new(LocalFs::new(config.hardware.write_mode()));
            let mut dispatcher =
                CommandDispatcher::discover(fs, &config.hardware, config.dispatch.all_target)?;
            Ok(dispatcher.dispatch(command))
        }
    }
}
