//! CLI argument definitions using clap derive
//!
//! Defines all command-line arguments and subcommands.

use crate::protocol::Target;
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

/// CPU/GPU frequency control for embedded boards
///
/// Run `serve` on the board to accept remote commands, or query and set
/// frequencies directly. With `--host`, commands go to a remote server.
#[derive(Parser, Debug)]
#[command(name = "dvfsctl")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "DVFSCTL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Send commands to this server instead of local hardware
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Server port (remote commands and `serve`)
    #[arg(short, long, global = true)]
    pub port: Option<u16>,

    /// Connect/read timeout in seconds for remote commands
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Whether commands are sent to a remote server
    pub fn is_remote(&self) -> bool {
        self.host.is_some()
    }
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the control server on this board
    Serve(ServeArgs),

    /// Show frequency and governor status
    Status {
        /// Domain to query
        #[arg(short, long, value_enum, default_value = "all")]
        target: TargetArg,
    },

    /// Set the clock frequency
    ///
    /// Values strictly between 0 and 1 select a step by position in the
    /// frequency table; anything else is an absolute frequency (kHz for CPU,
    /// Hz for GPU) snapped to the nearest step.
    Freq(FreqArgs),

    /// Set the scaling governor
    Governor(GovernorArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Arguments for the serve command
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long)]
    pub listen: Option<String>,

    /// Write sysfs files through `sudo -n tee`
    #[arg(long)]
    pub sudo: bool,
}

/// Arguments for the freq command
#[derive(Args, Debug)]
pub struct FreqArgs {
    /// Frequency or index in (0, 1)
    #[arg(allow_negative_numbers = true)]
    pub frequency: f64,

    /// Domain to control
    #[arg(short, long, value_enum, default_value = "cpu")]
    pub target: TargetArg,

    /// Single CPU core (default: all cores)
    #[arg(long)]
    pub cpu: Option<u32>,

    /// Write sysfs files through `sudo -n tee` (local only)
    #[arg(long)]
    pub sudo: bool,
}

/// Arguments for the governor command
#[derive(Args, Debug)]
pub struct GovernorArgs {
    /// Governor name
    #[arg(default_value = "userspace")]
    pub name: String,

    /// Domain to control
    #[arg(short, long, value_enum, default_value = "cpu")]
    pub target: TargetArg,

    /// Single CPU core (default: all cores)
    #[arg(long)]
    pub cpu: Option<u32>,

    /// Write sysfs files through `sudo -n tee` (local only)
    #[arg(long)]
    pub sudo: bool,
}

/// Target domain argument
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetArg {
    /// CPU cores
    Cpu,
    /// The GPU
    Gpu,
    /// CPU and GPU
    All,
}

impl From<TargetArg> for Target {
    fn from(arg: TargetArg) -> Self {
        match arg {
            TargetArg::Cpu => Target::Cpu,
            TargetArg::Gpu => Target::Gpu,
            TargetArg::All => Target::All,
        }
    }
}

/// Output format
#[derive(ValueEnum, Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format for machine parsing
    Json,
    /// Compact single-line format
    Compact,
}

/// Generate shell completions and print to stdout
pub fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
}
