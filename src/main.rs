//! dvfsctl - CPU/GPU frequency control tool
//!
//! Controls clock frequencies and scaling governors on embedded Linux
//! boards, locally or through a remote control server.

use clap::Parser;
use dvfsctl::cli::args::{generate_completions, Cli, Commands};
use dvfsctl::commands::{run_freq, run_governor, run_serve, run_status, Execution};
use dvfsctl::config::ConfigBuilder;
use dvfsctl::error::{AppError, ProtocolError, SysfsError};

fn main() {
    let cli = Cli::parse();

    // RUST_LOG still wins over the default filter
    let default_filter = log_filter(&cli.command, cli.verbose);
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();

    // Run the appropriate command
    let result = run(&cli);

    if let Err(e) = result {
        log::debug!("{:?}", e);
        print_error(&e);
        std::process::exit(1);
    }
}

/// Default log filter when RUST_LOG is unset
///
/// The server reports connections at info level; one-shot commands stay quiet.
fn log_filter(command: &Commands, verbose: bool) -> &'static str {
    match command {
        _ if verbose => "debug",
        Commands::Serve(_) => "info",
        _ => "warn",
    }
}

fn run(cli: &Cli) -> Result<(), AppError> {
    let execution = if cli.is_remote() {
        Execution::Remote
    } else {
        Execution::Local
    };

    match &cli.command {
        Commands::Serve(args) => {
            let config = build_config(cli, args.sudo)?
                .with_listen_host(args.listen.clone())
                .build()?;
            run_serve(&config, cli.format)
        }

        Commands::Status { target } => {
            let config = build_config(cli, false)?.build()?;
            run_status(*target, &config, execution, cli.format)
        }

        Commands::Freq(args) => {
            let config = build_config(cli, args.sudo)?.build()?;
            run_freq(args, &config, execution, cli.format)
        }

        Commands::Governor(args) => {
            let config = build_config(cli, args.sudo)?.build()?;
            run_governor(args, &config, execution, cli.format)
        }

        Commands::Completions { shell } => {
            generate_completions(*shell);
            Ok(())
        }
    }
}

/// Merge the config file with the global CLI overrides
fn build_config(cli: &Cli, sudo: bool) -> Result<ConfigBuilder, AppError> {
    let builder = ConfigBuilder::new()
        .with_file(cli.config.as_deref())?
        .with_remote_host(cli.host.clone())
        .with_port(cli.port)
        .with_timeout(cli.timeout)
        .with_sudo(sudo.then_some(true));
    Ok(builder)
}

fn print_error(err: &AppError) {
    eprintln!("Error: {}", err);

    // Print helpful hints for common errors
    match err {
        AppError::Sysfs(SysfsError::PermissionDenied(_)) => {
            eprintln!();
            eprintln!("Hint: Run as root, pass --sudo, or set hardware.use_sudo = true.");
        }
        AppError::Sysfs(SysfsError::ElevationFailed { .. }) => {
            eprintln!();
            eprintln!("Hint: Passwordless sudo is required for tee on the control files.");
        }
        AppError::Protocol(ProtocolError::Connect { .. }) => {
            eprintln!();
            eprintln!("Hint: Make sure `dvfsctl serve` is running on the board");
            eprintln!("      and that the port is reachable.");
        }
        AppError::CommandFailed(message) if message.contains("Permission denied") => {
            eprintln!();
            eprintln!("Hint: Run as root, pass --sudo, or set hardware.use_sudo = true.");
        }
        _ => {}
    }
}
