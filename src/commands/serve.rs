//! Serve command implementation
//!
//! Runs the control server on the board until Ctrl-C.

use crate::cli::args::OutputFormat;
use crate::cli::output::{print_output, Message};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::services::CommandDispatcher;
use crate::sysfs::LocalFs;
use crate::transport::ControlServer;

use std::sync::atomic::Ordering;
use std::sync::Arc;

/// Execute the serve command
pub fn run_serve(config: &Config, format: OutputFormat) -> Result<()> {
    let fs = Arc::new(LocalFs::new(config.hardware.write_mode()));
    let dispatcher =
        CommandDispatcher::discover(fs, &config.hardware, config.dispatch.all_target)?;

    if dispatcher.cpu().is_empty() && !dispatcher.gpu().is_available() {
        log::warn!("No controllable CPU or GPU domain found; every command will fail");
    }

    let mut server = ControlServer::bind(&config.server, dispatcher)?;

    let running = server.running_flag();
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|e| AppError::Io(std::io::Error::other(e)))?;

    log::info!(
        "Serving on {} (writes: {:?}, all-target routing: {:?})",
        server.local_addr()?,
        config.hardware.write_mode(),
        config.dispatch.all_target
    );

    server.run()?;

    print_output(
        &Message {
            message: "Server stopped".to_string(),
            success: true,
        },
        format,
    )?;

    Ok(())
}
