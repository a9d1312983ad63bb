//! Command dispatcher
//!
//! Turns a decoded command into calls on the CPU and GPU services and builds
//! the response. Every failure, from a malformed line to a rejected sysfs
//! write, comes back as an error response.

use crate::config::{AllTargetRouting, HardwareConfig};
use crate::domain::Governor;
use crate::error::{ConfigError, ControlError, ProtocolError};
use crate::protocol::{Command, CommandMessage, Response, Target};
use crate::services::{CpuDomainSet, GpuDomain};
use crate::sysfs::ControlFs;

use std::fmt;
use std::sync::Arc;

/// Dispatcher lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchState {
    #[default]
    Idle,
    Dispatching,
    Responding,
}

impl fmt::Display for DispatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchState::Idle => f.write_str("idle"),
            DispatchState::Dispatching => f.write_str("dispatching"),
            DispatchState::Responding => f.write_str("responding"),
        }
    }
}

/// Routes commands to the CPU and GPU domains
///
/// Holds no state between commands apart from the discovered domains.
pub struct CommandDispatcher<F> {
    cpu: CpuDomainSet<F>,
    gpu: GpuDomain<F>,
    routing: AllTargetRouting,
    state: DispatchState,
}

impl<F: ControlFs> CommandDispatcher<F> {
    pub fn new(cpu: CpuDomainSet<F>, gpu: GpuDomain<F>, routing: AllTargetRouting) -> Self {
        Self {
            cpu,
            gpu,
            routing,
            state: DispatchState::Idle,
        }
    }

    /// Discover all domains from the configured hardware layout
    pub fn discover(
        fs: Arc<F>,
        hardware: &HardwareConfig,
        routing: AllTargetRouting,
    ) -> Result<Self, ConfigError> {
        let fallback = hardware.gpu_fallback_table()?;
        let cpu = CpuDomainSet::discover(fs.clone(), &hardware.cpu_base_path);
        let gpu = GpuDomain::discover(fs, &hardware.gpu_paths, &fallback);
        Ok(Self::new(cpu, gpu, routing))
    }

    pub fn state(&self) -> DispatchState {
        self.state
    }

    pub fn cpu(&self) -> &CpuDomainSet<F> {
        &self.cpu
    }

    pub fn gpu(&self) -> &GpuDomain<F> {
        &self.gpu
    }

    /// Decode and execute one JSON command line
    pub fn dispatch_line(&mut self, line: &str) -> Response {
        let timestamp = now();
        self.transition(DispatchState::Dispatching);

        let response = match CommandMessage::decode(line) {
            Ok(message) => match Command::try_from(message) {
                Ok(command) => self.execute(&command, &timestamp),
                Err(e) => Response::failure(&timestamp, &e),
            },
            Err(e) => {
                log::warn!("Rejected message: {}", e);
                Response::invalid_request(&timestamp, &e)
            }
        };

        self.respond(response)
    }

    /// Answer input that never became a complete message
    pub fn reject(&mut self, err: &ProtocolError) -> Response {
        let timestamp = now();
        self.transition(DispatchState::Dispatching);
        log::warn!("Rejected message: {}", err);
        self.respond(Response::invalid_request(&timestamp, err))
    }

    /// Execute an already validated command
    pub fn dispatch(&mut self, command: &Command) -> Response {
        let timestamp = now();
        self.transition(DispatchState::Dispatching);
        let response = self.execute(command, &timestamp);
        self.respond(response)
    }

    fn execute(&self, command: &Command, timestamp: &str) -> Response {
        log::info!("Dispatching {}", command);

        let result = match command {
            Command::GetStatus { target } => self.get_status(*target, timestamp),
            Command::SetFrequency {
                target,
                frequency,
                cpu,
            } => self.set_frequency(*target, *frequency, *cpu, timestamp),
            Command::SetGovernor {
                target,
                governor,
                cpu,
            } => self.set_governor(*target, governor, *cpu, timestamp),
        };

        result.unwrap_or_else(|e| Response::failure(timestamp, &e))
    }

    fn get_status(&self, target: Target, timestamp: &str) -> Result<Response, ControlError> {
        match target {
            Target::Cpu => {
                Ok(Response::success(timestamp, "CPU status").with_cpu_status(self.cpu.status()))
            }
            Target::Gpu => Ok(Response::success(timestamp, "GPU status")
                .with_gpu_status(Some(self.gpu.status()?))),
            Target::All => {
                let gpu = self.gpu.status().map_err(|e| log::debug!("{}", e)).ok();
                Ok(Response::success(timestamp, "System status")
                    .with_cpu_status(self.cpu.status())
                    .with_gpu_status(gpu))
            }
        }
    }

    fn set_frequency(
        &self,
        target: Target,
        frequency: f64,
        core: Option<u32>,
        timestamp: &str,
    ) -> Result<Response, ControlError> {
        let (cpu, gpu) = self.write_scope(target);
        let mut response = Response::success(timestamp, "");
        let mut parts = Vec::new();

        if cpu {
            let applied = self.cpu.apply_frequency(frequency, core)?;
            parts.push(format!("CPU frequency set to {} kHz", applied));
            response = response
                .with_cpu_applied(applied)
                .with_cpu_status(self.cpu.status());
        }
        if gpu {
            let applied = self.gpu.apply_frequency(frequency)?;
            parts.push(format!("GPU frequency set to {} Hz", applied));
            response = response
                .with_gpu_applied(applied)
                .with_gpu_status(self.gpu.status().ok());
        }

        response.message = parts.join("; ");
        Ok(response)
    }

    fn set_governor(
        &self,
        target: Target,
        governor: &Governor,
        core: Option<u32>,
        timestamp: &str,
    ) -> Result<Response, ControlError> {
        let (cpu, gpu) = self.write_scope(target);
        let mut parts = Vec::new();

        if cpu {
            self.cpu.set_governor(governor, core)?;
            parts.push(format!("CPU governor set to {}", governor));
        }
        if gpu {
            self.gpu.set_governor(governor)?;
            parts.push(format!("GPU governor set to {}", governor));
        }

        Ok(Response::success(timestamp, parts.join("; ")))
    }

    /// Which services a write command reaches, as (cpu, gpu)
    fn write_scope(&self, target: Target) -> (bool, bool) {
        match (target, self.routing) {
            (Target::Cpu, _) => (true, false),
            (Target::Gpu, _) => (false, true),
            (Target::All, AllTargetRouting::Cpu) => (true, false),
            (Target::All, AllTargetRouting::Gpu) => (false, true),
            (Target::All, AllTargetRouting::Both) => (true, true),
        }
    }

    fn respond(&mut self, response: Response) -> Response {
        self.transition(DispatchState::Responding);
        if response.is_success() {
            log::info!("{}", response.message);
        } else {
            log::warn!("Command failed: {}", response.message);
        }
        self.transition(DispatchState::Idle);
        response
    }

    fn transition(&mut self, next: DispatchState) {
        log::trace!("Dispatcher {} -> {}", self.state, next);
        self.state = next;
    }
}

fn now() -> String {
    chrono::Local::now().to_rfc3339()
}
