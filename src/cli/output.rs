//! Output formatting utilities
//!
//! Provides table and JSON output formatting for CLI commands.

use crate::cli::args::OutputFormat;
use crate::domain::{CpuStatus, DomainSnapshot, FrequencySource, FrequencyUnit};
use crate::protocol::Response;
use serde::Serialize;
use std::fmt::Write as _;
use std::io::{self, Write};

/// Format and print output based on the selected format
pub fn print_output<T: Serialize + TableDisplay>(data: &T, format: OutputFormat) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match format {
        OutputFormat::Table => {
            writeln!(handle, "{}", data.to_table())?;
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(data).unwrap_or_else(|_| "{}".to_string());
            writeln!(handle, "{}", json)?;
        }
        OutputFormat::Compact => {
            writeln!(handle, "{}", data.to_compact())?;
        }
    }

    Ok(())
}

/// Trait for types that can be displayed as a table
pub trait TableDisplay {
    /// Format as a table string
    fn to_table(&self) -> String;

    /// Format as a compact single line
    fn to_compact(&self) -> String {
        self.to_table().replace('\n', " | ")
    }
}

fn format_freq(value: Option<u64>, unit: FrequencyUnit) -> String {
    match value {
        Some(v) => format!("{} {} ({:.2} MHz)", v, unit, unit.to_mhz(v)),
        None => "unknown".to_string(),
    }
}

fn format_range(snapshot: &DomainSnapshot, unit: FrequencyUnit) -> String {
    let table = &snapshot.available_freqs;
    let mut out = match (table.min(), table.max()) {
        (Some(min), Some(max)) => format!(
            "{} steps, {:.2}-{:.2} MHz",
            table.len(),
            unit.to_mhz(min),
            unit.to_mhz(max)
        ),
        _ => "none".to_string(),
    };
    if snapshot.freq_source == FrequencySource::Fallback {
        let _ = write!(out, " [{}]", snapshot.freq_source);
    }
    out
}

fn governor_name(snapshot: &DomainSnapshot) -> &str {
    snapshot.governor.as_ref().map_or("unknown", |g| g.as_str())
}

impl TableDisplay for CpuStatus {
    fn to_table(&self) -> String {
        let unit = FrequencyUnit::KHz;
        let mut output = format!(
            "{:<8} {:>12} {:>10}  {:<14} {}\n",
            "CORE", "FREQ (kHz)", "MHz", "GOVERNOR", "STEPS"
        );

        for (core, snapshot) in self.iter() {
            let (khz, mhz) = match snapshot.current_freq {
                Some(v) => (v.to_string(), format!("{:.1}", unit.to_mhz(v))),
                None => ("-".to_string(), "-".to_string()),
            };
            let _ = writeln!(
                output,
                "{:<8} {:>12} {:>10}  {:<14} {}",
                format!("cpu{}", core),
                khz,
                mhz,
                governor_name(snapshot),
                format_range(snapshot, unit)
            );
        }

        output
    }

    fn to_compact(&self) -> String {
        self.iter()
            .map(|(core, s)| {
                let freq = s.current_freq.map_or("-".to_string(), |v| v.to_string());
                format!("cpu{}:{}kHz/{}", core, freq, governor_name(s))
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl TableDisplay for DomainSnapshot {
    fn to_table(&self) -> String {
        let unit = FrequencyUnit::Hz;
        let mut output = String::from("GPU");
        if let Some(path) = &self.path {
            let _ = write!(output, " ({})", path);
        }
        let _ = write!(
            output,
            "\n  Current:  {}\n  Governor: {}\n  Steps:    {}",
            format_freq(self.current_freq, unit),
            governor_name(self),
            format_range(self, unit)
        );
        output
    }

    fn to_compact(&self) -> String {
        let freq = self.current_freq.map_or("-".to_string(), |v| v.to_string());
        format!("gpu:{}Hz/{}", freq, governor_name(self))
    }
}

impl TableDisplay for Response {
    fn to_table(&self) -> String {
        let mut output = if self.is_success() {
            format!("✓ {}", self.message)
        } else {
            format!("✗ {}", self.message)
        };

        if let Some(cpu) = &self.cpu_status {
            output.push_str("\n\n");
            output.push_str(cpu.to_table().trim_end());
        }
        if let Some(gpu) = &self.gpu_status {
            output.push_str("\n\n");
            output.push_str(&gpu.to_table());
        }

        output
    }

    fn to_compact(&self) -> String {
        let mut parts = vec![format!("{}: {}", self.status, self.message)];
        if let Some(cpu) = &self.cpu_status {
            parts.push(cpu.to_compact());
        }
        if let Some(gpu) = &self.gpu_status {
            parts.push(gpu.to_compact());
        }
        parts.join(" | ")
    }
}

/// Simple message output
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub message: String,
    pub success: bool,
}

impl TableDisplay for Message {
    fn to_table(&self) -> String {
        if self.success {
            format!("✓ {}", self.message)
        } else {
            format!("✗ {}", self.message)
        }
    }
}
