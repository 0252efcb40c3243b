// ABOUTME: Output formatting for CLI feedback.
// ABOUTME: Supports normal, quiet (CI), and JSON output modes.

use serde::Serialize;
use skiff::transfer::TransferSummary;
use std::time::Instant;

/// Output mode for CLI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-friendly output with progress messages
    Normal,
    /// Minimal output for CI (only final result)
    Quiet,
    /// JSON lines for scripting
    Json,
}

/// Handles CLI output based on the configured mode.
pub struct Output {
    mode: OutputMode,
    start_time: Option<Instant>,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            start_time: None,
        }
    }

    /// Start timing an operation.
    pub fn start_timer(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Get elapsed time since timer started.
    pub fn elapsed_secs(&self) -> f64 {
        self.start_time
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    fn duration(&self) -> Option<f64> {
        self.start_time.map(|_| self.elapsed_secs())
    }

    /// Print a progress message (suppressed in quiet/json mode).
    pub fn progress(&self, message: &str) {
        if self.mode == OutputMode::Normal {
            eprintln!("{message}");
        }
    }

    /// Print what a remote command wrote to stdout.
    ///
    /// Printed verbatim in normal and quiet mode so it can be piped.
    pub fn command_output(&self, stdout: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => {
                if !stdout.is_empty() {
                    println!("{stdout}");
                }
            }
            OutputMode::Json => self.emit(&JsonEvent {
                event: "output",
                message: stdout,
                duration_secs: self.duration(),
                summary: None,
            }),
        }
    }

    /// Report a finished transfer.
    pub fn transfer(&self, verb: &str, summary: &TransferSummary) {
        let message = format!(
            "{verb} {} file(s), {} directory(ies), {} bytes",
            summary.files, summary.directories, summary.bytes
        );
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => self.success(&message),
            OutputMode::Json => self.emit(&JsonEvent {
                event: "success",
                message: &message,
                duration_secs: self.duration(),
                summary: Some(JsonSummary::from(summary)),
            }),
        }
    }

    /// Print a success message with optional timing.
    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => {
                let elapsed = self.elapsed_secs();
                if elapsed > 0.0 {
                    println!("{message} ({:.1}s)", elapsed);
                } else {
                    println!("{message}");
                }
            }
            OutputMode::Quiet => {
                // Print only the essential result
                println!("{message}");
            }
            OutputMode::Json => self.emit(&JsonEvent {
                event: "success",
                message,
                duration_secs: self.duration(),
                summary: None,
            }),
        }
    }

    /// Print an error message.
    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => {
                eprintln!("Error: {message}");
            }
            OutputMode::Json => {
                let event = JsonEvent {
                    event: "error",
                    message,
                    duration_secs: self.duration(),
                    summary: None,
                };
                if let Ok(json) = serde_json::to_string(&event) {
                    eprintln!("{json}");
                }
            }
        }
    }

    fn emit(&self, event: &JsonEvent<'_>) {
        if let Ok(json) = serde_json::to_string(event) {
            println!("{json}");
        }
    }
}

#[derive(Serialize)]
struct JsonEvent<'a> {
    event: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<JsonSummary>,
}

#[derive(Serialize)]
struct JsonSummary {
    files: usize,
    directories: usize,
    bytes: u64,
}

impl From<&TransferSummary> for JsonSummary {
    fn from(summary: &TransferSummary) -> Self {
        Self {
            files: summary.files,
            directories: summary.directories,
            bytes: summary.bytes,
        }
    }
}
