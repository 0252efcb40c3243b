// ABOUTME: Error types for remote command execution.
// ABOUTME: Covers session setup, PTY allocation, and command failures.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("failed to open session: {0}")]
    Session(String),

    #[error("failed to allocate pseudo-terminal: {0}")]
    Pty(String),

    #[error("failed to execute command: {0}")]
    Exec(String),

    #[error("command exited with status {status}")]
    NonZeroExit { status: u32, output: String },

    #[error("command killed by signal {0}")]
    Signal(String),

    #[error("channel closed unexpectedly without exit status")]
    ChannelClosed,
}

impl CommandError {
    /// Exit status of the remote command, if it ran to completion.
    pub fn exit_status(&self) -> Option<u32> {
        match self {
            CommandError::NonZeroExit { status, .. } => Some(*status),
            _ => None,
        }
    }
}
