// ABOUTME: Remote command execution over a pseudo-terminal.
// ABOUTME: Connects, runs one command, captures stdout, and normalizes it.

mod error;
mod normalize;

pub use error::CommandError;
pub use normalize::{OutputMode, is_short_listing, normalize_output};

use crate::error::Error;
use crate::ssh::{Connector, SessionTarget, Transport, connect};
use russh::Pty;

/// Pseudo-terminal requested for every command.
///
/// Some commands (sudo prompts, for one) behave differently without a
/// controlling terminal.
#[derive(Debug, Clone)]
pub struct PtyRequest {
    pub term: String,
    pub cols: u32,
    pub rows: u32,
    pub modes: Vec<(Pty, u32)>,
}

impl Default for PtyRequest {
    fn default() -> Self {
        Self {
            term: "xterm".to_string(),
            cols: 80,
            rows: 40,
            modes: vec![
                (Pty::ECHO, 53),
                (Pty::TTY_OP_ISPEED, 14400),
                (Pty::TTY_OP_OSPEED, 14400),
            ],
        }
    }
}

/// What a transport captured from one command.
#[derive(Debug, Clone, Default)]
pub struct ExecOutput {
    /// Everything written to the session's stdout.
    pub stdout: Vec<u8>,
    pub exit_status: u32,
}

impl ExecOutput {
    pub fn success(&self) -> bool {
        self.exit_status == 0
    }
}

/// Connect to `target`, run `command`, and return its normalized stdout.
///
/// The connection is closed whether or not the command succeeds.
pub async fn run_command<C>(
    connector: &C,
    target: &SessionTarget,
    command: &str,
    mode: OutputMode,
) -> Result<String, Error>
where
    C: Connector,
{
    let connection = connect(connector, target).await?;
    let result = run_on(connection.transport(), command, mode).await;
    connection.close().await;
    Ok(result?)
}

/// Run `command` on an established transport.
pub async fn run_on<T>(transport: &T, command: &str, mode: OutputMode) -> Result<String, CommandError>
where
    T: Transport + ?Sized,
{
    tracing::debug!("executing: {}", command);
    let output = transport.exec(command, &PtyRequest::default()).await?;
    let stdout = String::from_utf8_lossy(&output.stdout);

    if !output.success() {
        return Err(CommandError::NonZeroExit {
            status: output.exit_status,
            output: stdout.into_owned(),
        });
    }

    Ok(normalize_output(command, &stdout, mode))
}
