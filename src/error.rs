// ABOUTME: Crate-level error with SNAFU pattern.
// ABOUTME: Unifies credential, connection, command, transfer, and config failures.

use snafu::Snafu;

use crate::config::ConfigError;
use crate::exec::CommandError;
use crate::ssh::{ConnectError, CredentialError};
use crate::transfer::TransferError;

/// Any failure a skiff operation can report.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("credential error: {source}"))]
    Credential { source: CredentialError },

    #[snafu(display("connection failed: {source}"))]
    Connect { source: ConnectError },

    #[snafu(display("command failed: {source}"))]
    Command { source: CommandError },

    #[snafu(display("transfer failed: {source}"))]
    Transfer { source: TransferError },

    #[snafu(display("configuration error: {source}"))]
    Config { source: ConfigError },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Authentication material could not be loaded.
    Credential,
    /// Dial, handshake, timeout, or authentication failure.
    Connect,
    /// The remote command could not run or exited unsuccessfully.
    Command,
    /// A transfer source matched nothing.
    NotFound,
    /// A transfer failed after it started.
    Transfer,
    Config,
}

impl Error {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Credential { .. } => ErrorKind::Credential,
            Error::Connect { .. } => ErrorKind::Connect,
            Error::Command { .. } => ErrorKind::Command,
            Error::Transfer {
                source: TransferError::NotFound { .. },
            } => ErrorKind::NotFound,
            Error::Transfer { .. } => ErrorKind::Transfer,
            Error::Config { .. } => ErrorKind::Config,
        }
    }

    /// The remote exit status, if a command ran and failed.
    pub fn exit_status(&self) -> Option<u32> {
        match self {
            Error::Command { source } => source.exit_status(),
            _ => None,
        }
    }

    /// The underlying I/O error of a failed transfer.
    pub fn io_error(&self) -> Option<&std::io::Error> {
        match self {
            Error::Transfer { source } => source.io_error(),
            _ => None,
        }
    }
}

impl From<CredentialError> for Error {
    fn from(source: CredentialError) -> Self {
        Error::Credential { source }
    }
}

impl From<ConnectError> for Error {
    fn from(source: ConnectError) -> Self {
        Error::Connect { source }
    }
}

impl From<CommandError> for Error {
    fn from(source: CommandError) -> Self {
        Error::Command { source }
    }
}

impl From<TransferError> for Error {
    fn from(source: TransferError) -> Self {
        Error::Transfer { source }
    }
}

impl From<ConfigError> for Error {
    fn from(source: ConfigError) -> Self {
        Error::Config { source }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
