// ABOUTME: SSH-specific error types.
// ABOUTME: Covers credential resolution, dialing, handshakes, and relayed streams.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failure turning configured credentials into authentication methods.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("failed to load key from {path}: {reason}")]
    KeyFile { path: PathBuf, reason: String },

    #[error("failed to parse inline private key: {reason}")]
    InlineKey { reason: String },

    #[error("SSH agent not available at {path}: {reason}")]
    Agent { path: PathBuf, reason: String },
}

/// Which part of establishing a hop timed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectPhase {
    /// TCP dial, or opening the relayed stream through a proxy.
    Stream,
    /// SSH handshake and authentication.
    Handshake,
}

impl std::fmt::Display for ConnectPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectPhase::Stream => write!(f, "connect"),
            ConnectPhase::Handshake => write!(f, "handshake"),
        }
    }
}

/// Failure establishing a transport, at either hop.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("connection to {addr} failed: {source}")]
    Dial {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{phase} to {addr} timed out after {timeout:?}")]
    Timeout {
        addr: String,
        phase: ConnectPhase,
        timeout: Duration,
    },

    #[error("SSH handshake with {addr} failed: {reason}")]
    Handshake { addr: String, reason: String },

    #[error("authentication failed for {user}@{addr}: no valid credentials")]
    AuthenticationFailed { user: String, addr: String },

    #[error("failed to open relayed stream to {addr}: {reason}")]
    Stream { addr: String, reason: String },

    #[error("SSH protocol error: {0}")]
    Protocol(#[from] russh::Error),
}
