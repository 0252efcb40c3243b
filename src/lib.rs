// ABOUTME: Library root for skiff - SSH command execution and recursive file transfer.
// ABOUTME: The CLI binary is in main.rs.

pub mod client;
pub mod config;
pub mod error;
pub mod exec;
pub mod ssh;
pub mod transfer;

pub use client::Client;
pub use error::{Error, ErrorKind, Result};
pub use exec::OutputMode;
pub use ssh::{EndpointConfig, HostKeyPolicy, SessionTarget};
pub use transfer::TransferSummary;
