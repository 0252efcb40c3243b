// ABOUTME: SSH client module: credentials, host keys, and connection building.
// ABOUTME: Supports direct connections and jump hosts with independent handshakes.

mod auth;
mod client;
mod endpoint;
mod error;
mod host_key;
mod transport;

pub use auth::{AuthKind, AuthMethod, resolve_auth_methods};
pub use client::{SshConnector, SshTransport};
pub use endpoint::{EndpointConfig, SessionTarget};
pub use error::{ConnectError, ConnectPhase, CredentialError};
pub use host_key::HostKeyPolicy;
pub use transport::{BoxedStream, ByteStream, Connection, Connector, Transport, connect};
