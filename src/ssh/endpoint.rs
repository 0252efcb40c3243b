// ABOUTME: Endpoint and session target configuration for SSH connections.
// ABOUTME: Describes where to connect, who to be, and which credentials to offer.

use super::host_key::HostKeyPolicy;
use std::path::PathBuf;
use std::time::Duration;

/// Connection parameters for one SSH endpoint.
#[derive(Clone)]
pub struct EndpointConfig {
    /// Remote host to connect to.
    pub host: String,
    /// SSH port (default: 22).
    pub port: u16,
    /// Username for authentication.
    pub user: String,
    /// Password, offered first when set.
    pub password: Option<String>,
    /// Path to a private key file.
    pub key_file: Option<PathBuf>,
    /// Private key text (OpenSSH or PEM encoded).
    pub private_key: Option<String>,
    /// Passphrase used to decrypt `key_file` or `private_key`.
    pub key_passphrase: Option<String>,
    /// Path to an SSH agent unix socket.
    pub agent_socket: Option<PathBuf>,
    /// Bound on stream establishment and on the handshake.
    /// `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// How the server's host key is verified.
    pub host_key: HostKeyPolicy,
}

impl EndpointConfig {
    pub fn new(host: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: 22,
            user: user.into(),
            password: None,
            key_file: None,
            private_key: None,
            key_passphrase: None,
            agent_socket: None,
            timeout: None,
            host_key: HostKeyPolicy::default(),
        }
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn key_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.key_file = Some(path.into());
        self
    }

    pub fn private_key(mut self, key: impl Into<String>) -> Self {
        self.private_key = Some(key.into());
        self
    }

    pub fn key_passphrase(mut self, passphrase: impl Into<String>) -> Self {
        self.key_passphrase = Some(passphrase.into());
        self
    }

    pub fn agent_socket(mut self, path: impl Into<PathBuf>) -> Self {
        self.agent_socket = Some(path.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn host_key(mut self, policy: HostKeyPolicy) -> Self {
        self.host_key = policy;
        self
    }

    /// `host:port`, with IPv6 literals bracketed.
    pub fn addr(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

impl std::fmt::Debug for EndpointConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn redact<T>(value: &Option<T>) -> &'static str {
            if value.is_some() { "<redacted>" } else { "<none>" }
        }

        f.debug_struct("EndpointConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &redact(&self.password))
            .field("key_file", &self.key_file)
            .field("private_key", &redact(&self.private_key))
            .field("key_passphrase", &redact(&self.key_passphrase))
            .field("agent_socket", &self.agent_socket)
            .field("timeout", &self.timeout)
            .field("host_key", &self.host_key)
            .finish()
    }
}

/// A primary endpoint, optionally reached through a jump host.
///
/// The proxy's credentials and timeout only govern reaching the proxy. The
/// primary's govern the second handshake, which runs over a stream relayed
/// by the proxy.
#[derive(Debug, Clone)]
pub struct SessionTarget {
    pub primary: EndpointConfig,
    pub proxy: Option<EndpointConfig>,
}

impl SessionTarget {
    /// Connect straight to `primary`.
    pub fn direct(primary: EndpointConfig) -> Self {
        Self {
            primary,
            proxy: None,
        }
    }

    /// Reach the primary endpoint through `proxy`.
    pub fn via(mut self, proxy: EndpointConfig) -> Self {
        self.proxy = Some(proxy);
        self
    }

    pub fn is_proxied(&self) -> bool {
        self.proxy.is_some()
    }
}

impl From<EndpointConfig> for SessionTarget {
    fn from(primary: EndpointConfig) -> Self {
        Self::direct(primary)
    }
}
