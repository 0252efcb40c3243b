// ABOUTME: Credential resolution and authentication for SSH endpoints.
// ABOUTME: Builds the ordered list of auth methods and offers them during the handshake.

use super::endpoint::EndpointConfig;
use super::error::{ConnectError, CredentialError};
use russh::client::{self, Handle};
use russh::keys::agent::client::AgentClient;
use russh::keys::{PrivateKeyWithHashAlg, decode_secret_key, load_secret_key, ssh_key};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::UnixStream;

/// Kind of an authentication method, without its secret material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthKind {
    Password,
    KeyFile,
    InlineKey,
    Agent,
}

/// One way of proving identity to a server.
pub enum AuthMethod {
    Password(String),
    KeyFile {
        path: PathBuf,
        key: Arc<ssh_key::PrivateKey>,
    },
    InlineKey(Arc<ssh_key::PrivateKey>),
    Agent {
        socket: PathBuf,
        client: AgentClient<UnixStream>,
    },
}

impl AuthMethod {
    pub fn kind(&self) -> AuthKind {
        match self {
            AuthMethod::Password(_) => AuthKind::Password,
            AuthMethod::KeyFile { .. } => AuthKind::KeyFile,
            AuthMethod::InlineKey(_) => AuthKind::InlineKey,
            AuthMethod::Agent { .. } => AuthKind::Agent,
        }
    }
}

impl std::fmt::Debug for AuthMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthMethod::Password(_) => f.write_str("Password(<redacted>)"),
            AuthMethod::KeyFile { path, .. } => {
                f.debug_struct("KeyFile").field("path", path).finish()
            }
            AuthMethod::InlineKey(_) => f.write_str("InlineKey(<redacted>)"),
            AuthMethod::Agent { socket, .. } => {
                f.debug_struct("Agent").field("socket", socket).finish()
            }
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Resolve every configured credential into an auth method.
///
/// Order is fixed: password, key file, inline key, agent. Each configured
/// field contributes exactly one method. An empty list is not an error here;
/// the handshake will fail to authenticate instead.
pub async fn resolve_auth_methods(
    endpoint: &EndpointConfig,
) -> Result<Vec<AuthMethod>, CredentialError> {
    let mut methods = Vec::new();
    let passphrase = non_empty(&endpoint.key_passphrase);

    if let Some(password) = non_empty(&endpoint.password) {
        methods.push(AuthMethod::Password(password.to_string()));
    }

    if let Some(path) = endpoint
        .key_file
        .as_ref()
        .filter(|p| !p.as_os_str().is_empty())
    {
        let key = load_secret_key(path, passphrase).map_err(|e| CredentialError::KeyFile {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        methods.push(AuthMethod::KeyFile {
            path: path.clone(),
            key: Arc::new(key),
        });
    }

    if let Some(text) = non_empty(&endpoint.private_key) {
        let key = decode_secret_key(text, passphrase).map_err(|e| CredentialError::InlineKey {
            reason: e.to_string(),
        })?;
        methods.push(AuthMethod::InlineKey(Arc::new(key)));
    }

    if let Some(socket) = endpoint
        .agent_socket
        .as_ref()
        .filter(|p| !p.as_os_str().is_empty())
    {
        let client = AgentClient::connect_uds(socket)
            .await
            .map_err(|e| CredentialError::Agent {
                path: socket.clone(),
                reason: e.to_string(),
            })?;
        methods.push(AuthMethod::Agent {
            socket: socket.clone(),
            client,
        });
    }

    tracing::debug!(
        "resolved {} auth method(s) for {}@{}",
        methods.len(),
        endpoint.user,
        endpoint.addr()
    );
    Ok(methods)
}

/// Offer `methods` in order until the server accepts one.
pub(crate) async fn authenticate<H>(
    session: &mut Handle<H>,
    user: &str,
    methods: Vec<AuthMethod>,
) -> Result<bool, ConnectError>
where
    H: client::Handler,
{
    for method in methods {
        let kind = method.kind();
        let accepted = match method {
            AuthMethod::Password(password) => session
                .authenticate_password(user, password)
                .await?
                .success(),
            AuthMethod::KeyFile { key, .. } | AuthMethod::InlineKey(key) => {
                let hash_alg = session.best_supported_rsa_hash().await?.flatten();
                session
                    .authenticate_publickey(user, PrivateKeyWithHashAlg::new(key, hash_alg))
                    .await?
                    .success()
            }
            AuthMethod::Agent { socket, mut client } => {
                authenticate_with_agent(session, user, &socket, &mut client).await
            }
        };

        if accepted {
            tracing::debug!("authenticated {} with {:?}", user, kind);
            return Ok(true);
        }
        tracing::debug!("{:?} authentication rejected for {}", kind, user);
    }
    Ok(false)
}

async fn authenticate_with_agent<H>(
    session: &mut Handle<H>,
    user: &str,
    socket: &std::path::Path,
    agent: &mut AgentClient<UnixStream>,
) -> bool
where
    H: client::Handler,
{
    let keys = match agent.request_identities().await {
        Ok(keys) => keys,
        Err(e) => {
            tracing::debug!("failed to list agent keys from {:?}: {}", socket, e);
            return false;
        }
    };

    for key in &keys {
        match session
            .authenticate_publickey_with(user, key.clone(), None, agent)
            .await
        {
            Ok(result) if result.success() => return true,
            _ => continue,
        }
    }
    false
}
