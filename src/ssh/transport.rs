// ABOUTME: Transport capability traits and the connection builder.
// ABOUTME: Establishes direct or proxy-jump connections from a SessionTarget.

use super::auth::{AuthMethod, resolve_auth_methods};
use super::endpoint::{EndpointConfig, SessionTarget};
use super::error::{ConnectError, ConnectPhase};
use crate::error::Error;
use crate::exec::{CommandError, ExecOutput, PtyRequest};
use crate::transfer::{FileSystem, TransferError};
use async_trait::async_trait;
use std::future::Future;
use std::ops::Deref;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};

/// A byte stream an SSH handshake can run over.
pub trait ByteStream: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T> ByteStream for T where T: AsyncRead + AsyncWrite + Unpin + Send {}

pub type BoxedStream = Box<dyn ByteStream>;

/// An authenticated, multiplexed connection to one host.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Open a raw TCP stream from the remote host to `host:port`.
    async fn open_stream(&self, host: &str, port: u16) -> Result<BoxedStream, ConnectError>;

    /// Run one command in a fresh session with a pseudo-terminal.
    async fn exec(&self, command: &str, pty: &PtyRequest) -> Result<ExecOutput, CommandError>;

    /// Start the SFTP subsystem in a fresh session.
    async fn open_sftp(&self) -> Result<Box<dyn FileSystem>, TransferError>;

    /// Tear the connection down.
    async fn close(&self) -> Result<(), ConnectError>;
}

/// Produces transports: dials endpoints and runs handshakes over streams.
#[async_trait]
pub trait Connector: Send + Sync {
    type Transport: Transport;

    /// Open a TCP stream to the endpoint.
    async fn dial(&self, endpoint: &EndpointConfig) -> Result<BoxedStream, ConnectError>;

    /// Run an SSH handshake over `stream` and authenticate with `methods`.
    async fn handshake(
        &self,
        stream: BoxedStream,
        endpoint: &EndpointConfig,
        methods: Vec<AuthMethod>,
    ) -> Result<Self::Transport, ConnectError>;
}

/// A transport to the primary host, plus the proxy transport it rides on.
pub struct Connection<T: Transport> {
    transport: T,
    proxy: Option<T>,
}

impl<T: Transport> Connection<T> {
    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn proxy(&self) -> Option<&T> {
        self.proxy.as_ref()
    }

    pub fn is_proxied(&self) -> bool {
        self.proxy.is_some()
    }

    /// Close the primary transport, then the proxy.
    ///
    /// Teardown failures are logged, not returned.
    pub async fn close(self) {
        if let Err(e) = self.transport.close().await {
            tracing::warn!("failed to close transport: {}", e);
        }
        if let Some(proxy) = self.proxy {
            if let Err(e) = proxy.close().await {
                tracing::warn!("failed to close proxy transport: {}", e);
            }
        }
    }
}

impl<T: Transport> Deref for Connection<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.transport
    }
}

/// Establish a connection to `target`, through its proxy when one is set.
///
/// Anything established before a failure is closed before the error is
/// returned.
pub async fn connect<C>(connector: &C, target: &SessionTarget) -> Result<Connection<C::Transport>, Error>
where
    C: Connector,
{
    let Some(proxy_endpoint) = &target.proxy else {
        let transport = hop(connector, &target.primary, None).await?;
        return Ok(Connection {
            transport,
            proxy: None,
        });
    };

    let proxy = hop(connector, proxy_endpoint, None).await?;
    match hop(connector, &target.primary, Some(&proxy)).await {
        Ok(transport) => Ok(Connection {
            transport,
            proxy: Some(proxy),
        }),
        Err(e) => {
            if let Err(close_err) = proxy.close().await {
                tracing::warn!("failed to close proxy transport: {}", close_err);
            }
            Err(e)
        }
    }
}

/// Reach one endpoint: over TCP, or over a stream relayed by `via`.
async fn hop<C>(
    connector: &C,
    endpoint: &EndpointConfig,
    via: Option<&C::Transport>,
) -> Result<C::Transport, Error>
where
    C: Connector,
{
    let methods = resolve_auth_methods(endpoint).await?;
    let addr = endpoint.addr();

    let stream = within(endpoint.timeout, &addr, ConnectPhase::Stream, async {
        match via {
            Some(proxy) => {
                tracing::debug!("opening relayed stream to {}", addr);
                proxy.open_stream(&endpoint.host, endpoint.port).await
            }
            None => {
                tracing::debug!("dialing {}", addr);
                connector.dial(endpoint).await
            }
        }
    })
    .await?;

    let transport = within(
        endpoint.timeout,
        &addr,
        ConnectPhase::Handshake,
        connector.handshake(stream, endpoint, methods),
    )
    .await?;

    tracing::info!(
        "connected to {}@{}{}",
        endpoint.user,
        addr,
        if via.is_some() { " via proxy" } else { "" }
    );
    Ok(transport)
}

async fn within<T, F>(
    timeout: Option<Duration>,
    addr: &str,
    phase: ConnectPhase,
    fut: F,
) -> Result<T, ConnectError>
where
    F: Future<Output = Result<T, ConnectError>>,
{
    match timeout {
        None => fut.await,
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| ConnectError::Timeout {
                addr: addr.to_string(),
                phase,
                timeout: limit,
            })?,
    }
}
