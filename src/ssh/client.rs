// ABOUTME: russh-backed connector and transport.
// ABOUTME: Dials TCP, runs handshakes over arbitrary streams, and opens sessions.

use super::auth::{AuthMethod, authenticate};
use super::endpoint::EndpointConfig;
use super::error::ConnectError;
use super::host_key::HostKeyPolicy;
use super::transport::{BoxedStream, Connector, Transport};
use crate::exec::{CommandError, ExecOutput, PtyRequest};
use crate::transfer::{FileSystem, SftpFs, TransferError};
use async_trait::async_trait;
use russh::client::{self, Config, Handle};
use russh::keys::ssh_key;
use russh::{ChannelMsg, Disconnect};
use russh_sftp::client::SftpSession;
use std::sync::Arc;
use tokio::net::TcpStream;

/// SSH client handler for russh.
pub(crate) struct SshHandler {
    host: String,
    port: u16,
    host_key: HostKeyPolicy,
}

impl SshHandler {
    fn new(host: String, port: u16, host_key: HostKeyPolicy) -> Self {
        Self {
            host,
            port,
            host_key,
        }
    }
}

impl client::Handler for SshHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &ssh_key::PublicKey,
    ) -> std::result::Result<bool, Self::Error> {
        Ok(self
            .host_key
            .verify(&self.host, self.port, server_public_key))
    }
}

/// Connector that speaks SSH through russh.
#[derive(Clone)]
pub struct SshConnector {
    config: Arc<Config>,
}

impl SshConnector {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Use a custom russh client configuration (ciphers, keepalives, ...).
    pub fn with_config(config: Config) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

impl Default for SshConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SshConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SshConnector")
            .field("config", &"<russh::client::Config>")
            .finish()
    }
}

#[async_trait]
impl Connector for SshConnector {
    type Transport = SshTransport;

    async fn dial(&self, endpoint: &EndpointConfig) -> Result<BoxedStream, ConnectError> {
        let stream = TcpStream::connect((endpoint.host.as_str(), endpoint.port))
            .await
            .map_err(|source| ConnectError::Dial {
                addr: endpoint.addr(),
                source,
            })?;
        stream.set_nodelay(true).ok();
        Ok(Box::new(stream))
    }

    async fn handshake(
        &self,
        stream: BoxedStream,
        endpoint: &EndpointConfig,
        methods: Vec<AuthMethod>,
    ) -> Result<SshTransport, ConnectError> {
        let addr = endpoint.addr();
        let handler = SshHandler::new(
            endpoint.host.clone(),
            endpoint.port,
            endpoint.host_key.clone(),
        );

        let mut handle = client::connect_stream(Arc::clone(&self.config), stream, handler)
            .await
            .map_err(|e| ConnectError::Handshake {
                addr: addr.clone(),
                reason: e.to_string(),
            })?;

        if !authenticate(&mut handle, &endpoint.user, methods).await? {
            let _ = handle
                .disconnect(Disconnect::ByApplication, "", "en")
                .await;
            return Err(ConnectError::AuthenticationFailed {
                user: endpoint.user.clone(),
                addr,
            });
        }

        Ok(SshTransport { addr, handle })
    }
}

/// An authenticated russh connection.
pub struct SshTransport {
    addr: String,
    handle: Handle<SshHandler>,
}

impl std::fmt::Debug for SshTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SshTransport")
            .field("addr", &self.addr)
            .field("handle", &"<russh::Handle>")
            .finish()
    }
}

#[async_trait]
impl Transport for SshTransport {
    async fn open_stream(&self, host: &str, port: u16) -> Result<BoxedStream, ConnectError> {
        let channel = self
            .handle
            .channel_open_direct_tcpip(host, u32::from(port), "127.0.0.1", 0)
            .await
            .map_err(|e| ConnectError::Stream {
                addr: format!("{}:{}", host, port),
                reason: e.to_string(),
            })?;
        Ok(Box::new(channel.into_stream()))
    }

    async fn exec(&self, command: &str, pty: &PtyRequest) -> Result<ExecOutput, CommandError> {
        let mut channel = self
            .handle
            .channel_open_session()
            .await
            .map_err(|e| CommandError::Session(e.to_string()))?;

        channel
            .request_pty(true, &pty.term, pty.cols, pty.rows, 0, 0, &pty.modes)
            .await
            .map_err(|e| CommandError::Pty(e.to_string()))?;

        channel
            .exec(true, command)
            .await
            .map_err(|e| CommandError::Exec(e.to_string()))?;

        let mut stdout = Vec::new();
        let mut exit_status = None;
        let mut signal = None;
        let mut got_eof = false;
        // Replies arrive in request order: pty first, then exec.
        let mut replies = 0u8;

        loop {
            match channel.wait().await {
                Some(ChannelMsg::Data { data }) => {
                    stdout.extend_from_slice(&data);
                }
                Some(ChannelMsg::Success) => {
                    replies += 1;
                }
                Some(ChannelMsg::Failure) => {
                    return Err(if replies == 0 {
                        CommandError::Pty("server refused pseudo-terminal".to_string())
                    } else {
                        CommandError::Exec("server refused command".to_string())
                    });
                }
                Some(ChannelMsg::ExitStatus { exit_status: status }) => {
                    exit_status = Some(status);
                    if got_eof {
                        break;
                    }
                }
                Some(ChannelMsg::ExitSignal { signal_name, .. }) => {
                    signal = Some(format!("{:?}", signal_name));
                }
                Some(ChannelMsg::Eof) => {
                    got_eof = true;
                    if exit_status.is_some() {
                        break;
                    }
                }
                Some(ChannelMsg::Close) => break,
                Some(_) => {}
                None => break,
            }
        }

        let _ = channel.close().await;

        if let Some(signal) = signal {
            return Err(CommandError::Signal(signal));
        }
        let Some(exit_status) = exit_status else {
            return Err(CommandError::ChannelClosed);
        };

        Ok(ExecOutput {
            stdout,
            exit_status,
        })
    }

    async fn open_sftp(&self) -> Result<Box<dyn FileSystem>, TransferError> {
        let channel = self
            .handle
            .channel_open_session()
            .await
            .map_err(|e| TransferError::Session(e.to_string()))?;

        channel
            .request_subsystem(true, "sftp")
            .await
            .map_err(|e| TransferError::Session(e.to_string()))?;

        let sftp = SftpSession::new(channel.into_stream())
            .await
            .map_err(|e| TransferError::Session(e.to_string()))?;

        tracing::debug!("SFTP session ready on {}", self.addr);
        Ok(Box::new(SftpFs::new(sftp)))
    }

    async fn close(&self) -> Result<(), ConnectError> {
        tracing::debug!("disconnecting from {}", self.addr);
        self.handle
            .disconnect(Disconnect::ByApplication, "", "en")
            .await?;
        Ok(())
    }
}
