// ABOUTME: Mock Connector and Transport that record every call in an event log.
// ABOUTME: Lets tests count dials and handshakes and inject failures per host.

use super::memory_fs::MemoryFs;
use async_trait::async_trait;
use parking_lot::Mutex;
use skiff::exec::{CommandError, ExecOutput, PtyRequest};
use skiff::ssh::{AuthKind, AuthMethod, BoxedStream, ConnectError, Connector, EndpointConfig, Transport};
use skiff::transfer::{FileSystem, TransferError};
use std::collections::HashSet;
use std::io;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Dial { host: String },
    Relay { via: String, host: String, port: u16 },
    Handshake { host: String, user: String, methods: Vec<AuthKind> },
    Established { host: String },
    Exec { host: String, command: String, term: String },
    OpenSftp { host: String },
    Close { host: String },
}

/// What the mock transport answers to `exec`.
#[derive(Debug, Clone)]
pub enum ExecReply {
    Output { stdout: String, status: u32 },
    Signal(String),
    Closed,
}

#[derive(Debug, Default)]
struct Behavior {
    fail_dial: HashSet<String>,
    stall_dial: HashSet<String>,
    stall_relay: HashSet<String>,
    fail_handshake: HashSet<String>,
    stall_handshake: HashSet<String>,
    fail_sftp: bool,
}

#[derive(Clone)]
pub struct MockConnector {
    events: Arc<Mutex<Vec<Event>>>,
    behavior: Arc<Mutex<Behavior>>,
    reply: Arc<Mutex<ExecReply>>,
    remote: MemoryFs,
}

impl Default for MockConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl MockConnector {
    pub fn new() -> Self {
        Self {
            events: Arc::default(),
            behavior: Arc::default(),
            reply: Arc::new(Mutex::new(ExecReply::Output {
                stdout: String::new(),
                status: 0,
            })),
            remote: MemoryFs::new(),
        }
    }

    /// Serve `remote` as the SFTP filesystem of every transport.
    pub fn with_remote(mut self, remote: MemoryFs) -> Self {
        self.remote = remote;
        self
    }

    pub fn reply(&self, reply: ExecReply) -> &Self {
        *self.reply.lock() = reply;
        self
    }

    pub fn reply_stdout(&self, stdout: &str) -> &Self {
        self.reply(ExecReply::Output {
            stdout: stdout.to_string(),
            status: 0,
        })
    }

    pub fn fail_dial(&self, host: &str) -> &Self {
        self.behavior.lock().fail_dial.insert(host.to_string());
        self
    }

    /// Dialing `host` never completes.
    pub fn stall_dial(&self, host: &str) -> &Self {
        self.behavior.lock().stall_dial.insert(host.to_string());
        self
    }

    /// Relaying a stream to `host` through any proxy never completes.
    pub fn stall_relay(&self, host: &str) -> &Self {
        self.behavior.lock().stall_relay.insert(host.to_string());
        self
    }

    /// The handshake with `host` never completes.
    pub fn stall_handshake(&self, host: &str) -> &Self {
        self.behavior.lock().stall_handshake.insert(host.to_string());
        self
    }

    pub fn fail_handshake(&self, host: &str) -> &Self {
        self.behavior.lock().fail_handshake.insert(host.to_string());
        self
    }

    pub fn fail_sftp(&self) -> &Self {
        self.behavior.lock().fail_sftp = true;
        self
    }

    pub fn remote(&self) -> &MemoryFs {
        &self.remote
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    pub fn dials(&self) -> usize {
        self.count(|e| matches!(e, Event::Dial { .. } | Event::Relay { .. }))
    }

    pub fn handshakes(&self) -> usize {
        self.count(|e| matches!(e, Event::Handshake { .. }))
    }

    pub fn closes(&self) -> usize {
        self.count(|e| matches!(e, Event::Close { .. }))
    }

    /// Transports established and not yet closed.
    pub fn open_transports(&self) -> usize {
        self.count(|e| matches!(e, Event::Established { .. })) - self.closes()
    }

    fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.events.lock().iter().filter(|e| pred(e)).count()
    }

    fn record(&self, event: Event) {
        self.events.lock().push(event);
    }
}

fn stream() -> BoxedStream {
    let (local, _remote) = tokio::io::duplex(64);
    Box::new(local)
}

#[async_trait]
impl Connector for MockConnector {
    type Transport = MockTransport;

    async fn dial(&self, endpoint: &EndpointConfig) -> Result<BoxedStream, ConnectError> {
        self.record(Event::Dial {
            host: endpoint.host.clone(),
        });

        let (fail, stall) = {
            let behavior = self.behavior.lock();
            (
                behavior.fail_dial.contains(&endpoint.host),
                behavior.stall_dial.contains(&endpoint.host),
            )
        };
        if stall {
            std::future::pending::<()>().await;
        }
        if fail {
            return Err(ConnectError::Dial {
                addr: endpoint.addr(),
                source: io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused"),
            });
        }
        Ok(stream())
    }

    async fn handshake(
        &self,
        _stream: BoxedStream,
        endpoint: &EndpointConfig,
        methods: Vec<AuthMethod>,
    ) -> Result<MockTransport, ConnectError> {
        self.record(Event::Handshake {
            host: endpoint.host.clone(),
            user: endpoint.user.clone(),
            methods: methods.iter().map(AuthMethod::kind).collect(),
        });

        let (fail, stall) = {
            let behavior = self.behavior.lock();
            (
                behavior.fail_handshake.contains(&endpoint.host),
                behavior.stall_handshake.contains(&endpoint.host),
            )
        };
        if stall {
            std::future::pending::<()>().await;
        }
        if fail {
            return Err(ConnectError::AuthenticationFailed {
                user: endpoint.user.clone(),
                addr: endpoint.addr(),
            });
        }

        self.record(Event::Established {
            host: endpoint.host.clone(),
        });
        Ok(MockTransport {
            host: endpoint.host.clone(),
            connector: self.clone(),
        })
    }
}

pub struct MockTransport {
    host: String,
    connector: MockConnector,
}

#[async_trait]
impl Transport for MockTransport {
    async fn open_stream(&self, host: &str, port: u16) -> Result<BoxedStream, ConnectError> {
        self.connector.record(Event::Relay {
            via: self.host.clone(),
            host: host.to_string(),
            port,
        });
        let stall = self.connector.behavior.lock().stall_relay.contains(host);
        if stall {
            std::future::pending::<()>().await;
        }
        Ok(stream())
    }

    async fn exec(&self, command: &str, pty: &PtyRequest) -> Result<ExecOutput, CommandError> {
        self.connector.record(Event::Exec {
            host: self.host.clone(),
            command: command.to_string(),
            term: pty.term.clone(),
        });

        let reply = self.connector.reply.lock().clone();
        match reply {
            ExecReply::Output { stdout, status } => Ok(ExecOutput {
                stdout: stdout.into_bytes(),
                exit_status: status,
            }),
            ExecReply::Signal(signal) => Err(CommandError::Signal(signal)),
            ExecReply::Closed => Err(CommandError::ChannelClosed),
        }
    }

    async fn open_sftp(&self) -> Result<Box<dyn FileSystem>, TransferError> {
        self.connector.record(Event::OpenSftp {
            host: self.host.clone(),
        });
        if self.connector.behavior.lock().fail_sftp {
            return Err(TransferError::Session("subsystem request failed".to_string()));
        }
        Ok(Box::new(self.connector.remote.clone()))
    }

    async fn close(&self) -> Result<(), ConnectError> {
        self.connector.record(Event::Close {
            host: self.host.clone(),
        });
        Ok(())
    }
}
