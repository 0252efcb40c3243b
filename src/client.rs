// ABOUTME: Client facade binding one SessionTarget to a Connector.
// ABOUTME: Every call dials fresh connections and tears them down before returning.

use crate::error::Result;
use crate::exec::{OutputMode, run_command};
use crate::ssh::{Connector, SessionTarget, SshConnector};
use crate::transfer::{self, TransferSummary};
use std::path::Path;

/// Runs commands and transfers files against one target.
///
/// No connection is kept between calls; concurrent calls each own their
/// transports.
#[derive(Debug)]
pub struct Client<C: Connector = SshConnector> {
    target: SessionTarget,
    connector: C,
}

impl Client<SshConnector> {
    /// A client that connects over TCP with russh.
    pub fn new(target: impl Into<SessionTarget>) -> Self {
        Self::with_connector(target, SshConnector::new())
    }
}

impl<C: Connector> Client<C> {
    pub fn with_connector(target: impl Into<SessionTarget>, connector: C) -> Self {
        Self {
            target: target.into(),
            connector,
        }
    }

    pub fn target(&self) -> &SessionTarget {
        &self.target
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Run `command` and return its stdout, post-processed with
    /// [`OutputMode::Auto`].
    pub async fn command(&self, command: &str) -> Result<String> {
        self.command_with(command, OutputMode::Auto).await
    }

    pub async fn command_with(&self, command: &str, mode: OutputMode) -> Result<String> {
        run_command(&self.connector, &self.target, command, mode).await
    }

    /// Download whatever `remote_src` matches into `local_dst`.
    pub async fn get(
        &self,
        remote_src: &str,
        local_dst: impl AsRef<Path>,
    ) -> Result<TransferSummary> {
        transfer::get(&self.connector, &self.target, remote_src, local_dst.as_ref()).await
    }

    /// Upload whatever `local_src` matches into `remote_dst`.
    pub async fn put(
        &self,
        local_src: &str,
        remote_dst: impl AsRef<Path>,
    ) -> Result<TransferSummary> {
        transfer::put(&self.connector, &self.target, local_src, remote_dst.as_ref()).await
    }
}
