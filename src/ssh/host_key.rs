// ABOUTME: Host key verification policies for SSH endpoints.
// ABOUTME: Supports accept-any, known_hosts with optional TOFU, and pinned fingerprints.

use russh::keys::known_hosts::{
    check_known_hosts, check_known_hosts_path, learn_known_hosts, learn_known_hosts_path,
};
use russh::keys::ssh_key::{self, HashAlg};
use serde::Deserialize;
use std::path::PathBuf;

/// How a server's host key is checked during the handshake.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum HostKeyPolicy {
    /// Accept any key without checking. Vulnerable to man-in-the-middle.
    AcceptAny,
    /// Check against a known_hosts file.
    /// If `path` is None, uses the default ~/.ssh/known_hosts.
    KnownHosts {
        #[serde(default)]
        path: Option<PathBuf>,
        /// Accept and record keys of hosts not yet in the file.
        #[serde(default = "default_trust_on_first_use")]
        trust_on_first_use: bool,
    },
    /// Accept only keys whose SHA256 fingerprint is listed.
    Fingerprints { fingerprints: Vec<String> },
}

fn default_trust_on_first_use() -> bool {
    true
}

impl Default for HostKeyPolicy {
    fn default() -> Self {
        HostKeyPolicy::KnownHosts {
            path: None,
            trust_on_first_use: default_trust_on_first_use(),
        }
    }
}

impl HostKeyPolicy {
    /// Decide whether `key`, presented by `host:port`, is acceptable.
    pub fn verify(&self, host: &str, port: u16, key: &ssh_key::PublicKey) -> bool {
        match self {
            HostKeyPolicy::AcceptAny => {
                tracing::warn!(
                    "host key checking disabled: accepting key for {}:{}",
                    host,
                    port
                );
                true
            }
            HostKeyPolicy::KnownHosts {
                path,
                trust_on_first_use,
            } => verify_known_hosts(host, port, key, path.as_ref(), *trust_on_first_use),
            HostKeyPolicy::Fingerprints { fingerprints } => {
                let presented = key.fingerprint(HashAlg::Sha256).to_string();
                let presented = strip_hash_prefix(&presented);
                let pinned = fingerprints
                    .iter()
                    .any(|f| strip_hash_prefix(f.trim()) == presented);
                if !pinned {
                    tracing::warn!(
                        "host key for {}:{} has unpinned fingerprint SHA256:{}",
                        host,
                        port,
                        presented
                    );
                }
                pinned
            }
        }
    }
}

fn strip_hash_prefix(fingerprint: &str) -> &str {
    fingerprint.strip_prefix("SHA256:").unwrap_or(fingerprint)
}

fn verify_known_hosts(
    host: &str,
    port: u16,
    key: &ssh_key::PublicKey,
    path: Option<&PathBuf>,
    trust_on_first_use: bool,
) -> bool {
    let check_result = match path {
        Some(path) => check_known_hosts_path(host, port, key, path),
        None => check_known_hosts(host, port, key),
    };

    match check_result {
        Ok(true) => true,
        Err(russh::keys::Error::KeyChanged { .. }) => {
            tracing::warn!(
                "host key for {}:{} does not match known_hosts",
                host,
                port
            );
            false
        }
        // Host not in known_hosts, or the file could not be read
        Ok(false) | Err(_) => {
            if !trust_on_first_use {
                return false;
            }
            tracing::warn!(
                "Trust-On-First-Use: accepting unknown host key for {}:{}",
                host,
                port
            );
            let learn_result = match path {
                Some(path) => learn_known_hosts_path(host, port, key, path),
                None => learn_known_hosts(host, port, key),
            };
            if let Err(e) = learn_result {
                tracing::warn!("Failed to save host key to known_hosts: {}", e);
            }
            true
        }
    }
}
