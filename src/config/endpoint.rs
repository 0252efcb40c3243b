// ABOUTME: Endpoint entries as written in the config file.
// ABOUTME: Resolves addresses, user fallbacks, and env-backed secrets into EndpointConfig.

use super::address::Address;
use super::env_value::{EnvValue, resolve_optional};
use super::error::ConfigError;
use crate::ssh::{EndpointConfig, HostKeyPolicy};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 22;
const FALLBACK_USER: &str = "root";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EndpointSpec {
    /// `[user@]host[:port]`
    pub host: String,
    /// Wins over a port embedded in `host`.
    #[serde(default)]
    pub port: Option<u16>,
    /// Wins over a user embedded in `host`.
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<EnvValue>,
    #[serde(default)]
    pub key_file: Option<PathBuf>,
    #[serde(default)]
    pub private_key: Option<EnvValue>,
    #[serde(default)]
    pub key_passphrase: Option<EnvValue>,
    #[serde(default)]
    pub agent_socket: Option<EnvValue>,
    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,
    #[serde(default)]
    pub host_key: HostKeyPolicy,
}

impl EndpointSpec {
    /// An entry with only an address, everything else defaulted.
    pub fn parse(s: &str) -> Result<Self, String> {
        Address::parse(s)?;
        Ok(EndpointSpec {
            host: s.trim().to_string(),
            port: None,
            user: None,
            password: None,
            key_file: None,
            private_key: None,
            key_passphrase: None,
            agent_socket: None,
            timeout: None,
            host_key: HostKeyPolicy::default(),
        })
    }

    pub fn address(&self) -> Result<Address, ConfigError> {
        Address::parse(&self.host)
            .map_err(|e| ConfigError::InvalidConfig(format!("{}: {}", self.host, e)))
    }

    /// Turn the entry into connection parameters, reading env-backed values.
    pub fn resolve(&self) -> Result<EndpointConfig, ConfigError> {
        let address = self.address()?;

        let user = self
            .user
            .clone()
            .or(address.user)
            .or_else(|| std::env::var("USER").ok().filter(|u| !u.is_empty()))
            .unwrap_or_else(|| FALLBACK_USER.to_string());
        let port = self.port.or(address.port).unwrap_or(DEFAULT_PORT);

        Ok(EndpointConfig {
            host: address.host,
            port,
            user,
            password: resolve_optional(self.password.as_ref())?,
            key_file: self.key_file.as_deref().map(expand_home),
            private_key: resolve_optional(self.private_key.as_ref())?,
            key_passphrase: resolve_optional(self.key_passphrase.as_ref())?,
            agent_socket: resolve_optional(self.agent_socket.as_ref())?
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
            timeout: self.timeout,
            host_key: self.host_key.clone(),
        })
    }
}

/// Expand a leading `~/` to the home directory.
fn expand_home(path: &std::path::Path) -> PathBuf {
    match (path.strip_prefix("~"), std::env::var_os("HOME")) {
        (Ok(rest), Some(home)) => PathBuf::from(home).join(rest),
        _ => path.to_path_buf(),
    }
}

/// Endpoint entries may be a bare address string or a full mapping.
pub(super) fn deserialize_endpoint<'de, D>(deserializer: D) -> Result<EndpointSpec, D::Error>
where
    D: serde::Deserializer<'de>,
{
    EndpointEntry::deserialize(deserializer)?
        .into_spec()
        .map_err(serde::de::Error::custom)
}

pub(super) fn deserialize_endpoint_option<'de, D>(
    deserializer: D,
) -> Result<Option<EndpointSpec>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<EndpointEntry>::deserialize(deserializer)?
        .map(EndpointEntry::into_spec)
        .transpose()
        .map_err(serde::de::Error::custom)
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EndpointEntry {
    Simple(String),
    Detailed(EndpointSpec),
}

impl EndpointEntry {
    fn into_spec(self) -> Result<EndpointSpec, String> {
        match self {
            EndpointEntry::Simple(s) => EndpointSpec::parse(&s),
            EndpointEntry::Detailed(spec) => {
                Address::parse(&spec.host)?;
                Ok(spec)
            }
        }
    }
}
