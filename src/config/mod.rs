// ABOUTME: Configuration types and parsing for skiff.yml.
// ABOUTME: Handles YAML parsing, env var interpolation, and destination overrides.

mod address;
mod endpoint;
mod env_value;
mod error;
mod init;

pub use address::Address;
pub use endpoint::{DEFAULT_PORT, EndpointSpec};
pub use env_value::EnvValue;
pub use error::ConfigError;
pub use init::init_config;

use crate::ssh::SessionTarget;
use endpoint::{deserialize_endpoint, deserialize_endpoint_option};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = "skiff.yml";
pub const CONFIG_FILENAME_ALT: &str = "skiff.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".skiff/config.yml";

type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(deserialize_with = "deserialize_endpoint")]
    pub target: EndpointSpec,

    #[serde(default, deserialize_with = "deserialize_endpoint_option")]
    pub proxy: Option<EndpointSpec>,

    #[serde(default)]
    pub destinations: HashMap<String, Destination>,
}

/// Named override of the target and/or proxy.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Destination {
    #[serde(default, deserialize_with = "deserialize_endpoint_option")]
    pub target: Option<EndpointSpec>,

    #[serde(default, deserialize_with = "deserialize_endpoint_option")]
    pub proxy: Option<EndpointSpec>,
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(ConfigError::from)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// The first config file found in `dir`.
    pub fn find(dir: &Path) -> Option<PathBuf> {
        [CONFIG_FILENAME, CONFIG_FILENAME_ALT, CONFIG_FILENAME_DIR]
            .into_iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        match Self::find(dir) {
            Some(path) => Self::load(&path),
            None => Err(ConfigError::ConfigNotFound(dir.to_path_buf())),
        }
    }

    /// Apply the overrides of destination `name`.
    pub fn for_destination(&self, name: &str) -> Result<Config> {
        let dest = self
            .destinations
            .get(name)
            .ok_or_else(|| ConfigError::UnknownDestination(name.to_string()))?;

        let mut merged = self.clone();

        if let Some(ref target) = dest.target {
            merged.target = target.clone();
        }

        if dest.proxy.is_some() {
            merged.proxy = dest.proxy.clone();
        }

        Ok(merged)
    }

    /// Resolve both endpoints into a connectable target.
    pub fn session_target(&self) -> Result<SessionTarget> {
        let target = SessionTarget::direct(self.target.resolve()?);
        match &self.proxy {
            Some(proxy) => Ok(target.via(proxy.resolve()?)),
            None => Ok(target),
        }
    }
}
