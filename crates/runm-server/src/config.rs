use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use runm_types::{ObjectType, ObjectTypeScope};

use crate::error::{ServerError, ServerResult};

pub const DEFAULT_BIND_PORT: u16 = 10002;
pub const DEFAULT_SERVICE_NAME: &str = "runmachine-metadata";
pub const DEFAULT_KEY_PREFIX: &str = "runm-metadata/";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 1;

/// Server configuration, usually loaded from a TOML file.
///
/// Every field has a default, so a file only needs the values it changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub service_name: String,
    /// Upper bound on the storage work done for one request. Zero disables it.
    pub request_timeout_secs: u64,
    pub storage: StorageConfig,
    pub bootstrap: BootstrapConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_BIND_PORT)),
            service_name: DEFAULT_SERVICE_NAME.into(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            storage: StorageConfig::default(),
            bootstrap: BootstrapConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_toml(text: &str) -> ServerResult<Self> {
        toml::from_str(text).map_err(|e| ServerError::Config(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> ServerResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&text)?;
        tracing::debug!(path = %path.display(), "loaded server config");
        Ok(config)
    }

    pub fn to_toml(&self) -> ServerResult<String> {
        toml::to_string_pretty(self).map_err(|e| ServerError::Config(e.to_string()))
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Prefix segregating this service's keys in a shared store.
    pub key_prefix: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            key_prefix: DEFAULT_KEY_PREFIX.into(),
        }
    }
}

/// Records created at startup when they do not exist yet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    pub partitions: Vec<String>,
    pub object_types: Vec<ObjectTypeSeed>,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            partitions: Vec::new(),
            object_types: vec![ObjectTypeSeed {
                code: "runm.provider".into(),
                scope: ObjectTypeScope::Partition,
                description: "A provider of resources".into(),
            }],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectTypeSeed {
    pub code: String,
    #[serde(default)]
    pub scope: ObjectTypeScope,
    #[serde(default)]
    pub description: String,
}

impl From<&ObjectTypeSeed> for ObjectType {
    fn from(seed: &ObjectTypeSeed) -> Self {
        ObjectType::new(seed.code.clone(), seed.scope).with_description(seed.description.clone())
    }
}
