//! Backend configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Configuration for the object storage backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StorageConfig {
    /// S3-compatible storage, authenticated with the shared AWS configuration
    S3 {
        /// Endpoint override (e.g., "http://localhost:9000" for MinIO)
        #[serde(default)]
        endpoint: Option<String>,
        /// Permit plain-HTTP endpoints
        #[serde(default)]
        allow_http: bool,
    },

    /// Local filesystem storage, one directory per bucket
    Local {
        /// Root directory holding the bucket directories
        path: PathBuf,
    },

    /// In-memory storage (for testing)
    Memory,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig::S3 {
            endpoint: None,
            allow_http: false,
        }
    }
}

/// Configuration for the identity service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// STS endpoint override
    #[serde(default)]
    pub endpoint: Option<String>,
}

/// Vault configuration.
///
/// `profile` and `region` feed the single AWS configuration that both the
/// S3 store and the identity client are built from; anything left unset is
/// resolved by the SDK's default chain (environment, `~/.aws`, SSO,
/// container and instance metadata).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Named profile from the shared AWS config files
    #[serde(default)]
    pub profile: Option<String>,
    /// Region override
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
}

impl VaultConfig {
    /// Configuration backed by in-memory buckets.
    pub fn memory() -> Self {
        Self {
            storage: StorageConfig::Memory,
            ..Self::default()
        }
    }

    /// Configuration backed by bucket directories under `path`.
    pub fn local(path: impl Into<PathBuf>) -> Self {
        Self {
            storage: StorageConfig::Local { path: path.into() },
            ..Self::default()
        }
    }
}
