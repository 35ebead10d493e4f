//! Error types for vault operations.

/// Errors that can occur when working with the vault.
#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    /// Ambient configuration (credentials, region, endpoint) could not be loaded
    #[error("configuration error: {0}")]
    Config(String),

    /// The identity service call failed
    #[error("identity lookup failed: {0}")]
    Identity(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The identity service returned an identifier we can't take a principal from
    #[error("malformed caller identity: {0:?}")]
    MalformedIdentity(String),

    /// User segment can't be encoded into an object key
    #[error("invalid user {0:?}: must be non-empty and must not contain '/'")]
    InvalidUser(String),

    /// Encoded key is not a valid object store path
    #[error("invalid object key: {0}")]
    InvalidKey(#[from] object_store::path::Error),

    /// Object key found while scanning does not follow the vault layout
    #[error("malformed object key: {0:?}")]
    MalformedKey(String),

    /// Error reported by the storage backend, carried unchanged
    #[error(transparent)]
    Storage(#[from] object_store::Error),

    /// Stored value is not valid UTF-8 text
    #[error("value is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl VaultError {
    /// Whether this is the backend's own not-found condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, VaultError::Storage(object_store::Error::NotFound { .. }))
    }
}

/// Result type alias for vault operations.
pub type Result<T> = std::result::Result<T, VaultError>;
