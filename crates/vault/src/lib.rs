//! Namespaced key/value vault on top of object storage
//!
//! Values are plain text stored in an object storage bucket under
//! `<public|private>/<user>/<key>`. The user is either given by the caller or
//! looked up from the identity service (AWS STS) when left empty.
//!
//! # Example
//!
//! ```rust,no_run
//! use configvault::{Clients, Path, Query, Vault, VaultConfig};
//!
//! # async fn example() -> Result<(), configvault::VaultError> {
//! // Credentials, region and endpoint come from the environment
//! let vault = Vault::new(Clients::new(VaultConfig::default()));
//!
//! let path = Path::new("my-config-bucket", "db.conf").public(true);
//! vault.write(&path, "host=db.internal").await?;
//! let value = vault.read(&path).await?;
//!
//! let users = vault.search(&Query::new("my-config-bucket", "db.conf", true)).await?;
//! # Ok(())
//! # }
//! ```

mod clients;
mod config;
mod credentials;
mod error;
mod identity;
pub mod path;
mod vault;

pub use clients::Clients;
pub use config::{IdentityConfig, StorageConfig, VaultConfig};
pub use error::{Result, VaultError};
pub use identity::{principal_from_arn, resolve_user, IdentityProvider, StaticIdentity, StsIdentity};
pub use path::{Path, Query, Visibility};
pub use vault::Vault;
