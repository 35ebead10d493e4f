//! Read, write, delete and search operations.

use std::sync::Arc;

use bytes::Bytes;
use futures::TryStreamExt;
use object_store::path::Path as ObjectPath;
use tracing::{debug, info};

use crate::clients::Clients;
use crate::error::Result;
use crate::identity::resolve_user;
use crate::path::{self, Path, Query};

/// Namespaced key/value vault on top of object storage buckets.
///
/// Cloning is cheap; clones share the same backend clients.
#[derive(Debug, Clone)]
pub struct Vault {
    clients: Arc<Clients>,
}

impl Vault {
    pub fn new(clients: Clients) -> Self {
        Self {
            clients: Arc::new(clients),
        }
    }

    pub fn clients(&self) -> &Clients {
        &self.clients
    }

    /// Resolve the user for `path` and compute its object location.
    async fn locate(&self, path: &Path) -> Result<ObjectPath> {
        let user = if path.user.is_empty() {
            let identity = self.clients.identity().await?;
            resolve_user(&path.user, identity.as_ref()).await?
        } else {
            path.user.clone()
        };
        path::validate_user(&user)?;

        path::location(&path::encode(path, &user))
    }

    /// Return the value stored at `path`.
    ///
    /// A missing value surfaces as the backend's not-found error; see
    /// [`VaultError::is_not_found`](crate::VaultError::is_not_found).
    pub async fn read(&self, path: &Path) -> Result<String> {
        let store = self.clients.store(&path.bucket).await?;
        let location = self.locate(path).await?;

        debug!(bucket = %path.bucket, key = %location, "reading value");
        let bytes = store.get(&location).await?.bytes().await?;

        Ok(String::from_utf8(bytes.to_vec())?)
    }

    /// Store `data` at `path`, replacing any existing value.
    pub async fn write(&self, path: &Path, data: &str) -> Result<()> {
        let store = self.clients.store(&path.bucket).await?;
        let location = self.locate(path).await?;

        store
            .put(&location, Bytes::copy_from_slice(data.as_bytes()).into())
            .await?;

        info!(bucket = %path.bucket, key = %location, size = data.len(), "value written");
        Ok(())
    }

    /// Remove the value at `path`.
    ///
    /// Unlike read and write, the user is taken from `path` as-is and never
    /// looked up. An empty user produces a key with an empty segment, which
    /// no object store location can represent, so the call fails with
    /// [`VaultError::InvalidKey`](crate::VaultError::InvalidKey) without
    /// sending a delete. Objects that other tools wrote at such keys
    /// (`<category>//<key>`) cannot be removed through this type.
    pub async fn delete(&self, path: &Path) -> Result<()> {
        let store = self.clients.store(&path.bucket).await?;
        let location = path::location(&path::encode(path, &path.user))?;

        store.delete(&location).await?;

        info!(bucket = %path.bucket, key = %location, "value deleted");
        Ok(())
    }

    /// List the users holding a value for `query.key`, in listing order.
    ///
    /// If any listing page fails, the error is returned and nothing
    /// gathered so far is kept.
    pub async fn search(&self, query: &Query) -> Result<Vec<String>> {
        let store = self.clients.store(&query.bucket).await?;
        let prefix = ObjectPath::from(query.visibility().prefix());

        let mut users = Vec::new();
        // Pages are fetched lazily as the stream is drained
        let mut listing = store.list(Some(&prefix));
        while let Some(meta) = listing.try_next().await? {
            match path::decode(meta.location.as_ref()) {
                Ok(decoded) if decoded.suffix == query.key => {
                    users.push(decoded.user.to_string());
                }
                Ok(_) => {}
                Err(e) => {
                    debug!(key = %meta.location, error = %e, "skipping object outside vault layout");
                }
            }
        }

        debug!(
            bucket = %query.bucket,
            key = %query.key,
            visibility = %query.visibility(),
            matches = users.len(),
            "search complete"
        );
        Ok(users)
    }
}
