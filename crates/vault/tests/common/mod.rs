//! Shared test utilities for vault integration tests
#![allow(dead_code)]

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use configvault::{Clients, IdentityProvider, Vault, VaultConfig};
use futures::stream::{self, BoxStream, StreamExt};
use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::{
    GetOptions, GetResult, ListResult, MultipartUpload, ObjectMeta, ObjectStore, PutMultipartOpts,
    PutOptions, PutPayload, PutResult,
};

pub const CALLER_ARN: &str = "arn:aws:sts::123456789012:assumed-role/deploy/alice";

/// Identity provider that counts how often it is asked.
#[derive(Debug)]
pub struct CountingIdentity {
    arn: String,
    calls: AtomicUsize,
}

impl CountingIdentity {
    pub fn new(arn: &str) -> Arc<Self> {
        Arc::new(Self {
            arn: arn.to_string(),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl IdentityProvider for CountingIdentity {
    async fn caller_identity(&self) -> configvault::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.arn.clone())
    }
}

/// Set up an in-memory vault whose caller is `alice`
pub fn setup_vault() -> (Vault, Arc<CountingIdentity>) {
    let identity = CountingIdentity::new(CALLER_ARN);
    let clients = Clients::new(VaultConfig::memory()).with_identity(identity.clone());
    (Vault::new(clients), identity)
}

/// How a [`ListingStore`] answers `list`.
#[derive(Debug)]
enum Listing {
    /// Everything held, then an error, as if the final page request failed
    FailAtEnd,
    /// These keys in this order, regardless of what is stored
    Fixed(Vec<ObjectPath>),
}

/// In-memory store with scripted listings.
#[derive(Debug)]
pub struct ListingStore {
    inner: InMemory,
    listing: Listing,
}

impl ListingStore {
    pub fn failing() -> Self {
        Self {
            inner: InMemory::new(),
            listing: Listing::FailAtEnd,
        }
    }

    pub fn fixed(keys: &[&str]) -> Self {
        Self {
            inner: InMemory::new(),
            listing: Listing::Fixed(keys.iter().map(|k| ObjectPath::from(*k)).collect()),
        }
    }
}

impl fmt::Display for ListingStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ListingStore({})", self.inner)
    }
}

#[async_trait::async_trait]
impl ObjectStore for ListingStore {
    async fn put_opts(
        &self,
        location: &ObjectPath,
        payload: PutPayload,
        opts: PutOptions,
    ) -> object_store::Result<PutResult> {
        self.inner.put_opts(location, payload, opts).await
    }

    async fn put_multipart_opts(
        &self,
        location: &ObjectPath,
        opts: PutMultipartOpts,
    ) -> object_store::Result<Box<dyn MultipartUpload>> {
        self.inner.put_multipart_opts(location, opts).await
    }

    async fn get_opts(
        &self,
        location: &ObjectPath,
        options: GetOptions,
    ) -> object_store::Result<GetResult> {
        self.inner.get_opts(location, options).await
    }

    async fn delete(&self, location: &ObjectPath) -> object_store::Result<()> {
        self.inner.delete(location).await
    }

    fn list(&self, prefix: Option<&ObjectPath>) -> BoxStream<'_, object_store::Result<ObjectMeta>> {
        match &self.listing {
            Listing::FailAtEnd => self
                .inner
                .list(prefix)
                .chain(stream::once(async {
                    Err(object_store::Error::Generic {
                        store: "ListingStore",
                        source: "listing page failed".into(),
                    })
                }))
                .boxed(),
            Listing::Fixed(keys) => {
                let metas: Vec<_> = keys
                    .iter()
                    .filter(|key| prefix.map_or(true, |p| key.prefix_matches(p)))
                    .map(|key| {
                        Ok(ObjectMeta {
                            location: key.clone(),
                            last_modified: Default::default(),
                            size: 0,
                            e_tag: None,
                            version: None,
                        })
                    })
                    .collect();
                stream::iter(metas).boxed()
            }
        }
    }

    async fn list_with_delimiter(
        &self,
        prefix: Option<&ObjectPath>,
    ) -> object_store::Result<ListResult> {
        self.inner.list_with_delimiter(prefix).await
    }

    async fn copy(&self, from: &ObjectPath, to: &ObjectPath) -> object_store::Result<()> {
        self.inner.copy(from, to).await
    }

    async fn copy_if_not_exists(
        &self,
        from: &ObjectPath,
        to: &ObjectPath,
    ) -> object_store::Result<()> {
        self.inner.copy_if_not_exists(from, to).await
    }
}
