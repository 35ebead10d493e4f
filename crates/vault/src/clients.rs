//! Lazily-built backend clients.
//!
//! A [`Clients`] value is created once by the caller's startup path and
//! handed to [`Vault`](crate::Vault). It loads the ambient AWS configuration,
//! the identity client and one object store per bucket on first use and
//! hands out the same handles afterwards. Construction failures are not
//! remembered, so a later call retries with whatever the environment looks
//! like then.

use std::collections::HashMap;
use std::sync::Arc;

use aws_config::{BehaviorVersion, Region, SdkConfig};
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::ObjectStore;
use parking_lot::Mutex;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::config::{StorageConfig, VaultConfig};
use crate::credentials::SdkCredentials;
use crate::error::{Result, VaultError};
use crate::identity::{IdentityProvider, StsIdentity};

type StoreCell = Arc<OnceCell<Arc<dyn ObjectStore>>>;

#[derive(Debug)]
pub struct Clients {
    config: VaultConfig,
    // Shared by the S3 stores and the identity client so both act as one principal
    aws: OnceCell<SdkConfig>,
    identity: OnceCell<Arc<dyn IdentityProvider>>,
    stores: Mutex<HashMap<String, StoreCell>>,
}

impl Clients {
    pub fn new(config: VaultConfig) -> Self {
        Self {
            config,
            aws: OnceCell::new(),
            identity: OnceCell::new(),
            stores: Mutex::new(HashMap::new()),
        }
    }

    /// Use `sdk_config` instead of loading the ambient AWS configuration.
    pub fn with_aws_config(mut self, sdk_config: SdkConfig) -> Self {
        self.aws = OnceCell::new_with(Some(sdk_config));
        self
    }

    /// Use `provider` instead of building an STS client.
    pub fn with_identity(mut self, provider: Arc<dyn IdentityProvider>) -> Self {
        self.identity = OnceCell::new_with(Some(provider));
        self
    }

    /// Use `store` for `bucket` instead of building one from configuration.
    pub fn with_store(mut self, bucket: impl Into<String>, store: Arc<dyn ObjectStore>) -> Self {
        self.stores
            .get_mut()
            .insert(bucket.into(), Arc::new(OnceCell::new_with(Some(store))));
        self
    }

    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    /// Object store for `bucket`, built on first use.
    pub async fn store(&self, bucket: &str) -> Result<Arc<dyn ObjectStore>> {
        let cell = Arc::clone(self.stores.lock().entry(bucket.to_string()).or_default());

        cell.get_or_try_init(|| self.build_store(bucket))
            .await
            .map(Arc::clone)
    }

    /// Identity service client, built on first use.
    pub async fn identity(&self) -> Result<Arc<dyn IdentityProvider>> {
        self.identity
            .get_or_try_init(|| self.build_identity())
            .await
            .map(Arc::clone)
    }

    /// Ambient AWS configuration, loaded on first use.
    pub async fn aws_config(&self) -> Result<&SdkConfig> {
        self.aws.get_or_try_init(|| self.load_aws_config()).await
    }

    async fn load_aws_config(&self) -> Result<SdkConfig> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(profile) = &self.config.profile {
            loader = loader.profile_name(profile);
        }
        if let Some(region) = &self.config.region {
            loader = loader.region(Region::new(region.clone()));
        }
        let sdk_config = loader.load().await;

        check_aws_config(&sdk_config)?;
        debug!(region = ?sdk_config.region(), "AWS configuration loaded");
        Ok(sdk_config)
    }

    async fn build_store(&self, bucket: &str) -> Result<Arc<dyn ObjectStore>> {
        let store: Arc<dyn ObjectStore> = match &self.config.storage {
            StorageConfig::Memory => Arc::new(InMemory::new()),

            StorageConfig::Local { path } => {
                let root = path.join(bucket);
                std::fs::create_dir_all(&root)?;
                Arc::new(
                    LocalFileSystem::new_with_prefix(&root)
                        .map_err(|e| VaultError::Config(e.to_string()))?,
                )
            }

            StorageConfig::S3 {
                endpoint,
                allow_http,
            } => {
                let sdk_config = self.aws_config().await?;
                Arc::new(build_s3_store(
                    sdk_config,
                    endpoint.as_deref(),
                    *allow_http,
                    bucket,
                )?)
            }
        };

        debug!(bucket = %bucket, "object store client created");
        Ok(store)
    }

    async fn build_identity(&self) -> Result<Arc<dyn IdentityProvider>> {
        let sdk_config = self.aws_config().await?;

        let mut sts_config = aws_sdk_sts::config::Builder::from(sdk_config);
        if let Some(endpoint) = &self.config.identity.endpoint {
            sts_config = sts_config.endpoint_url(endpoint);
        }

        debug!("identity client created");
        Ok(Arc::new(StsIdentity::new(aws_sdk_sts::Client::from_conf(
            sts_config.build(),
        ))))
    }
}

/// Reject an AWS configuration neither client could authenticate with.
fn check_aws_config(sdk_config: &SdkConfig) -> Result<()> {
    if sdk_config.region().is_none() {
        return Err(VaultError::Config("no AWS region configured".to_string()));
    }
    if sdk_config.credentials_provider().is_none() {
        return Err(VaultError::Config(
            "no AWS credentials provider available".to_string(),
        ));
    }
    Ok(())
}

fn build_s3_store(
    sdk_config: &SdkConfig,
    endpoint: Option<&str>,
    allow_http: bool,
    bucket: &str,
) -> Result<impl ObjectStore> {
    let (Some(region), Some(credentials)) =
        (sdk_config.region(), sdk_config.credentials_provider())
    else {
        return Err(VaultError::Config(
            "AWS configuration has no region or credentials".to_string(),
        ));
    };

    let mut builder = AmazonS3Builder::new()
        .with_bucket_name(bucket)
        .with_region(region.as_ref())
        .with_credentials(Arc::new(SdkCredentials::new(credentials)));
    if let Some(endpoint) = endpoint.or(sdk_config.endpoint_url()) {
        builder = builder.with_endpoint(endpoint);
    }
    if allow_http {
        builder = builder.with_allow_http(true);
    }

    builder
        .build()
        .map_err(|e| VaultError::Config(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::StaticIdentity;
    use aws_credential_types::provider::SharedCredentialsProvider;
    use aws_credential_types::Credentials;
    use bytes::Bytes;
    use object_store::path::Path as ObjectPath;

    fn static_sdk_config() -> SdkConfig {
        SdkConfig::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("eu-west-1"))
            .credentials_provider(SharedCredentialsProvider::new(Credentials::new(
                "AKIDEXAMPLE",
                "secret",
                None,
                None,
                "test",
            )))
            .build()
    }

    #[tokio::test]
    async fn test_store_is_memoized_per_bucket() {
        let clients = Clients::new(VaultConfig::memory());

        let first = clients.store("alpha").await.unwrap();
        first
            .put(&ObjectPath::from("k"), Bytes::from("v").into())
            .await
            .unwrap();

        // Same handle, so the in-memory data is still there
        let again = clients.store("alpha").await.unwrap();
        assert!(Arc::ptr_eq(&first, &again));
        assert!(again.get(&ObjectPath::from("k")).await.is_ok());

        let other = clients.store("beta").await.unwrap();
        assert!(!Arc::ptr_eq(&first, &other));
        assert!(other.get(&ObjectPath::from("k")).await.is_err());
    }

    #[tokio::test]
    async fn test_concurrent_first_use_builds_once() {
        let clients = Clients::new(VaultConfig::memory());

        let (a, b) = tokio::join!(clients.store("alpha"), clients.store("alpha"));
        assert!(Arc::ptr_eq(&a.unwrap(), &b.unwrap()));
    }

    #[tokio::test]
    async fn test_local_store_creates_bucket_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let clients = Clients::new(VaultConfig::local(temp_dir.path()));

        clients.store("configs").await.unwrap();
        assert!(temp_dir.path().join("configs").is_dir());
    }

    #[tokio::test]
    async fn test_failed_store_build_is_retried() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path().join("vault");
        // A file where the root directory should be
        std::fs::write(&root, b"").unwrap();
        let clients = Clients::new(VaultConfig::local(&root));

        let err = clients.store("configs").await.unwrap_err();
        assert!(matches!(err, VaultError::Io(_)));

        std::fs::remove_file(&root).unwrap();
        std::fs::create_dir(&root).unwrap();

        clients.store("configs").await.unwrap();
        assert!(root.join("configs").is_dir());
    }

    #[tokio::test]
    async fn test_injected_store_is_used() {
        let store: Arc<dyn ObjectStore> = Arc::new(InMemory::new());
        let clients =
            Clients::new(VaultConfig::default()).with_store("shared", Arc::clone(&store));

        assert!(Arc::ptr_eq(&clients.store("shared").await.unwrap(), &store));
    }

    #[tokio::test]
    async fn test_injected_identity_is_used() {
        let clients = Clients::new(VaultConfig::memory()).with_identity(Arc::new(
            StaticIdentity::new("arn:aws:iam::123456789012:user/alice"),
        ));

        let identity = clients.identity().await.unwrap();
        assert_eq!(
            identity.caller_identity().await.unwrap(),
            "arn:aws:iam::123456789012:user/alice"
        );
    }

    #[tokio::test]
    async fn test_s3_and_identity_share_aws_config() {
        let clients = Clients::new(VaultConfig::default()).with_aws_config(static_sdk_config());

        // Neither build touches the network
        clients.store("configs").await.unwrap();
        clients.identity().await.unwrap();

        let sdk_config = clients.aws_config().await.unwrap();
        assert_eq!(sdk_config.region().map(|r| r.as_ref()), Some("eu-west-1"));
    }

    #[test]
    fn test_check_aws_config_requires_region() {
        let sdk_config = SdkConfig::builder()
            .behavior_version(BehaviorVersion::latest())
            .credentials_provider(SharedCredentialsProvider::new(Credentials::new(
                "AKIDEXAMPLE",
                "secret",
                None,
                None,
                "test",
            )))
            .build();
        assert!(matches!(
            check_aws_config(&sdk_config),
            Err(VaultError::Config(_))
        ));
    }

    #[test]
    fn test_check_aws_config_requires_credentials() {
        let sdk_config = SdkConfig::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("eu-west-1"))
            .build();
        assert!(matches!(
            check_aws_config(&sdk_config),
            Err(VaultError::Config(_))
        ));
        assert!(matches!(
            build_s3_store(&sdk_config, None, false, "configs"),
            Err(VaultError::Config(_))
        ));
        assert!(check_aws_config(&static_sdk_config()).is_ok());
    }
}
