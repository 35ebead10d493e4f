//! Bridges the AWS SDK credential chain into `object_store`.
//!
//! `AmazonS3Builder::from_env` only looks at `AWS_*` variables, container
//! credentials and instance metadata. Feeding it the SDK's provider instead
//! makes the object store and the identity client authenticate as the same
//! principal, including profile and SSO credentials.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use aws_credential_types::provider::{ProvideCredentials, SharedCredentialsProvider};
use object_store::aws::AwsCredential;
use object_store::CredentialProvider;
use tokio::sync::Mutex;
use tracing::debug;

/// Refresh credentials this long before they expire.
const EXPIRY_BUFFER: Duration = Duration::from_secs(5 * 60);

struct Cached {
    credential: Arc<AwsCredential>,
    expiry: Option<SystemTime>,
}

impl Cached {
    fn is_fresh(&self) -> bool {
        match self.expiry {
            None => true,
            Some(expiry) => SystemTime::now() + EXPIRY_BUFFER < expiry,
        }
    }
}

/// `object_store` credential provider backed by an SDK credentials provider.
pub(crate) struct SdkCredentials {
    provider: SharedCredentialsProvider,
    cached: Mutex<Option<Cached>>,
}

impl SdkCredentials {
    pub(crate) fn new(provider: SharedCredentialsProvider) -> Self {
        Self {
            provider,
            cached: Mutex::new(None),
        }
    }
}

impl std::fmt::Debug for SdkCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SdkCredentials")
            .field("provider", &self.provider)
            .finish()
    }
}

#[async_trait::async_trait]
impl CredentialProvider for SdkCredentials {
    type Credential = AwsCredential;

    async fn get_credential(&self) -> object_store::Result<Arc<AwsCredential>> {
        // Held across the fetch so concurrent requests share one refresh
        let mut cached = self.cached.lock().await;
        if let Some(entry) = cached.as_ref().filter(|entry| entry.is_fresh()) {
            return Ok(Arc::clone(&entry.credential));
        }

        let credentials = self.provider.provide_credentials().await.map_err(|e| {
            object_store::Error::Generic {
                store: "S3",
                source: Box::new(e),
            }
        })?;
        debug!(expiry = ?credentials.expiry(), "refreshed AWS credentials");

        let credential = Arc::new(AwsCredential {
            key_id: credentials.access_key_id().to_string(),
            secret_key: credentials.secret_access_key().to_string(),
            token: credentials.session_token().map(str::to_string),
        });
        *cached = Some(Cached {
            credential: Arc::clone(&credential),
            expiry: credentials.expiry(),
        });

        Ok(credential)
    }
}
