//! Caller identity lookup.

use tracing::debug;

use crate::error::{Result, VaultError};

/// Source of the caller's own identifier (an ARN-like string).
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync + std::fmt::Debug {
    async fn caller_identity(&self) -> Result<String>;
}

/// AWS STS `GetCallerIdentity`.
#[derive(Debug, Clone)]
pub struct StsIdentity {
    client: aws_sdk_sts::Client,
}

impl StsIdentity {
    pub fn new(client: aws_sdk_sts::Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl IdentityProvider for StsIdentity {
    async fn caller_identity(&self) -> Result<String> {
        let output = self
            .client
            .get_caller_identity()
            .send()
            .await
            .map_err(|e| VaultError::Identity(Box::new(aws_sdk_sts::Error::from(e))))?;

        output
            .arn()
            .map(str::to_string)
            .ok_or_else(|| VaultError::MalformedIdentity(String::new()))
    }
}

/// Always reports the same identifier.
#[derive(Debug, Clone)]
pub struct StaticIdentity {
    arn: String,
}

impl StaticIdentity {
    pub fn new(arn: impl Into<String>) -> Self {
        Self { arn: arn.into() }
    }
}

#[async_trait::async_trait]
impl IdentityProvider for StaticIdentity {
    async fn caller_identity(&self) -> Result<String> {
        Ok(self.arn.clone())
    }
}

/// Take the principal name from an identifier such as
/// `arn:aws:sts::123456789012:assumed-role/deploy/alice`.
pub fn principal_from_arn(arn: &str) -> Result<String> {
    match arn.rsplit_once('/') {
        Some((_, name)) if !name.is_empty() => Ok(name.to_string()),
        _ => Err(VaultError::MalformedIdentity(arn.to_string())),
    }
}

/// Use `given` if set, otherwise ask `provider` who we are.
pub async fn resolve_user(given: &str, provider: &dyn IdentityProvider) -> Result<String> {
    if !given.is_empty() {
        return Ok(given.to_string());
    }

    let arn = provider.caller_identity().await?;
    let user = principal_from_arn(&arn)?;
    debug!(arn = %arn, user = %user, "resolved caller identity");
    Ok(user)
}
