use clap::Args;
use configvault::{Path, VaultError};

#[derive(Args, Debug, Clone)]
pub struct Read {
    /// Bucket holding the vault
    pub bucket: String,

    /// Key to read
    pub key: String,

    /// Read from public data instead of private
    #[arg(long)]
    pub public: bool,

    /// User to read from (defaults to the caller's identity)
    #[arg(short, long)]
    pub user: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error(transparent)]
    Vault(#[from] VaultError),
}

#[async_trait::async_trait]
impl crate::op::Op for Read {
    type Error = ReadError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let path = Path::new(&self.bucket, &self.key)
            .user(self.user.clone().unwrap_or_default())
            .public(self.public);

        Ok(ctx.vault.read(&path).await?)
    }
}
