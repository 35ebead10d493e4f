use clap::Args;
use configvault::{Path, VaultError};

#[derive(Args, Debug, Clone)]
pub struct Delete {
    /// Bucket holding the vault
    pub bucket: String,

    /// Key to delete
    pub key: String,

    /// Delete from public data instead of private
    #[arg(long)]
    pub public: bool,

    /// User to delete from
    #[arg(short, long)]
    pub user: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteError {
    #[error(transparent)]
    Vault(#[from] VaultError),
}

#[async_trait::async_trait]
impl crate::op::Op for Delete {
    type Error = DeleteError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        // No identity lookup here: deleting requires naming the user
        let path = Path::new(&self.bucket, &self.key)
            .user(self.user.clone().unwrap_or_default())
            .public(self.public);

        ctx.vault.delete(&path).await?;
        Ok(String::new())
    }
}
