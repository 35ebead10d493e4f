use clap::Args;
use configvault::{Query, VaultError};

#[derive(Args, Debug, Clone)]
pub struct List {
    /// Bucket holding the vault
    pub bucket: String,

    /// Key to look for
    pub key: String,

    /// List users with private data instead of public
    #[arg(long)]
    pub private: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ListError {
    #[error(transparent)]
    Vault(#[from] VaultError),
}

#[async_trait::async_trait]
impl crate::op::Op for List {
    type Error = ListError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let query = Query::new(&self.bucket, &self.key, !self.private);
        let users = ctx.vault.search(&query).await?;
        Ok(users.join("\n"))
    }
}
