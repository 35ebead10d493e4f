use std::io::IsTerminal;

use clap::Args;
use configvault::{Path, VaultError};
use tokio::io::{AsyncRead, AsyncReadExt};

#[derive(Args, Debug, Clone)]
pub struct Write {
    /// Bucket holding the vault
    pub bucket: String,

    /// Key to write
    pub key: String,

    /// Value to store (read from stdin when omitted)
    pub data: Option<String>,

    /// Write to public data instead of private
    #[arg(long)]
    pub public: bool,

    /// User to write as (defaults to the caller's identity)
    #[arg(short, long)]
    pub user: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error(transparent)]
    Vault(#[from] VaultError),
    #[error("no stdin provided")]
    NoStdin,
    #[error("failed to read stdin: {0}")]
    Io(#[from] std::io::Error),
}

/// Read all of `reader` as the value to store.
async fn read_value<R: AsyncRead + Unpin>(mut reader: R) -> Result<String, WriteError> {
    let mut data = String::new();
    reader.read_to_string(&mut data).await?;
    Ok(data)
}

#[async_trait::async_trait]
impl crate::op::Op for Write {
    type Error = WriteError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let data = match &self.data {
            Some(data) => data.clone(),
            None => {
                if std::io::stdin().is_terminal() {
                    return Err(WriteError::NoStdin);
                }
                read_value(tokio::io::stdin()).await?
            }
        };

        let path = Path::new(&self.bucket, &self.key)
            .user(self.user.clone().unwrap_or_default())
            .public(self.public);

        ctx.vault.write(&path, &data).await?;
        Ok(String::new())
    }
}
