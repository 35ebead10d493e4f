use std::error::Error;
use std::path::{Path, PathBuf};

use anyhow::Context;

use configvault::{Clients, Vault, VaultConfig};

/// Load the vault configuration, falling back to the ambient defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<VaultConfig> {
    let Some(path) = path else {
        return Ok(VaultConfig::default());
    };

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file {}", path.display()))
}

#[derive(Clone, Debug)]
pub struct OpContext {
    /// Vault with lazily-built backend clients
    pub vault: Vault,
}

impl OpContext {
    /// Create context from an optional config file path
    pub fn new(config_path: Option<PathBuf>) -> anyhow::Result<Self> {
        let config = load_config(config_path.as_deref())?;
        Ok(Self {
            vault: Vault::new(Clients::new(config)),
        })
    }
}

#[async_trait::async_trait]
pub trait Op: Send + Sync {
    type Error: Error + Send + Sync + 'static;
    type Output;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error>;
}

#[macro_export]
macro_rules! command_enum {
    ($(($variant:ident, $type:ty)),* $(,)?) => {
        #[derive(Subcommand, Debug, Clone)]
        pub enum Command {
            $($variant($type),)*
        }

        #[derive(Debug)]
        pub enum OpOutput {
            $($variant(<$type as $crate::op::Op>::Output),)*
        }

        #[derive(Debug, thiserror::Error)]
        pub enum OpError {
            $(
                #[error(transparent)]
                $variant(<$type as $crate::op::Op>::Error),
            )*
        }

        #[async_trait::async_trait]
        impl $crate::op::Op for Command {
            type Output = OpOutput;
            type Error = OpError;

            async fn execute(&self, ctx: &$crate::op::OpContext) -> Result<Self::Output, Self::Error> {
                match self {
                    $(
                        Command::$variant(op) => {
                            op.execute(ctx).await
                                .map(OpOutput::$variant)
                                .map_err(OpError::$variant)
                        },
                    )*
                }
            }
        }

        impl std::fmt::Display for OpOutput {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        OpOutput::$variant(output) => write!(f, "{}", output),
                    )*
                }
            }
        }
    };
}
