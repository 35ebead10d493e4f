pub use clap::Parser;

use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "configvault")]
#[command(about = "Tool for managing ConfigVault")]
pub struct Args {
    /// Path to a TOML config file (defaults to the ambient AWS environment)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level for stderr output (RUST_LOG overrides)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: crate::Command,
}
