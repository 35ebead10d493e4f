mod args;
mod logging;
mod op;
mod ops;

use args::Args;
use clap::{Parser, Subcommand};
use op::Op;
use ops::{Delete, List, Read, Version, Write};

command_enum! {
    (Read, Read),
    (Write, Write),
    (Delete, Delete),
    (List, List),
    (Version, Version),
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let guard = logging::init_logging(args.log_level);

    let ctx = match op::OpContext::new(args.config) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    match args.command.execute(&ctx).await {
        Ok(output) => {
            let output = output.to_string();
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            eprintln!("Error: {}", e);
            // Flush pending log lines before exiting
            drop(guard);
            std::process::exit(1);
        }
    }
}
