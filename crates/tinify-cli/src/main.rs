//! Tinify CLI: optimize images with the Tinify service from the command line.
//!
//! Set TINIFY_API_URL (or API_URL) to target another endpoint.

use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tinify_api_client::Optimizer;
use tinify_cli::{init_tracing, OptimizeArgs};
use tinify_core::TinifyConfig;

#[derive(Parser)]
#[command(name = "tinify", about = "Tinify image optimization CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress, convert, resize or upscale an image and save the result locally
    Optimize(OptimizeArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = TinifyConfig::from_env().context("Invalid Tinify configuration")?;

    match cli.command {
        Commands::Optimize(args) => {
            if let Some(ms) = args.timeout_ms {
                config.completion_timeout = Duration::from_millis(ms);
            }
            config.validate()?;

            let optimizer = Optimizer::from_config(&config).context("Failed to create API client")?;
            let result = optimizer.optimize(&args.to_request()).await?;

            if args.json {
                let out = serde_json::to_string_pretty(&result).context("Serialize result")?;
                println!("{}", out);
            } else {
                println!("{}", result.summary());
            }
        }
    }

    Ok(())
}
