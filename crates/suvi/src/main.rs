//! suvi - post the latest GOES-16 SUVI 171Å solar image to Bluesky.
//!
//! Meant to be triggered by an external scheduler (cron, systemd timer);
//! every invocation does exactly one pass.
//!
//! # Usage
//!
//! ```bash
//! # Post the latest image (reads BSKY_USER / BSKY_PSWD)
//! suvi run
//!
//! # Process without posting, keep a local copy
//! suvi run --dry-run --save ./latest.jpg
//!
//! # View configuration
//! suvi config show
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;
mod logging;

/// suvi - post the latest SUVI solar image to Bluesky.
#[derive(Parser, Debug)]
#[command(name = "suvi")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file to use instead of the default location
    #[arg(long, global = true, env = "SUVI_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch, enhance and post the latest image
    Run(cli::run::RunArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config problems go to stderr directly.
    let config = match cli::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        // `config init` is how a broken or missing file gets replaced.
        Err(e) if matches!(cli.command, Commands::Config(_)) => {
            eprintln!("Warning: failed to load config: {e}\n  Using default configuration.");
            suvi_core::Config::default()
        }
        Err(e) => {
            eprintln!("Error: failed to load config: {e}");
            std::process::exit(2);
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("suvi v{}", suvi_core::VERSION);

    match cli.command {
        Commands::Run(args) => cli::run::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args, cli.config.as_deref(), config).await,
    }
}
