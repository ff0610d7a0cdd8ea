//! The `suvi run` command.

use clap::Args;
use std::path::PathBuf;
use suvi_core::{Config, RunOptions, RunReport, Suvi};

/// Arguments for the `run` command.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Locate, process and caption the image without posting it
    #[arg(long)]
    pub dry_run: bool,

    /// Also write the processed image to this path
    #[arg(long, value_name = "PATH")]
    pub save: Option<PathBuf>,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

/// Execute one pass.
pub async fn execute(args: RunArgs, mut config: Config) -> anyhow::Result<()> {
    if let Some(path) = args.save {
        config.debug.save_path = Some(path);
    }

    let suvi = Suvi::new(
        config,
        RunOptions {
            dry_run: args.dry_run,
        },
    )?;
    let report = suvi.run().await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", summary(&report));
    }
    Ok(())
}

fn summary(report: &RunReport) -> String {
    let mut out = format!(
        "{} ({}x{}, {} bytes) from {}",
        report.caption, report.width, report.height, report.bytes, report.image.file_name
    );
    match &report.receipt {
        Some(receipt) => match &receipt.uri {
            Some(uri) => out.push_str(&format!("\nPosted: {uri}")),
            None => out.push_str("\nPosted."),
        },
        None => out.push_str("\nDry run, nothing posted."),
    }
    out
}
