mod cli;
mod commands;
mod mcp;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr: stdout carries the MCP transport and command output
    let default_level = if cli.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Mcp => {
            mcp::run_server().await?;
        }
        Commands::Split {
            job,
            layout,
            no_clobber,
            remove_partial_on_failure,
        } => {
            let options = pdfbatch::SplitOptions {
                overwrite: cli::overwrite_policy(no_clobber),
                on_failure: cli::failure_policy(remove_partial_on_failure),
                ..layout.to_options()
            };
            commands::split::run(job.to_job(), options).await?;
        }
        Commands::Plan { job, layout } => {
            commands::plan::run(&job.to_job(), layout.to_options())?;
        }
    }

    Ok(())
}
