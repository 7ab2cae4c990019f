//! Roundup CLI — weekly link digests from Pinboard bookmarks.
//!
//! Collects the bookmarks tagged for this week's roundup, renders them as
//! markdown bullets, and optionally tags them as processed afterwards.

mod commands;
mod shell;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
