//! TrendLens CLI — trending-topic enrichment and reporting.
//!
//! Fetches the current hot-topic list, enriches each topic with web-search
//! context and an LLM-generated analysis, and renders a styled HTML report.

mod commands;

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
