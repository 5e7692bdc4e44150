//! docsearch CLI: build and inspect search indexes for a documentation site.
//!
//! Turns the content loaded by a static site generator into a per-version
//! search index, either as a compressed local artifact or a remote index.

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
