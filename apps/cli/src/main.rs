//! Inspectors CLI — save inspector general reports to a local data tree.
//!
//! Reads report records produced by scrapers, validates them, downloads the
//! documents, extracts their text, and writes normalized metadata.

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
