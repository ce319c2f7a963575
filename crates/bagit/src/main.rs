use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{App, Commands};

mod cli;
mod commands;

fn main() -> Result<()> {
    let app = App::parse();
    init_tracing(app.verbose);

    match app.cmd {
        Commands::Create(arg) => commands::create(arg),
        Commands::Verify(arg) => commands::verify(arg),
        Commands::Validate(arg) => commands::validate(arg),
        Commands::Quick(arg) => commands::quick(arg),
        Commands::Info(arg) => commands::info(arg),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}
