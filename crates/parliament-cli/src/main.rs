mod cli;
mod commands;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use parliament::ParliamentConfig;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use cli::Cli;

fn init_tracing(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("parliament={}", level).parse()?)
        .add_directive(format!("parliament_cli={}", level).parse()?);
    // Stdout carries the summary; all logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = init_tracing(cli.verbose) {
        eprintln!("warning: logging disabled: {:#}", e);
    }

    let config = ParliamentConfig::from_env();
    debug!(?config, "Loaded configuration");

    match commands::run(cli.command, &config) {
        Ok(summary) => {
            println!("{}", summary);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
