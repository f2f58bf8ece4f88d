//! Notetree CLI Binary
//!
//! Command-line interface for browsing and editing a notetree vault.

use anyhow::Context;
use clap::Parser;
use notetree::logging::init_logging;
use notetree::tooling::cli::{Cli, CliContext};
use std::process;

fn run(cli: &Cli) -> anyhow::Result<String> {
    let context = CliContext::new(cli.vault.clone(), cli.config.clone())
        .context("Error initializing vault")?;
    let logging = cli.logging_config(context.config().logging.clone());
    init_logging(Some(&logging)).context("Error initializing logging")?;
    Ok(context.execute(&cli.command)?)
}

fn main() {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(output) => {
            println!("{}", output);
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}
