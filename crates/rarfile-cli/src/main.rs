//! rarfile CLI - Command-line utility for listing, testing and extracting
//! RAR archives.

mod cli;
mod commands;
mod error;
mod output;
mod progress;

use std::process;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = match cli::Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // Help and version go to stdout and are not failures.
            let code = i32::from(err.use_stderr());
            let _ = err.print();
            process::exit(code);
        }
    };

    init_logging(cli.verbose);

    let formatter = output::create_formatter(cli.json, cli.verbose, cli.quiet);

    match &cli.command {
        cli::Commands::List(args) => commands::list::execute(args, &*formatter),
        cli::Commands::Test(args) => commands::test::execute(args, &*formatter),
        cli::Commands::Extract(args) => {
            let show_progress = !cli.quiet && !cli.json;
            commands::extract::execute(args, &*formatter, show_progress)
        }
        cli::Commands::Completion(args) => {
            commands::completion::execute(args.shell);
            Ok(())
        }
    }
}

/// Installs the stderr log subscriber. `RUST_LOG` overrides the level chosen
/// by `--verbose`.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
