//! Command-line interface for greet
//!
//! Options are read from the config file first (`~/.greetrc`,
//! `~/.config/greet/conf.toml`, or `--config FILE`), then from the command line.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use clap_conf_file::{ConfError, ConfOption};
use std::ffi::OsString;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod greet;

const APP_NAME: &str = "greet";

/// Print a greeting, with defaults taken from a TOML config file
#[derive(Parser)]
#[command(name = "greet")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    greet: greet::GreetArgs,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long)]
    verbose: bool,
}

pub fn run() -> Result<()> {
    let argv: Vec<OsString> = std::env::args_os().collect();
    init_tracing(verbose_requested(&argv));

    let option = ConfOption::new().app_name(APP_NAME).send_param(true);
    let invocation = match option.invoke_from(Cli::command(), argv) {
        Ok(invocation) => invocation,
        Err(err @ ConfError::Cli(_)) => err.exit(),
        Err(err) => return Err(err).context("Failed to load configuration"),
    };

    let cli: Cli = invocation.parse()?;
    let config = invocation.config_param(&option.id()).flatten();
    greet::run(cli.greet, config, invocation.defaults())
}

// Logging has to be up before the config search runs, so the flag is read
// straight from argv rather than from the parsed options.
fn verbose_requested(argv: &[OsString]) -> bool {
    argv.iter().skip(1).take_while(|arg| *arg != "--").any(|arg| arg == "-v" || arg == "--verbose")
}

fn init_tracing(verbose: bool) {
    // RUST_LOG in the environment always takes precedence; --verbose falls back to DEBUG.
    let filter = if verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}
