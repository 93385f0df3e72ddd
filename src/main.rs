//! greet: a small CLI whose option defaults come from `~/.greetrc`
//!
//! Demonstrates `clap-conf-file`: every option below can be given a default
//! in the config file, and the command line still wins.

use anyhow::Result;

mod cli;

fn main() -> Result<()> {
    cli::run()
}
