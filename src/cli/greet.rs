//! Greet command implementation

use anyhow::Result;
use clap::Args;
use clap_conf_file::{ConfigTree, DefaultsMap};
use serde::Serialize;

#[derive(Args, Debug)]
pub struct GreetArgs {
    /// Who to greet
    #[arg(short, long, value_name = "NAME")]
    pub name: Option<String>,

    /// Greeting word
    #[arg(short, long, value_name = "WORD", default_value = "Hello")]
    pub greeting: String,

    /// Print the greeting this many times
    #[arg(short, long, value_name = "N", default_value_t = 1)]
    pub repeat: u32,

    /// Uppercase the greeting
    #[arg(long)]
    pub shout: bool,

    /// Print the loaded config file and resulting defaults as JSON
    #[arg(long)]
    pub show_config: bool,
}

#[derive(Serialize)]
struct ConfigReport<'a> {
    loaded: bool,
    config: Option<&'a ConfigTree>,
    defaults: &'a DefaultsMap,
}

pub fn run(args: GreetArgs, config: Option<&ConfigTree>, defaults: &DefaultsMap) -> Result<()> {
    if args.show_config {
        let report = ConfigReport { loaded: config.is_some(), config, defaults };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let line = render(&args);
    for _ in 0..args.repeat {
        println!("{}", line);
    }
    Ok(())
}

fn render(args: &GreetArgs) -> String {
    let name = args.name.as_deref().unwrap_or("world");
    let line = format!("{}, {}!", args.greeting, name);
    if args.shout {
        line.to_uppercase()
    } else {
        line
    }
}
