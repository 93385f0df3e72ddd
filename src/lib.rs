//! clap-conf-file: populate clap option defaults from a TOML config file
//!
//! A [`ConfOption`] adds a `-c/--config FILE` option to a command. When the
//! command is parsed, the config file is taken from that option or found by
//! searching a list of candidate paths (`~/.{app}rc` and
//! `~/.config/{app}/conf.toml` by default), decoded, and used as the default
//! for every option not given on the command line.
//!
//! Precedence: command line > config file > built-in defaults.
//!
//! ```toml
//! verbose = true        # default for --verbose
//!
//! [greet]               # section named after the app: keys apply as top-level
//! greeting = "Howdy"
//!
//! [other]               # any other section is kept whole under its own key
//! greeting = "ignored"
//! ```

pub mod context;
pub mod error;
mod invoke;
pub mod merge;
pub mod option;
pub mod paths;
pub mod resolve;

pub use context::{Context, Invocation};
pub use error::ConfError;
pub use merge::{merge_config, set_if_absent, ConfigTree, DefaultsMap};
pub use option::{ConfOption, ShowDefault};
pub use paths::{expand_all, CandidatePaths, LOOK_IN};
pub use resolve::resolve_config_path;
