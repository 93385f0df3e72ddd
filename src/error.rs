//! Error taxonomy for config-file resolution and loading.

use std::path::PathBuf;

/// Failures that abort an invocation before the command body runs.
///
/// A missing config file is not represented here: resolution simply yields
/// `None` and nothing is merged.
#[derive(Debug, thiserror::Error)]
pub enum ConfError {
    /// The resolved path exists but is not a regular file.
    #[error("Invalid value for '{param}': {} exists but is not a file.", path.display())]
    BadParameter { param: String, path: PathBuf },

    #[error("Failed reading config file: {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML in config file {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A config value cannot be used as the default of its argument.
    #[error("Invalid value for '{key}' in config file: {reason}")]
    InvalidDefault { key: String, reason: String },

    /// Argument parsing failed, or help/version output was requested.
    #[error(transparent)]
    Cli(#[from] clap::Error),
}

impl ConfError {
    /// Print the error and exit the process.
    ///
    /// Parse errors and help/version requests are delegated to clap so the
    /// usual exit codes and formatting apply; everything else exits with 2,
    /// matching clap's usage-error code.
    pub fn exit(&self) -> ! {
        match self {
            ConfError::Cli(err) => err.exit(),
            other => {
                eprintln!("error: {other}");
                std::process::exit(2)
            }
        }
    }
}
