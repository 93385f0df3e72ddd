//! Per-invocation state

use clap::{ArgMatches, FromArgMatches};

use crate::merge::{ConfigTree, DefaultsMap};

/// State owned by one command invocation: the command's name and the
/// defaults map the config file is merged into.
#[derive(Debug, Clone, Default)]
pub struct Context {
    info_name: String,
    default_map: DefaultsMap,
}

impl Context {
    pub fn new(info_name: impl Into<String>) -> Self {
        Self { info_name: info_name.into(), default_map: DefaultsMap::new() }
    }

    /// Start from pre-seeded defaults. Seeded keys win over the config file.
    pub fn with_defaults(info_name: impl Into<String>, default_map: DefaultsMap) -> Self {
        Self { info_name: info_name.into(), default_map }
    }

    pub fn info_name(&self) -> &str {
        &self.info_name
    }

    pub fn default_map(&self) -> &DefaultsMap {
        &self.default_map
    }

    pub fn default_map_mut(&mut self) -> &mut DefaultsMap {
        &mut self.default_map
    }

    pub fn into_default_map(self) -> DefaultsMap {
        self.default_map
    }
}

/// Result of parsing a command with config-file defaults applied.
#[derive(Debug, Clone)]
pub struct Invocation {
    matches: ArgMatches,
    defaults: DefaultsMap,
    exposed: Option<(String, Option<ConfigTree>)>,
}

impl Invocation {
    pub(crate) fn new(
        matches: ArgMatches,
        defaults: DefaultsMap,
        exposed: Option<(String, Option<ConfigTree>)>,
    ) -> Self {
        Self { matches, defaults, exposed }
    }

    /// Final matches; absent options carry their config-file value.
    pub fn matches(&self) -> &ArgMatches {
        &self.matches
    }

    pub fn defaults(&self) -> &DefaultsMap {
        &self.defaults
    }

    /// The decoded config file, when the option was set up with
    /// `send_param(true)` and `name` is its id.
    ///
    /// `None` means not exposed under that name; `Some(None)` means exposed but
    /// no file was found.
    pub fn config_param(&self, name: &str) -> Option<Option<&ConfigTree>> {
        match &self.exposed {
            Some((id, tree)) if id == name => Some(tree.as_ref()),
            _ => None,
        }
    }

    /// Build a derive-based args struct from the final matches.
    pub fn parse<T: FromArgMatches>(&self) -> Result<T, clap::Error> {
        T::from_arg_matches(&self.matches)
    }
}
