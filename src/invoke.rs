//! Parsing a command with config-file defaults
//!
//! clap has no eager callbacks or default maps, so parsing happens twice:
//! 1. Parse argv as given to find an explicit config path (help, version and
//!    usage errors surface here).
//! 2. Resolve and merge the config file into the invocation's defaults map.
//! 3. Re-parse with every argument found in the defaults map given that value
//!    as its clap default. Values given on the command line still win, since
//!    clap only falls back to defaults for absent arguments, and an argument
//!    given on the command line never has its config value looked at.
//!    A matched subcommand takes its defaults from the table named after it,
//!    recursively.

use clap::error::ErrorKind;
use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::collections::HashMap;
use std::ffi::OsString;
use std::path::PathBuf;
use toml::Value;

use crate::context::{Context, Invocation};
use crate::error::ConfError;
use crate::merge::DefaultsMap;
use crate::option::ConfOption;

impl ConfOption {
    /// Decorate `cmd` and parse the process arguments.
    pub fn invoke(&self, cmd: Command) -> Result<Invocation, ConfError> {
        self.invoke_from(cmd, std::env::args_os())
    }

    /// Decorate `cmd` and parse `args` (including the binary name).
    pub fn invoke_from<I, T>(&self, cmd: Command, args: I) -> Result<Invocation, ConfError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        self.invoke_with_defaults(cmd, args, DefaultsMap::new())
    }

    /// Like [`ConfOption::invoke_from`], starting from pre-seeded defaults that
    /// take precedence over the config file.
    pub fn invoke_with_defaults<I, T>(
        &self,
        cmd: Command,
        args: I,
        seeded: DefaultsMap,
    ) -> Result<Invocation, ConfError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let argv: Vec<OsString> = args.into_iter().map(Into::into).collect();
        let cmd = self.decorate(cmd);
        let id = self.id();

        let first = first_pass(&cmd, &argv)?;
        let explicit = first.get_one::<PathBuf>(&id).cloned();

        let mut ctx = Context::with_defaults(cmd.get_name().to_string(), seeded);
        let tree = self.callback(&mut ctx, explicit.as_deref())?;
        let defaults = ctx.into_default_map();

        let seeded_cmd = seed_command(cmd, &defaults, &first, Some(&id))?;
        let matches = seeded_cmd.try_get_matches_from(argv)?;

        let exposed = self.sends_param().then(|| (id, tree));
        Ok(Invocation::new(matches, defaults, exposed))
    }
}

/// First parse. Required arguments may be satisfied by the config file, so
/// a missing-required failure is retried with nothing required.
fn first_pass(cmd: &Command, argv: &[OsString]) -> Result<clap::ArgMatches, ConfError> {
    match cmd.clone().try_get_matches_from(argv.iter().cloned()) {
        Ok(matches) => Ok(matches),
        Err(err) if err.kind() == ErrorKind::MissingRequiredArgument => {
            let relaxed = cmd.clone().mut_args(|arg| arg.required(false));
            Ok(relaxed.try_get_matches_from(argv.iter().cloned())?)
        }
        Err(err) => Err(err.into()),
    }
}

/// Give `cmd` clap defaults from `defaults`, then do the same for the
/// subcommand matched in `given` using the table named after it.
fn seed_command(
    cmd: Command,
    defaults: &DefaultsMap,
    given: &ArgMatches,
    skip: Option<&str>,
) -> Result<Command, ConfError> {
    let seeds = collect_seeds(&cmd, defaults, given, skip)?;
    let mut cmd = cmd.mut_args(|arg| {
        let values = seeds.get(arg.get_id().as_str()).cloned();
        match values {
            Some(values) => arg.required(false).default_values(values),
            None => arg,
        }
    });

    if let Some((name, sub_given)) = given.subcommand() {
        let section = defaults.get(name).and_then(Value::as_table);
        let sub = cmd.find_subcommand(name).cloned();
        if let (Some(section), Some(sub)) = (section, sub) {
            tracing::debug!("Applying config section '{}' to subcommand", name);
            let seeded = seed_command(sub, section, sub_given, None)?;
            cmd = cmd.mut_subcommand(name, |_| seeded);
        }
    }
    Ok(cmd)
}

/// Clap default values for every argument with an entry in `defaults` that
/// was not already given on the command line or through its env var.
///
/// Each value is checked against the argument's parser here, so a bad config
/// value is reported as such instead of tripping clap's own default checks.
fn collect_seeds(
    cmd: &Command,
    defaults: &DefaultsMap,
    given: &ArgMatches,
    skip: Option<&str>,
) -> Result<HashMap<String, Vec<String>>, ConfError> {
    let mut seeds = HashMap::new();
    for arg in cmd.get_arguments() {
        let id = arg.get_id().as_str();
        if Some(id) == skip || explicitly_given(given, id) {
            continue;
        }
        let Some((key, value)) = lookup(arg, defaults) else {
            continue;
        };
        let Some(values) = seed_values(arg, key, value)? else {
            continue;
        };
        tracing::debug!("Config key '{}' seeds argument '{}' with {:?}", key, id, values);
        seeds.insert(id.to_string(), values);
    }
    Ok(seeds)
}

fn explicitly_given(given: &ArgMatches, id: &str) -> bool {
    matches!(given.value_source(id), Some(ValueSource::CommandLine | ValueSource::EnvVariable))
}

/// Find the defaults entry for `arg`: by id, then by long flag, also trying
/// `_` in place of `-`.
fn lookup<'a>(arg: &Arg, defaults: &'a DefaultsMap) -> Option<(&'a str, &'a Value)> {
    let id = arg.get_id().as_str();
    let mut names = vec![id.to_string(), id.replace('-', "_")];
    if let Some(long) = arg.get_long() {
        names.push(long.to_string());
        names.push(long.replace('-', "_"));
    }
    names
        .iter()
        .find_map(|name| defaults.get_key_value(name.as_str()))
        .map(|(key, value)| (key.as_str(), value))
}

fn seed_values(
    arg: &Arg,
    key: &str,
    value: &Value,
) -> Result<Option<Vec<String>>, ConfError> {
    let invalid = |reason: String| ConfError::InvalidDefault { key: key.to_string(), reason };

    let Some(values) = value_strings(value) else {
        tracing::warn!("Config key '{}' holds a table and cannot set '{}'", key, arg.get_id());
        return Ok(None);
    };

    match arg.get_action() {
        ArgAction::Set | ArgAction::Append => {}
        ArgAction::SetTrue | ArgAction::SetFalse => {
            if !value.is_bool() {
                return Err(invalid("expected a boolean".to_string()));
            }
            return Ok(Some(values));
        }
        ArgAction::Count => {
            if !value.as_integer().map(|n| (0..=255).contains(&n)).unwrap_or(false) {
                return Err(invalid("expected a count between 0 and 255".to_string()));
            }
            return Ok(Some(values));
        }
        _ => return Ok(None),
    }

    if values.len() != 1 && !takes_many(arg) {
        return Err(invalid("expected a single value, found an array".to_string()));
    }
    check_values(arg, &values).map_err(invalid)?;
    Ok(Some(values))
}

/// Run each value through the argument's value parser on a throwaway command.
fn check_values(arg: &Arg, values: &[String]) -> Result<(), String> {
    let probe = Arg::new("value").required(true).value_parser(arg.get_value_parser().clone());
    let cmd = Command::new("config").no_binary_name(true).disable_help_flag(true).arg(probe);
    for value in values {
        cmd.clone()
            .try_get_matches_from(["--", value.as_str()])
            .map_err(|err| first_line(&err.to_string()).replace(" for '<value>'", ""))?;
    }
    Ok(())
}

fn takes_many(arg: &Arg) -> bool {
    matches!(arg.get_action(), ArgAction::Append)
        || arg.get_num_args().map(|range| range.max_values() > 1).unwrap_or(false)
}

/// Display form of a scalar, or each element of an array of scalars.
fn value_strings(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Array(items) => items.iter().map(scalar_string).collect(),
        other => scalar_string(other).map(|s| vec![s]),
    }
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Integer(i) => Some(i.to_string()),
        Value::Float(f) => Some(f.to_string()),
        Value::Boolean(b) => Some(b.to_string()),
        Value::Datetime(d) => Some(d.to_string()),
        Value::Array(_) | Value::Table(_) => None,
    }
}

fn first_line(message: &str) -> String {
    let line = message.lines().next().unwrap_or(message);
    line.trim_start_matches("error: ").trim().to_string()
}
