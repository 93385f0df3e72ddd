//! The `--config` option and its resolve-and-merge callback

use clap::{Arg, ArgAction, Command};
use std::path::{Path, PathBuf};

use crate::context::Context;
use crate::error::ConfError;
use crate::merge::{load_config_tree, merge_config, ConfigTree};
use crate::paths::CandidatePaths;
use crate::resolve::resolve_config_path;

const HELP_TEXT: &str = "Optional TOML conf file path.";

/// What the option's help text shows as its default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShowDefault {
    Hide,
    /// `Look in <candidate>, <candidate>, ...`
    SearchPaths,
    /// A literal description.
    Text(String),
}

/// Registers a config-file option on a clap command and loads the file.
///
/// Built once per command and cloned into the invocation driver. The
/// resolve-and-merge step is [`ConfOption::callback`].
///
/// ```no_run
/// use clap::{Arg, Command};
/// use clap_conf_file::ConfOption;
///
/// let option = ConfOption::new().app_name("greet").try_path("/etc/greet.toml");
/// let cmd = Command::new("greet").arg(Arg::new("name").long("name"));
/// let invocation = option.invoke(cmd).unwrap_or_else(|err| err.exit());
/// let name = invocation.matches().get_one::<String>("name");
/// ```
#[derive(Debug, Clone)]
pub struct ConfOption {
    app_name: Option<String>,
    short: Option<char>,
    long: Option<String>,
    short_aliases: Vec<char>,
    long_aliases: Vec<String>,
    send_param: bool,
    try_paths: Vec<String>,
    show_default: Option<ShowDefault>,
}

impl Default for ConfOption {
    fn default() -> Self {
        Self {
            app_name: None,
            short: Some('c'),
            long: Some("config".to_string()),
            short_aliases: Vec::new(),
            long_aliases: Vec::new(),
            send_param: false,
            try_paths: Vec::new(),
            show_default: None,
        }
    }
}

impl ConfOption {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name used for the default file locations and the config section.
    /// Falls back to the command name when unset.
    pub fn app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = Some(app_name.into());
        self
    }

    /// Flag spellings, e.g. `["-c", "--config"]`. The first short and first
    /// long are primary; further ones become aliases. An empty list keeps
    /// the current names.
    pub fn param_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut shorts = Vec::new();
        let mut longs = Vec::new();
        for name in names {
            let name = name.as_ref();
            if let Some(long) = name.strip_prefix("--") {
                longs.push(long.to_string());
            } else if let Some(short) = name.strip_prefix('-') {
                let mut chars = short.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => shorts.push(c),
                    _ => longs.push(short.to_string()),
                }
            } else if !name.is_empty() {
                longs.push(name.to_string());
            }
        }
        if shorts.is_empty() && longs.is_empty() {
            return self;
        }

        let mut shorts = shorts.into_iter();
        let mut longs = longs.into_iter();
        self.short = shorts.next();
        self.long = longs.next();
        self.short_aliases = shorts.collect();
        self.long_aliases = longs.collect();
        self
    }

    /// Expose the decoded config to the command under the option id.
    pub fn send_param(mut self, send_param: bool) -> Self {
        self.send_param = send_param;
        self
    }

    /// Add a location to search before the built-in ones. Repeated calls
    /// keep their order.
    pub fn try_path(mut self, path: impl Into<String>) -> Self {
        self.try_paths.push(path.into());
        self
    }

    pub fn try_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.try_paths.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn show_default(mut self, show_default: ShowDefault) -> Self {
        self.show_default = Some(show_default);
        self
    }

    /// Argument id: the long name with `-` mapped to `_`, else the short flag.
    pub fn id(&self) -> String {
        match (&self.long, self.short) {
            (Some(long), _) => long.replace('-', "_"),
            (None, Some(short)) => short.to_string(),
            (None, None) => "config".to_string(),
        }
    }

    pub fn sends_param(&self) -> bool {
        self.send_param
    }

    /// Search list; placeholders are filled in when the app name is known up
    /// front.
    pub fn candidates(&self) -> CandidatePaths {
        let candidates = CandidatePaths::new(self.try_paths.iter().cloned());
        match &self.app_name {
            Some(app_name) => candidates.formatted(app_name),
            None => candidates,
        }
    }

    fn effective_show_default(&self) -> ShowDefault {
        match &self.show_default {
            Some(show) => show.clone(),
            None if self.app_name.is_some() => ShowDefault::SearchPaths,
            None => ShowDefault::Hide,
        }
    }

    pub fn help_text(&self) -> String {
        match self.effective_show_default() {
            ShowDefault::Hide => HELP_TEXT.to_string(),
            ShowDefault::SearchPaths => format!(
                "{HELP_TEXT} [default: Look in {}]",
                self.candidates().templates().join(", ")
            ),
            ShowDefault::Text(text) => format!("{HELP_TEXT} [default: {text}]"),
        }
    }

    /// The clap argument this option registers.
    pub fn arg(&self) -> Arg {
        let mut arg = Arg::new(self.id())
            .value_name("FILE")
            .action(ArgAction::Set)
            .value_parser(existing_file)
            .help(self.help_text());
        if let Some(short) = self.short {
            arg = arg.short(short);
        }
        if let Some(long) = &self.long {
            arg = arg.long(long.clone());
        }
        if !self.short_aliases.is_empty() {
            arg = arg.visible_short_aliases(self.short_aliases.clone());
        }
        if !self.long_aliases.is_empty() {
            arg = arg.visible_aliases(self.long_aliases.clone());
        }
        arg
    }

    /// Add the config option to `cmd`.
    pub fn decorate(&self, cmd: Command) -> Command {
        cmd.arg(self.arg())
    }

    /// Resolve the config file, decode it and merge it into the context's
    /// defaults. Returns the whole decoded file, or `None` when no file was
    /// given or found.
    pub fn callback(
        &self,
        ctx: &mut Context,
        explicit: Option<&Path>,
    ) -> Result<Option<ConfigTree>, ConfError> {
        let app_name = self.app_name.clone().unwrap_or_else(|| ctx.info_name().to_string());
        let Some(path) = resolve_config_path(explicit, &self.candidates(), &app_name, &self.id())?
        else {
            return Ok(None);
        };

        let config = load_config_tree(&path)?;
        tracing::info!("Loaded config file {} ({} top-level keys)", path.display(), config.len());
        merge_config(ctx.default_map_mut(), &config, &app_name);
        Ok(Some(config))
    }
}

fn existing_file(value: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(value);
    if !path.exists() {
        return Err(format!("Path '{value}' does not exist."));
    }
    if path.is_dir() {
        return Err(format!("File '{value}' is a directory."));
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_names_and_id() {
        let option = ConfOption::new();
        let arg = option.arg();
        assert_eq!(option.id(), "config");
        assert_eq!(arg.get_short(), Some('c'));
        assert_eq!(arg.get_long(), Some("config"));
    }

    #[test]
    fn test_param_names_are_parsed() {
        let option = ConfOption::new().param_names(["-f", "--conf-file", "--settings", "-s"]);
        let arg = option.arg();
        assert_eq!(option.id(), "conf_file");
        assert_eq!(arg.get_short(), Some('f'));
        assert_eq!(arg.get_long(), Some("conf-file"));
        assert_eq!(arg.get_visible_aliases(), Some(vec!["settings"]));
        assert_eq!(arg.get_visible_short_aliases(), Some(vec!['s']));
    }

    #[test]
    fn test_short_only_id() {
        let option = ConfOption::new().param_names(["-k"]);
        assert_eq!(option.id(), "k");
        assert_eq!(option.arg().get_long(), None);
    }

    #[test]
    fn test_help_lists_formatted_paths_with_app_name() {
        let help = ConfOption::new()
            .app_name("testapp")
            .try_path("/nowhere/special.toml")
            .help_text();
        assert!(help.contains("/nowhere/special.toml"));
        assert!(help.contains("~/.testapprc"));
        assert!(help.contains("~/.config/testapp/conf.toml"));
    }

    #[test]
    fn test_help_hides_paths_without_app_name() {
        let help = ConfOption::new().try_path("/nowhere/special.toml").help_text();
        assert_eq!(help, HELP_TEXT);
    }

    #[test]
    fn test_help_show_default_overrides() {
        let forced = ConfOption::new()
            .try_path("/nowhere/special.toml")
            .show_default(ShowDefault::SearchPaths)
            .help_text();
        assert!(forced.contains("/nowhere/special.toml"));
        assert!(forced.contains("{app}"));

        let hidden = ConfOption::new().app_name("testapp").show_default(ShowDefault::Hide).help_text();
        assert!(!hidden.contains("testapprc"));

        let text = ConfOption::new()
            .show_default(ShowDefault::Text("the usual places".into()))
            .help_text();
        assert!(text.ends_with("[default: the usual places]"));
    }

    #[test]
    fn test_callback_merges_into_context() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("conf.toml");
        fs::write(&path, "val1 = \"YES\"\n[testapp]\nawesomeval = 12345\n").expect("write");

        let mut ctx = Context::new("testapp");
        let tree = ConfOption::new()
            .callback(&mut ctx, Some(&path))
            .expect("callback")
            .expect("tree");

        assert_eq!(ctx.default_map().get("val1").and_then(|v| v.as_str()), Some("YES"));
        assert_eq!(ctx.default_map().get("awesomeval").and_then(|v| v.as_integer()), Some(12345));
        assert!(tree.get("testapp").map(|v| v.is_table()).unwrap_or(false));
    }

    #[test]
    fn test_callback_uses_builder_app_name_over_command_name() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("conf.toml");
        fs::write(&path, "[mytool]\nlevel = 3\n[cmdname]\nlevel = 9\n").expect("write");

        let mut ctx = Context::new("cmdname");
        ConfOption::new().app_name("mytool").callback(&mut ctx, Some(&path)).expect("callback");
        assert_eq!(ctx.default_map().get("level").and_then(|v| v.as_integer()), Some(3));
        assert!(ctx.default_map().contains_key("cmdname"));
    }

    #[test]
    fn test_callback_searches_try_paths_with_command_name() {
        let tmp = TempDir::new().expect("tmp");
        fs::write(tmp.path().join("searchapp.toml"), "found = true\n").expect("write");
        let template = format!("{}/{{app}}.toml", tmp.path().display());

        let mut ctx = Context::new("searchapp");
        let tree = ConfOption::new().try_path(template).callback(&mut ctx, None).expect("callback");
        assert!(tree.is_some());
        assert_eq!(ctx.default_map().get("found").and_then(|v| v.as_bool()), Some(true));
    }

    #[test]
    fn test_existing_file_parser() {
        let tmp = TempDir::new().expect("tmp");
        let file = tmp.path().join("a.toml");
        fs::write(&file, "").expect("write");

        assert!(existing_file(file.to_str().expect("utf8")).is_ok());
        let dir_err = existing_file(tmp.path().to_str().expect("utf8")).unwrap_err();
        assert!(dir_err.contains("is a directory"));
        let missing = tmp.path().join("nope.toml");
        let missing_err = existing_file(missing.to_str().expect("utf8")).unwrap_err();
        assert!(missing_err.contains("does not exist"));
    }
}
