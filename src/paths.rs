//! Candidate config paths and their expansion
//!
//! Templates may contain `{app}` (or `{app_name}`), a leading `~`, and
//! `$NAME` / `${NAME}` environment references.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::path::{Path, PathBuf};

/// Built-in search locations, tried after any caller-supplied paths.
pub const LOOK_IN: [&str; 2] = ["~/.{app}rc", "~/.config/{app}/conf.toml"];

static ENV_VAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$([A-Za-z0-9_]+|\{[^}]*\})").expect("valid regex"));

/// Ordered list of path templates. First existing match wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidatePaths {
    templates: Vec<String>,
}

impl CandidatePaths {
    /// Caller paths first, in the order given, followed by [`LOOK_IN`].
    pub fn new<I, S>(try_paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let templates = try_paths
            .into_iter()
            .map(Into::into)
            .chain(LOOK_IN.iter().map(|p| p.to_string()))
            .collect();
        Self { templates }
    }

    /// Replace the app placeholder in every template, leaving `~` and
    /// environment references for expansion at resolution time.
    pub fn formatted(&self, app_name: &str) -> Self {
        Self { templates: self.templates.iter().map(|t| format_app(t, app_name)).collect() }
    }

    pub fn templates(&self) -> &[String] {
        &self.templates
    }

    /// Fully expanded paths, in search order.
    pub fn expanded(&self, app_name: &str) -> Vec<PathBuf> {
        self.templates.iter().map(|t| expand_all(app_name, t)).collect()
    }
}

impl Default for CandidatePaths {
    fn default() -> Self {
        Self::new(Vec::<String>::new())
    }
}

fn format_app(template: &str, app_name: &str) -> String {
    template.replace("{app_name}", app_name).replace("{app}", app_name)
}

/// Substitute the app name, then expand home and environment references
/// using the current process environment.
pub fn expand_all(app_name: &str, template: &str) -> PathBuf {
    let home = dirs::home_dir();
    PathBuf::from(expand_with(app_name, template, home.as_deref(), |name| std::env::var(name).ok()))
}

/// Expansion with an explicit home directory and variable lookup.
///
/// Unknown variables and unresolvable `~` stay as literal text.
pub fn expand_with<F>(app_name: &str, template: &str, home: Option<&Path>, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let formatted = format_app(template, app_name);
    let with_home = expand_home(&formatted, home);
    expand_vars(&with_home, lookup)
}

fn expand_home(path: &str, home: Option<&Path>) -> String {
    let Some(rest) = path.strip_prefix('~') else {
        return path.to_string();
    };
    // `~user` forms are not supported
    if !(rest.is_empty() || rest.starts_with('/')) {
        return path.to_string();
    }
    match home {
        Some(home) => {
            let home = home.to_string_lossy();
            let home = home.trim_end_matches('/');
            let home = if home.is_empty() { "/" } else { home };
            if rest.is_empty() {
                home.to_string()
            } else if home == "/" {
                rest.to_string()
            } else {
                format!("{home}{rest}")
            }
        }
        None => path.to_string(),
    }
}

fn expand_vars<F>(path: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    if !path.contains('$') {
        return path.to_string();
    }
    ENV_VAR
        .replace_all(path, |caps: &Captures| {
            let raw = &caps[1];
            let name = raw.strip_prefix('{').and_then(|s| s.strip_suffix('}')).unwrap_or(raw);
            lookup(name).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(name: &str) -> Option<String> {
        match name {
            "CONFDIR" => Some("/etc/conf".to_string()),
            "HOME" => Some("/home/env".to_string()),
            _ => None,
        }
    }

    #[test]
    fn test_builtin_paths_follow_caller_paths() {
        let paths = CandidatePaths::new(["/a.toml", "/b.toml"]);
        assert_eq!(
            paths.templates(),
            &["/a.toml", "/b.toml", "~/.{app}rc", "~/.config/{app}/conf.toml"]
        );
    }

    #[test]
    fn test_formatted_replaces_both_placeholders() {
        let paths = CandidatePaths::new(["/etc/{app_name}.toml"]).formatted("testapp");
        assert_eq!(paths.templates()[0], "/etc/testapp.toml");
        assert_eq!(paths.templates()[1], "~/.testapprc");
        assert_eq!(paths.templates()[2], "~/.config/testapp/conf.toml");
    }

    #[test]
    fn test_expand_home_prefix() {
        let home = Path::new("/home/user");
        assert_eq!(expand_with("app", "~/.{app}rc", Some(home), vars), "/home/user/.apprc");
        assert_eq!(expand_with("app", "~", Some(home), vars), "/home/user");
    }

    #[test]
    fn test_tilde_left_alone_without_home_or_for_other_users() {
        assert_eq!(expand_with("app", "~/.apprc", None, vars), "~/.apprc");
        assert_eq!(
            expand_with("app", "~bob/x", Some(Path::new("/home/user")), vars),
            "~bob/x"
        );
        assert_eq!(
            expand_with("app", "/data/~/x", Some(Path::new("/home/user")), vars),
            "/data/~/x"
        );
    }

    #[test]
    fn test_expand_env_vars_both_forms() {
        assert_eq!(expand_with("app", "$CONFDIR/{app}.conf", None, vars), "/etc/conf/app.conf");
        assert_eq!(expand_with("app", "${CONFDIR}/x", None, vars), "/etc/conf/x");
        assert_eq!(expand_with("app", "$HOME/.{app}rc", None, vars), "/home/env/.apprc");
    }

    #[test]
    fn test_unset_vars_pass_through() {
        assert_eq!(expand_with("app", "$NOPE/x/${ALSO_NOPE}", None, vars), "$NOPE/x/${ALSO_NOPE}");
        assert_eq!(expand_with("app", "cost$", None, vars), "cost$");
    }

    #[test]
    fn test_expanded_keeps_search_order() {
        let paths = CandidatePaths::new(["/first/{app}.toml"]);
        let expanded = paths.expanded("demo");
        assert_eq!(expanded.len(), 3);
        assert_eq!(expanded[0], PathBuf::from("/first/demo.toml"));
    }
}
