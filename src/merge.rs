//! Config loading and the set-if-absent merge into the defaults map
//!
//! Top-level keys go straight into the defaults map. A table named after the
//! application is unpacked so its keys act as top-level keys. Any other table
//! is kept whole under its own key. Nothing already in the map is replaced.

use crate::error::ConfError;
use std::fs;
use std::path::Path;
use toml::{Table, Value};

/// Decoded config file, in file order.
pub type ConfigTree = Table;

/// Option id to fallback value, consulted only for options not given on the
/// command line.
pub type DefaultsMap = Table;

/// Read and decode a TOML file. The file is closed before this returns.
pub fn load_config_tree(path: &Path) -> Result<ConfigTree, ConfError> {
    let content = fs::read_to_string(path)
        .map_err(|source| ConfError::Read { path: path.to_path_buf(), source })?;
    toml::from_str(&content).map_err(|source| ConfError::Decode { path: path.to_path_buf(), source })
}

/// Insert `value` under `key` unless the key is already present.
///
/// Returns whether the value was inserted.
pub fn set_if_absent(defaults: &mut DefaultsMap, key: &str, value: &Value) -> bool {
    if defaults.contains_key(key) {
        tracing::debug!("Keeping existing default for '{}'", key);
        return false;
    }
    defaults.insert(key.to_string(), value.clone());
    true
}

/// Merge every entry of `overlay` into `defaults` without overwriting.
pub fn merge_absent(defaults: &mut DefaultsMap, overlay: &Table) {
    for (key, value) in overlay {
        set_if_absent(defaults, key, value);
    }
}

/// Apply a decoded config to the defaults map, honouring the app section.
pub fn merge_config(defaults: &mut DefaultsMap, config: &ConfigTree, app_name: &str) {
    for (name, value) in config {
        match value {
            Value::Table(section) if name == app_name => merge_absent(defaults, section),
            _ => {
                set_if_absent(defaults, name, value);
            }
        }
    }
}
