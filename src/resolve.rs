//! Config file resolution

use crate::error::ConfError;
use crate::paths::CandidatePaths;
use std::path::{Path, PathBuf};

/// Pick the config file for this invocation.
///
/// An explicit path wins outright and is not checked again; clap's value parser
/// has already required it to exist and not be a directory. Otherwise the
/// first expanded candidate that exists is chosen, and must be a regular file.
/// Finding nothing is not an error.
pub fn resolve_config_path(
    explicit: Option<&Path>,
    candidates: &CandidatePaths,
    app_name: &str,
    param: &str,
) -> Result<Option<PathBuf>, ConfError> {
    if let Some(path) = explicit {
        tracing::debug!("Using config file given on the command line: {}", path.display());
        return Ok(Some(path.to_path_buf()));
    }

    let Some(found) = first_existing(candidates.expanded(app_name)) else {
        tracing::debug!("No config file found for {}", app_name);
        return Ok(None);
    };

    if !found.is_file() {
        return Err(ConfError::BadParameter { param: param.to_string(), path: found });
    }
    Ok(Some(found))
}

fn first_existing(paths: Vec<PathBuf>) -> Option<PathBuf> {
    paths.into_iter().find(|path| {
        let exists = path.exists();
        tracing::debug!("Probing config candidate {} (exists: {})", path.display(), exists);
        exists
    })
}
