//! Discovery of directories carrying a `.barrelrc.json` marker
//!
//! A marker declares its directory as a target without listing it in the
//! configuration. Its content, if any, holds option overrides for that
//! directory alone.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use tracing::debug;

use crate::config::{Config, OneOrMany, PathEntry, PathSpec, normalize_path};
use crate::error::{Error, Result};
use crate::options::OptionsOverride;

/// File name of the per-directory marker.
pub const MARKER: &str = ".barrelrc.json";

/// Every directory under `root` (inclusive) holding a marker, sorted.
///
/// Hidden directories and paths excluded by ignore files are not searched.
pub fn marker_dirs(root: &Path) -> Vec<PathBuf> {
    let walker = WalkBuilder::new(root)
        .hidden(true)
        .ignore(true)
        .git_ignore(true)
        .git_exclude(true)
        .require_git(false)
        .follow_links(false)
        .build();

    let mut dirs: Vec<PathBuf> = walker
        .flatten()
        .filter(|entry| entry.file_type().is_some_and(|t| t.is_dir()))
        .map(|entry| entry.into_path())
        .filter(|dir| dir.join(MARKER).is_file())
        .collect();
    dirs.sort();
    dirs
}

/// Read the overrides of a marker file. An empty marker means no overrides.
pub fn load_marker(dir: &Path) -> Result<OptionsOverride> {
    let path = dir.join(MARKER);
    let invalid = |source: serde_json::Error| Error::ConfigFile {
        path: path.clone(),
        source,
    };
    let text = fs::read_to_string(&path).map_err(|e| invalid(serde_json::Error::io(e)))?;
    if text.trim().is_empty() {
        return Ok(OptionsOverride::default());
    }
    serde_json::from_str(&text).map_err(invalid)
}

/// Add every marked directory under `root` to the declared paths of `config`.
///
/// Directories already declared keep their explicit settings.
pub fn extend(mut config: Config, root: &Path) -> Result<Config> {
    let declared: HashSet<PathBuf> = config
        .declared()
        .into_iter()
        .map(|(path, _)| normalize_path(Path::new(path)))
        .collect();

    for dir in marker_dirs(root) {
        if declared.contains(&normalize_path(&dir)) {
            debug!("{} already declared, marker ignored", dir.display());
            continue;
        }
        let options = load_marker(&dir)?;
        debug!("discovered {}", dir.display());
        config.paths.push(PathSpec::Detailed(PathEntry {
            path: OneOrMany::One(dir.display().to_string()),
            options,
        }));
    }
    Ok(config)
}
