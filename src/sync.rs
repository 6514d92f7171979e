//! Index file synchronization
//!
//! One pass over a declared directory: list its modules, render the index,
//! compare with what is on disk and create, update or remove the file.

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::config::{Plan, Target};
use crate::contents::{equivalent, synthesize};
use crate::error::{Error, Result};
use crate::listing::list_declared;
use crate::module::Module;
use crate::options::Options;

/// Prefix of the temporary file an index is written through.
pub const TEMP_PREFIX: &str = ".barrel-";

/// What a pass did, or would do in test mode, to the index file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    Add,
    Update,
    Remove,
    NoChange,
}

impl Action {
    /// Verb used in report messages.
    pub fn label(self) -> &'static str {
        match self {
            Action::Add => "Created",
            Action::Update => "Updated",
            Action::Remove => "Removed",
            Action::NoChange => "No changes",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of one directory pass.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub action: Action,
    pub message: String,
    pub directory: PathBuf,
    pub index: PathBuf,
    pub modules: Vec<Module>,
    pub content: String,
    pub options: Options,
}

/// Decide the action from the current index content and the rendered one.
///
/// `existing` is `None` when no index file exists.
pub fn decide(existing: Option<&str>, rendered: &str, has_modules: bool) -> Action {
    match (existing, has_modules) {
        (None, false) => Action::NoChange,
        (None, true) => Action::Add,
        (Some(_), false) => Action::Remove,
        (Some(current), true) if equivalent(current, rendered) => Action::NoChange,
        (Some(_), true) => Action::Update,
    }
}

/// Synchronize the index file of a declared target.
///
/// With `dry_run` the decision is made exactly as in a real run, including
/// reading the current index, but nothing is written or removed.
pub fn sync_target(target: &Target, plan: &Plan, dry_run: bool) -> Result<SyncReport> {
    sync_directory(&target.path, &target.options, plan, dry_run)
}

/// Synchronize the index file of `dir` with explicit options.
pub fn sync_directory(
    dir: &Path,
    options: &Options,
    plan: &Plan,
    dry_run: bool,
) -> Result<SyncReport> {
    let modules = list_declared(dir, options, plan)?;
    let content = synthesize(&modules, options, None);
    let index = options.index_path(dir);

    let action = if modules.is_empty() {
        decide(index_exists(&index)?.then_some(""), &content, false)
    } else {
        let existing = read_index(&index)?;
        decide(existing.as_deref(), &content, true)
    };

    if dry_run {
        debug!("dry run, {} left as is", index.display());
    } else {
        apply(action, &index, &content)?;
    }

    Ok(SyncReport {
        action,
        message: format!("{}: \"{}\"", action.label(), index.display()),
        directory: dir.to_path_buf(),
        index,
        modules,
        content,
        options: options.clone(),
    })
}

fn apply(action: Action, index: &Path, content: &str) -> Result<()> {
    match action {
        Action::Add | Action::Update => {
            write_atomic(index, content).map_err(|source| Error::WriteIndex {
                path: index.to_path_buf(),
                source,
            })?;
            info!("{action} {}", index.display());
        }
        Action::Remove => {
            fs::remove_file(index).map_err(|source| Error::RemoveIndex {
                path: index.to_path_buf(),
                source,
            })?;
            info!("{action} {}", index.display());
        }
        Action::NoChange => {}
    }
    Ok(())
}

fn index_exists(index: &Path) -> Result<bool> {
    index.try_exists().map_err(|source| Error::ReadIndex {
        path: index.to_path_buf(),
        source,
    })
}

/// Current index content, `None` when there is no index file.
///
/// Invalid UTF-8 is replaced rather than rejected, the file is regenerated anyway.
fn read_index(index: &Path) -> Result<Option<String>> {
    match fs::read(index) {
        Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(Error::ReadIndex {
            path: index.to_path_buf(),
            source,
        }),
    }
}

/// Write through a temporary file in the same directory, then rename over `path`.
///
/// The permissions of an existing file are kept.
fn write_atomic(path: &Path, content: &str) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .suffix(".tmp")
        .tempfile_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.as_file().sync_all()?;

    match fs::metadata(path) {
        Ok(existing) => tmp.as_file().set_permissions(existing.permissions())?,
        Err(_) => set_default_permissions(tmp.as_file())?,
    }

    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(unix)]
fn set_default_permissions(file: &fs::File) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn set_default_permissions(_file: &fs::File) -> io::Result<()> {
    Ok(())
}
