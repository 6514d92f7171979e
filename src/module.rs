//! Module resolution for single directory entries

use std::fs::{self, DirEntry};
use std::io;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::Plan;
use crate::error::{Error, Result};
use crate::filter::IgnoreFilter;
use crate::listing;
use crate::name::sanitize;
use crate::options::Options;

/// One exportable unit of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    /// Sanitized export identifier
    pub name: String,
    /// Import path emitted into the index file
    pub path: String,
    /// Nested directory with its own non-empty index
    pub has_recursion: bool,
}

impl Module {
    pub fn file(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            has_recursion: false,
        }
    }

    pub fn nested(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            has_recursion: true,
        }
    }
}

/// Everything the resolver needs besides the entry itself.
pub struct Resolver<'a> {
    pub options: &'a Options,
    pub filter: &'a IgnoreFilter,
    pub plan: &'a Plan,
}

impl Resolver<'_> {
    /// Resolve one directory entry.
    ///
    /// Returns `Ok(None)` when the entry contributes nothing to the index.
    /// Failing to stat the entry, or failing inside a nested listing, is an
    /// error for the whole directory.
    pub fn resolve(&self, entry: &DirEntry) -> Result<Option<Module>> {
        let path = entry.path();
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            debug!("skipping non UTF-8 entry {}", path.display());
            return Ok(None);
        };

        let metadata = match fs::metadata(&path) {
            Ok(metadata) => metadata,
            // Removed since the directory was read, e.g. a temporary file being persisted
            Err(e) if e.kind() == io::ErrorKind::NotFound && fs::symlink_metadata(&path).is_err() => {
                debug!("{} vanished while listing", path.display());
                return Ok(None);
            }
            Err(source) => return Err(Error::Stat { path, source }),
        };

        if metadata.is_dir() {
            // Symlinked directories are never descended into to keep recursion cycle free
            let is_symlink = entry.file_type().is_ok_and(|t| t.is_symlink());
            if is_symlink {
                debug!("not following symlinked directory {}", path.display());
                return Ok(None);
            }
            return self.resolve_directory(&path, name);
        }

        Ok(self.resolve_file(name))
    }

    fn resolve_directory(&self, path: &Path, dir_name: &str) -> Result<Option<Module>> {
        if !self.options.recursion {
            return Ok(None);
        }
        let Some(child) = self.plan.nested(path, self.options) else {
            return Ok(None);
        };

        let modules = listing::list_modules(path, &child.options, self.plan)?;
        Ok(as_directory(dir_name, &modules, &child.options))
    }

    fn resolve_file(&self, file_name: &str) -> Option<Module> {
        if self.filter.is_ignored(file_name) {
            return None;
        }
        as_file(file_name, self.filter.stem(file_name), self.options)
    }
}

/// Module for a nested directory, or `None` when its listing is empty.
pub fn as_directory(dir_name: &str, modules: &[Module], child: &Options) -> Option<Module> {
    if modules.is_empty() {
        return None;
    }
    let name = sanitize(dir_name);
    if name.is_empty() {
        warn!("directory '{dir_name}' has no usable export name, skipping");
        return None;
    }
    Some(Module::nested(
        name,
        format!("./{}{}", dir_name, child.nested_path_suffix()),
    ))
}

/// Module for a file that passed the ignore filter.
pub fn as_file(file_name: &str, stem: &str, options: &Options) -> Option<Module> {
    let name = sanitize(stem);
    if name.is_empty() {
        warn!("file '{file_name}' has no usable export name, skipping");
        return None;
    }
    let path = if options.module_extension_in_path {
        format!("./{file_name}")
    } else {
        format!("./{stem}")
    };
    Some(Module::file(name, path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_as_file_paths() {
        let options = Options::default();
        assert_eq!(
            as_file("my-button.js", "my-button", &options),
            Some(Module::file("myButton", "./my-button"))
        );

        let options = Options {
            module_extension_in_path: true,
            ..Default::default()
        };
        assert_eq!(
            as_file("my-button.js", "my-button", &options),
            Some(Module::file("myButton", "./my-button.js"))
        );
    }

    #[test]
    fn test_as_file_without_usable_name() {
        assert_eq!(as_file("123.js", "123", &Options::default()), None);
    }

    #[test]
    fn test_as_directory_requires_modules() {
        let options = Options::default();
        assert_eq!(as_directory("forms", &[], &options), None);

        let inner = vec![Module::file("input", "./input")];
        assert_eq!(
            as_directory("forms", &inner, &options),
            Some(Module::nested("forms", "./forms"))
        );
    }

    #[test]
    fn test_as_directory_path_suffix_follows_child_options() {
        let inner = vec![Module::file("input", "./input")];
        let child = Options {
            file_extension_in_path: true,
            file_extension: "mjs".to_string(),
            ..Default::default()
        };
        assert_eq!(
            as_directory("form-fields", &inner, &child),
            Some(Module::nested("formFields", "./form-fields/index.mjs"))
        );
    }
}
