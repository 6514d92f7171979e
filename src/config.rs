//! Configuration loading, merging and planning
//!
//! A [`Config`] comes from a discovered config file, from library callers and
//! from the command line. [`Config::plan`] turns it into a [`Plan`]: the list
//! of declared target directories with their effective [`Options`]. The plan
//! also answers whether a sub-directory is itself declared, which is what
//! makes it eligible as a nested module.

use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::filter::IgnoreFilter;
use crate::options::{Options, OptionsOverride};

/// Config file names looked up in every ancestor directory, in priority order.
pub const CONFIG_FILE_NAMES: &[&str] = &["barrel.config.json", ".barrelrc"];

/// Key holding the configuration inside `package.json`.
pub const PACKAGE_JSON_KEY: &str = "barrel";

/// A single path or a list of paths sharing one set of overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        match self {
            OneOrMany::One(path) => std::slice::from_ref(path).iter(),
            OneOrMany::Many(paths) => paths.iter(),
        }
    }
}

/// Path entry with per-path option overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathEntry {
    pub path: OneOrMany,
    #[serde(flatten)]
    pub options: OptionsOverride,
}

/// One element of the `paths` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSpec {
    Path(String),
    Detailed(PathEntry),
}

impl From<&str> for PathSpec {
    fn from(path: &str) -> Self {
        PathSpec::Path(path.to_string())
    }
}

/// Caller or file supplied configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Print one line per processed directory
    pub log: bool,
    /// Dry run: decide but never touch the filesystem
    pub test: bool,
    pub watch: bool,
    pub paths: Vec<PathSpec>,
    /// Global overrides applied to every path
    #[serde(flatten)]
    pub options: OptionsOverride,
}

impl Config {
    /// Config declaring plain paths with default options.
    pub fn with_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paths: paths.into_iter().map(|p| PathSpec::Path(p.into())).collect(),
            ..Default::default()
        }
    }

    /// Layer `later` on top of `self`.
    ///
    /// Option fields set in `later` win, flags are combined, and a non-empty
    /// `paths` list in `later` replaces the one in `self`.
    pub fn merge(self, later: Config) -> Config {
        Config {
            log: self.log || later.log,
            test: self.test || later.test,
            watch: self.watch || later.watch,
            paths: if later.paths.is_empty() {
                self.paths
            } else {
                later.paths
            },
            options: self.options.merged(&later.options),
        }
    }

    /// Options every path starts from before its own overrides.
    pub fn base_options(&self) -> Options {
        Options::default().with(&self.options)
    }

    /// Every declared path string paired with its per-path overrides.
    pub fn declared(&self) -> Vec<(&str, Option<&OptionsOverride>)> {
        let mut declared = Vec::new();
        for spec in &self.paths {
            match spec {
                PathSpec::Path(path) => declared.push((path.as_str(), None)),
                PathSpec::Detailed(entry) => {
                    for path in entry.path.iter() {
                        declared.push((path.as_str(), Some(&entry.options)));
                    }
                }
            }
        }
        declared
    }

    /// Validate the configuration and resolve the effective options of every path.
    ///
    /// Nothing is read from disk here. Duplicate detection compares paths
    /// after lexical normalization and reports the values as written.
    pub fn plan(&self) -> Result<Plan> {
        let declared = self.declared();
        if declared.is_empty() {
            return Err(Error::MissingPaths);
        }

        let mut seen: HashMap<PathBuf, &str> = HashMap::new();
        let mut duplicates: Vec<String> = Vec::new();
        for &(path, _) in &declared {
            let key = normalize_path(Path::new(path));
            if seen.insert(key, path).is_some() && !duplicates.iter().any(|d| d == path) {
                duplicates.push(path.to_string());
            }
        }
        if !duplicates.is_empty() {
            return Err(Error::DuplicatePaths(duplicates));
        }

        let base = self.base_options();
        let mut targets = Vec::with_capacity(declared.len());
        for (path, over) in declared {
            let options = match over {
                Some(over) => base.clone().with(over),
                None => base.clone(),
            };
            // Compile once up front so bad patterns fail before any directory is touched
            IgnoreFilter::new(&options)?;
            targets.push(Target::new(PathBuf::from(path), options));
        }

        Ok(Plan::new(targets))
    }
}

/// A located configuration file and what it contained.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub path: PathBuf,
    pub config: Config,
}

impl ConfigFile {
    /// Load a config file. `package.json` is read through its `barrel` key.
    pub fn load(path: &Path) -> Result<ConfigFile> {
        Self::read(path)?
            .map(|config| ConfigFile {
                path: path.to_path_buf(),
                config,
            })
            .ok_or_else(|| Error::ConfigFile {
                path: path.to_path_buf(),
                source: serde::de::Error::custom(format!("missing \"{PACKAGE_JSON_KEY}\" key")),
            })
    }

    /// Find the nearest config file in `start` or any of its ancestors.
    pub fn discover(start: &Path) -> Result<Option<ConfigFile>> {
        for dir in start.ancestors() {
            let candidates = CONFIG_FILE_NAMES
                .iter()
                .copied()
                .chain(std::iter::once("package.json"));
            for name in candidates {
                let path = dir.join(name);
                if !path.is_file() {
                    continue;
                }
                if let Some(config) = Self::read(&path)? {
                    debug!("using config file {}", path.display());
                    return Ok(Some(ConfigFile { path, config }));
                }
            }
        }
        Ok(None)
    }

    /// `Ok(None)` for a `package.json` without a `barrel` key.
    fn read(path: &Path) -> Result<Option<Config>> {
        let invalid = |source: serde_json::Error| Error::ConfigFile {
            path: path.to_path_buf(),
            source,
        };
        let text = fs::read_to_string(path).map_err(|e| invalid(serde_json::Error::io(e)))?;

        let is_package_json = path.file_name().is_some_and(|n| n == "package.json");
        if !is_package_json {
            return serde_json::from_str(&text).map(Some).map_err(invalid);
        }

        let mut package: serde_json::Value = serde_json::from_str(&text).map_err(invalid)?;
        match package.get_mut(PACKAGE_JSON_KEY) {
            Some(section) => serde_json::from_value(section.take())
                .map(Some)
                .map_err(invalid),
            None => Ok(None),
        }
    }
}

/// Lexically normalize a path: make it absolute against the working
/// directory, drop `.` components and fold `..` into their parent.
///
/// Symlinks are not resolved.
pub fn normalize_path(path: &Path) -> PathBuf {
    let joined;
    let path = if path.is_relative() {
        match std::env::current_dir() {
            Ok(cwd) => {
                joined = cwd.join(path);
                joined.as_path()
            }
            Err(_) => path,
        }
    } else {
        path
    };

    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                } else {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// A declared directory with its effective options.
#[derive(Debug, Clone)]
pub struct Target {
    /// Path as declared
    pub path: PathBuf,
    /// Normalized path used for lookups
    pub key: PathBuf,
    pub options: Options,
}

impl Target {
    pub fn new(path: PathBuf, options: Options) -> Self {
        let key = normalize_path(&path);
        Self { path, key, options }
    }
}

/// Validated set of targets, immutable for the duration of a pass.
#[derive(Debug, Clone, Default)]
pub struct Plan {
    pub targets: Vec<Target>,
    index: HashMap<PathBuf, usize>,
}

impl Plan {
    pub fn new(targets: Vec<Target>) -> Self {
        let index = targets
            .iter()
            .enumerate()
            .map(|(i, t)| (t.key.clone(), i))
            .collect();
        Self { targets, index }
    }

    /// Look up a declared target by path.
    pub fn get(&self, path: &Path) -> Option<&Target> {
        self.index
            .get(&normalize_path(path))
            .map(|&i| &self.targets[i])
    }

    /// The declared target for a sub-directory met while listing a parent
    /// with `parent` options.
    ///
    /// Only targets generating the same kind of index file qualify.
    pub fn nested(&self, path: &Path, parent: &Options) -> Option<&Target> {
        self.get(path)
            .filter(|t| t.options.file_extension == parent.file_extension)
    }

    /// Targets whose directory contains `changed`, in declared order.
    pub fn affected_by(&self, changed: &Path) -> Vec<&Target> {
        let changed = normalize_path(changed);
        self.targets
            .iter()
            .filter(|t| changed.starts_with(&t.key))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestTree;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_path_specs() {
        let config: Config = serde_json::from_str(
            r#"{
                "log": true,
                "fileExtension": "ts",
                "paths": [
                    "src/a",
                    { "path": "src/b", "fileName": "barrel" },
                    { "path": ["src/c", "src/d"], "recursion": false }
                ]
            }"#,
        )
        .unwrap();

        assert!(config.log);
        assert_eq!(config.options.file_extension.as_deref(), Some("ts"));
        let declared: Vec<&str> = config.declared().into_iter().map(|(p, _)| p).collect();
        assert_eq!(declared, vec!["src/a", "src/b", "src/c", "src/d"]);
    }

    #[test]
    fn test_plan_applies_overrides_in_order() {
        let config: Config = serde_json::from_str(
            r#"{
                "fileExtension": "ts",
                "paths": ["a", { "path": "b", "fileExtension": "mjs", "fileName": "barrel" }]
            }"#,
        )
        .unwrap();
        let plan = config.plan().unwrap();

        assert_eq!(plan.targets[0].options.file_extension, "ts");
        assert_eq!(plan.targets[0].options.file_name, "index");
        assert_eq!(plan.targets[1].options.file_extension, "mjs");
        assert_eq!(plan.targets[1].options.file_name, "barrel");
    }

    #[test]
    fn test_plan_rejects_missing_paths() {
        let err = Config::default().plan().unwrap_err();
        assert!(matches!(err, Error::MissingPaths));
    }

    #[test]
    fn test_plan_rejects_duplicates() {
        let err = Config::with_paths(["./a", "./a"]).plan().unwrap_err();
        match err {
            Error::DuplicatePaths(paths) => assert_eq!(paths, vec!["./a".to_string()]),
            other => panic!("expected DuplicatePaths, got {other:?}"),
        }
    }

    #[test]
    fn test_plan_detects_duplicates_after_normalization() {
        let err = Config::with_paths(["src/a", "./src/b/../a/"])
            .plan()
            .unwrap_err();
        assert!(matches!(err, Error::DuplicatePaths(_)));
    }

    #[test]
    fn test_plan_rejects_invalid_patterns() {
        let mut config = Config::with_paths(["a"]);
        config.options.ignore_files = Some(vec!["/(oops/".to_string()]);
        let err = config.plan().unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { .. }));
    }

    #[test]
    fn test_merge_later_wins() {
        let file: Config =
            serde_json::from_str(r#"{ "fileExtension": "ts", "log": true, "paths": ["a"] }"#)
                .unwrap();
        let caller: Config =
            serde_json::from_str(r#"{ "fileName": "barrel", "fileExtension": "mjs" }"#).unwrap();
        let merged = file.merge(caller);

        assert!(merged.log);
        assert_eq!(merged.options.file_extension.as_deref(), Some("mjs"));
        assert_eq!(merged.options.file_name.as_deref(), Some("barrel"));
        assert_eq!(merged.paths, vec![PathSpec::from("a")]);

        let replaced = merged.merge(Config::with_paths(["b"]));
        assert_eq!(replaced.paths, vec![PathSpec::from("b")]);
    }

    #[test]
    fn test_normalize_path() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(normalize_path(Path::new("./a/b/../c")), cwd.join("a/c"));
        assert_eq!(normalize_path(Path::new("/x/./y/")), PathBuf::from("/x/y"));
        assert_eq!(normalize_path(Path::new("/x/y/..")), PathBuf::from("/x"));
    }

    #[test]
    fn test_nested_requires_same_file_extension() {
        let config: Config = serde_json::from_str(
            r#"{ "paths": ["/root", "/root/js", { "path": "/root/ts", "fileExtension": "ts" }] }"#,
        )
        .unwrap();
        let plan = config.plan().unwrap();
        let parent = Options::default();

        assert!(plan.nested(Path::new("/root/js"), &parent).is_some());
        assert!(plan.nested(Path::new("/root/./js"), &parent).is_some());
        assert!(plan.nested(Path::new("/root/ts"), &parent).is_none());
        assert!(plan.nested(Path::new("/root/other"), &parent).is_none());
    }

    #[test]
    fn test_affected_by_matches_ancestors() {
        let plan = Config::with_paths(["/p", "/p/forms", "/q"]).plan().unwrap();
        let affected: Vec<&Path> = plan
            .affected_by(Path::new("/p/forms/input.js"))
            .into_iter()
            .map(|t| t.path.as_path())
            .collect();
        assert_eq!(affected, vec![Path::new("/p"), Path::new("/p/forms")]);
        assert!(plan.affected_by(Path::new("/pq/a.js")).is_empty());
    }

    #[test]
    fn test_discover_walks_upward() {
        let tree = TestTree::new();
        tree.add_file(".barrelrc", r#"{ "fileExtension": "ts", "paths": ["src"] }"#);
        tree.add_dir("src/deep");

        let found = ConfigFile::discover(&tree.path().join("src/deep"))
            .unwrap()
            .unwrap();
        assert_eq!(found.path, tree.path().join(".barrelrc"));
        assert_eq!(found.config.options.file_extension.as_deref(), Some("ts"));
    }

    #[test]
    fn test_discover_reads_package_json_key() {
        let tree = TestTree::new();
        tree.add_file(
            "package.json",
            r#"{ "name": "pkg", "barrel": { "fileName": "barrel", "paths": ["lib"] } }"#,
        );

        let found = ConfigFile::discover(tree.path()).unwrap().unwrap();
        assert_eq!(found.config.options.file_name.as_deref(), Some("barrel"));
        assert_eq!(found.config.paths, vec![PathSpec::from("lib")]);
    }

    #[test]
    fn test_discover_prefers_config_file_over_package_json() {
        let tree = TestTree::new();
        tree.add_file("package.json", r#"{ "barrel": { "fileName": "pkg" } }"#);
        tree.add_file("barrel.config.json", r#"{ "fileName": "file" }"#);

        let found = ConfigFile::discover(tree.path()).unwrap().unwrap();
        assert_eq!(found.config.options.file_name.as_deref(), Some("file"));
    }

    #[test]
    fn test_invalid_config_file_names_the_file() {
        let tree = TestTree::new();
        let path = tree.add_file("barrel.config.json", "{ not json");

        let err = ConfigFile::load(&path).unwrap_err();
        assert!(err.is_config_error());
        assert!(err.to_string().contains("barrel.config.json"));
    }

    #[test]
    fn test_load_package_json_without_key_is_an_error() {
        let tree = TestTree::new();
        let path = tree.add_file("package.json", r#"{ "name": "pkg" }"#);
        assert!(matches!(
            ConfigFile::load(&path),
            Err(Error::ConfigFile { .. })
        ));
    }
}
