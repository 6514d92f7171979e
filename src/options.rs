//! Effective per-directory options and their overrides

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const DEFAULT_FILE_EXTENSION: &str = "js";
pub const DEFAULT_FILE_NAME: &str = "index";
pub const DEFAULT_MODULE_TEMPLATE: &str = "export { default as {name} } from '{path}';";
pub const DEFAULT_RECURSION_TEMPLATE: &str = "import * as {name} from '{path}';";
pub const DEFAULT_RECURSION_TEMPLATE_EXPORT: &str = "export { {moduleList} };";

/// Options that drive how one directory is listed and how its index file is rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Options {
    /// Extension of the generated index file
    pub file_extension: String,
    /// Append `/<fileName>.<fileExtension>` to nested import paths
    pub file_extension_in_path: bool,
    /// Base name of the generated index file
    pub file_name: String,
    /// Append `/<fileName>` to nested import paths
    pub file_name_in_path: bool,
    /// Bare module names, `/regex/` literals or glob patterns to skip
    pub ignore_files: Vec<String>,
    /// Extension of exported modules. Falls back to `file_extension`.
    pub module_extension: Option<String>,
    /// Keep the module extension in emitted import paths
    pub module_extension_in_path: bool,
    pub module_template: String,
    /// Treat declared sub-directories as nested modules
    pub recursion: bool,
    pub recursion_template: String,
    pub recursion_template_export: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            file_extension: DEFAULT_FILE_EXTENSION.to_string(),
            file_extension_in_path: false,
            file_name: DEFAULT_FILE_NAME.to_string(),
            file_name_in_path: false,
            ignore_files: Vec::new(),
            module_extension: None,
            module_extension_in_path: false,
            module_template: DEFAULT_MODULE_TEMPLATE.to_string(),
            recursion: true,
            recursion_template: DEFAULT_RECURSION_TEMPLATE.to_string(),
            recursion_template_export: DEFAULT_RECURSION_TEMPLATE_EXPORT.to_string(),
        }
    }
}

impl Options {
    /// Extension that exported modules must carry.
    pub fn module_extension(&self) -> &str {
        self.module_extension
            .as_deref()
            .unwrap_or(&self.file_extension)
    }

    /// File name of the generated index, e.g. `index.js`.
    pub fn index_file_name(&self) -> String {
        format!("{}.{}", self.file_name, self.file_extension)
    }

    /// Location of the generated index inside `dir`.
    pub fn index_path(&self, dir: &Path) -> PathBuf {
        dir.join(self.index_file_name())
    }

    /// Suffix appended to the import path of a nested directory module.
    pub fn nested_path_suffix(&self) -> String {
        if self.file_extension_in_path {
            format!("/{}.{}", self.file_name, self.file_extension)
        } else if self.file_name_in_path {
            format!("/{}", self.file_name)
        } else {
            String::new()
        }
    }

    /// Apply an override on top of these options. Fields set in `over` win.
    pub fn with(mut self, over: &OptionsOverride) -> Self {
        if let Some(v) = &over.file_extension {
            self.file_extension = v.clone();
        }
        if let Some(v) = over.file_extension_in_path {
            self.file_extension_in_path = v;
        }
        if let Some(v) = &over.file_name {
            self.file_name = v.clone();
        }
        if let Some(v) = over.file_name_in_path {
            self.file_name_in_path = v;
        }
        if let Some(v) = &over.ignore_files {
            self.ignore_files = v.clone();
        }
        if let Some(v) = &over.module_extension {
            self.module_extension = Some(v.clone());
        }
        if let Some(v) = over.module_extension_in_path {
            self.module_extension_in_path = v;
        }
        if let Some(v) = &over.module_template {
            self.module_template = v.clone();
        }
        if let Some(v) = over.recursion {
            self.recursion = v;
        }
        if let Some(v) = &over.recursion_template {
            self.recursion_template = v.clone();
        }
        if let Some(v) = &over.recursion_template_export {
            self.recursion_template_export = v.clone();
        }
        self
    }
}

/// A partial set of options, as found in config files, caller input and `paths` entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_extension: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_extension_in_path: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name_in_path: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_files: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_extension: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_extension_in_path: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_template: Option<String>,
    #[serde(
        default,
        alias = "recursiveSearch",
        skip_serializing_if = "Option::is_none"
    )]
    pub recursion: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recursion_template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recursion_template_export: Option<String>,
}

impl OptionsOverride {
    /// Merge `later` into `self`; fields set in `later` win.
    pub fn merged(&self, later: &OptionsOverride) -> OptionsOverride {
        fn pick<T: Clone>(early: &Option<T>, late: &Option<T>) -> Option<T> {
            late.clone().or_else(|| early.clone())
        }
        OptionsOverride {
            file_extension: pick(&self.file_extension, &later.file_extension),
            file_extension_in_path: pick(
                &self.file_extension_in_path,
                &later.file_extension_in_path,
            ),
            file_name: pick(&self.file_name, &later.file_name),
            file_name_in_path: pick(&self.file_name_in_path, &later.file_name_in_path),
            ignore_files: pick(&self.ignore_files, &later.ignore_files),
            module_extension: pick(&self.module_extension, &later.module_extension),
            module_extension_in_path: pick(
                &self.module_extension_in_path,
                &later.module_extension_in_path,
            ),
            module_template: pick(&self.module_template, &later.module_template),
            recursion: pick(&self.recursion, &later.recursion),
            recursion_template: pick(&self.recursion_template, &later.recursion_template),
            recursion_template_export: pick(
                &self.recursion_template_export,
                &later.recursion_template_export,
            ),
        }
    }
}
