//! Ignore filter deciding which files of a directory are exported

use glob::Pattern;
use regex::Regex;

use crate::error::{Error, Result};
use crate::options::Options;

/// One compiled ignore rule.
#[derive(Debug, Clone)]
enum Rule {
    Regex(Regex),
    Glob(Pattern),
}

impl Rule {
    fn matches(&self, file_name: &str, stem: &str) -> bool {
        match self {
            Rule::Regex(re) => re.is_match(file_name),
            Rule::Glob(pattern) => pattern.matches(file_name) || pattern.matches(stem),
        }
    }
}

/// Composed ignore rules for one set of options.
///
/// A file is ignored when it lacks the module extension or when any rule
/// matches its name. The rules are, in order: declaration/spec/test
/// suffixes, the generated index file itself, then one rule per
/// `ignore_files` entry.
#[derive(Debug, Clone)]
pub struct IgnoreFilter {
    extension: Regex,
    suffix: String,
    rules: Vec<Rule>,
}

impl IgnoreFilter {
    pub fn new(options: &Options) -> Result<Self> {
        let module_ext = regex::escape(options.module_extension());
        let index_ext = regex::escape(&options.file_extension);

        let mut rules = vec![
            Rule::Regex(compile(&format!(r"\.(?:d|spec|test)\.{module_ext}$"))?),
            Rule::Regex(compile(&format!(
                r"^{}\.{index_ext}$",
                regex::escape(&options.file_name)
            ))?),
        ];
        for entry in &options.ignore_files {
            rules.push(compile_entry(entry, options.module_extension())?);
        }

        Ok(Self {
            extension: compile(&format!(r"\.{module_ext}$"))?,
            suffix: format!(".{}", options.module_extension()),
            rules,
        })
    }

    /// Check if a file name should be left out of the index.
    pub fn is_ignored(&self, file_name: &str) -> bool {
        if !self.extension.is_match(file_name) {
            return true;
        }
        let stem = self.stem(file_name);
        self.rules.iter().any(|rule| rule.matches(file_name, stem))
    }

    /// File name without the module extension.
    pub fn stem<'a>(&self, file_name: &'a str) -> &'a str {
        file_name.strip_suffix(&self.suffix).unwrap_or(file_name)
    }
}

/// Compile one `ignore_files` entry.
fn compile_entry(entry: &str, module_ext: &str) -> Result<Rule> {
    if let Some(body) = regex_literal(entry) {
        return Ok(Rule::Regex(compile(body)?));
    }
    if is_glob(entry) {
        return Pattern::new(entry)
            .map(Rule::Glob)
            .map_err(|e| Error::InvalidPattern {
                pattern: entry.to_string(),
                reason: e.to_string(),
            });
    }
    let name = entry
        .strip_suffix(&format!(".{module_ext}"))
        .unwrap_or(entry);
    Ok(Rule::Regex(compile(&format!(
        r"^{}\.{}$",
        regex::escape(name),
        regex::escape(module_ext)
    ))?))
}

/// Body of a `/.../` literal, if `entry` is one.
fn regex_literal(entry: &str) -> Option<&str> {
    if entry.len() >= 2 {
        entry.strip_prefix('/')?.strip_suffix('/')
    } else {
        None
    }
}

fn is_glob(entry: &str) -> bool {
    entry.contains(['*', '?', '['])
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| Error::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}
