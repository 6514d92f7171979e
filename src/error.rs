//! Error types for index synchronization.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for barrel operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while planning or synchronizing index files.
#[derive(Error, Debug)]
pub enum Error {
    /// No target directory was declared.
    #[error("no paths to synchronize: at least one path is required")]
    MissingPaths,

    /// The same directory was declared more than once.
    #[error("duplicate paths: {}", .0.join(", "))]
    DuplicatePaths(Vec<String>),

    /// An ignore pattern could not be compiled.
    #[error("invalid ignore pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// A configuration file exists but is not valid.
    #[error("invalid configuration file {}: {source}", path.display())]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A declared directory could not be read.
    #[error("cannot read directory {}: {source}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A directory entry could not be inspected.
    #[error("cannot stat {}: {source}", path.display())]
    Stat {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The existing index file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    ReadIndex {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The index file could not be written.
    #[error("cannot write {}: {source}", path.display())]
    WriteIndex {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The index file could not be removed.
    #[error("cannot remove {}: {source}", path.display())]
    RemoveIndex {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Two entries of one directory sanitize to the same export name.
    #[error(
        "export name '{name}' in {} is produced by both '{first}' and '{second}'",
        directory.display()
    )]
    NameCollision {
        directory: PathBuf,
        name: String,
        first: String,
        second: String,
    },

    /// File watching failed.
    #[error("watch error: {0}")]
    Watch(#[from] notify::Error),
}

impl Error {
    /// Whether the error was raised before any filesystem work started.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Error::MissingPaths
                | Error::DuplicatePaths(_)
                | Error::InvalidPattern { .. }
                | Error::ConfigFile { .. }
        )
    }
}
