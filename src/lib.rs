//! Barrel - generates and keeps in sync index files re-exporting the modules of a directory

pub mod config;
pub mod contents;
pub mod discover;
pub mod engine;
pub mod error;
pub mod filter;
pub mod listing;
pub mod module;
pub mod name;
pub mod options;
pub mod output;
pub mod sync;
pub mod watch;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::{Config, ConfigFile, PathSpec, Plan, Target};
pub use engine::{PathResult, run, run_plan};
pub use error::{Error, Result};
pub use module::Module;
pub use options::{Options, OptionsOverride};
pub use output::{ConsoleFormatter, OutputConfig, print_json};
pub use sync::{Action, SyncReport};
