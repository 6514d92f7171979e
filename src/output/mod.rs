//! Report formatting and display
//!
//! - `config` - Output configuration
//! - `console` - Colored action lines on stdout, errors on stderr
//! - `json` - JSON output

mod config;
mod console;
mod json;

pub use config::OutputConfig;
pub use console::{ConsoleFormatter, action_color, write_error, write_report};
pub use json::{JsonEntry, print_json, to_json};
