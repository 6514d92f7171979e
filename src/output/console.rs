//! Console output
//!
//! Writes `> <message>` per report, colored by action, and errors in red.

use std::io::{self, Write};
use std::path::Path;

use termcolor::{Color, ColorSpec, StandardStream, WriteColor};

use crate::engine::PathResult;
use crate::error::Error;
use crate::sync::{Action, SyncReport};

use super::config::OutputConfig;

/// Color of an action line, `None` for the terminal default.
pub fn action_color(action: Action) -> Option<Color> {
    match action {
        Action::Add => Some(Color::Green),
        Action::Update => Some(Color::Yellow),
        Action::Remove => Some(Color::Red),
        Action::NoChange => None,
    }
}

/// Write one report line.
pub fn write_report<W: WriteColor>(out: &mut W, report: &SyncReport) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(action_color(report.action)))?;
    write!(out, "> {}", report.message)?;
    out.reset()?;
    writeln!(out)
}

/// Write one failed path.
pub fn write_error<W: WriteColor>(out: &mut W, path: &Path, error: &Error) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(Color::Red)))?;
    write!(out, "barrel: {}: {error}", path.display())?;
    out.reset()?;
    writeln!(out)
}

/// Prints pass results to the terminal.
pub struct ConsoleFormatter {
    config: OutputConfig,
    stdout: StandardStream,
    stderr: StandardStream,
}

impl ConsoleFormatter {
    pub fn new(config: OutputConfig) -> Self {
        let choice = config.color_choice();
        Self {
            config,
            stdout: StandardStream::stdout(choice),
            stderr: StandardStream::stderr(choice),
        }
    }

    /// Print every result. Reports only show up when logging is enabled.
    pub fn print(&mut self, results: &[PathResult]) -> io::Result<()> {
        for result in results {
            match &result.outcome {
                Ok(report) if self.config.log => write_report(&mut self.stdout, report)?,
                Ok(_) => {}
                Err(e) => write_error(&mut self.stderr, &result.path, e)?,
            }
        }
        self.stdout.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Options;
    use std::path::PathBuf;
    use termcolor::Buffer;

    fn report(action: Action) -> SyncReport {
        SyncReport {
            action,
            message: format!("{}: \"src/index.js\"", action.label()),
            directory: PathBuf::from("src"),
            index: PathBuf::from("src/index.js"),
            modules: Vec::new(),
            content: String::new(),
            options: Options::default(),
        }
    }

    #[test]
    fn test_plain_report_line() {
        let mut buf = Buffer::no_color();
        write_report(&mut buf, &report(Action::Add)).unwrap();
        assert_eq!(
            String::from_utf8(buf.into_inner()).unwrap(),
            "> Created: \"src/index.js\"\n"
        );
    }

    #[test]
    fn test_colored_report_line() {
        let mut buf = Buffer::ansi();
        write_report(&mut buf, &report(Action::Remove)).unwrap();
        let text = String::from_utf8(buf.into_inner()).unwrap();
        assert!(text.contains("\x1b[31m"), "expected red in {text:?}");
        assert!(text.contains("> Removed: \"src/index.js\""));
    }

    #[test]
    fn test_action_colors() {
        assert_eq!(action_color(Action::Add), Some(Color::Green));
        assert_eq!(action_color(Action::Update), Some(Color::Yellow));
        assert_eq!(action_color(Action::Remove), Some(Color::Red));
        assert_eq!(action_color(Action::NoChange), None);
    }

    #[test]
    fn test_error_line_names_path() {
        let mut buf = Buffer::no_color();
        write_error(&mut buf, Path::new("src"), &Error::MissingPaths).unwrap();
        let text = String::from_utf8(buf.into_inner()).unwrap();
        assert!(text.starts_with("barrel: src: no paths"));
    }
}
