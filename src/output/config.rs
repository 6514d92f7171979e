//! Output configuration types

/// Configuration for output formatting.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    pub use_color: bool,
    /// Print one line per processed directory. Errors are printed regardless.
    pub log: bool,
}

impl OutputConfig {
    pub fn color_choice(&self) -> termcolor::ColorChoice {
        if self.use_color {
            termcolor::ColorChoice::Always
        } else {
            termcolor::ColorChoice::Never
        }
    }
}
