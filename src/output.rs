//! # User-Facing Status Output
//!
//! Status lines (per-source warnings, the final destination, the "nothing
//! written" message) are printed to stderr so that stdout can carry the
//! generated YAML unchanged.
//!
//! ## Respecting User Preferences
//!
//! - `--color=never|always|auto` - CLI flag for color control
//! - `NO_COLOR` - Disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables colors
//! - `CLICOLOR_FORCE=1` - Forces colors even in non-TTY
//! - `TERM=dumb` - Disables colors for dumb terminals
//!
//! ## Usage
//!
//! ```rust,ignore
//! use clouds_gen::output::{OutputConfig, Reporter};
//!
//! let reporter = Reporter::new(OutputConfig::from_env_and_flag("auto"));
//! reporter.success("Wrote 3 cloud entries to stdout");
//! ```

use std::env;

use console::style;

use crate::merge::RunSummary;

/// Output configuration for controlling colors and emojis.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colors and emojis should be used in status lines.
    pub use_color: bool,
}

impl OutputConfig {
    /// Create an output configuration from environment and CLI flag.
    ///
    /// # Arguments
    /// * `color_flag` - The value of the --color CLI flag: "always", "never", or "auto"
    ///
    /// # Behavior
    /// - `--color=always`: Force colors on (overrides NO_COLOR)
    /// - `--color=never`: Force colors off
    /// - `--color=auto`: Detect based on environment
    ///
    /// In auto mode, colors are disabled if:
    /// - `NO_COLOR` environment variable is set (any value, including empty)
    /// - `CLICOLOR=0` is set
    /// - `TERM=dumb` is set
    /// - stderr is not a TTY (unless `CLICOLOR_FORCE=1`)
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };
        Self { use_color }
    }

    /// Detect whether stderr should get colors, based on environment.
    fn detect_color_support() -> bool {
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }
        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }
        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }
        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }
        console::Term::stderr().features().colors_supported()
    }

    /// Create a configuration with colors always enabled.
    #[cfg(test)]
    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    /// Create a configuration with colors always disabled.
    #[cfg(test)]
    pub fn without_color() -> Self {
        Self { use_color: false }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Returns the appropriate string based on color configuration.
///
/// When colors are enabled, returns the emoji. When disabled, returns
/// the plain text alternative.
///
/// # Arguments
/// * `config` - The output configuration
/// * `emoji_str` - The emoji to use when colors are enabled
/// * `plain` - The plain text to use when colors are disabled
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}

/// Formats status lines for stderr.
///
/// The `*_line` methods only build the text; the unsuffixed methods print
/// it. Every line starts with a tag (`✅`/`[OK]`, `⚠️`/`[WARN]`,
/// `❌`/`[ERR]`) chosen by [`emoji`].
#[derive(Debug, Clone)]
pub struct Reporter {
    /// Color settings applied to every line.
    config: OutputConfig,
}

impl Reporter {
    /// Create a reporter using `config` for colors and tags.
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    /// A success line, green when colors are enabled.
    pub fn success_line(&self, message: &str) -> String {
        let tag = emoji(&self.config, "✅", "[OK]");
        if self.config.use_color {
            format!("{} {}", tag, style(message).green())
        } else {
            format!("{} {}", tag, message)
        }
    }

    /// A warning line, yellow when colors are enabled.
    pub fn warning_line(&self, message: &str) -> String {
        let tag = emoji(&self.config, "⚠️", "[WARN]");
        if self.config.use_color {
            format!("{} {}", tag, style(message).yellow())
        } else {
            format!("{} {}", tag, message)
        }
    }

    /// An error line, bold red when colors are enabled.
    pub fn error_line(&self, message: &str) -> String {
        let tag = emoji(&self.config, "❌", "[ERR]");
        if self.config.use_color {
            format!("{} {}", tag, style(message).red().bold())
        } else {
            format!("{} {}", tag, message)
        }
    }

    /// Lines describing skipped sources.
    ///
    /// # Returns
    /// One warning per failed source (`<source>: <reason>`) followed by a
    /// count line, or nothing when every source succeeded.
    pub fn summary_lines(&self, summary: &RunSummary) -> Vec<String> {
        if !summary.has_failures() {
            return Vec::new();
        }
        let mut lines: Vec<String> = summary
            .failures()
            .map(|(source, outcome)| self.warning_line(&format!("{}: {}", source, outcome)))
            .collect();
        lines.push(self.warning_line(&format!(
            "{} of {} sources failed; this did not block the other {}",
            summary.failed(),
            summary.outcomes().len(),
            summary.succeeded()
        )));
        lines
    }

    pub fn success(&self, message: &str) {
        eprintln!("{}", self.success_line(message));
    }

    pub fn warning(&self, message: &str) {
        eprintln!("{}", self.warning_line(message));
    }

    pub fn error(&self, message: &str) {
        eprintln!("{}", self.error_line(message));
    }

    /// Print [`Reporter::summary_lines`] to stderr.
    pub fn summary(&self, summary: &RunSummary) {
        for line in self.summary_lines(summary) {
            eprintln!("{}", line);
        }
    }
}
