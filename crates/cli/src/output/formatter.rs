//! Output formatter for text, JSON and YAML records
//!
//! Records go to stdout, one per completed unit of work. Errors go to stderr
//! so piped output stays parseable.

use console::style;
use serde::Serialize;

use super::{OutputConfig, OutputFormat};

/// Formatter for CLI output
#[derive(Debug, Clone, Default)]
pub struct Formatter {
    config: OutputConfig,
}

impl Formatter {
    /// Create a new formatter with the given configuration
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    /// Selected output format
    pub fn format(&self) -> OutputFormat {
        self.config.format
    }

    /// Render a record without printing it
    ///
    /// `line` is the human-readable form used by the text format; the
    /// structured formats serialize `record` instead.
    pub fn render<T: Serialize>(&self, record: &T, line: &str) -> Result<String, String> {
        match self.config.format {
            OutputFormat::Text => Ok(line.to_string()),
            OutputFormat::Json => serde_json::to_string(record).map_err(|e| e.to_string()),
            OutputFormat::Yaml => serde_yaml::to_string(record)
                .map(|doc| format!("---\n{}", doc.trim_end()))
                .map_err(|e| e.to_string()),
        }
    }

    /// Emit one record to stdout
    pub fn emit<T: Serialize>(&self, record: &T, line: &str) {
        match self.render(record, line) {
            Ok(out) => println!("{out}"),
            Err(e) => self.error(&format!("failed to serialize output: {e}")),
        }
    }

    fn error_line(&self, message: &str) -> String {
        let mut tag = style("[error]").for_stderr().red();
        if self.config.no_color {
            tag = tag.force_styling(false);
        }
        format!("{tag} {message}")
    }

    /// Output an error message to stderr
    pub fn error(&self, message: &str) {
        eprintln!("{}", self.error_line(message));
    }
}
