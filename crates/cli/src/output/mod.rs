//! Output formatting utilities
//!
//! Every completed unit of work is emitted as one record: plain text lines,
//! compact JSON documents or YAML documents depending on `--format`.

mod formatter;

pub use formatter::Formatter;

use std::str::FromStr;

use jiff::Timestamp;
use jiff::tz::TimeZone;

/// Output format selected by `--format` or the config file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON document per line
    Json,
    /// YAML documents separated by `---`
    #[value(alias = "yml")]
    Yaml,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            other => Err(format!("unsupported output format: {other}")),
        }
    }
}

/// Output configuration derived from CLI flags and the config file
#[derive(Debug, Clone, Default)]
pub struct OutputConfig {
    /// Record format
    pub format: OutputFormat,
    /// Disable colored output
    pub no_color: bool,
}

/// Timestamp as shown in text listings, e.g. `14 Nov 23 22:13 UTC`
pub fn rfc822(ts: &Timestamp) -> String {
    ts.to_zoned(TimeZone::UTC)
        .strftime("%d %b %y %H:%M %Z")
        .to_string()
}

/// Timestamp with a numeric offset, used in structured records
pub fn rfc822z(ts: &Timestamp) -> String {
    ts.to_zoned(TimeZone::UTC)
        .strftime("%d %b %y %H:%M %z")
        .to_string()
}
