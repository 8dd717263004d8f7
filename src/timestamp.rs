//! Timestamp grammar shared by the dump parser, the CSV codec and the store

use chrono::NaiveDateTime;

/// Format of every timestamp written to or read from sample text
pub const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Format of run directory names (filesystem safe)
pub const RUN_DIRECTORY_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Parse a bare `yyyy/MM/dd HH:mm:ss` timestamp
pub fn parse(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text.trim(), TIMESTAMP_FORMAT).ok()
}

/// Render a timestamp as `yyyy/MM/dd HH:mm:ss`
pub fn format(timestamp: &NaiveDateTime) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}
