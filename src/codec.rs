//! Line-oriented sample encoding
//!
//! Each sample is written as its timestamp followed by one `name, value`
//! line per reading, and samples are separated by a blank line:
//!
//! ```text
//! 2024/01/01 00:00:00
//! id process, 4242
//! working set, 1048576
//!
//! 2024/01/01 00:00:05
//! id process, 4242
//! working set, 1052672.5
//! ```
//!
//! Decoding goes through [`CsvSampleParser`], so malformed input fails with
//! the same errors as any other parse.

use crate::error::Result;
use crate::parser::CsvSampleParser;
use crate::sample::Sample;
use crate::timestamp;

/// File extension of encoded sample files
pub const FILE_EXTENSION: &str = "csv";

/// Separator between a reading name and its value
pub const SEPARATOR: &str = ", ";

const MAX_FRACTION_DIGITS: usize = 8;

/// Render a value as an integer when whole, else with up to 8 fractional digits
pub fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        return format!("{:.0}", value);
    }
    let fixed = format!("{:.*}", MAX_FRACTION_DIGITS, value);
    fixed.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Encode one sample, ending with a newline
pub fn encode_sample(sample: &Sample) -> String {
    let mut out = timestamp::format(&sample.timestamp());
    out.push('\n');
    for reading in sample.readings() {
        out.push_str(reading.name());
        out.push_str(SEPARATOR);
        out.push_str(&format_value(reading.value()));
        out.push('\n');
    }
    out
}

/// Encode samples in order, separated by blank lines
pub fn encode_samples<'a, I>(samples: I) -> String
where
    I: IntoIterator<Item = &'a Sample>,
{
    samples
        .into_iter()
        .map(encode_sample)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Decode every sample in `text`
pub fn decode(text: &str) -> Result<Vec<Sample>> {
    CsvSampleParser::new().parse_str(text)
}

/// Decode every sample in a sequence of lines
pub fn decode_lines<S: AsRef<str>>(lines: &[S]) -> Result<Vec<Sample>> {
    CsvSampleParser::new().parse(lines)
}
