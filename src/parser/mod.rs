//! Raw sample parsers
//!
//! Two line grammars are understood:
//!
//! - the native counter dump written by the collector ([`DumpParser`]):
//!
//!   ```text
//!   Timestamp : 2024/01/01 00:00:00
//!   Readings  : \\host\process(app)\id process :
//!   4242
//!   \\host\process(app)\working set :
//!   1048576
//!   End       :
//!   ```
//!
//! - the CSV layout produced by [`crate::codec`] ([`CsvSampleParser`]):
//!
//!   ```text
//!   2024/01/01 00:00:00
//!   id process, 4242
//!   working set, 1048576
//!   ```
//!
//! Blank lines are ignored by both. Line numbers in errors are 1-based and
//! refer to the original input.

mod csv;
mod dump;

pub use csv::CsvSampleParser;
pub use dump::{DumpParser, DumpRun, SkippedCounter};

use crate::error::{Result, SampleError};

/// A non-blank input line with its 1-based position in the original input
#[derive(Debug, Clone, Copy)]
pub(crate) struct Line<'a> {
    pub number: usize,
    pub text: &'a str,
}

/// Drop blank lines, remembering where the rest came from
pub(crate) fn numbered_lines<S: AsRef<str>>(lines: &[S]) -> Vec<Line<'_>> {
    lines
        .iter()
        .enumerate()
        .map(|(i, l)| Line {
            number: i + 1,
            text: l.as_ref(),
        })
        .filter(|l| !l.text.trim().is_empty())
        .collect()
}

/// Parse a reading value line: a bare integer or decimal
pub(crate) fn parse_value(line: &Line<'_>, raw: &str) -> Result<f64> {
    let trimmed = raw.trim();
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(SampleError::MalformedValue {
            line: line.number,
            text: trimmed.to_string(),
        }),
    }
}

/// Self-consistency check between timestamps seen and records produced
pub(crate) fn check_count(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(SampleError::SampleCountMismatch { expected, actual });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbered_lines_skip_blanks_keep_positions() {
        let input = ["a", "", "   ", "b"];
        let lines = numbered_lines(&input);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].number, 1);
        assert_eq!(lines[1].number, 4);
        assert_eq!(lines[1].text, "b");
    }

    #[test]
    fn test_parse_value_accepts_integers_and_decimals() {
        let line = Line {
            number: 7,
            text: "",
        };
        assert_eq!(parse_value(&line, " 42 ").unwrap(), 42.0);
        assert_eq!(parse_value(&line, "0.125").unwrap(), 0.125);
        match parse_value(&line, "abc") {
            Err(SampleError::MalformedValue { line, text }) => {
                assert_eq!(line, 7);
                assert_eq!(text, "abc");
            }
            other => panic!("expected MalformedValue, got {:?}", other),
        }
        assert!(parse_value(&line, "NaN").is_err());
        assert!(parse_value(&line, "inf").is_err());
    }

    #[test]
    fn test_check_count() {
        assert!(check_count(3, 3).is_ok());
        assert!(matches!(
            check_count(3, 2),
            Err(SampleError::SampleCountMismatch {
                expected: 3,
                actual: 2
            })
        ));
    }
}
