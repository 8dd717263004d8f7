//! CSV sample layout
//!
//! Records are delimited by bare timestamp lines; there is no end marker,
//! so a record runs until the next timestamp or the end of input.

use super::{check_count, numbered_lines, parse_value, Line};
use crate::error::{Result, SampleError};
use crate::sample::{Reading, Sample};
use crate::timestamp;
use chrono::NaiveDateTime;
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

// group 1 = reading name, group 2 = value
fn entry_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(.+),\s*([^,]+)$").expect("entry pattern is valid"))
}

/// Parser for the `name, value` layout written by [`crate::codec`]
#[derive(Debug, Clone, Default)]
pub struct CsvSampleParser {
    ignore_trailing_incomplete: bool,
}

impl CsvSampleParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tolerate a final timestamp with no entries after it
    pub fn ignore_trailing_incomplete(mut self, ignore: bool) -> Self {
        self.ignore_trailing_incomplete = ignore;
        self
    }

    pub fn parse_str(&self, text: &str) -> Result<Vec<Sample>> {
        let lines: Vec<&str> = text.lines().collect();
        self.parse(&lines)
    }

    /// Parse an ordered sequence of CSV lines into samples, in input order
    pub fn parse<S: AsRef<str>>(&self, lines: &[S]) -> Result<Vec<Sample>> {
        let lines = numbered_lines(lines);
        let Some(first) = lines.first() else {
            return Ok(Vec::new());
        };
        if timestamp::parse(first.text).is_none() {
            return Err(SampleError::MalformedTimestamp {
                line: first.number,
                text: first.text.trim().to_string(),
            });
        }

        let mut records: Vec<Record<'_>> = Vec::new();
        for line in lines {
            match timestamp::parse(line.text) {
                Some(timestamp) => records.push(Record {
                    start: line.number,
                    timestamp,
                    entries: Vec::new(),
                }),
                // the first line is a timestamp, so a record is always open here
                None => {
                    if let Some(record) = records.last_mut() {
                        record.entries.push(line);
                    }
                }
            }
        }

        let mut expected = records.len();
        if self.ignore_trailing_incomplete
            && records.last().is_some_and(|r| r.entries.is_empty())
        {
            debug!("dropping trailing sample with no entries");
            records.pop();
            expected -= 1;
        }

        let samples = records
            .into_iter()
            .map(Record::finish)
            .collect::<Result<Vec<_>>>()?;
        check_count(expected, samples.len())?;
        debug!(samples = samples.len(), "parsed csv samples");
        Ok(samples)
    }
}

struct Record<'a> {
    start: usize,
    timestamp: NaiveDateTime,
    entries: Vec<Line<'a>>,
}

impl Record<'_> {
    fn finish(self) -> Result<Sample> {
        if self.entries.is_empty() {
            return Err(SampleError::IncompleteSample {
                line: self.start,
                reason: "no readings",
            });
        }
        let readings = self
            .entries
            .iter()
            .map(|line| {
                let trimmed = line.text.trim();
                let caps = entry_pattern().captures(trimmed).ok_or_else(|| {
                    SampleError::MalformedCounterLine {
                        line: line.number,
                        text: trimmed.to_string(),
                    }
                })?;
                let value = parse_value(line, &caps[2])?;
                Reading::new(caps[1].trim(), value)
            })
            .collect::<Result<Vec<_>>>()?;
        Sample::new(self.timestamp, readings)
    }
}
