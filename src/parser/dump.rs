//! Native counter dump grammar
//!
//! A record is a timestamp line, alternating counter-identity and value
//! lines, and an end marker. Each counter-identity line names the process
//! label (the counter name, e.g. `chrome#2`) and the reading, so one record
//! yields one sample per process label it mentions.

use super::{check_count, numbered_lines, parse_value, Line};
use crate::error::{Result, SampleError};
use crate::sample::{Reading, Sample};
use crate::sample_set::{SampleSet, Validation};
use crate::timestamp;
use chrono::NaiveDateTime;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;
use tracing::{debug, trace, warn};

fn timestamp_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\s*Timestamp\s+:\s*([0-9/: ]+?)\s*$").expect("timestamp pattern is valid")
    })
}

// group 1 = process label (e.g. "javaw#2"), group 2 = reading (e.g. "working set - private")
fn counter_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)\\process\((.+)\)\\(.+?)\s+:\s*$").expect("counter pattern is valid")
    })
}

fn end_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(^|\s)End\s+:").expect("end pattern is valid"))
}

/// Parser for the native counter dump layout
#[derive(Debug, Clone, Default)]
pub struct DumpParser {
    ignore_trailing_incomplete: bool,
}

impl DumpParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tolerate a final record with no end marker (collector stopped mid-sample)
    pub fn ignore_trailing_incomplete(mut self, ignore: bool) -> Self {
        self.ignore_trailing_incomplete = ignore;
        self
    }

    /// Parse dump text
    pub fn parse_str(&self, text: &str) -> Result<DumpRun> {
        let lines: Vec<&str> = text.lines().collect();
        self.parse(&lines)
    }

    /// Parse an ordered sequence of dump lines
    pub fn parse<S: AsRef<str>>(&self, lines: &[S]) -> Result<DumpRun> {
        let mut counters: BTreeMap<String, Vec<Sample>> = BTreeMap::new();
        let mut open: Option<OpenRecord<'_>> = None;
        let mut timestamps_seen = 0usize;
        let mut records = 0usize;

        for line in numbered_lines(lines) {
            if let Some(caps) = timestamp_pattern().captures(line.text) {
                if open.is_some() {
                    return Err(SampleError::DuplicateTimestamp { line: line.number });
                }
                let timestamp =
                    timestamp::parse(&caps[1]).ok_or_else(|| SampleError::MalformedTimestamp {
                        line: line.number,
                        text: line.text.trim().to_string(),
                    })?;
                timestamps_seen += 1;
                open = Some(OpenRecord {
                    start: line.number,
                    timestamp,
                    body: Vec::new(),
                });
            } else if end_pattern().is_match(line.text) {
                let record = open
                    .take()
                    .ok_or(SampleError::UnexpectedEndMarker { line: line.number })?;
                let start = record.start;
                for (label, sample) in record.finish()? {
                    counters.entry(label).or_default().push(sample);
                }
                records += 1;
                debug!(line = start, records, "parsed dump record");
            } else if let Some(record) = open.as_mut() {
                record.body.push(line);
            } else {
                trace!(line = line.number, "skipping line outside of any sample");
            }
        }

        if let Some(record) = open {
            if !self.ignore_trailing_incomplete {
                return Err(SampleError::IncompleteSample {
                    line: record.start,
                    reason: "missing end marker",
                });
            }
            debug!(line = record.start, "dropping unterminated trailing record");
            timestamps_seen -= 1;
        }

        check_count(timestamps_seen, records)?;
        Ok(DumpRun { counters, records })
    }
}

struct OpenRecord<'a> {
    start: usize,
    timestamp: NaiveDateTime,
    body: Vec<Line<'a>>,
}

impl OpenRecord<'_> {
    /// Turn the reading pairs into one sample per process label
    fn finish(self) -> Result<BTreeMap<String, Sample>> {
        if self.body.is_empty() {
            return Err(SampleError::IncompleteSample {
                line: self.start,
                reason: "no readings",
            });
        }

        let mut by_label: BTreeMap<String, Vec<Reading>> = BTreeMap::new();
        for pair in self.body.chunks(2) {
            let counter_line = &pair[0];
            let caps = counter_pattern().captures(counter_line.text).ok_or_else(|| {
                SampleError::MalformedCounterLine {
                    line: counter_line.number,
                    text: counter_line.text.trim().to_string(),
                }
            })?;
            let value_line = pair.get(1).ok_or(SampleError::IncompleteSample {
                line: self.start,
                reason: "reading without a value",
            })?;
            let value = parse_value(value_line, value_line.text)?;
            by_label
                .entry(caps[1].to_string())
                .or_default()
                .push(Reading::new(caps[2].trim(), value)?);
        }

        by_label
            .into_iter()
            .map(|(label, readings)| Ok((label, Sample::new(self.timestamp, readings)?)))
            .collect()
    }
}

/// A counter whose samples could not form a [`SampleSet`]
#[derive(Debug)]
pub struct SkippedCounter {
    pub counter_name: String,
    pub error: SampleError,
}

/// Samples parsed from one dump, grouped by counter name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DumpRun {
    counters: BTreeMap<String, Vec<Sample>>,
    records: usize,
}

impl DumpRun {
    /// Number of complete records in the dump
    pub fn records(&self) -> usize {
        self.records
    }

    /// Number of distinct counters
    pub fn len(&self) -> usize {
        self.counters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }

    pub fn counter_names(&self) -> impl Iterator<Item = &str> {
        self.counters.keys().map(String::as_str)
    }

    /// Samples for one counter, in dump order
    pub fn samples(&self, counter_name: &str) -> Option<&[Sample]> {
        self.counters.get(counter_name).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Sample])> {
        self.counters
            .iter()
            .map(|(name, samples)| (name.as_str(), samples.as_slice()))
    }

    /// Earliest timestamp in the run
    pub fn first_timestamp(&self) -> Option<NaiveDateTime> {
        self.counters
            .values()
            .flatten()
            .map(Sample::timestamp)
            .min()
    }

    pub fn into_counters(self) -> BTreeMap<String, Vec<Sample>> {
        self.counters
    }

    /// Build a sample set per counter
    ///
    /// Counters that fail construction (too few samples, or a policy
    /// violation under `validation`) are skipped and returned separately.
    pub fn into_sample_sets(self, validation: Validation) -> (Vec<SampleSet>, Vec<SkippedCounter>) {
        let mut sets = Vec::new();
        let mut skipped = Vec::new();
        for (counter_name, samples) in self.counters {
            match SampleSet::new(counter_name.as_str(), samples, validation) {
                Ok(set) => sets.push(set),
                Err(error) => {
                    warn!(counter = %counter_name, %error, "skipping counter");
                    skipped.push(SkippedCounter {
                        counter_name,
                        error,
                    });
                }
            }
        }
        (sets, skipped)
    }
}
