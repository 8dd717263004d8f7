//! Derived statistics for a sample set
//!
//! A [`Meta`] is computed once, when its [`crate::sample_set::SampleSet`] is
//! built, and never changes afterwards. The fields depend on each other, so
//! they are computed in a fixed order:
//!
//! 1. intervals
//! 2. completeness
//! 3. min/max/mean intervals
//! 4. min/max/mean samples
//! 5. genuineness (uses the interval extremes)
//! 6. covariance matrix (only for complete sets)

use crate::error::{Result, SampleError};
use crate::sample::{Reading, Sample};
use chrono::{NaiveDateTime, TimeDelta};
use std::collections::BTreeMap;
use std::fmt;

/// Reading that carries the process identifier
pub const PID_READING: &str = "id process";

/// How many times the longest interval may exceed the mean interval (and the
/// mean exceed the shortest) before a set stops looking like one capture
pub const INTERVAL_OUTLIER_TOLERANCE: f64 = 3.0;

const NANOS_PER_SEC: i128 = 1_000_000_000;

/// Why a sample set does not look like one continuous observation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngenuineReason {
    /// A live sample follows a dead one; processes do not come back
    AliveAfterDead,
    MissingPid,
    IllegalPid,
    MultiplePids,
    MaxIntervalAboveTolerance,
    MinIntervalBelowTolerance,
}

impl fmt::Display for IngenuineReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::AliveAfterDead => "contains non-dead samples that were taken after dead samples",
            Self::MissingPid => "missing 1 or more PID reading",
            Self::IllegalPid => "illegal PID value",
            Self::MultiplePids => "contains multiple PID values",
            Self::MaxIntervalAboveTolerance => "max interval above interval tolerance threshold",
            Self::MinIntervalBelowTolerance => "min interval below interval tolerance threshold",
        };
        f.write_str(reason)
    }
}

/// Symmetric covariance matrix over the reading names of a complete set
#[derive(Debug, Clone, PartialEq)]
pub struct CovMatrix {
    names: Vec<String>,
    /// Row-major, `dim * dim`
    values: Vec<f64>,
}

impl CovMatrix {
    /// Number of rows (and columns)
    pub fn dim(&self) -> usize {
        self.names.len()
    }

    /// Reading names in row/column order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        let dim = self.dim();
        (i < dim && j < dim).then(|| self.values[i * dim + j])
    }

    /// Covariance of two readings, looked up case-insensitively
    pub fn get_by_name(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.index_of(a)?;
        let j = self.index_of(b)?;
        self.get(i, j)
    }

    pub fn row(&self, i: usize) -> Option<&[f64]> {
        let dim = self.dim();
        (i < dim).then(|| &self.values[i * dim..(i + 1) * dim])
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        let key = name.to_lowercase();
        self.names.iter().position(|n| n.to_lowercase() == key)
    }

    fn compute(samples: &[Sample], mean: &Sample) -> Self {
        let names: Vec<String> = samples[0].readings().map(|r| r.name().to_string()).collect();
        let dim = names.len();
        let n = samples.len() as f64;
        let means: Vec<f64> = mean.readings().map(Reading::value).collect();
        let rows: Vec<Vec<f64>> = samples
            .iter()
            .map(|s| s.readings().map(Reading::value).collect())
            .collect();

        let mut values = vec![0.0; dim * dim];
        for i in 0..dim {
            for j in i..dim {
                for row in &rows {
                    let term = (row[i] - means[i]) * (row[j] - means[j]) / n;
                    values[i * dim + j] += term;
                    if i != j {
                        values[j * dim + i] += term;
                    }
                }
            }
        }

        Self { names, values }
    }
}

/// Pre-computed information about an immutable sample set
#[derive(Debug, Clone)]
pub struct Meta {
    /// `intervals[i]` is the gap between `samples[i]` and `samples[i + 1]`
    intervals: Vec<TimeDelta>,
    complete: bool,
    min_interval: TimeDelta,
    max_interval: TimeDelta,
    mean_interval: TimeDelta,
    min_sample: Sample,
    max_sample: Sample,
    mean_sample: Sample,
    genuine: Option<IngenuineReason>,
    cov_matrix: Option<CovMatrix>,
}

impl Meta {
    /// Compute every field for samples already sorted by timestamp
    pub(crate) fn compute(samples: &[Sample]) -> Result<Self> {
        if samples.len() < 2 {
            return Err(SampleError::InvalidArgument(format!(
                "statistics need at least 2 samples, got {}",
                samples.len()
            )));
        }

        let intervals = calc_intervals(samples);
        let complete = calc_complete(samples);
        let (min_interval, max_interval, mean_interval) = calc_interval_extremes(&intervals);
        let (min_sample, max_sample, mean_sample) = calc_sample_extremes(samples)?;
        let genuine = calc_genuine(samples, min_interval, max_interval, mean_interval);
        let cov_matrix = complete.then(|| CovMatrix::compute(samples, &mean_sample));

        Ok(Self {
            intervals,
            complete,
            min_interval,
            max_interval,
            mean_interval,
            min_sample,
            max_sample,
            mean_sample,
            genuine,
            cov_matrix,
        })
    }

    pub fn intervals(&self) -> &[TimeDelta] {
        &self.intervals
    }

    pub fn min_interval(&self) -> TimeDelta {
        self.min_interval
    }

    pub fn max_interval(&self) -> TimeDelta {
        self.max_interval
    }

    /// Mean interval, truncated to whole nanoseconds
    pub fn mean_interval(&self) -> TimeDelta {
        self.mean_interval
    }

    /// Per-reading minimum, stamped with the earliest timestamp of the set
    pub fn min_sample(&self) -> &Sample {
        &self.min_sample
    }

    /// Per-reading maximum, stamped with the latest timestamp of the set
    pub fn max_sample(&self) -> &Sample {
        &self.max_sample
    }

    /// Per-reading mean. Its timestamp is `NaiveDateTime::MIN` and carries no meaning.
    pub fn mean_sample(&self) -> &Sample {
        &self.mean_sample
    }

    pub fn is_genuine(&self) -> bool {
        self.genuine.is_none()
    }

    pub fn ingenuine_reason(&self) -> Option<IngenuineReason> {
        self.genuine
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Covariance matrix; only complete sets have one
    pub fn cov_matrix(&self) -> Result<&CovMatrix> {
        self.cov_matrix
            .as_ref()
            .ok_or(SampleError::CovarianceUnavailable)
    }
}

fn calc_intervals(samples: &[Sample]) -> Vec<TimeDelta> {
    samples
        .windows(2)
        .map(|w| {
            let delta = w[1].timestamp() - w[0].timestamp();
            if delta < TimeDelta::zero() {
                -delta
            } else {
                delta
            }
        })
        .collect()
}

fn calc_complete(samples: &[Sample]) -> bool {
    let first = &samples[0];
    samples[1..].iter().all(|s| first.same_names(s))
}

fn total_nanos(delta: TimeDelta) -> i128 {
    delta.num_seconds() as i128 * NANOS_PER_SEC + delta.subsec_nanos() as i128
}

fn from_nanos(nanos: i128) -> TimeDelta {
    TimeDelta::seconds((nanos / NANOS_PER_SEC) as i64)
        + TimeDelta::nanoseconds((nanos % NANOS_PER_SEC) as i64)
}

fn calc_interval_extremes(intervals: &[TimeDelta]) -> (TimeDelta, TimeDelta, TimeDelta) {
    let mut min = intervals[0];
    let mut max = intervals[0];
    let mut total: i128 = 0;
    for &d in intervals {
        min = min.min(d);
        max = max.max(d);
        total += total_nanos(d);
    }
    let mean = from_nanos(total / intervals.len() as i128);
    (min, max, mean)
}

struct ReadingStats {
    min: Reading,
    max: Reading,
    /// Running mean, so large readings cannot overflow an intermediate sum
    mean: f64,
    count: usize,
}

fn calc_sample_extremes(samples: &[Sample]) -> Result<(Sample, Sample, Sample)> {
    let mut stats: BTreeMap<String, ReadingStats> = BTreeMap::new();
    for sample in samples {
        for reading in sample.readings() {
            let entry = stats
                .entry(reading.key())
                .or_insert_with(|| ReadingStats {
                    min: reading.clone(),
                    max: reading.clone(),
                    mean: 0.0,
                    count: 0,
                });
            if entry.min.value() > reading.value() {
                entry.min = reading.clone();
            }
            if entry.max.value() < reading.value() {
                entry.max = reading.clone();
            }
            entry.count += 1;
            entry.mean += (reading.value() - entry.mean) / entry.count as f64;
        }
    }

    // samples are sorted, so the ends hold the timestamp extremes
    let min_timestamp = samples[0].timestamp();
    let max_timestamp = samples[samples.len() - 1].timestamp();

    let mut mins = Vec::with_capacity(stats.len());
    let mut maxes = Vec::with_capacity(stats.len());
    let mut means = Vec::with_capacity(stats.len());
    for s in stats.into_values() {
        means.push(Reading::new(s.min.name(), s.mean)?);
        mins.push(s.min);
        maxes.push(s.max);
    }

    Ok((
        Sample::new(min_timestamp, mins)?,
        Sample::new(max_timestamp, maxes)?,
        Sample::new(NaiveDateTime::MIN, means)?,
    ))
}

fn calc_genuine(
    samples: &[Sample],
    min_interval: TimeDelta,
    max_interval: TimeDelta,
    mean_interval: TimeDelta,
) -> Option<IngenuineReason> {
    let mut pid: Option<u64> = None;
    let mut died = false;
    for sample in samples {
        if sample.is_dead() {
            died = true;
            continue;
        }
        // even a restarted process would get a new PID and counter name
        if died {
            return Some(IngenuineReason::AliveAfterDead);
        }
        let Some(reading) = sample.get(PID_READING) else {
            return Some(IngenuineReason::MissingPid);
        };
        if reading.value() < 0.0 {
            return Some(IngenuineReason::IllegalPid);
        }
        let bits = reading.value().to_bits();
        match pid {
            None => pid = Some(bits),
            Some(first) if first != bits => return Some(IngenuineReason::MultiplePids),
            Some(_) => {}
        }
    }

    let min = total_nanos(min_interval) as f64;
    let max = total_nanos(max_interval) as f64;
    let mean = total_nanos(mean_interval) as f64;
    // all-zero intervals leave nothing to compare the max against; the min check catches them
    if mean > 0.0 && max / mean > INTERVAL_OUTLIER_TOLERANCE {
        return Some(IngenuineReason::MaxIntervalAboveTolerance);
    }
    if min == 0.0 || mean / min > INTERVAL_OUTLIER_TOLERANCE {
        return Some(IngenuineReason::MinIntervalBelowTolerance);
    }
    None
}
