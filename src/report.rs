//! Text and JSON reports over loaded sample sets

use crate::meta::Meta;
use crate::sample::is_meta_reading;
use crate::sample_set::SampleSet;
use crate::store::SampleSetsByProcess;
use crate::timestamp;
use chrono::TimeDelta;
use serde::Serialize;
use std::fmt::Write as _;

/// Report format identifier written into JSON output
pub const REPORT_FORMAT_ID: &str = "proctrack-report-v1";

/// Min/max/mean of one reading across a set
#[derive(Debug, Clone, Serialize)]
pub struct ReadingSummary {
    pub name: String,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CovarianceSummary {
    pub names: Vec<String>,
    pub matrix: Vec<Vec<f64>>,
}

/// Summary of one sample set
#[derive(Debug, Clone, Serialize)]
pub struct SetSummary {
    pub counter_name: String,
    pub samples: usize,
    pub first_timestamp: String,
    pub last_timestamp: String,
    pub min_interval_ms: i64,
    pub max_interval_ms: i64,
    pub mean_interval_ms: i64,
    pub genuine: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingenuine_reason: Option<String>,
    pub complete: bool,
    /// Measurement readings; identity readings such as the PID are left out
    pub readings: Vec<ReadingSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub covariance: Option<CovarianceSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessSummary {
    pub process_name: String,
    pub sets: Vec<SetSummary>,
}

/// Report over every loaded process
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub format: &'static str,
    pub processes: Vec<ProcessSummary>,
}

fn interval_ms(delta: TimeDelta) -> i64 {
    delta.num_milliseconds()
}

fn reading_summaries(meta: &Meta) -> Vec<ReadingSummary> {
    meta.mean_sample()
        .readings()
        .filter(|r| !is_meta_reading(r.name()))
        .map(|mean| {
            let value_of = |sample: &crate::sample::Sample| {
                sample.get(mean.name()).map_or(0.0, |r| r.value())
            };
            ReadingSummary {
                name: mean.name().to_string(),
                min: value_of(meta.min_sample()),
                max: value_of(meta.max_sample()),
                mean: mean.value(),
            }
        })
        .collect()
}

fn covariance_summary(meta: &Meta) -> Option<CovarianceSummary> {
    let cov = meta.cov_matrix().ok()?;
    Some(CovarianceSummary {
        names: cov.names().to_vec(),
        matrix: (0..cov.dim())
            .filter_map(|i| cov.row(i).map(<[f64]>::to_vec))
            .collect(),
    })
}

impl SetSummary {
    pub fn from_set(set: &SampleSet, show_covariance: bool) -> Self {
        let meta = set.meta();
        let samples = set.samples();
        Self {
            counter_name: set.counter_name().to_string(),
            samples: set.len(),
            first_timestamp: timestamp::format(&samples[0].timestamp()),
            last_timestamp: timestamp::format(&samples[samples.len() - 1].timestamp()),
            min_interval_ms: interval_ms(meta.min_interval()),
            max_interval_ms: interval_ms(meta.max_interval()),
            mean_interval_ms: interval_ms(meta.mean_interval()),
            genuine: meta.is_genuine(),
            ingenuine_reason: meta.ingenuine_reason().map(|r| r.to_string()),
            complete: meta.is_complete(),
            readings: reading_summaries(meta),
            covariance: if show_covariance {
                covariance_summary(meta)
            } else {
                None
            },
        }
    }
}

impl Report {
    pub fn new(sets: &SampleSetsByProcess, show_covariance: bool) -> Self {
        let processes = sets
            .iter()
            .map(|(process_name, sets)| ProcessSummary {
                process_name: process_name.clone(),
                sets: sets
                    .iter()
                    .map(|set| SetSummary::from_set(set, show_covariance))
                    .collect(),
            })
            .collect();
        Self {
            format: REPORT_FORMAT_ID,
            processes,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for process in &self.processes {
            let _ = writeln!(out, "=== {} ({} sets) ===", process.process_name, process.sets.len());
            for set in &process.sets {
                let status = match &set.ingenuine_reason {
                    None => "genuine".to_string(),
                    Some(reason) => format!("NOT genuine: {}", reason),
                };
                let _ = writeln!(
                    out,
                    "{}: {} samples, {} .. {}",
                    set.counter_name, set.samples, set.first_timestamp, set.last_timestamp
                );
                let _ = writeln!(
                    out,
                    "  intervals (ms): min {} / mean {} / max {}",
                    set.min_interval_ms, set.mean_interval_ms, set.max_interval_ms
                );
                let _ = writeln!(
                    out,
                    "  {}, {}",
                    status,
                    if set.complete { "complete" } else { "incomplete" }
                );
                if !set.readings.is_empty() {
                    let _ = writeln!(out, "  {:<32} {:>16} {:>16} {:>16}", "reading", "min", "mean", "max");
                    for r in &set.readings {
                        let _ = writeln!(
                            out,
                            "  {:<32} {:>16.3} {:>16.3} {:>16.3}",
                            r.name, r.min, r.mean, r.max
                        );
                    }
                }
                if let Some(cov) = &set.covariance {
                    let _ = writeln!(out, "  covariance:");
                    for (name, row) in cov.names.iter().zip(&cov.matrix) {
                        let cells: Vec<String> = row.iter().map(|v| format!("{:.3}", v)).collect();
                        let _ = writeln!(out, "    {:<32} {}", name, cells.join(" "));
                    }
                }
            }
            out.push('\n');
        }
        out
    }
}
