//! proctrack - per-process performance counter analysis
//!
//! This library turns raw counter dumps into validated, timestamp-ordered
//! sample sets and derives summary statistics for each of them: interval
//! extremes, per-reading min/max/mean, a covariance matrix, and a verdict on
//! whether the set looks like one continuous capture of one process.

pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod meta;
pub mod parser;
pub mod report;
pub mod sample;
pub mod sample_set;
pub mod store;
pub mod timestamp;

pub use error::{Result, SampleError};
pub use meta::{CovMatrix, IngenuineReason, Meta};
pub use sample::{Reading, Sample};
pub use sample_set::{SampleSet, Validation};
