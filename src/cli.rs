//! CLI argument parsing for proctrack

use crate::config::ReportFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "proctrack")]
#[command(version)]
#[command(about = "Parse per-process performance counter dumps and summarize them", long_about = None)]
pub struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable debug tracing output on stderr
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Split a raw counter dump into one sample file per counter
    Import {
        /// Counter dump written by the collector
        #[arg(value_name = "DUMP")]
        dump: PathBuf,

        /// Data directory; a run directory named after the first sample is created inside
        #[arg(short, long, value_name = "DIR")]
        out: PathBuf,

        /// Accept a dump whose last record was cut off
        #[arg(long)]
        ignore_trailing_incomplete: bool,
    },

    /// Summarize every sample file under a directory
    Report {
        /// Directory to load (searched recursively)
        #[arg(value_name = "DIR")]
        dir: PathBuf,

        /// Output format (overrides the config file)
        #[arg(long = "format", value_enum)]
        format: Option<ReportFormat>,

        /// Load sets that are not genuine or not complete instead of skipping them
        #[arg(long)]
        lenient: bool,

        /// Include covariance matrices for complete sets
        #[arg(long)]
        covariance: bool,
    },
}
