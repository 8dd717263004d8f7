use anyhow::{bail, Context, Result};
use clap::Parser;
use proctrack::{
    cli::{Cli, Command},
    config::{Config, ReportFormat},
    parser::DumpParser,
    report::Report,
    sample_set::Validation,
    store,
};
use std::fs;
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber; `--debug` forces TRACE, otherwise RUST_LOG (default warn)
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Parse a raw dump and write one sample file per counter into a new run directory
fn run_import(dump: &Path, out: &Path, ignore_trailing_incomplete: bool) -> Result<()> {
    let text = fs::read_to_string(dump)
        .with_context(|| format!("Failed to read dump {}", dump.display()))?;
    let run = DumpParser::new()
        .ignore_trailing_incomplete(ignore_trailing_incomplete)
        .parse_str(&text)
        .with_context(|| format!("Failed to parse dump {}", dump.display()))?;

    let Some(started) = run.first_timestamp() else {
        bail!("No samples found in {}", dump.display());
    };

    for counter_name in run.counter_names() {
        store::check_counter_name(counter_name)
            .with_context(|| format!("Refusing to import {}", dump.display()))?;
    }

    fs::create_dir_all(out)
        .with_context(|| format!("Failed to create data directory {}", out.display()))?;
    let dir = store::create_run_directory(out, &started)?;

    let mut written = 0usize;
    for (counter_name, samples) in run.iter() {
        if store::write_sample_file(&dir, counter_name, samples)?.is_some() {
            written += 1;
        }
    }
    info!(records = run.records(), counters = written, "import finished");

    println!(
        "Imported {} samples for {} counters into {}",
        run.records(),
        written,
        dir.display()
    );
    Ok(())
}

/// Load every sample file under `dir` and print a summary
fn run_report(dir: &Path, format: ReportFormat, validation: Validation, covariance: bool) -> Result<()> {
    let sets = store::load_sample_sets(dir, validation)
        .with_context(|| format!("Failed to load sample sets from {}", dir.display()))?;
    let report = Report::new(&sets, covariance);
    match format {
        ReportFormat::Text => print!("{}", report.to_text()),
        ReportFormat::Json => println!("{}", report.to_json()?),
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();

    init_tracing(args.debug);

    let config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    match args.command {
        Command::Import {
            dump,
            out,
            ignore_trailing_incomplete,
        } => run_import(
            &dump,
            &out,
            ignore_trailing_incomplete || config.parse.ignore_trailing_incomplete,
        ),
        Command::Report {
            dir,
            format,
            lenient,
            covariance,
        } => {
            let validation = if lenient {
                Validation::lenient()
            } else {
                config.validation.validation()
            };
            run_report(
                &dir,
                format.unwrap_or(config.report.format),
                validation,
                covariance || config.report.show_covariance,
            )
        }
    }
}
