//! Run directories on disk
//!
//! A run is stored as a directory holding one encoded sample file per
//! counter, named `<counter name>.csv`. Run directories are named after the
//! time the run started and may be nested under a common data directory.

use crate::codec::{self, FILE_EXTENSION};
use crate::error::{Result, SampleError};
use crate::sample::Sample;
use crate::sample_set::{SampleSet, Validation};
use crate::timestamp::RUN_DIRECTORY_FORMAT;
use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Sample sets grouped by process name
pub type SampleSetsByProcess = BTreeMap<String, Vec<SampleSet>>;

/// Directory name for a run started at `started`
pub fn run_directory_name(started: &NaiveDateTime) -> String {
    started.format(RUN_DIRECTORY_FORMAT).to_string()
}

/// Create the directory for a run under `parent`
///
/// An existing empty directory is reused; a non-empty one is refused so a
/// previous run is never mixed into this one.
pub fn create_run_directory(parent: &Path, started: &NaiveDateTime) -> Result<PathBuf> {
    if !parent.is_dir() {
        return Err(SampleError::InvalidArgument(format!(
            "not a directory: {}",
            parent.display()
        )));
    }
    let dir = parent.join(run_directory_name(started));
    if dir.exists() && fs::read_dir(&dir)?.next().is_some() {
        return Err(SampleError::InvalidArgument(format!(
            "run directory already exists and is not empty: {}",
            dir.display()
        )));
    }
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Refuse counter names that cannot be used as a file stem inside a run directory
///
/// Counter names come from process labels in the dump, so a label such as
/// `../x` must not be able to place a file outside the run.
pub fn check_counter_name(counter_name: &str) -> Result<()> {
    if counter_name.is_empty()
        || counter_name.contains(['/', '\\', '\0'])
        || counter_name.contains("..")
    {
        return Err(SampleError::InvalidArgument(format!(
            "counter name cannot be used as a file name: {:?}",
            counter_name
        )));
    }
    Ok(())
}

/// Write `samples` to `<dir>/<counter_name>.csv`
///
/// Returns `Ok(None)` without touching anything if the file already exists.
pub fn write_sample_file(dir: &Path, counter_name: &str, samples: &[Sample]) -> Result<Option<PathBuf>> {
    check_counter_name(counter_name)?;
    let path = dir.join(format!("{}.{}", counter_name, FILE_EXTENSION));
    if path.exists() {
        warn!(path = %path.display(), "sample file already exists, skipping");
        return Ok(None);
    }
    fs::write(&path, codec::encode_samples(samples))?;
    debug!(path = %path.display(), samples = samples.len(), "wrote sample file");
    Ok(Some(path))
}

/// Load a single sample file; the file stem is the counter name
pub fn load_sample_file(path: &Path, validation: Validation) -> Result<SampleSet> {
    let counter_name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| SampleError::InvalidArgument(format!("bad file name: {}", path.display())))?;
    let content = fs::read_to_string(path)?;
    let samples = codec::decode(&content)?;
    SampleSet::new(counter_name, samples, validation)
}

/// Load every sample file under `dir`, recursing into subdirectories
///
/// Files that cannot be read, parsed or validated are logged and skipped.
pub fn load_sample_sets(dir: &Path, validation: Validation) -> Result<SampleSetsByProcess> {
    if !dir.is_dir() {
        return Err(SampleError::InvalidArgument(format!(
            "not a directory: {}",
            dir.display()
        )));
    }

    let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<_>>()?;
    entries.sort();

    let mut sets = SampleSetsByProcess::new();
    let (subdirs, files): (Vec<PathBuf>, Vec<PathBuf>) = entries.into_iter().partition(|p| p.is_dir());

    for path in files.iter().filter(|p| is_sample_file(p)) {
        match load_sample_file(path, validation) {
            Ok(set) => sets
                .entry(set.process_name().to_string())
                .or_default()
                .push(set),
            Err(error) => warn!(path = %path.display(), %error, "failed to load sample file"),
        }
    }

    for subdir in subdirs {
        for (process, mut nested) in load_sample_sets(&subdir, validation)? {
            sets.entry(process).or_default().append(&mut nested);
        }
    }

    info!(dir = %dir.display(), processes = sets.len(), "loaded sample sets");
    Ok(sets)
}

fn is_sample_file(path: &Path) -> bool {
    path.is_file() && path.extension().is_some_and(|ext| ext == FILE_EXTENSION)
}
