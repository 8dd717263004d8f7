//! Sample value model
//!
//! A [`Sample`] is one timestamped snapshot of named counter readings for a
//! single process. Reading names are case-insensitive: `ID Process` and
//! `id process` name the same reading and may not both appear in one sample.
//! Readings are kept sorted by their lower-cased name so iteration order,
//! equality and hashing are deterministic.

use crate::error::{Result, SampleError};
use chrono::NaiveDateTime;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

/// Readings that identify a process rather than measure it
pub const META_READINGS: &[&str] = &["id process", "creating process id"];

/// Whether a reading name is one of [`META_READINGS`]
pub fn is_meta_reading(name: &str) -> bool {
    META_READINGS.contains(&name.to_lowercase().as_str())
}

/// A single named, non-negative measurement
#[derive(Debug, Clone)]
pub struct Reading {
    name: String,
    value: f64,
}

impl Reading {
    /// Create a reading, rejecting negative and non-finite values
    ///
    /// The name must be non-empty, single-line and carry no surrounding
    /// whitespace, so that it survives a trip through a sample file.
    pub fn new(name: impl Into<String>, value: f64) -> Result<Self> {
        let name = name.into();
        if name.is_empty() || name.trim() != name || name.contains(['\n', '\r']) {
            return Err(SampleError::InvalidArgument(format!(
                "illegal reading name {:?}",
                name
            )));
        }
        if !value.is_finite() || value < 0.0 {
            return Err(SampleError::InvalidArgument(format!(
                "reading \"{}\" has illegal value {}",
                name, value
            )));
        }
        Ok(Self { name, value })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Case-insensitive lookup key
    pub(crate) fn key(&self) -> String {
        self.name.to_lowercase()
    }

    /// Compare by value only
    pub fn compare_values(&self, other: &Reading) -> Ordering {
        self.value.total_cmp(&other.value)
    }
}

impl PartialEq for Reading {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Reading {}

impl PartialOrd for Reading {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Reading {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key()
            .cmp(&other.key())
            .then_with(|| self.compare_values(other))
    }
}

impl Hash for Reading {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
        self.value.to_bits().hash(state);
    }
}

/// An immutable, timestamped snapshot of readings
#[derive(Debug, Clone)]
pub struct Sample {
    timestamp: NaiveDateTime,
    /// Keyed by lower-cased reading name
    readings: BTreeMap<String, Reading>,
    dead: bool,
    hash: u64,
}

impl Sample {
    /// Build a sample, failing on case-insensitively duplicated reading names
    pub fn new<I>(timestamp: NaiveDateTime, readings: I) -> Result<Self>
    where
        I: IntoIterator<Item = Reading>,
    {
        let mut map = BTreeMap::new();
        for reading in readings {
            let key = reading.key();
            if map.contains_key(&key) {
                return Err(SampleError::DuplicateReading {
                    name: reading.name,
                });
            }
            map.insert(key, reading);
        }

        let dead = !map.is_empty() && map.values().all(|r| r.value.to_bits() == 0);
        let hash = structural_hash(&timestamp, &map);

        Ok(Self {
            timestamp,
            readings: map,
            dead,
            hash,
        })
    }

    /// Build a sample from `(name, value)` pairs
    pub fn from_pairs<I, S>(timestamp: NaiveDateTime, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let readings = pairs
            .into_iter()
            .map(|(name, value)| Reading::new(name, value))
            .collect::<Result<Vec<_>>>()?;
        Self::new(timestamp, readings)
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    /// Number of readings in this sample
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// True when every reading is exactly zero (the process had exited)
    pub fn is_dead(&self) -> bool {
        self.dead
    }

    /// Look up a reading by name, ignoring case
    pub fn get(&self, name: &str) -> Option<&Reading> {
        self.readings.get(&name.to_lowercase())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Reading at `index` in sorted name order
    pub fn get_index(&self, index: usize) -> Option<&Reading> {
        self.readings.values().nth(index)
    }

    /// Readings in sorted (case-insensitive) name order
    pub fn readings(&self) -> impl Iterator<Item = &Reading> {
        self.readings.values()
    }

    /// Lower-cased reading names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.readings.keys().map(String::as_str)
    }

    /// Whether both samples carry the same set of reading names
    pub fn same_names(&self, other: &Sample) -> bool {
        self.readings.len() == other.readings.len()
            && self.readings.keys().all(|k| other.readings.contains_key(k))
    }
}

fn structural_hash(timestamp: &NaiveDateTime, readings: &BTreeMap<String, Reading>) -> u64 {
    let mut hasher = fnv::FnvHasher::default();
    timestamp.hash(&mut hasher);
    for reading in readings.values() {
        reading.hash(&mut hasher);
    }
    hasher.finish()
}

impl PartialEq for Sample {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
            && self.timestamp == other.timestamp
            && self.readings.len() == other.readings.len()
            && self
                .readings
                .values()
                .zip(other.readings.values())
                .all(|(a, b)| a.key() == b.key() && a.value.to_bits() == b.value.to_bits())
    }
}

impl Eq for Sample {}

impl Hash for Sample {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

impl<'a> IntoIterator for &'a Sample {
    type Item = &'a Reading;
    type IntoIter = std::collections::btree_map::Values<'a, String, Reading>;

    fn into_iter(self) -> Self::IntoIter {
        self.readings.values()
    }
}
