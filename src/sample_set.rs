//! Ordered, validated runs of samples for one counter
//!
//! The counter name may carry a `#n` suffix that tells apart processes that
//! shared a name at sampling time (`chrome#1`, `chrome#4`). That suffix is
//! only meaningful within one run on one machine, so sets from different runs
//! should be correlated by [`SampleSet::process_name`] instead, which strips
//! it.

use crate::error::{Result, SampleError};
use crate::meta::Meta;
use crate::sample::Sample;
use std::hash::{Hash, Hasher};
use tracing::debug;

/// Which policy checks a [`SampleSet`] must pass to be constructed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Validation {
    /// Reject sets whose metadata flags them as not genuine
    pub assert_genuine: bool,
    /// Reject sets whose samples do not share one set of reading names
    pub assert_complete: bool,
}

impl Validation {
    /// Reject both ingenuine and incomplete sets
    pub fn strict() -> Self {
        Self {
            assert_genuine: true,
            assert_complete: true,
        }
    }

    /// Accept anything structurally valid and expose problems through [`Meta`]
    pub fn lenient() -> Self {
        Self {
            assert_genuine: false,
            assert_complete: false,
        }
    }
}

impl Default for Validation {
    fn default() -> Self {
        Self::strict()
    }
}

/// An immutable run of at least two samples, sorted by timestamp
#[derive(Debug, Clone)]
pub struct SampleSet {
    counter_name: String,
    process_name: String,
    samples: Vec<Sample>,
    meta: Meta,
    hash: u64,
}

impl SampleSet {
    /// Sort `samples` by timestamp and compute their [`Meta`]
    ///
    /// # Errors
    ///
    /// - [`SampleError::InvalidArgument`] for fewer than 2 samples
    /// - [`SampleError::IncompleteSet`] if `validation.assert_complete` fails
    /// - [`SampleError::IngenuineSet`] if `validation.assert_genuine` fails
    pub fn new<I>(counter_name: impl Into<String>, samples: I, validation: Validation) -> Result<Self>
    where
        I: IntoIterator<Item = Sample>,
    {
        let counter_name = counter_name.into();
        let mut samples: Vec<Sample> = samples.into_iter().collect();
        if samples.len() < 2 {
            return Err(SampleError::InvalidArgument(format!(
                "a sample set must contain at least 2 samples, \"{}\" has {}",
                counter_name,
                samples.len()
            )));
        }
        samples.sort_by_key(Sample::timestamp);

        let meta = Meta::compute(&samples)?;
        if validation.assert_complete && !meta.is_complete() {
            return Err(SampleError::IncompleteSet);
        }
        if validation.assert_genuine {
            if let Some(reason) = meta.ingenuine_reason() {
                return Err(SampleError::IngenuineSet(reason.to_string()));
            }
        }

        let process_name = process_name_of(&counter_name).to_string();
        let hash = structural_hash(&counter_name, &samples);
        debug!(
            counter = %counter_name,
            samples = samples.len(),
            genuine = meta.is_genuine(),
            complete = meta.is_complete(),
            "built sample set"
        );

        Ok(Self {
            counter_name,
            process_name,
            samples,
            meta,
            hash,
        })
    }

    /// Counter name, possibly with a `#n` disambiguation suffix
    pub fn counter_name(&self) -> &str {
        &self.counter_name
    }

    /// Counter name without its `#n` suffix
    pub fn process_name(&self) -> &str {
        &self.process_name
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false; a set holds at least two samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Sample> {
        self.samples.get(index)
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.samples.iter()
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }
}

/// Strip the `#n` suffix from a counter name
pub fn process_name_of(counter_name: &str) -> &str {
    counter_name
        .split_once('#')
        .map_or(counter_name, |(name, _)| name)
}

// Only the counter name and samples take part; everything else is derived from them.
fn structural_hash(counter_name: &str, samples: &[Sample]) -> u64 {
    let mut hasher = fnv::FnvHasher::default();
    counter_name.hash(&mut hasher);
    for sample in samples {
        sample.hash(&mut hasher);
    }
    hasher.finish()
}

impl PartialEq for SampleSet {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
            && self.counter_name == other.counter_name
            && self.samples == other.samples
    }
}

impl Eq for SampleSet {}

impl Hash for SampleSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

impl<'a> IntoIterator for &'a SampleSet {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}
