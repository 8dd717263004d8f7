#![no_main]

use libfuzzer_sys::fuzz_target;
use proctrack::codec;
use proctrack::sample_set::{SampleSet, Validation};

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        if let Ok(samples) = codec::decode(input) {
            let _ = SampleSet::new("fuzz", samples, Validation::lenient());
        }
    }
});
