#![no_main]

use libfuzzer_sys::fuzz_target;
use proctrack::parser::DumpParser;
use proctrack::sample_set::Validation;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Parsing and validation must never panic, whatever the dump holds
        if let Ok(run) = DumpParser::new().ignore_trailing_incomplete(true).parse_str(input) {
            let _ = run.into_sample_sets(Validation::lenient());
        }
    }
});
