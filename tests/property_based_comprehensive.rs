//! Comprehensive property-based tests for pre-commit hook
//!
//! Covers the core data model of proctrack using proptest. Designed to run
//! under 30 seconds as a pre-commit quality gate.
//!
//! Core features tested:
//! 1. Case-insensitive reading lookup
//! 2. Duplicate and unencodable reading names
//! 3. Sample file encoding
//! 4. Sample set construction and ordering
//! 5. Covariance matrix shape
//! 6. Dead sample detection

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use proctrack::codec;
use proctrack::meta::PID_READING;
use proctrack::sample::{Reading, Sample};
use proctrack::sample_set::{SampleSet, Validation};
use proctrack::SampleError;
use proptest::prelude::*;

fn base() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

// quarters are exactly representable, so encoding loses nothing
fn quarter_value() -> impl Strategy<Value = f64> {
    (0u32..4_000_000).prop_map(|n| n as f64 / 4.0)
}

fn reading_names() -> impl Strategy<Value = Vec<String>> {
    // counter names carry spaces, '%' and '/' (e.g. "% processor time", "io read bytes/sec")
    prop::collection::btree_set("[a-z%/]([a-z %/]{0,10}[a-z%/])?", 1..6)
        .prop_map(|set| set.into_iter().collect())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_lookup_ignores_case(names in reading_names(), value in quarter_value()) {
        let sample = Sample::from_pairs(base(), names.iter().map(|n| (n.as_str(), value))).unwrap();
        prop_assert_eq!(sample.len(), names.len());
        for name in &names {
            let upper = name.to_uppercase();
            let reading = sample.get(&upper).unwrap();
            prop_assert_eq!(reading.name(), name.as_str());
            prop_assert_eq!(reading.value(), value);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_duplicate_names_rejected(name in "[a-z]{1,12}", a in quarter_value(), b in quarter_value()) {
        let readings = vec![
            Reading::new(name.clone(), a).unwrap(),
            Reading::new(name.to_uppercase(), b).unwrap(),
        ];
        let err = Sample::new(base(), readings).unwrap_err();
        let is_duplicate = matches!(err, SampleError::DuplicateReading { .. });
        prop_assert!(is_duplicate);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_padded_or_multiline_names_rejected(
        name in "[a-z%/]{1,8}",
        pad in prop_oneof![Just(" "), Just("\t"), Just("\n"), Just("\r\n")],
        at_start in any::<bool>(),
    ) {
        let padded = if at_start { format!("{}{}", pad, name) } else { format!("{}{}", name, pad) };
        let is_invalid = matches!(Reading::new(padded, 1.0), Err(SampleError::InvalidArgument(_)));
        prop_assert!(is_invalid);

        let split = format!("{}\n{}", name, name);
        let is_invalid = matches!(Reading::new(split, 1.0), Err(SampleError::InvalidArgument(_)));
        prop_assert!(is_invalid);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn prop_encoded_samples_decode_unchanged(
        names in reading_names(),
        values in prop::collection::vec(prop::collection::vec(quarter_value(), 6), 1..5),
    ) {
        let samples: Vec<Sample> = values
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let pairs = names.iter().zip(row).map(|(n, &v)| (n.as_str(), v));
                Sample::from_pairs(base() + TimeDelta::seconds(i as i64), pairs).unwrap()
            })
            .collect();
        let decoded = codec::decode(&codec::encode_samples(&samples)).unwrap();
        prop_assert_eq!(decoded, samples);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_set_size_and_order(offsets in prop::collection::btree_set(0i64..100_000, 0..12)) {
        let mut samples: Vec<Sample> = offsets
            .iter()
            .map(|&s| Sample::from_pairs(base() + TimeDelta::seconds(s), [(PID_READING, 1.0)]).unwrap())
            .collect();
        samples.reverse();

        let result = SampleSet::new("p", samples, Validation::lenient());
        if offsets.len() < 2 {
            let is_invalid = matches!(result, Err(SampleError::InvalidArgument(_)));
            prop_assert!(is_invalid);
        } else {
            let set = result.unwrap();
            prop_assert_eq!(set.len(), offsets.len());
            prop_assert!(set.samples().windows(2).all(|w| w[0].timestamp() <= w[1].timestamp()));
            prop_assert_eq!(set.meta().intervals().len(), offsets.len() - 1);
            prop_assert!(set.meta().min_interval() <= set.meta().mean_interval());
            prop_assert!(set.meta().mean_interval() <= set.meta().max_interval());
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_covariance_symmetric(
        rows in prop::collection::vec((quarter_value(), quarter_value(), quarter_value()), 2..10),
    ) {
        let samples: Vec<Sample> = rows
            .iter()
            .enumerate()
            .map(|(i, &(a, b, c))| {
                Sample::from_pairs(
                    base() + TimeDelta::seconds(i as i64 * 5),
                    [("a", a), ("b", b), ("c", c)],
                )
                .unwrap()
            })
            .collect();
        let set = SampleSet::new("p", samples, Validation::lenient()).unwrap();
        let cov = set.meta().cov_matrix().unwrap();
        prop_assert_eq!(cov.dim(), 3);
        for i in 0..3 {
            prop_assert!(cov.get(i, i).unwrap() >= 0.0);
            for j in 0..3 {
                prop_assert_eq!(cov.get(i, j), cov.get(j, i));
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_dead_iff_all_zero(values in prop::collection::vec(prop_oneof![Just(0.0), quarter_value()], 1..6)) {
        let pairs = values.iter().enumerate().map(|(i, &v)| (format!("r{}", i), v));
        let sample = Sample::from_pairs(base(), pairs).unwrap();
        prop_assert_eq!(sample.is_dead(), values.iter().all(|&v| v == 0.0));
    }
}
