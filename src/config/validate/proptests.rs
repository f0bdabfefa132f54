//! Property-based tests for configuration validation

use super::error::ValidationError;
use super::validator::validate_spec;
use crate::config::schema::*;
use proptest::prelude::*;

fn arb_valid_spec() -> impl Strategy<Value = HarnessSpec> {
    (
        1usize..512,                   // batch_size
        1usize..100,                   // epochs
        1usize..20,                    // save interval
        1usize..300,                   // embed_size
        proptest::option::of(any::<u64>()), // seed
    )
        .prop_map(|(batch_size, epochs, interval, embed_size, seed)| HarnessSpec {
            fit: FitOptions { batch_size, epochs, verbose: false, seed },
            saver: Some(SaverConfig {
                basename: "model".to_string(),
                directory: ".".into(),
                interval,
                extension: "json".to_string(),
            }),
            preprocessor: Some(PreprocessorConfig { embed_size, ..Default::default() }),
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_valid_spec_passes(spec in arb_valid_spec()) {
        prop_assert!(validate_spec(&spec).is_ok());
    }

    #[test]
    fn prop_zero_batch_size_fails(mut spec in arb_valid_spec()) {
        spec.fit.batch_size = 0;
        prop_assert_eq!(validate_spec(&spec), Err(ValidationError::InvalidBatchSize(0)));
    }

    #[test]
    fn prop_valid_spec_survives_yaml(spec in arb_valid_spec()) {
        let yaml = serde_yaml::to_string(&spec).unwrap();
        let parsed = HarnessSpec::from_yaml_str(&yaml).unwrap();
        prop_assert_eq!(parsed, spec);
    }
}
