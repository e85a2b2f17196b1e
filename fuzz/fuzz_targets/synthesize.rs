#![no_main]

use fnchain_core::graph::{FunctionGraph, has_cycle};
use fnchain_core::percent::Percentage;
use fnchain_core::store::BackendConfig;
use fnchain_core::synth::{SynthesisOptions, synthesize};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&pct, rest)) = data.split_first() else {
        return;
    };
    let Ok(text) = std::str::from_utf8(rest) else {
        return;
    };
    let Ok(config) = BackendConfig::parse(text) else {
        return;
    };
    let options = SynthesisOptions {
        percentage: Percentage::new(i64::from(pct % 101)).expect("in range"),
        ..SynthesisOptions::default()
    };

    let input_cyclic = has_cycle(&FunctionGraph::build(config.functions()));
    match synthesize(config.functions(), &options) {
        Ok(result) => {
            assert!(!input_cyclic);
            assert!(!has_cycle(&FunctionGraph::build(&result.functions)));
            let bound = result.metrics.to_serialize.max(0);
            assert!(i64::try_from(result.edges.len()).is_ok_and(|n| n <= bound));
        }
        Err(_) => assert!(input_cyclic),
    }
});
