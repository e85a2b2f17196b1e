#![no_main]

use fnchain_core::store::BackendConfig;
use libfuzzer_sys::fuzz_target;

// Any document that parses must re-encode to one that parses to the same map.
fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(config) = BackendConfig::parse(text) else {
        return;
    };
    let encoded = config.to_json_string().expect("parsed config must encode");
    let reparsed = BackendConfig::parse(&encoded).expect("encoded config must parse");
    assert_eq!(config.functions(), reparsed.functions());
});
