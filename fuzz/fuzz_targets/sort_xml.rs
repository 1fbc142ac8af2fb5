#![no_main]
use libfuzzer_sys::fuzz_target;
use xmlsort::{Options, sort_bytes};

fuzz_target!(|data: &[u8]| {
    let options = Options::new().use_group(true);
    if let Ok(sorted) = sort_bytes(data, &options) {
        // anything we emit must parse again
        assert!(sort_bytes(sorted.as_bytes(), &options).is_ok());
    }
});
