#![no_main]
use libfuzzer_sys::fuzz_target;

/// Fuzz keyword detection on arbitrary descriptions.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = stride_tools::analysis::detect(s);
    }
});
