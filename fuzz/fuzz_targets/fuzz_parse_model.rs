#![no_main]
use libfuzzer_sys::fuzz_target;

/// Fuzz threat-model parsing followed by a full analysis pass.
///
/// Any document that parses must analyze without panicking.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(input) = stride_tools::parse_model_str(s, None) {
            let _ = stride_tools::analyze(&input);
        }
    }
});
