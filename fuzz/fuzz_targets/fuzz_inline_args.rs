#![no_main]
use libfuzzer_sys::fuzz_target;

/// Fuzz the `--flow` and `--boundary` value parsers.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = stride_tools::parsers::parse_flow_arg(s);
        let _ = stride_tools::parsers::parse_boundary_arg(s);
    }
});
