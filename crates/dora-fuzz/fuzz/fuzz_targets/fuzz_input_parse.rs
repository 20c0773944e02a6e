#![no_main]

use libfuzzer_sys::fuzz_target;
use dora_mcp::models::{FulltextInput, SearchByDateRangeInput, SearchPublicationsInput};

fuzz_target!(|data: &[u8]| {
    // Deserialization and validation must never panic
    if let Ok(input) = serde_json::from_slice::<SearchPublicationsInput>(data) {
        let _ = input.validate();
    }
    if let Ok(input) = serde_json::from_slice::<SearchByDateRangeInput>(data) {
        let _ = input.validate();
    }
    if let Ok(input) = serde_json::from_slice::<FulltextInput>(data) {
        let _ = input.validate();
    }
});
