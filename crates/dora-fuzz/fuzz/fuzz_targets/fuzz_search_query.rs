#![no_main]

use libfuzzer_sys::fuzz_target;
use dora_mcp::models::PublicationId;
use dora_mcp::query;

fuzz_target!(|data: &str| {
    let encoded = query::build_search_query(data);
    assert!(!encoded.contains(' '));
    assert!(encoded.matches(query::CLAUSE_SEPARATOR).count() >= query::FIELD_WEIGHTS.len() - 1);

    let _ = query::encode_raw_query(data);
    let _ = PublicationId::parse(data);
});
