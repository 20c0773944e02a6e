#![no_main]

use libfuzzer_sys::fuzz_target;
use dora_mcp::client::html;

const PAGE_URL: &str = "https://www.dora.lib4ri.ch/empa/islandora/object/empa:1";

fuzz_target!(|data: &str| {
    let _ = html::extract_abstract(data);
    if let Some(link) = html::find_pdf_link(data, PAGE_URL) {
        assert!(link.starts_with("http") || link.contains(':'));
    }
});
