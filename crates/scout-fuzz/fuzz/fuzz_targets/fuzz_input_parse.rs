#![no_main]

use libfuzzer_sys::fuzz_target;
use paper_scout_mcp::models::SearchPapersInput;

fuzz_target!(|data: &[u8]| {
    // Try to parse arbitrary bytes as SearchPapersInput
    let _ = serde_json::from_slice::<SearchPapersInput>(data);
});
