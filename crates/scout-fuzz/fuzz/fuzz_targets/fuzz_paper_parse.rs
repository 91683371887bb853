#![no_main]

use libfuzzer_sys::fuzz_target;
use paper_scout_mcp::models::{Paper, PaperId, strip_arxiv_version};

fuzz_target!(|data: &[u8]| {
    // Parsing arbitrary bytes must never panic, only return Ok or Err
    let _ = serde_json::from_slice::<Paper>(data);

    if let Ok(text) = std::str::from_utf8(data) {
        let _ = text.parse::<PaperId>();
        let _ = strip_arxiv_version(text);
    }
});
