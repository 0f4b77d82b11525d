//! Fuzz target for the request line decoder
//!
//! # Invariants
//!
//! - NEVER panic on arbitrary bytes
//! - Every non-blank line gets exactly one JSON response
//! - Arbitrary bytes never produce a successful response

#![no_main]

use hourglass_core::{Protocol, ServerKeys};
use hourglass_harness::{SimEnv, TEST_MASTER_KEY};
use hourglass_server::RequestDriver;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|line: &[u8]| {
    let protocol = Protocol::new(SimEnv::with_seed(0), ServerKeys::from_master(&TEST_MASTER_KEY));
    let driver = RequestDriver::new(protocol);

    let blank = std::str::from_utf8(line).is_ok_and(|text| text.trim().is_empty());
    match driver.handle_line(line) {
        None => assert!(blank, "non-blank line got no response"),
        Some(response) => {
            let value: serde_json::Value =
                serde_json::from_str(&response).expect("response is JSON");
            if value["ok"] == true {
                // Only a well-formed setup or seal request can succeed without
                // a prior proof.
                let text = std::str::from_utf8(line).expect("successful request is UTF-8");
                let request: serde_json::Value =
                    serde_json::from_str(text.trim()).expect("successful request is JSON");
                assert!(
                    request["op"] == "setup" || request["op"] == "seal",
                    "unexpected success for {request}"
                );
            }
        },
    }
});
