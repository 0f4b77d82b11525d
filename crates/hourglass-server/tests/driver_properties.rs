//! Property-based tests for the request driver
//!
//! Whatever arrives on a line, the driver answers with a well-formed
//! response and never panics.

use hourglass_core::{Protocol, ServerKeys};
use hourglass_harness::{SimEnv, TEST_MASTER_KEY};
use hourglass_server::RequestDriver;
use proptest::prelude::*;
use serde_json::{Value, json};

fn driver(seed: u64) -> RequestDriver<SimEnv> {
    let env = SimEnv::with_seed(seed);
    RequestDriver::new(Protocol::new(env, ServerKeys::from_master(&TEST_MASTER_KEY)))
}

const KINDS: [&str; 6] = [
    "token_validation",
    "proof_validation",
    "window_not_open",
    "salt_binding",
    "malformed_input",
    "sealed_secret",
];

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: Arbitrary bytes get a failure response or none at all
    #[test]
    fn prop_arbitrary_bytes_never_succeed(line in prop::collection::vec(any::<u8>(), 0..512)) {
        let driver = driver(0);

        if let Some(response) = driver.handle_line(&line) {
            let value: Value = serde_json::from_str(&response)?;
            prop_assert_eq!(&value["ok"], &json!(false));
            prop_assert!(KINDS.contains(&value["error"]["kind"].as_str().unwrap_or("")));
        }
    }

    /// Property: Forged unlock_finish requests are rejected with a known kind
    #[test]
    fn prop_forged_finish_rejected(
        seed in any::<u64>(),
        salt in "[a-f0-9]{27}",
        start in any::<u64>(),
        length in any::<u64>(),
        proof in "[ -~]{0,80}",
        sealed in "[A-Za-z0-9_-]{0,120}",
    ) {
        let driver = driver(seed);
        let request = json!({
            "op": "unlock_finish",
            "salt": salt,
            "windowStart": start,
            "windowEnd": start.saturating_add(length),
            "proof": proof,
            "sealed": sealed,
        });

        let response = driver.handle_line(request.to_string().as_bytes());
        let value: Value = serde_json::from_str(&response.unwrap_or_default())?;
        prop_assert_eq!(&value["ok"], &json!(false));
        prop_assert!(KINDS.contains(&value["error"]["kind"].as_str().unwrap_or("")));
    }
}
