//! Request driver.
//!
//! Maps wire requests onto protocol operations and protocol results onto
//! wire responses. Performs no I/O, so the same driver runs behind the TCP
//! listener and directly in tests over a simulated environment.

use hourglass_core::{Environment, Protocol, ProtocolError};

use crate::wire::{Reply, Request, Response};

/// Sans-IO request handler.
pub struct RequestDriver<E: Environment> {
    protocol: Protocol<E>,
}

impl<E: Environment> RequestDriver<E> {
    /// Create a driver over a protocol instance.
    pub fn new(protocol: Protocol<E>) -> Self {
        Self { protocol }
    }

    /// The wrapped protocol.
    pub fn protocol(&self) -> &Protocol<E> {
        &self.protocol
    }

    /// Handle one decoded request.
    pub fn handle(&self, request: &Request) -> Response {
        let op = request.op();
        match self.dispatch(request) {
            Ok(reply) => {
                tracing::debug!(op, "request succeeded");
                Response::success(reply)
            },
            Err(err) => {
                tracing::debug!(op, kind = err.kind(), "request rejected");
                Response::failure(&err)
            },
        }
    }

    /// Handle one raw request line and encode the response line (without
    /// the trailing newline).
    ///
    /// Returns `None` for blank lines, which get no response.
    pub fn handle_line(&self, line: &[u8]) -> Option<String> {
        let response = match std::str::from_utf8(line) {
            Ok(text) if text.trim().is_empty() => return None,
            Ok(text) => match serde_json::from_str::<Request>(text.trim()) {
                Ok(request) => self.handle(&request),
                Err(e) => {
                    tracing::debug!(error = %e, "unparsable request");
                    Response::failure(&ProtocolError::malformed(format!("invalid request: {e}")))
                },
            },
            Err(_) => Response::failure(&ProtocolError::malformed("request is not UTF-8")),
        };

        Some(encode(&response))
    }

    fn dispatch(&self, request: &Request) -> Result<Reply, ProtocolError> {
        let protocol = &self.protocol;
        match request {
            Request::Setup(req) => protocol.setup(req).map(|tokens| Reply::Tokens { tokens }),
            Request::Seal(req) => protocol.seal(req).map(Reply::Sealed),
            Request::TempBegin(req) => protocol.temp_begin(req).map(Reply::TempBegin),
            Request::TempFastCopy(req) => protocol.temp_fast_copy(req).map(Reply::FastCopy),
            Request::TempUnlockBegin(req) => protocol.temp_unlock_begin(req).map(Reply::Window),
            Request::UnlockBegin(req) => protocol.unlock_begin(req).map(Reply::Window),
            Request::UnlockFinish(req) => protocol.unlock_finish(req).map(Reply::Released),
        }
    }
}

fn encode(response: &Response) -> String {
    serde_json::to_string(response).unwrap_or_else(|e| {
        tracing::error!(error = %e, "response serialization failed");
        r#"{"ok":false,"error":{"kind":"internal","message":"response serialization failed"}}"#
            .to_string()
    })
}

#[cfg(test)]
mod tests {
    use hourglass_core::{Environment, ServerKeys};
    use hourglass_harness::{SimEnv, TEST_MASTER_KEY};
    use serde_json::{Value, json};

    use super::*;

    fn driver(seed: u64) -> (SimEnv, RequestDriver<SimEnv>) {
        let env = SimEnv::with_seed(seed);
        let protocol = Protocol::new(env.clone(), ServerKeys::from_master(&TEST_MASTER_KEY));
        (env, RequestDriver::new(protocol))
    }

    fn call(driver: &RequestDriver<SimEnv>, request: &Value) -> Value {
        let line = driver.handle_line(request.to_string().as_bytes()).unwrap();
        serde_json::from_str(&line).unwrap()
    }

    #[test]
    fn full_temp_flow_over_json() {
        let (env, driver) = driver(1);

        let setup = call(&driver, &json!({ "op": "setup", "delays": ["15m"] }));
        assert_eq!(setup["ok"], true);
        let token = &setup["result"]["tokens"][0];
        assert_eq!(token["name"], "15m");
        let salt = token["salt"].as_str().unwrap();

        let sealed = call(&driver, &json!({ "op": "seal", "password": "hunter2", "salt": salt }));
        let sealed = sealed["result"]["sealed"].as_str().unwrap();

        let begin = call(
            &driver,
            &json!({ "op": "temp_begin", "salt": salt, "delay": "15m", "proof": token["proof"] }),
        );
        assert_eq!(begin["ok"], true);

        env.advance_millis(70_000);
        let fast = call(
            &driver,
            &json!({
                "op": "temp_fast_copy",
                "delay": "15m",
                "salt": salt,
                "createTime": begin["result"]["createTime"],
                "tempproof": begin["result"]["tempproof"],
            }),
        );
        assert_eq!(fast["result"]["minutesElapsed"], "0001");

        let window = call(
            &driver,
            &json!({
                "op": "temp_unlock_begin",
                "delay": "15m",
                "salt": salt,
                "minutesElapsed": fast["result"]["minutesElapsed"],
                "fastproof": fast["result"]["fastproof"],
                "durationMinutes": 5,
                "sealed": sealed,
            }),
        );
        let window = &window["result"];
        let finish = json!({
            "op": "unlock_finish",
            "salt": salt,
            "windowStart": window["windowStart"],
            "windowEnd": window["windowEnd"],
            "proof": window["proof"],
            "sealed": sealed,
        });

        let early = call(&driver, &finish);
        assert_eq!(early["ok"], false);
        assert_eq!(early["error"]["kind"], "window_not_open");
        assert_eq!(early["error"]["retryAfterMs"], 14 * 60_000);

        env.set_millis(window["windowStart"].as_u64().unwrap());
        let released = call(&driver, &finish);
        assert_eq!(released["ok"], true);
        assert_eq!(released["result"]["secret"], "hunter2");
        assert_eq!(released["result"]["timeLeft"], 5 * 60_000);
        assert!(released["result"].get("counter").is_none());
    }

    #[test]
    fn protocol_rejections_carry_kind() {
        let (_env, driver) = driver(2);

        let response = call(
            &driver,
            &json!({ "op": "temp_begin", "salt": "abc", "delay": "15m", "proof": "0000" }),
        );

        assert_eq!(response["ok"], false);
        assert_eq!(response["error"]["kind"], "token_validation");
        assert!(response.get("result").is_none());
    }

    #[test]
    fn garbage_lines_are_malformed_input() {
        let (_env, driver) = driver(3);

        for line in [&b"not json"[..], b"{\"op\":\"nope\"}", b"{\"op\":\"seal\"}", b"\xff\xfe"] {
            let response: Value = serde_json::from_str(&driver.handle_line(line).unwrap()).unwrap();
            assert_eq!(response["error"]["kind"], "malformed_input");
        }
    }

    #[test]
    fn blank_lines_get_no_response() {
        let (_env, driver) = driver(4);

        assert_eq!(driver.handle_line(b""), None);
        assert_eq!(driver.handle_line(b"  \r"), None);
    }

    #[test]
    fn driver_time_comes_from_environment() {
        let (env, driver) = driver(5);
        env.set_millis(1_800_000_000_000);

        let setup = call(&driver, &json!({ "op": "setup", "delays": ["15m"] }));
        let token = &setup["result"]["tokens"][0];
        let begin = call(
            &driver,
            &json!({
                "op": "temp_begin",
                "salt": token["salt"],
                "delay": "15m",
                "proof": token["proof"],
            }),
        );

        assert_eq!(begin["result"]["createTime"], 1_800_000_000_000_u64);
        assert_eq!(driver.protocol().env().now_millis(), 1_800_000_000_000);
    }
}
