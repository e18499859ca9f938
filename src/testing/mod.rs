//! Testing utilities for the Keys Pay platform
//!
//! Provides fluent HTTP endpoint testing without running a server, plus
//! helpers that sign requests the way real clients and providers do.
//!
//! # Example
//!
//! ```rust,ignore
//! use keyspay::testing::{self, client_signature, now_timestamp_ms};
//! use axum::http::Method;
//!
//! #[tokio::test]
//! async fn test_signed_call() {
//!     let body = br#"{"amount":100}"#;
//!     let ts = now_timestamp_ms();
//!     let sig = client_signature("s3cr3t", &Method::POST, "/api/ramp/session", &ts, body);
//!
//!     testing::post(app, "/api/ramp/session")
//!         .header("x-timestamp", &ts)
//!         .header("x-signature", &sig)
//!         .text_body(String::from_utf8_lossy(body))
//!         .execute()
//!         .await
//!         .assert_ok();
//! }
//! ```

mod scenario;

pub use scenario::{Scenario, ScenarioAssert, get, patch, post, put};

use axum::http::Method;

use crate::signing;

/// The current wall clock as a decimal epoch-milliseconds string, the format
/// clients put in `x-timestamp`.
pub fn now_timestamp_ms() -> String {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
        .to_string()
}

/// Compute a client request signature exactly as the frontend does:
/// HMAC-SHA256 over `METHOD|PATH|TIMESTAMP|BODY`, lowercase hex.
pub fn client_signature(
    secret: &str,
    method: &Method,
    path: &str,
    timestamp: &str,
    body: &[u8],
) -> String {
    let message = signing::request_message(method.as_str(), path, timestamp, body);
    signing::hmac_sha256_hex(secret.as_bytes(), &message)
}

/// Compute a provider webhook signature: HMAC-SHA256 over
/// `TIMESTAMP.BODY`, lowercase hex.
pub fn webhook_signature(secret: &str, timestamp: &str, body: &[u8]) -> String {
    let message = signing::webhook_message(timestamp, body);
    signing::hmac_sha256_hex(secret.as_bytes(), &message)
}
