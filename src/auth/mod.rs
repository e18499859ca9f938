//! Client request authentication.
//!
//! Inbound API calls from the Keys Pay frontend carry two headers:
//!
//! - `x-timestamp`: decimal epoch milliseconds at which the client signed
//! - `x-signature`: lowercase hex HMAC-SHA256 over
//!   `METHOD|PATH|TIMESTAMP|BODY` under the shared client secret
//!
//! [`verifier`] holds the pure verification predicate; [`middleware`] wires
//! it into axum so route handlers behind it only ever see authenticated
//! requests, with the body intact.

pub mod middleware;
mod verifier;

pub use middleware::require_signed;
pub use verifier::{
    DEFAULT_MAX_SKEW_MS, RejectReason, SignedRequest, SignedRequestVerifier, Verification,
};

/// Header carrying the client's signing timestamp (decimal epoch ms).
pub const TIMESTAMP_HEADER: &str = "x-timestamp";

/// Header carrying the client's request signature (lowercase hex).
pub const SIGNATURE_HEADER: &str = "x-signature";
