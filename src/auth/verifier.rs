use axum::http::Method;
use secrecy::{ExposeSecret, SecretString};

use crate::signing;

/// Default replay window: a signed request is accepted for at most five
/// minutes of clock skew in either direction.
pub const DEFAULT_MAX_SKEW_MS: i64 = 300_000;

/// An inbound client request reduced to the fields that participate in
/// signature verification.
///
/// `timestamp` and `signature` are the raw header values; the canonical
/// message is built over the exact timestamp string the client signed, so it
/// is never re-formatted here. `body` is the raw payload for body-carrying
/// methods and empty otherwise.
#[derive(Debug, Clone, Copy)]
pub struct SignedRequest<'a> {
    pub method: &'a Method,
    pub path: &'a str,
    pub timestamp: &'a str,
    pub signature: &'a str,
    pub body: &'a [u8],
}

/// Why a signed request was rejected.
///
/// Skew failures are reported distinctly so operators can tell clock drift
/// from forgery; signature failures stay generic and do not reveal which
/// part of the canonical message mismatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    TimestampSkew,
    BadSignature,
}

impl RejectReason {
    pub fn as_str(self) -> &'static str {
        match self {
            RejectReason::TimestampSkew => "timestamp_skew",
            RejectReason::BadSignature => "bad_signature",
        }
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of verifying a [`SignedRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    Accepted,
    Rejected(RejectReason),
}

impl Verification {
    pub fn is_accepted(self) -> bool {
        matches!(self, Verification::Accepted)
    }

    pub fn reason(self) -> Option<RejectReason> {
        match self {
            Verification::Accepted => None,
            Verification::Rejected(reason) => Some(reason),
        }
    }
}

/// Verifier for client-signed API requests.
///
/// A pure, stateless predicate over a request: no shared mutable state, so
/// any number of verifications may run concurrently. Constructed once at
/// startup with the shared client secret and handed to the middleware.
pub struct SignedRequestVerifier {
    secret: SecretString,
    max_skew_ms: i64,
}

impl SignedRequestVerifier {
    pub fn new(secret: impl Into<SecretString>) -> Self {
        Self {
            secret: secret.into(),
            max_skew_ms: DEFAULT_MAX_SKEW_MS,
        }
    }

    pub fn with_max_skew_ms(mut self, max_skew_ms: i64) -> Self {
        self.max_skew_ms = max_skew_ms;
        self
    }

    /// Verify a request against the wall clock.
    pub fn verify(&self, request: &SignedRequest<'_>) -> Verification {
        self.verify_at(request, now_ms())
    }

    /// Verify a request as of the given clock reading (epoch milliseconds).
    ///
    /// The timestamp check runs first and takes priority: a stale request is
    /// reported as `timestamp_skew` even if its signature would also fail.
    /// A missing or unparseable timestamp is treated as `0`, which always
    /// falls outside the window.
    pub fn verify_at(&self, request: &SignedRequest<'_>, now_ms: i64) -> Verification {
        let timestamp: i64 = request.timestamp.parse().unwrap_or(0);
        let skew = (now_ms - timestamp).abs();
        if skew > self.max_skew_ms {
            return Verification::Rejected(RejectReason::TimestampSkew);
        }

        let message = signing::request_message(
            request.method.as_str(),
            request.path,
            request.timestamp,
            request.body,
        );
        let expected =
            signing::hmac_sha256_hex(self.secret.expose_secret().as_bytes(), &message);

        if signing::digests_match(&expected, request.signature) {
            Verification::Accepted
        } else {
            Verification::Rejected(RejectReason::BadSignature)
        }
    }
}

fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_722_945_600_000;

    fn verifier() -> SignedRequestVerifier {
        SignedRequestVerifier::new("s3cr3t".to_string())
    }

    fn sign(method: &Method, path: &str, timestamp: &str, body: &[u8]) -> String {
        let message = signing::request_message(method.as_str(), path, timestamp, body);
        signing::hmac_sha256_hex(b"s3cr3t", &message)
    }

    fn request<'a>(
        method: &'a Method,
        path: &'a str,
        timestamp: &'a str,
        signature: &'a str,
        body: &'a [u8],
    ) -> SignedRequest<'a> {
        SignedRequest {
            method,
            path,
            timestamp,
            signature,
            body,
        }
    }

    // ============ happy path tests ============

    #[test]
    fn test_valid_post_is_accepted() {
        let ts = NOW.to_string();
        let sig = sign(&Method::POST, "/api/ramp/session", &ts, b"{\"amount\":100}");
        let req = request(&Method::POST, "/api/ramp/session", &ts, &sig, b"{\"amount\":100}");

        assert_eq!(verifier().verify_at(&req, NOW), Verification::Accepted);
    }

    #[test]
    fn test_valid_get_with_empty_body_is_accepted() {
        let ts = NOW.to_string();
        let sig = sign(&Method::GET, "/api/profile", &ts, b"");
        let req = request(&Method::GET, "/api/profile", &ts, &sig, b"");

        assert_eq!(verifier().verify_at(&req, NOW), Verification::Accepted);
    }

    // ============ skew window tests ============

    #[test]
    fn test_skew_boundary_is_inclusive() {
        let ts = (NOW - DEFAULT_MAX_SKEW_MS).to_string();
        let sig = sign(&Method::POST, "/p", &ts, b"x");
        let req = request(&Method::POST, "/p", &ts, &sig, b"x");

        // Exactly 300_000ms old still passes
        assert_eq!(verifier().verify_at(&req, NOW), Verification::Accepted);
    }

    #[test]
    fn test_one_past_skew_boundary_fails() {
        let ts = (NOW - DEFAULT_MAX_SKEW_MS - 1).to_string();
        let sig = sign(&Method::POST, "/p", &ts, b"x");
        let req = request(&Method::POST, "/p", &ts, &sig, b"x");

        assert_eq!(
            verifier().verify_at(&req, NOW),
            Verification::Rejected(RejectReason::TimestampSkew)
        );
    }

    #[test]
    fn test_future_timestamps_are_bounded_too() {
        let ts = (NOW + DEFAULT_MAX_SKEW_MS + 1).to_string();
        let sig = sign(&Method::POST, "/p", &ts, b"x");
        let req = request(&Method::POST, "/p", &ts, &sig, b"x");

        assert_eq!(
            verifier().verify_at(&req, NOW),
            Verification::Rejected(RejectReason::TimestampSkew)
        );
    }

    #[test]
    fn test_replay_ten_minutes_later_is_stale() {
        let ts = NOW.to_string();
        let sig = sign(&Method::POST, "/api/ramp/session", &ts, b"{\"amount\":100}");
        let req = request(&Method::POST, "/api/ramp/session", &ts, &sig, b"{\"amount\":100}");

        assert_eq!(verifier().verify_at(&req, NOW), Verification::Accepted);
        assert_eq!(
            verifier().verify_at(&req, NOW + 600_000),
            Verification::Rejected(RejectReason::TimestampSkew)
        );
    }

    #[test]
    fn test_missing_timestamp_defaults_to_zero_and_fails_skew() {
        let req = request(&Method::POST, "/p", "0", "deadbeef", b"x");
        assert_eq!(
            verifier().verify_at(&req, NOW),
            Verification::Rejected(RejectReason::TimestampSkew)
        );
    }

    #[test]
    fn test_unparseable_timestamp_fails_skew_not_panics() {
        let req = request(&Method::POST, "/p", "yesterday", "deadbeef", b"x");
        assert_eq!(
            verifier().verify_at(&req, NOW),
            Verification::Rejected(RejectReason::TimestampSkew)
        );
    }

    // ============ tampering tests ============

    #[test]
    fn test_tampered_body_is_bad_signature() {
        let ts = NOW.to_string();
        let sig = sign(&Method::POST, "/p", &ts, b"{\"amount\":100}");
        let req = request(&Method::POST, "/p", &ts, &sig, b"{\"amount\":101}");

        assert_eq!(
            verifier().verify_at(&req, NOW),
            Verification::Rejected(RejectReason::BadSignature)
        );
    }

    #[test]
    fn test_tampered_path_is_bad_signature() {
        let ts = NOW.to_string();
        let sig = sign(&Method::POST, "/api/ramp/session", &ts, b"x");
        let req = request(&Method::POST, "/api/ramp/sessioN", &ts, &sig, b"x");

        assert_eq!(
            verifier().verify_at(&req, NOW),
            Verification::Rejected(RejectReason::BadSignature)
        );
    }

    #[test]
    fn test_tampered_method_is_bad_signature() {
        let ts = NOW.to_string();
        let sig = sign(&Method::POST, "/p", &ts, b"x");
        let req = request(&Method::PUT, "/p", &ts, &sig, b"x");

        assert_eq!(
            verifier().verify_at(&req, NOW),
            Verification::Rejected(RejectReason::BadSignature)
        );
    }

    #[test]
    fn test_tampered_timestamp_within_window_is_bad_signature() {
        // Shifting the timestamp by 1ms keeps it inside the window but
        // breaks the signed bytes, so the failure is bad_signature, not skew.
        let ts = NOW.to_string();
        let shifted = (NOW + 1).to_string();
        let sig = sign(&Method::POST, "/p", &ts, b"x");
        let req = request(&Method::POST, "/p", &shifted, &sig, b"x");

        assert_eq!(
            verifier().verify_at(&req, NOW),
            Verification::Rejected(RejectReason::BadSignature)
        );
    }

    #[test]
    fn test_wrong_secret_is_bad_signature() {
        let ts = NOW.to_string();
        let message = signing::request_message("POST", "/p", &ts, b"x");
        let sig = signing::hmac_sha256_hex(b"other-secret", &message);
        let req = request(&Method::POST, "/p", &ts, &sig, b"x");

        assert_eq!(
            verifier().verify_at(&req, NOW),
            Verification::Rejected(RejectReason::BadSignature)
        );
    }

    #[test]
    fn test_method_case_is_normalized_not_tampering() {
        // Signatures computed over a lower-cased verb still verify: the
        // canonicalizer upper-cases before signing on both sides.
        let ts = NOW.to_string();
        let message = signing::request_message("post", "/p", &ts, b"x");
        let sig = signing::hmac_sha256_hex(b"s3cr3t", &message);
        let req = request(&Method::POST, "/p", &ts, &sig, b"x");

        assert_eq!(verifier().verify_at(&req, NOW), Verification::Accepted);
    }

    // ============ Verification accessor tests ============

    #[test]
    fn test_verification_accessors() {
        assert!(Verification::Accepted.is_accepted());
        assert_eq!(Verification::Accepted.reason(), None);

        let rejected = Verification::Rejected(RejectReason::BadSignature);
        assert!(!rejected.is_accepted());
        assert_eq!(rejected.reason(), Some(RejectReason::BadSignature));
        assert_eq!(rejected.reason().unwrap().as_str(), "bad_signature");
    }
}
