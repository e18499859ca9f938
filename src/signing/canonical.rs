//! Canonical message construction.
//!
//! Clients and providers sign different shapes:
//!
//! - client API calls sign `METHOD|PATH|TIMESTAMP|BODY`
//! - provider webhooks sign `TIMESTAMP.BODY`
//!
//! The two forms are intentionally separate functions. Providers do not sign
//! the HTTP method or path, and the delimiter conventions differ; collapsing
//! them into one parameterized builder would invite signing the wrong shape.

/// Build the canonical message for a client-signed API request.
///
/// The method is upper-cased so verb casing altered by a client library or
/// proxy cannot change the signed bytes. The body is appended byte-for-byte:
/// no re-serialization, no whitespace or key-order normalization. Caller and
/// verifier must serialize bodies identically.
pub fn request_message(method: &str, path: &str, timestamp: &str, body: &[u8]) -> Vec<u8> {
    let mut message =
        Vec::with_capacity(method.len() + path.len() + timestamp.len() + body.len() + 3);
    message.extend_from_slice(method.to_ascii_uppercase().as_bytes());
    message.push(b'|');
    message.extend_from_slice(path.as_bytes());
    message.push(b'|');
    message.extend_from_slice(timestamp.as_bytes());
    message.push(b'|');
    message.extend_from_slice(body);
    message
}

/// Build the canonical message for a provider webhook delivery.
///
/// Providers sign only the delivery timestamp and the raw payload, joined by
/// a single `.` — the HTTP method and path are not part of the signed bytes.
pub fn webhook_message(timestamp: &str, body: &[u8]) -> Vec<u8> {
    let mut message = Vec::with_capacity(timestamp.len() + body.len() + 1);
    message.extend_from_slice(timestamp.as_bytes());
    message.push(b'.');
    message.extend_from_slice(body);
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_message_layout() {
        let message = request_message("POST", "/api/ramp/session", "1722945600000", b"{\"amount\":100}");
        assert_eq!(
            message,
            b"POST|/api/ramp/session|1722945600000|{\"amount\":100}".to_vec()
        );
    }

    #[test]
    fn test_request_message_uppercases_method() {
        let lower = request_message("post", "/a", "1", b"x");
        let upper = request_message("POST", "/a", "1", b"x");
        assert_eq!(lower, upper);
    }

    #[test]
    fn test_request_message_is_deterministic() {
        let a = request_message("PUT", "/api/cards", "42", b"body");
        let b = request_message("PUT", "/api/cards", "42", b"body");
        assert_eq!(a, b);
    }

    #[test]
    fn test_request_message_preserves_body_bytes() {
        // Body participates verbatim, including whitespace and non-UTF-8 bytes
        let body: &[u8] = &[0x7b, 0x20, 0x00, 0xff, 0x7d];
        let message = request_message("POST", "/p", "1", body);
        assert!(message.ends_with(body));
    }

    #[test]
    fn test_request_message_empty_body() {
        let message = request_message("GET", "/api/profile", "99", b"");
        assert_eq!(message, b"GET|/api/profile|99|".to_vec());
    }

    #[test]
    fn test_webhook_message_layout() {
        let message = webhook_message("1722945600000", b"{\"id\":\"evt_1\"}");
        assert_eq!(message, b"1722945600000.{\"id\":\"evt_1\"}".to_vec());
    }

    #[test]
    fn test_webhook_message_excludes_method_and_path() {
        // The webhook form has no method/path inputs at all; identical
        // (timestamp, body) pairs canonicalize identically no matter how the
        // HTTP request was shaped.
        let a = webhook_message("7", b"payload");
        let b = webhook_message("7", b"payload");
        assert_eq!(a, b);
        assert_eq!(a, b"7.payload".to_vec());
    }

    #[test]
    fn test_forms_differ_for_same_inputs() {
        let request = request_message("POST", "/p", "7", b"payload");
        let webhook = webhook_message("7", b"payload");
        assert_ne!(request, webhook);
    }
}
