use secrecy::{ExposeSecret, SecretString};

use crate::signing;

/// HMAC-SHA256 webhook verifier with timing-safe comparison
///
/// Each provider signs `timestamp.rawBody` with its own shared secret and
/// sends the lowercase hex digest in its own signature header; the header
/// names live in the provider registry, not here. Unlike client request
/// verification, no freshness window is applied: webhook delivery latency is
/// allowed to exceed the client skew window, and the contract is a plain
/// accept/reject boolean.
///
/// # Example
///
/// ```rust,ignore
/// use keyspay::webhooks::WebhookVerifier;
///
/// let verifier = WebhookVerifier::new(config.webhook_secret(provider).clone());
/// let is_valid = verifier.verify(timestamp, &raw_body, signature);
/// ```
pub struct WebhookVerifier {
    secret: SecretString,
}

impl WebhookVerifier {
    pub fn new(secret: impl Into<SecretString>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Verify a webhook delivery.
    ///
    /// `timestamp` is the raw value of the provider's timestamp header and
    /// `payload` the raw request body; the expected digest is computed over
    /// `timestamp.payload`. A malformed or missing signature fails
    /// verification, it never errors.
    pub fn verify(&self, timestamp: &str, payload: &[u8], signature: &str) -> bool {
        let message = signing::webhook_message(timestamp, payload);
        let expected =
            signing::hmac_sha256_hex(self.secret.expose_secret().as_bytes(), &message);

        let is_valid = signing::digests_match(&expected, signature);

        if !is_valid {
            tracing::debug!("Webhook signature verification failed");
        }

        is_valid
    }
}
