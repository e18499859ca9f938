//! Provider webhook handling.
//!
//! Providers notify the platform of transaction progress via signed webhook
//! POSTs. Deliveries are authenticated against the per-provider secret
//! ([`verification`]), acknowledged with a uniform `{"ok":true}` body, and
//! deduplicated so redeliveries ack without reprocessing ([`idempotency`]).
//! [`handler`] mounts one route per registered provider.

pub mod handler;
pub mod idempotency;
pub mod verification;

pub use handler::webhook_routes;
pub use idempotency::{IdempotencyStore, MemoryIdempotencyStore};
pub use verification::WebhookVerifier;
