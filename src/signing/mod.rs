//! Canonical message construction and keyed digests.
//!
//! Every trust decision in the platform reduces to "was this exact byte
//! sequence signed with this secret?". This module owns both halves of that
//! question: building the byte sequence ([`canonical`]) and computing and
//! comparing digests over it ([`digest`]).

pub mod canonical;
pub mod digest;

pub use canonical::{request_message, webhook_message};
pub use digest::{constant_time_eq, digests_match, hmac_sha256_hex};
