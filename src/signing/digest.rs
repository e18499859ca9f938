//! HMAC-SHA256 digests and timing-safe comparison.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Compute the HMAC-SHA256 digest of `message` under `secret`, as lowercase
/// hex (64 characters).
pub fn hmac_sha256_hex(secret: &[u8], message: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(message);
    hex::encode(mac.finalize().into_bytes())
}

/// Constant-time comparison to prevent timing attacks
///
/// Uses the `subtle` crate which provides compiler-optimization-resistant
/// constant-time operations, so an attacker cannot use response timing to
/// recover a valid signature byte-by-byte. Inputs of different lengths
/// return `false` without comparing; digest length is fixed, so the length
/// itself is not secret.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.ct_eq(b).into()
}

/// Compare a locally computed digest (lowercase hex) against a digest
/// supplied by a caller.
///
/// The supplied value is hex-decoded first; anything that is not valid hex
/// fails the comparison rather than erroring. The byte comparison runs in
/// constant time.
pub fn digests_match(expected_hex: &str, provided_hex: &str) -> bool {
    let Ok(expected) = hex::decode(expected_hex) else {
        return false;
    };
    let Ok(provided) = hex::decode(provided_hex) else {
        return false;
    };

    constant_time_eq(&expected, &provided)
}
