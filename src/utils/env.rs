/// Get environment variable with KEYSPAY_ prefix, falling back to unprefixed version
///
/// This helper function checks for `KEYSPAY_{key}` first, then falls back to `{key}`
/// so deployments can use either the namespaced or the plain variable names
/// (`KEYSPAY_HMAC_SHARED_SECRET` or `HMAC_SHARED_SECRET`).
pub fn get_env_with_prefix(key: &str) -> Option<String> {
    std::env::var(format!("KEYSPAY_{}", key))
        .or_else(|_| std::env::var(key))
        .ok()
}
