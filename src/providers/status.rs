//! Provider status normalization.
//!
//! Each provider reports transaction state in its own vocabulary. Downstream
//! flows work against the small shared [`ProviderStatus`] set; the mappings
//! here are total and case-insensitive, so a provider introducing a new
//! status string degrades the transaction to a conservative in-flight state
//! instead of failing the caller. New provider statuses should be added as
//! explicit arms rather than left to the fallback long-term.

use serde::Serialize;

use super::Provider;

/// Normalized transaction status shared across all providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderStatus {
    Created,
    Authorized,
    Processing,
    Completed,
    Failed,
}

impl ProviderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderStatus::Created => "created",
            ProviderStatus::Authorized => "authorized",
            ProviderStatus::Processing => "processing",
            ProviderStatus::Completed => "completed",
            ProviderStatus::Failed => "failed",
        }
    }

    /// Map a raw Ramp status string onto the shared set.
    pub fn from_ramp(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "completed" => ProviderStatus::Completed,
            "failed" | "cancelled" => ProviderStatus::Failed,
            "authorized" => ProviderStatus::Authorized,
            // unknown -> conservative in-flight status
            _ => ProviderStatus::Created,
        }
    }

    /// Map a raw Nium status string onto the shared set.
    pub fn from_nium(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "completed" | "success" => ProviderStatus::Completed,
            "failed" | "rejected" => ProviderStatus::Failed,
            // unknown -> conservative in-flight status
            _ => ProviderStatus::Processing,
        }
    }
}

impl std::fmt::Display for ProviderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalize a provider's raw status string onto [`ProviderStatus`].
pub fn normalize(provider: Provider, raw: &str) -> ProviderStatus {
    match provider {
        Provider::Ramp => ProviderStatus::from_ramp(raw),
        Provider::Nium => ProviderStatus::from_nium(raw),
    }
}
