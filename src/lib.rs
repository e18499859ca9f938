//! Keys Pay — signed-request authentication and provider webhook verification
//!
//! Keys Pay fronts several regulated payment providers behind one platform
//! API without custody of funds. This crate is the trust boundary of that
//! platform:
//!
//! - **Client authentication**: inbound API calls carry `x-timestamp` /
//!   `x-signature` headers signed with a shared secret; verification is
//!   timing-safe and replay-bounded to a five-minute window.
//! - **Webhook verification**: each provider signs `timestamp.body` with its
//!   own secret and header names; deliveries are verified, acknowledged with
//!   a uniform `{"ok":true}`, and deduplicated on redelivery.
//! - **Status normalization**: provider-specific status vocabularies map
//!   onto one small shared enum.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use axum::Router;
//! use keyspay::{AppContext, Config, app};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Initialize logging
//!     keyspay::init_tracing();
//!
//!     // Load and validate configuration (secrets, feature flags)
//!     let config = Config::builder().from_env().build()?;
//!     let ctx = AppContext::new(config);
//!
//!     // Client API routes go behind signature verification
//!     let api = app::signed(&ctx, Router::new());
//!
//!     // Start server
//!     app::serve(ctx, api).await?;
//!     Ok(())
//! }
//! ```

pub mod app;
pub mod auth;
mod config;
mod error;
pub mod providers;
pub mod signing;
pub mod testing;
mod utils;
pub mod webhooks;

// Re-exports for public API
pub use app::AppContext;
pub use auth::{RejectReason, SignedRequest, SignedRequestVerifier, Verification};
pub use config::{AuthConfig, Config, ConfigBuilder, LoggingConfig, ProvidersConfig, ServerConfig};
pub use error::{KeysPayError, Result};
pub use providers::{Feature, Provider, ProviderStatus, normalize};
pub use webhooks::{IdempotencyStore, MemoryIdempotencyStore, WebhookVerifier};

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging with sensible defaults
///
/// This should be called early in your application, typically in main()
/// before creating the AppContext.
///
/// # Environment Variables
///
/// - `RUST_LOG`: Set log level (e.g., "info", "debug", "keyspay=debug")
/// - `KEYSPAY_LOG_JSON`: Set to "true" for JSON formatted logs
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json_logs = std::env::var("KEYSPAY_LOG_JSON")
        .map(|v| v.parse::<bool>().unwrap_or(false))
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

/// Initialize tracing with a custom configuration
pub fn init_tracing_with_config(config: &Config) {
    let env_filter = EnvFilter::new(&config.logging.level);

    if config.logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
