use std::sync::Arc;

use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::signal;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::auth::{SignedRequestVerifier, require_signed};
use crate::config::Config;
use crate::providers::Feature;
use crate::webhooks::{IdempotencyStore, MemoryIdempotencyStore, webhook_routes};

/// Application context for dependency injection and shared state
///
/// Holds the immutable configuration, the client-request verifier built from
/// it, and the webhook idempotency store. Constructed once at startup and
/// cloned cheaply into every handler via axum state.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub verifier: Arc<SignedRequestVerifier>,
    pub acks: Arc<dyn IdempotencyStore>,
}

impl AppContext {
    /// Create a context from a validated configuration, with the in-memory
    /// idempotency store.
    pub fn new(config: Config) -> Self {
        let verifier = SignedRequestVerifier::new(config.auth.client_secret.clone())
            .with_max_skew_ms(config.auth.max_skew_ms);

        Self {
            config: Arc::new(config),
            verifier: Arc::new(verifier),
            acks: Arc::new(MemoryIdempotencyStore::new()),
        }
    }

    /// Replace the idempotency store (e.g. with a database-backed one).
    pub fn with_idempotency_store(mut self, store: Arc<dyn IdempotencyStore>) -> Self {
        self.acks = store;
        self
    }
}

/// Wrap a route group in client signature verification.
///
/// Handlers inside only ever run for authenticated requests; see
/// [`require_signed`](crate::auth::require_signed).
pub fn signed(ctx: &AppContext, routes: Router<AppContext>) -> Router<AppContext> {
    routes.layer(middleware::from_fn_with_state(ctx.clone(), require_signed))
}

/// Wrap a route group in a feature-flag gate.
///
/// When the feature is disabled the gate answers `403 disabled` before any
/// inner middleware runs, so apply it *around* [`signed`]:
///
/// ```rust,ignore
/// let ramp_api = app::gated(&ctx, Feature::Ramp, app::signed(&ctx, ramp_routes));
/// ```
pub fn gated(ctx: &AppContext, feature: Feature, routes: Router<AppContext>) -> Router<AppContext> {
    routes.layer(middleware::from_fn_with_state(
        (ctx.clone(), feature),
        feature_gate,
    ))
}

/// Middleware rejecting requests to routes whose feature flag is disabled.
pub async fn feature_gate(
    State((ctx, feature)): State<(AppContext, Feature)>,
    request: Request,
    next: Next,
) -> Response {
    if !ctx.config.feature_enabled(feature) {
        tracing::debug!(feature = feature.name(), "Rejected request to disabled feature");
        return (StatusCode::FORBIDDEN, "disabled").into_response();
    }

    next.run(request).await
}

/// Assemble the platform router: provider webhook routes plus the supplied
/// client API routes, under request-id and trace layers.
///
/// API routes should be registered with their full paths (e.g.
/// `/api/ramp/session`) and composed with [`signed`] / [`gated`]; clients
/// sign the path exactly as sent.
pub fn router(ctx: AppContext, api: Router<AppContext>) -> Router {
    Router::new()
        .merge(webhook_routes())
        .merge(api)
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

/// Start the platform server with graceful shutdown.
pub async fn serve(ctx: AppContext, api: Router<AppContext>) -> Result<(), std::io::Error> {
    let addr = ctx
        .config
        .server
        .addr()
        .expect("Invalid server address in config");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Keys Pay platform listening on http://{}", addr);

    axum::serve(listener, router(ctx, api))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

/// Middleware for adding request ID to all requests
#[derive(Clone, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let request_id = Uuid::new_v4().to_string().parse().ok()?;
        Some(RequestId::new(request_id))
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal, starting graceful shutdown");
        },
    }
}
