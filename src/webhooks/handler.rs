use axum::{
    Json, Router,
    extract::{Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde::Serialize;

use super::verification::WebhookVerifier;
use crate::app::AppContext;
use crate::error::KeysPayError;
use crate::providers::Provider;

/// Uniform acknowledgement body returned for every accepted delivery.
#[derive(Serialize)]
struct Ack {
    ok: bool,
}

/// Build the webhook router: one POST route per registered provider.
///
/// Route behavior, in order: disabled feature answers `403 disabled` before
/// any verification; a delivery that fails signature verification answers
/// `401 invalid` and is not processed; a verified delivery is acknowledged
/// with `200 {"ok":true}`. Redeliveries of an already-acknowledged delivery
/// get the same acknowledgement without being processed again.
pub fn webhook_routes() -> Router<AppContext> {
    let mut router = Router::new();
    for provider in Provider::ALL {
        router = router.route(
            provider.webhook_path(),
            post(move |state: State<AppContext>, request: Request| {
                receive(provider, state, request)
            }),
        );
    }
    router
}

async fn receive(
    provider: Provider,
    State(ctx): State<AppContext>,
    request: Request,
) -> Response {
    if !ctx.config.feature_enabled(provider.feature()) {
        return (StatusCode::FORBIDDEN, "disabled").into_response();
    }

    let (parts, body) = request.into_parts();

    let timestamp = header_str(&parts.headers, provider.timestamp_header())
        .unwrap_or("")
        .to_owned();
    let signature = header_str(&parts.headers, provider.signature_header())
        .unwrap_or("")
        .to_owned();

    let payload = match axum::body::to_bytes(body, ctx.config.server.max_body_size).await {
        Ok(payload) => payload,
        Err(e) => {
            return KeysPayError::bad_request(format!("unreadable webhook body: {}", e))
                .into_response();
        }
    };

    let verifier = WebhookVerifier::new(ctx.config.webhook_secret(provider).clone());
    if !verifier.verify(&timestamp, &payload, &signature) {
        tracing::warn!(provider = provider.name(), "Rejected webhook delivery");
        return (StatusCode::UNAUTHORIZED, "invalid").into_response();
    }

    // The signature is a keyed digest of the full delivery, so it doubles as
    // the dedup key; no payload parsing happens at this layer.
    let key = format!("{}:{}", provider.name(), signature);
    match ctx.acks.is_processed(&key).await {
        Ok(true) => {
            tracing::debug!(
                provider = provider.name(),
                "Duplicate webhook delivery, acknowledging without reprocessing"
            );
        }
        Ok(false) => {
            if let Err(e) = ctx.acks.mark_processed(key).await {
                tracing::warn!(provider = provider.name(), error = %e, "Failed to record webhook delivery");
            }
            tracing::info!(
                provider = provider.name(),
                bytes = payload.len(),
                "Webhook delivery verified"
            );
        }
        Err(e) => {
            // A dedup-store failure must not turn a healthy delivery into an
            // error response; duplicate processing is the accepted cost.
            tracing::warn!(provider = provider.name(), error = %e, "Idempotency check failed, acknowledging delivery");
        }
    }

    (StatusCode::OK, Json(Ack { ok: true })).into_response()
}

fn header_str<'a>(headers: &'a axum::http::HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}
