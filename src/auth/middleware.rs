use axum::{
    body::Body,
    extract::{OriginalUri, Request, State},
    http::Method,
    middleware::Next,
    response::Response,
};

use super::{SIGNATURE_HEADER, TIMESTAMP_HEADER, SignedRequest};
use crate::app::AppContext;
use crate::error::KeysPayError;

/// Middleware that requires a valid client signature on every request it wraps
///
/// The raw body is buffered for verification and re-injected, so downstream
/// handlers receive it byte-for-byte intact. Rejections answer
/// `401 {"code":"UNAUTHENTICATED","message":"timestamp_skew"|"bad_signature"}`
/// and the wrapped handler never runs.
///
/// # Example
///
/// ```rust,ignore
/// use axum::{Router, middleware::from_fn_with_state};
/// use keyspay::auth::require_signed;
///
/// let api = Router::new()
///     .route("/api/ramp/session", post(create_session))
///     .layer(from_fn_with_state(ctx.clone(), require_signed));
/// ```
pub async fn require_signed(
    State(ctx): State<AppContext>,
    request: Request,
    next: Next,
) -> Result<Response, KeysPayError> {
    let (parts, body) = request.into_parts();

    // Routers rewrite the URI when nesting; the client signed the path as it
    // sent it, so prefer the original.
    let path = parts
        .extensions
        .get::<OriginalUri>()
        .map(|uri| uri.0.path().to_owned())
        .unwrap_or_else(|| parts.uri.path().to_owned());

    let timestamp = header_str(&parts.headers, TIMESTAMP_HEADER)
        .unwrap_or("0")
        .to_owned();
    let signature = header_str(&parts.headers, SIGNATURE_HEADER)
        .unwrap_or("")
        .to_owned();

    // Only body-carrying methods include the payload in the signed bytes;
    // for the rest the original body stream is passed through untouched.
    let request = if carries_body(&parts.method) {
        let bytes = axum::body::to_bytes(body, ctx.config.server.max_body_size)
            .await
            .map_err(|e| KeysPayError::bad_request(format!("unreadable request body: {}", e)))?;

        check(&ctx, &SignedRequest {
            method: &parts.method,
            path: &path,
            timestamp: &timestamp,
            signature: &signature,
            body: &bytes,
        })?;

        Request::from_parts(parts, Body::from(bytes))
    } else {
        check(&ctx, &SignedRequest {
            method: &parts.method,
            path: &path,
            timestamp: &timestamp,
            signature: &signature,
            body: b"",
        })?;

        Request::from_parts(parts, body)
    };

    Ok(next.run(request).await)
}

fn check(ctx: &AppContext, request: &SignedRequest<'_>) -> Result<(), KeysPayError> {
    match ctx.verifier.verify(request).reason() {
        None => Ok(()),
        Some(reason) => {
            tracing::warn!(
                method = %request.method,
                path = request.path,
                reason = %reason,
                "Rejected client request signature"
            );
            Err(KeysPayError::unauthenticated(reason.as_str()))
        }
    }
}

fn carries_body(method: &Method) -> bool {
    matches!(method.as_str(), "POST" | "PUT" | "PATCH")
}

fn header_str<'a>(headers: &'a axum::http::HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_carries_body() {
        assert!(carries_body(&Method::POST));
        assert!(carries_body(&Method::PUT));
        assert!(carries_body(&Method::PATCH));
        assert!(!carries_body(&Method::GET));
        assert!(!carries_body(&Method::DELETE));
        assert!(!carries_body(&Method::HEAD));
    }

    #[test]
    fn test_header_str_reads_value() {
        let mut headers = axum::http::HeaderMap::new();
        headers.insert(TIMESTAMP_HEADER, "1722945600000".parse().unwrap());

        assert_eq!(header_str(&headers, TIMESTAMP_HEADER), Some("1722945600000"));
        assert_eq!(header_str(&headers, SIGNATURE_HEADER), None);
    }
}
