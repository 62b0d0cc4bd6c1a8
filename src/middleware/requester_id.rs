//! Requester-id header enforcement.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderName, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

/// State for [`require_requester_id`]: which header carries the caller's id.
#[derive(Clone)]
pub struct RequesterIdConfig {
    pub header: HeaderName,
}

/// Reject requests whose requester-id header is absent, empty, or not a UUID.
pub async fn require_requester_id(
    State(config): State<RequesterIdConfig>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let value = request
        .headers()
        .get(&config.header)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");

    if value.is_empty() {
        let message = format!("no '{}' header", config.header);
        tracing::debug!(header = %config.header, "rejecting request without requester id");
        return (StatusCode::BAD_REQUEST, message).into_response();
    }

    if Uuid::parse_str(value).is_err() {
        let message = format!("'{}' header is not a valid UUID", config.header);
        tracing::debug!(header = %config.header, "rejecting request with malformed requester id");
        return (StatusCode::BAD_REQUEST, message).into_response();
    }

    next.run(request).await
}
