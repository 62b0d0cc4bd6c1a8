//! Request tracing: id assignment and start/finish logging.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderName, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

/// State for [`trace_requests`]: which header carries the trace id.
#[derive(Clone)]
pub struct TraceIdConfig {
    pub header: HeaderName,
}

/// Ensure every request carries a trace id (generating a v4 UUID when the
/// header is absent or unreadable) and log receipt and completion. Downstream
/// handlers see the header on the request and can propagate it.
pub async fn trace_requests(
    State(config): State<TraceIdConfig>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let request_id = match request
        .headers()
        .get(&config.header)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
    {
        Some(existing) => existing.to_string(),
        None => {
            let generated = Uuid::new_v4().to_string();
            if let Ok(value) = HeaderValue::from_str(&generated) {
                request.headers_mut().insert(config.header.clone(), value);
            }
            generated
        }
    };

    let uri = request.uri().to_string();
    tracing::info!(request_id = %request_id, uri = %uri, "request received");

    let response = next.run(request).await;

    tracing::info!(
        request_id = %request_id,
        uri = %uri,
        status = %response.status(),
        "request finished"
    );
    response
}
