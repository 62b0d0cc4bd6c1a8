//! Permissive CORS for locally-running web frontends.

use axum::http::{header, HeaderName, Method};
use tower_http::cors::{Any, CorsLayer};

/// Build a wildcard-origin CORS layer allowing the headers internal tools
/// commonly send, plus the host's requester-id header. Preflight requests are
/// answered by the layer itself.
///
/// The wildcard origin rules out `Access-Control-Allow-Credentials`; hosts
/// needing credentialed requests must build their own layer with explicit
/// origins.
pub fn cors_layer(requester_id_header: HeaderName) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::POST,
            Method::OPTIONS,
            Method::GET,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::CONTENT_LENGTH,
            header::ACCEPT_ENCODING,
            header::AUTHORIZATION,
            header::ACCEPT,
            header::ORIGIN,
            header::CACHE_CONTROL,
            HeaderName::from_static("x-csrf-token"),
            HeaderName::from_static("x-requested-with"),
            HeaderName::from_static("session"),
            requester_id_header,
        ])
}
