//! Response writers.
//!
//! Every writer serializes the payload into a buffer *before* building the
//! response. If the status were committed first and serialization failed
//! afterwards, the client would see a success status with a truncated or
//! absent body; buffering first lets a serialization failure surface as a
//! proper error status instead.

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Response, StatusCode};
use axum::http::request::Parts;
use serde::Serialize;
use tower::BoxError;

use super::codec::{self, Media};
use super::jsonapi::{self, ResourceObject};
use super::PipelineConfig;

/// Serialize `payload` as JSON and respond with `status`.
pub fn write_json<P: Serialize>(
    config: &PipelineConfig,
    payload: &P,
    status: StatusCode,
) -> Result<Response<Body>, BoxError> {
    let buffer = serde_json::to_vec(payload)?;
    let response = Response::builder()
        .status(status)
        .header(CONTENT_TYPE, config.json_media_type.as_str())
        .body(Body::from(buffer))?;
    Ok(response)
}

/// Serialize `payload` as a single-resource attribute document and respond
/// with `status`.
pub fn write_document<P: ResourceObject>(
    config: &PipelineConfig,
    payload: &P,
    status: StatusCode,
) -> Result<Response<Body>, BoxError> {
    let document = jsonapi::to_document(payload)?;
    let buffer = serde_json::to_vec(&document)?;
    let response = Response::builder()
        .status(status)
        .header(CONTENT_TYPE, config.attribute_media_type.as_str())
        .body(Body::from(buffer))?;
    Ok(response)
}

/// Write with the codec the request negotiated (`Content-Type` first, then
/// `Accept`; default JSON).
pub fn write_negotiated<P: ResourceObject>(
    config: &PipelineConfig,
    parts: &Parts,
    payload: &P,
    status: StatusCode,
) -> Result<Response<Body>, BoxError> {
    match codec::response_media(config, parts) {
        Media::Json => write_json(config, payload, status),
        Media::AttributeDocument => write_document(config, payload, status),
    }
}

/// 204 response for handlers whose success carries no payload.
pub fn no_content() -> Response<Body> {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::NO_CONTENT;
    response
}
