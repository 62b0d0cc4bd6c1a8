//! Content-type classification and decode selection.
//!
//! Matching is an exact string comparison against the configured media types,
//! mirroring the strictness of the negotiated decode contract: a
//! `Content-Type` carrying parameters (`application/json; charset=utf-8`)
//! does not match.

use axum::http::header::{ACCEPT, CONTENT_TYPE};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use tower::BoxError;

use super::{jsonapi, PipelineConfig};

/// Which codec family a response should be written with.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Media {
    Json,
    AttributeDocument,
}

fn header_value<'a>(parts: &'a Parts, name: &axum::http::HeaderName) -> &'a str {
    parts
        .headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
}

/// Decode a JSON body into `I`.
///
/// Unknown-field rejection is the type's responsibility: input types opt in
/// with `#[serde(deny_unknown_fields)]`.
pub fn decode_json_strict<I: DeserializeOwned>(bytes: &[u8]) -> Result<I, BoxError> {
    serde_json::from_slice(bytes).map_err(Into::into)
}

/// Decode per the declared `Content-Type`: the JSON media type selects strict
/// JSON, the attribute media type selects the document codec, anything else
/// fails without attempting a decode.
pub fn decode_negotiated<I: DeserializeOwned>(
    config: &PipelineConfig,
    parts: &Parts,
    bytes: &[u8],
) -> Result<I, BoxError> {
    let declared = header_value(parts, &CONTENT_TYPE);
    if declared == config.json_media_type {
        decode_json_strict(bytes)
    } else if declared == config.attribute_media_type {
        jsonapi::from_document(bytes).map_err(Into::into)
    } else {
        Err(format!(
            "unsupported content type: expected '{}' or '{}'",
            config.json_media_type, config.attribute_media_type
        )
        .into())
    }
}

/// Pick the response codec: `Content-Type` is consulted first, then `Accept`;
/// either matching the attribute media type selects the document codec,
/// everything else defaults to JSON.
pub fn response_media(config: &PipelineConfig, parts: &Parts) -> Media {
    let declared = header_value(parts, &CONTENT_TYPE);
    let accepted = header_value(parts, &ACCEPT);
    if declared == config.attribute_media_type || accepted == config.attribute_media_type {
        Media::AttributeDocument
    } else {
        Media::Json
    }
}
