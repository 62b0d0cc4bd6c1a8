//! Structured-attribute document codec (JSON:API style).
//!
//! Single-resource documents of the shape
//! `{"data": {"type": "...", "id": "...", "attributes": {...}}}`. Decoding
//! flattens `id` and the attributes into the target type's fields; encoding
//! lifts a string `id` field out of the serialized payload and wraps the rest
//! as attributes.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Media type selecting this codec during content negotiation.
pub const MEDIA_TYPE: &str = "application/vnd.api+json";

/// Payloads encodable as a resource document. The implementor names its
/// resource type; the `id`, if any, comes from a string `id` field of the
/// serialized form.
pub trait ResourceObject: Serialize {
    fn resource_type(&self) -> &'static str;
}

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("invalid resource document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("payload does not serialize to an object")]
    NotAnObject,
    #[error("resource id must be a string")]
    NonStringId,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Document {
    pub data: Resource,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Resource {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

/// Decode a single-resource document into `I`, merging `data.id` into the
/// attribute map under `"id"` first.
pub fn from_document<I: DeserializeOwned>(bytes: &[u8]) -> Result<I, DocumentError> {
    let document: Document = serde_json::from_slice(bytes)?;
    let mut fields = document.data.attributes;
    if let Some(id) = document.data.id {
        fields.insert("id".to_string(), Value::String(id));
    }
    Ok(serde_json::from_value(Value::Object(fields))?)
}

/// Encode a payload as a single-resource document. The payload must serialize
/// to an object; a string `id` field becomes the resource id.
pub fn to_document<P: ResourceObject>(payload: &P) -> Result<Document, DocumentError> {
    let value = serde_json::to_value(payload)?;
    let Value::Object(mut fields) = value else {
        return Err(DocumentError::NotAnObject);
    };
    let id = match fields.remove("id") {
        None | Some(Value::Null) => None,
        Some(Value::String(id)) => Some(id),
        Some(_) => return Err(DocumentError::NonStringId),
    };
    Ok(Document {
        data: Resource {
            kind: payload.resource_type().to_string(),
            id,
            attributes: fields,
        },
    })
}
