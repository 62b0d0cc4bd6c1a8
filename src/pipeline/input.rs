//! Input objects: request-scoped records populated from the body.

use serde::Deserialize;
use tower::BoxError;

/// A request body target. The pipeline decodes into a value of the
/// implementing type, then calls [`validate`](InputObject::validate) before
/// handing it to business logic.
///
/// Validation belongs to the type owner: implement whatever field checks the
/// type needs here (the helpers in this module cover the common ones) rather
/// than relying on any generic runtime inspection.
pub trait InputObject: Send {
    /// Set for handler inputs that consume no body at all ([`NoInput`]).
    /// When true the pipeline never reads the body and never calls `decode`.
    const SKIP_DECODE: bool = false;

    fn validate(&self) -> Result<(), BoxError> {
        Ok(())
    }
}

/// Marker input for handlers that produce output without consuming input.
/// Business logic receives `None`. The `Deserialize` impl exists only to
/// satisfy the convenience wrappers' bounds; it is never exercised.
#[derive(Debug, Deserialize)]
pub struct NoInput;

impl InputObject for NoInput {
    const SKIP_DECODE: bool = true;
}

/// Reject string fields containing a semicolon. Prepared statements make this
/// mostly redundant, but it is a cheap guard for values that end up in
/// hand-built SQL. Call from `validate()` with the string fields of the type.
pub fn check_no_injection(fields: &[&str]) -> Result<(), BoxError> {
    for field in fields {
        if field.contains(';') {
            return Err("string field contains a semicolon".into());
        }
    }
    Ok(())
}

/// Split a delimited string into owned parts; an empty input yields an empty
/// vector rather than a single empty element. For input types that receive
/// `"a::b::c"` on the wire but expose a `Vec<String>` field.
pub fn split_delimited(raw: &str, delimiter: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(delimiter).map(str::to_string).collect()
}
