//! Three-stage request dispatch.
//!
//! # Responsibilities
//! - Split every handler into decode+validate, business logic, and
//!   encode+respond, wired together with a single well-defined error path
//! - Cap body reads before decoding begins
//! - Negotiate request/response codecs from the declared media types
//!
//! # Design Decisions
//! - All decode and validation failures map to 400: preprocessing errors are
//!   client-input errors by policy. A decode function that fails for a
//!   non-input reason is still reported as 400; keep such logic out of the
//!   preprocessing stage if that matters to you.
//! - Business logic keeps full control of its failure status; the pipeline
//!   never reinterprets it.
//! - Payloads are serialized before any status is committed (see `respond`).
//! - The error sink runs exactly once per failed request and never on the
//!   success path.

pub mod codec;
pub mod input;
pub mod jsonapi;
pub mod respond;

use std::fmt;
use std::future::Future;

use axum::body::{to_bytes, Body};
use axum::http::request::Parts;
use axum::http::{Request, Response, StatusCode};
use axum::response::IntoResponse;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tower::BoxError;

pub use input::{InputObject, NoInput};
pub use jsonapi::ResourceObject;

/// Default request body cap: 512 KiB.
pub const DEFAULT_MAX_BODY_BYTES: usize = 524288;

/// Pipeline settings. These were ambient globals in earlier incarnations of
/// this library; they are explicit values here so tests and hosts can vary
/// them per instance without cross-talk.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Hard cap on request body size; reads beyond it fail closed.
    pub max_body_bytes: usize,
    /// Media type selecting strict JSON.
    pub json_media_type: String,
    /// Media type selecting the structured-attribute document codec.
    pub attribute_media_type: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            json_media_type: "application/json".to_string(),
            attribute_media_type: jsonapi::MEDIA_TYPE.to_string(),
        }
    }
}

/// Business-logic failure: the logic stage picks the response status itself.
#[derive(Debug)]
pub struct LogicError {
    pub status: StatusCode,
    pub reason: BoxError,
}

impl LogicError {
    pub fn new(status: StatusCode, reason: impl Into<BoxError>) -> Self {
        Self {
            status,
            reason: reason.into(),
        }
    }

    pub fn internal(reason: impl Into<BoxError>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, reason)
    }
}

impl fmt::Display for LogicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reason)
    }
}

impl std::error::Error for LogicError {}

/// The single failure threaded across stage boundaries. Once one of these
/// exists no further stage runs.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Body read or decode failed (includes over-cap bodies and unsupported
    /// content types). Always reported as 400.
    #[error("{0}")]
    Decode(BoxError),
    /// The input object's own `validate()` rejected it. Always 400.
    #[error("{0}")]
    Validation(BoxError),
    /// Business logic failed; carries the logic-supplied status.
    #[error("{0}")]
    Logic(LogicError),
    /// The payload did not serialize. 500; no status had been committed yet.
    #[error("{0}")]
    Encode(BoxError),
}

impl PipelineError {
    pub fn status(&self) -> StatusCode {
        match self {
            PipelineError::Decode(_) | PipelineError::Validation(_) => StatusCode::BAD_REQUEST,
            PipelineError::Logic(err) => err.status,
            PipelineError::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl PipelineConfig {
    /// Run the full pipeline for one request.
    ///
    /// Stages run strictly in order; the first failure is terminal. The
    /// returned response is either the encoded payload with the
    /// logic-supplied status, or the failure's text with the status from
    /// [`PipelineError::status`]. On failure `log_error` is invoked exactly
    /// once with the error and the request head; it is never invoked on
    /// success. The error text lands in the response body verbatim, which is
    /// appropriate for trusted/internal services only.
    ///
    /// When `I` is [`NoInput`] the body is never read and `decode` is never
    /// called; `logic` receives `None`.
    pub async fn run<I, P, D, L, Fut, E, S>(
        &self,
        request: Request<Body>,
        decode: D,
        logic: L,
        encode: E,
        log_error: S,
    ) -> Response<Body>
    where
        I: InputObject,
        D: FnOnce(&Parts, &[u8]) -> Result<I, BoxError>,
        L: FnOnce(Option<I>, Parts) -> Fut,
        Fut: Future<Output = Result<(P, StatusCode), LogicError>>,
        E: FnOnce(&Parts, &P, StatusCode) -> Result<Response<Body>, BoxError>,
        S: FnOnce(&PipelineError, &Parts),
    {
        let (parts, body) = request.into_parts();

        let result = async {
            let input = if I::SKIP_DECODE {
                None
            } else {
                let bytes = to_bytes(body, self.max_body_bytes)
                    .await
                    .map_err(|err| PipelineError::Decode(err.into()))?;
                let input = decode(&parts, &bytes).map_err(PipelineError::Decode)?;
                input.validate().map_err(PipelineError::Validation)?;
                Some(input)
            };

            let (payload, status) = logic(input, parts.clone())
                .await
                .map_err(PipelineError::Logic)?;

            encode(&parts, &payload, status).map_err(PipelineError::Encode)
        }
        .await;

        match result {
            Ok(response) => response,
            Err(err) => {
                log_error(&err, &parts);
                (err.status(), err.to_string()).into_response()
            }
        }
    }

    /// JSON-only pipeline: strict JSON decode, JSON response.
    pub async fn run_json<I, P, L, Fut, S>(
        &self,
        request: Request<Body>,
        logic: L,
        log_error: S,
    ) -> Response<Body>
    where
        I: InputObject + DeserializeOwned,
        P: Serialize,
        L: FnOnce(Option<I>, Parts) -> Fut,
        Fut: Future<Output = Result<(P, StatusCode), LogicError>>,
        S: FnOnce(&PipelineError, &Parts),
    {
        self.run(
            request,
            |_parts, bytes| codec::decode_json_strict(bytes),
            logic,
            |_parts, payload, status| respond::write_json(self, payload, status),
            log_error,
        )
        .await
    }

    /// Content-negotiated pipeline: the declared `Content-Type` selects the
    /// decode codec, and `Content-Type` then `Accept` select the response
    /// codec.
    pub async fn run_negotiated<I, P, L, Fut, S>(
        &self,
        request: Request<Body>,
        logic: L,
        log_error: S,
    ) -> Response<Body>
    where
        I: InputObject + DeserializeOwned,
        P: ResourceObject,
        L: FnOnce(Option<I>, Parts) -> Fut,
        Fut: Future<Output = Result<(P, StatusCode), LogicError>>,
        S: FnOnce(&PipelineError, &Parts),
    {
        self.run(
            request,
            |parts, bytes| codec::decode_negotiated(self, parts, bytes),
            logic,
            |parts, payload, status| respond::write_negotiated(self, parts, payload, status),
            log_error,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::CONTENT_TYPE;
    use serde::Deserialize;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(deny_unknown_fields)]
    struct Widget {
        id: String,
        name: String,
    }

    impl InputObject for Widget {
        fn validate(&self) -> Result<(), BoxError> {
            if self.name.is_empty() {
                return Err("name must not be empty".into());
            }
            Ok(())
        }
    }

    fn json_request(body: &str) -> Request<Body> {
        Request::builder()
            .uri("/widgets")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_text(response: Response<Body>) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn decode_failure_skips_logic_and_logs_once() {
        let config = PipelineConfig::default();
        let logged = Arc::new(AtomicU32::new(0));
        let logic_calls = Arc::new(AtomicU32::new(0));

        let logic_counter = logic_calls.clone();
        let sink_counter = logged.clone();
        let response = config
            .run_json(
                json_request("not json"),
                move |_input: Option<Widget>, _parts| {
                    let logic_counter = logic_counter.clone();
                    async move {
                        logic_counter.fetch_add(1, Ordering::SeqCst);
                        Ok((serde_json::json!({}), StatusCode::OK))
                    }
                },
                move |err, _parts| {
                    assert!(matches!(err, PipelineError::Decode(_)));
                    sink_counter.fetch_add(1, Ordering::SeqCst);
                },
            )
            .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(logic_calls.load(Ordering::SeqCst), 0);
        assert_eq!(logged.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn validation_failure_maps_to_400() {
        let config = PipelineConfig::default();
        let logic_calls = Arc::new(AtomicU32::new(0));

        let logic_counter = logic_calls.clone();
        let response = config
            .run_json(
                json_request(r#"{"id":"1","name":""}"#),
                move |_input: Option<Widget>, _parts| {
                    let logic_counter = logic_counter.clone();
                    async move {
                        logic_counter.fetch_add(1, Ordering::SeqCst);
                        Ok((serde_json::json!({}), StatusCode::OK))
                    }
                },
                |err, _parts| {
                    assert!(matches!(err, PipelineError::Validation(_)));
                },
            )
            .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, "name must not be empty");
        assert_eq!(logic_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn logic_failure_keeps_its_status_and_text() {
        let config = PipelineConfig::default();
        let response = config
            .run_json(
                json_request(r#"{"id":"1","name":"gear"}"#),
                |_input: Option<Widget>, _parts| async move {
                    let result: Result<(Widget, StatusCode), LogicError> = Err(LogicError::new(
                        StatusCode::CONFLICT,
                        "widget already exists",
                    ));
                    result
                },
                |err, _parts| {
                    assert!(matches!(err, PipelineError::Logic(_)));
                },
            )
            .await;

        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(body_text(response).await, "widget already exists");
    }

    #[tokio::test]
    async fn success_path_never_logs() {
        let config = PipelineConfig::default();
        let logged = Arc::new(AtomicU32::new(0));

        let sink_counter = logged.clone();
        let response = config
            .run_json(
                json_request(r#"{"id":"1","name":"gear"}"#),
                |input: Option<Widget>, _parts| async move {
                    Ok((input.unwrap(), StatusCode::CREATED))
                },
                move |_err, _parts| {
                    sink_counter.fetch_add(1, Ordering::SeqCst);
                },
            )
            .await;

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(logged.load(Ordering::SeqCst), 0);
        let body: Widget = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body.id, "1");
        assert_eq!(body.name, "gear");
    }

    #[tokio::test]
    async fn no_input_skips_decode_but_runs_logic() {
        let config = PipelineConfig::default();
        let logic_calls = Arc::new(AtomicU32::new(0));

        // Body is garbage on purpose: it must never be decoded.
        let request = json_request("certainly not json");
        let logic_counter = logic_calls.clone();
        let response = config
            .run_json(
                request,
                move |input: Option<NoInput>, _parts| {
                    let logic_counter = logic_counter.clone();
                    async move {
                        assert!(input.is_none());
                        logic_counter.fetch_add(1, Ordering::SeqCst);
                        Ok((serde_json::json!({"ready": true}), StatusCode::OK))
                    }
                },
                |_err, _parts| panic!("error sink must not run"),
            )
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(logic_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn body_over_cap_fails_closed_at_boundary() {
        let body = r#"{"id":"1","name":"gear"}"#;
        let at_limit = PipelineConfig {
            max_body_bytes: body.len(),
            ..PipelineConfig::default()
        };
        let response = at_limit
            .run_json(
                json_request(body),
                |input: Option<Widget>, _parts| async move {
                    Ok((input.unwrap(), StatusCode::OK))
                },
                |_err, _parts| panic!("exact-boundary body must decode"),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);

        let one_short = PipelineConfig {
            max_body_bytes: body.len() - 1,
            ..PipelineConfig::default()
        };
        let logged = Arc::new(AtomicU32::new(0));
        let sink_counter = logged.clone();
        let response = one_short
            .run_json(
                json_request(body),
                |input: Option<Widget>, _parts| async move {
                    Ok((input.unwrap(), StatusCode::OK))
                },
                move |err, _parts| {
                    assert!(matches!(err, PipelineError::Decode(_)));
                    sink_counter.fetch_add(1, Ordering::SeqCst);
                },
            )
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(logged.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn encode_failure_maps_to_500() {
        let config = PipelineConfig::default();
        let response = config
            .run(
                json_request(r#"{"id":"1","name":"gear"}"#),
                |_parts, bytes| codec::decode_json_strict::<Widget>(bytes),
                |input: Option<Widget>, _parts| async move {
                    Ok((input.unwrap(), StatusCode::OK))
                },
                |_parts, _payload, _status| Err("payload refused to serialize".into()),
                |err, _parts| {
                    assert!(matches!(err, PipelineError::Encode(_)));
                },
            )
            .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, "payload refused to serialize");
    }
}
