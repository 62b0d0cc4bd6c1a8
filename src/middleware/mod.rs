//! HTTP middleware for host servers.
//!
//! Apply with the usual axum layering:
//! `Router::new().layer(middleware::from_fn_with_state(cfg, require_requester_id))`.

pub mod cors;
pub mod requester_id;
pub mod trace;

pub use cors::cors_layer;
pub use requester_id::{require_requester_id, RequesterIdConfig};
pub use trace::{trace_requests, TraceIdConfig};
