//! Server-side helper library: startup readiness probing, a three-stage
//! request pipeline with content negotiation, HTTP middleware, and
//! environment loading.

pub mod env;
pub mod middleware;
pub mod pipeline;
pub mod retry;

pub use pipeline::{
    InputObject, LogicError, NoInput, PipelineConfig, PipelineError, ResourceObject,
};
pub use retry::{check_and_retry, ensure_ready};
pub use tower::BoxError;
