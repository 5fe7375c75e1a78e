//! # Daedalus Core
//!
//! Core types shared by every Daedalus crate: the per-request context, the
//! stage-function vocabulary of the composed chain, and the two failure
//! surfaces (setup-time [`BuildError`], request-time [`Failure`]).
//!
//! ## Design Principles
//!
//! - **Explicit failures**: stages return `Err(Failure)` instead of
//!   panicking; the dispatcher routes failures to error boundaries.
//! - **Shared-nothing requests**: each request owns its [`RequestContext`];
//!   routing tables are immutable once built and shared via `Arc`.
//! - **Async throughout**: every stage is async via boxed futures, so
//!   handlers and middleware are free to await I/O.

pub mod context;
pub mod error;
pub mod stage;
pub mod types;

pub use context::{RequestContext, RequestId};
pub use error::{BuildError, BuildResult, Failure, StageResult};
pub use stage::{
    handler_fn, middleware_fn, render_fn, BoxFuture, HandlerFn, HandlerOutcome, MethodMap,
    MiddlewareFn, Next, Render, RenderFn, Resolved, RouteHandler, ViewOutcome,
};
pub use types::{Request, Response, ResponseExt};
