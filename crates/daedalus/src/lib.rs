//! # Daedalus
//!
//! **File-convention routing and composition for async Rust web apps**
//!
//! Daedalus turns a directory of route artifacts into a frozen routing
//! table and serves it:
//!
//! - **Convention over configuration** – file names decide URL patterns;
//!   `_middleware`, `_layout`, `_app`, and `_error` artifacts compose by
//!   directory nesting
//! - **Deterministic routing** – routes sort by specificity, so static
//!   segments always beat captures and captures beat catch-alls
//! - **Explicit failures** – every stage returns `Result`; failures route
//!   to the nearest error boundary
//! - **Async throughout** – handlers, middleware, and views are all async
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use daedalus::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let table = RouteManifest::new()
//!         .register("index.tsx", ArtifactExports::new().component(home))?
//!         .register("blog/[slug].tsx", ArtifactExports::new().handler(show_post))?
//!         .build()?;
//!
//!     Server::new(ServerConfig::default(), table).run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! Each request runs a fixed stage sequence built from the matched route's
//! inherited artifacts:
//!
//! ```text
//! Request → Middleware (outermost first) → Handler → Component
//!                                                        ↓
//! Response ← App Shell ← Layouts (innermost first) ←────┘
//! ```

#![doc(html_root_url = "https://docs.rs/daedalus/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use daedalus_core as core;

// Re-export manifest types
pub use daedalus_manifest as manifest;

// Re-export router types
pub use daedalus_router as router;

// Re-export server types
pub use daedalus_server as server;

// Re-export telemetry types
pub use daedalus_telemetry as telemetry;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust,ignore
/// use daedalus::prelude::*;
/// ```
pub mod prelude {
    pub use daedalus_core::{
        handler_fn, middleware_fn, render_fn, Failure, HandlerFn, HandlerOutcome, MethodMap,
        MiddlewareFn, Next, Render, RenderFn, RequestContext, RequestId, Response, ResponseExt,
        RouteHandler, StageResult, ViewOutcome,
    };

    // Re-export manifest building types
    pub use daedalus_manifest::{
        ArtifactExports, ArtifactKind, RouteConfig, RouteManifest, RouteTable,
    };

    // Re-export server types
    pub use daedalus_server::{DispatchOutcome, Dispatcher, Server, ServerConfig, ShutdownSignal};

    // Re-export logging setup
    pub use daedalus_telemetry::{init_logging, LogConfig};
}
