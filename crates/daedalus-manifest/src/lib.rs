//! # Daedalus Manifest
//!
//! Turns a hierarchical set of route artifacts into a deterministic,
//! immutable routing table. The pipeline runs once at setup:
//!
//! 1. **Classification** ([`artifact`]) — each registered source file is
//!    classified by its filename and its exports are validated.
//! 2. **Translation** ([`pattern`]) — source paths become URL patterns:
//!    `[name]` captures, `[...name]` catch-alls, `(group)` elision, `index`
//!    resolution.
//! 3. **Ordering** ([`sort`]) — a total order over source paths makes
//!    matching precedence independent of discovery order.
//! 4. **Composition** ([`compose`]) — every page gets its chain of
//!    inherited middleware, layouts, app shell, and error boundary.
//!
//! The result is a [`RouteTable`] consumed by the dispatcher per request.
//!
//! ```ignore
//! let table = RouteManifest::new()
//!     .register("_app.tsx", ArtifactExports::new().component(shell))?
//!     .register("blog/[slug].tsx", ArtifactExports::new().handler(show).component(post))?
//!     .build()?;
//! ```

pub mod artifact;
pub mod compose;
pub mod pattern;
pub mod sort;
pub mod table;
mod tree;

pub use artifact::{ArtifactExports, ArtifactKind, RouteConfig};
pub use compose::ComposedChain;
pub use pattern::RoutePattern;
pub use sort::sort_route_paths;
pub use table::{Registration, RouteManifest, RouteTable};
pub use tree::BoundaryRecord;
