//! URL matcher for the Daedalus routing table.
//!
//! This crate provides the structural matching half of routing: a radix tree
//! (compressed trie) mapping URL patterns to an arbitrary route value. The
//! routing table registers each produced pattern together with its composed
//! chain; at request time the tree resolves a concrete path to that value in
//! O(k) time where k is the number of path segments.
//!
//! Pattern syntax:
//!
//! - static segments: `/blog/archive`
//! - dynamic segments: `/blog/{slug}` (captures `slug`)
//! - catch-all segments: `/files/*path` (captures the remainder under `path`,
//!   final segment only)
//!
//! # Example
//!
//! ```rust
//! use daedalus_router::Router;
//!
//! let mut router = Router::new();
//! router.insert("/blog/{slug}", "post-route");
//! router.insert("/blog/archive", "archive-route");
//!
//! // Static segments win over dynamic ones.
//! let (value, params) = router.match_path("/blog/archive").unwrap();
//! assert_eq!(*value, "archive-route");
//! assert!(params.is_empty());
//!
//! let (value, params) = router.match_path("/blog/hello-world").unwrap();
//! assert_eq!(*value, "post-route");
//! assert_eq!(params.get("slug"), Some("hello-world"));
//! ```
//!
//! # Architecture
//!
//! Each node represents one path segment:
//!
//! ```text
//!                  (root)
//!                    │
//!            ┌───────┴───────┐
//!            │               │
//!          "blog"         "files"
//!            │               │
//!      ┌─────┴─────┐       "*path"
//!      │           │
//!  "archive"    "{slug}"
//!   (leaf)       (leaf)
//! ```

mod node;
mod params;
mod router;

pub use node::{Node, SegmentKind};
pub use params::Params;
pub use router::Router;
