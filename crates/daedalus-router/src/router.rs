//! High-level matcher API.
//!
//! [`Router`] wraps the radix tree root and tracks the number of registered
//! patterns. The routing table inserts patterns in its sorted registration
//! order; for patterns that collide structurally, the first insertion wins.

use crate::node::Node;
use crate::params::Params;

/// A radix tree URL matcher, generic over the value stored per route.
///
/// # Route Priority
///
/// When multiple patterns could match a path, priority is:
///
/// 1. **Static segments** (e.g., `/docs/latest`)
/// 2. **Dynamic segments** (e.g., `/docs/{version}`)
/// 3. **Catch-all segments** (e.g., `/docs/*rest`)
///
/// # Example
///
/// ```rust
/// use daedalus_router::Router;
///
/// let mut router = Router::new();
/// router.insert("/blog/{slug}", "post");
///
/// let (value, params) = router.match_path("/blog/first-post").unwrap();
/// assert_eq!(*value, "post");
/// assert_eq!(params.get("slug"), Some("first-post"));
/// ```
#[derive(Debug, Clone)]
pub struct Router<T> {
    /// Root node of the radix tree
    root: Node<T>,
    /// Number of patterns registered
    route_count: usize,
}

impl<T> Default for Router<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Router<T> {
    /// Creates a new empty matcher.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: Node::root(),
            route_count: 0,
        }
    }

    /// Inserts a pattern with its route value.
    ///
    /// # Arguments
    ///
    /// * `pattern` - The URL pattern (e.g., `/blog/{slug}`)
    /// * `value` - The value resolved when the pattern matches
    pub fn insert(&mut self, pattern: &str, value: T) {
        self.root.insert(pattern, value);
        self.route_count += 1;
    }

    /// Matches a concrete path against the registered patterns.
    ///
    /// Returns the route value and extracted parameters for the most
    /// specific matching pattern, or `None` when nothing matches. Trailing
    /// slashes are normalized (empty segments are filtered).
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<(&T, Params)> {
        self.root.match_path(path)
    }

    /// Returns the number of patterns registered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.route_count
    }

    /// Returns true if no patterns are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.route_count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_router() {
        let router: Router<()> = Router::new();
        assert!(router.is_empty());
        assert_eq!(router.len(), 0);
    }

    #[test]
    fn insert_increments_count() {
        let mut router = Router::new();
        router.insert("/docs", ());
        assert_eq!(router.len(), 1);
        assert!(!router.is_empty());
    }

    #[test]
    fn root_pattern() {
        let mut router = Router::new();
        router.insert("/", "home");

        let (value, _) = router.match_path("/").unwrap();
        assert_eq!(*value, "home");
    }

    #[test]
    fn trailing_slash_normalized() {
        let mut router = Router::new();
        router.insert("/docs", "docs");

        assert!(router.match_path("/docs").is_some());
        assert!(router.match_path("/docs/").is_some());
    }

    #[test]
    fn nested_patterns() {
        let mut router = Router::new();
        router.insert("/api/v1/posts", "list");
        router.insert("/api/v1/posts/{id}", "show");
        router.insert("/api/v1/posts/{id}/comments/{cid}", "comment");

        let (value, params) = router.match_path("/api/v1/posts/42/comments/7").unwrap();
        assert_eq!(*value, "comment");
        assert_eq!(params.get("id"), Some("42"));
        assert_eq!(params.get("cid"), Some("7"));
    }

    #[test]
    fn clone_preserves_routes() {
        let mut router = Router::new();
        router.insert("/docs", "docs");

        let cloned = router.clone();
        assert!(cloned.match_path("/docs").is_some());
    }
}
