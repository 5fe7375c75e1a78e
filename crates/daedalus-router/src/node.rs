//! Radix tree node implementation.
//!
//! The tree stores one generic value per registered pattern. Matching tries
//! static children first, then the dynamic child, then the catch-all child,
//! so a concrete path always resolves to the most specific pattern.

use crate::params::Params;

/// Type of path segment in the radix tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentKind {
    /// Static path segment (e.g., `blog`, `archive`)
    Static,
    /// Named dynamic segment (e.g., `{slug}`)
    Param(String),
    /// Catch-all segment capturing the remainder (e.g., `*path`)
    Wildcard(String),
}

/// A node in the radix tree.
///
/// Each node represents a path segment and may carry the route value when a
/// registered pattern terminates at it.
#[derive(Debug, Clone)]
pub struct Node<T> {
    /// The path segment this node represents
    pub segment: String,

    /// The kind of segment (static, param, or wildcard)
    pub kind: SegmentKind,

    /// Route value, present when a pattern ends at this node
    pub value: Option<T>,

    /// Static children, sorted by segment for binary search
    pub static_children: Vec<Node<T>>,

    /// Dynamic child (at most one per node)
    pub param_child: Option<Box<Node<T>>>,

    /// Catch-all child (at most one per node, always a leaf)
    pub wildcard_child: Option<Box<Node<T>>>,
}

impl<T> Node<T> {
    /// Creates a new static node.
    #[must_use]
    pub fn new_static(segment: impl Into<String>) -> Self {
        Self {
            segment: segment.into(),
            kind: SegmentKind::Static,
            value: None,
            static_children: Vec::new(),
            param_child: None,
            wildcard_child: None,
        }
    }

    /// Creates a new dynamic-segment node.
    #[must_use]
    pub fn new_param(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            segment: format!("{{{name}}}"),
            kind: SegmentKind::Param(name),
            value: None,
            static_children: Vec::new(),
            param_child: None,
            wildcard_child: None,
        }
    }

    /// Creates a new catch-all node.
    #[must_use]
    pub fn new_wildcard(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            segment: format!("*{name}"),
            kind: SegmentKind::Wildcard(name),
            value: None,
            static_children: Vec::new(),
            param_child: None,
            wildcard_child: None,
        }
    }

    /// Creates a root node for the tree.
    #[must_use]
    pub fn root() -> Self {
        Self::new_static("")
    }

    /// Inserts a pattern into the tree.
    ///
    /// If the pattern was already registered, the earlier value is kept;
    /// registration order therefore decides which structural match wins.
    pub fn insert(&mut self, pattern: &str, value: T) {
        let segments = Self::parse_pattern(pattern);
        self.insert_segments(&segments, value);
    }

    /// Parses a pattern into segments.
    fn parse_pattern(pattern: &str) -> Vec<(String, SegmentKind)> {
        pattern
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| {
                if let Some(name) = s.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                    (s.to_string(), SegmentKind::Param(name.to_string()))
                } else if let Some(name) = s.strip_prefix('*') {
                    (s.to_string(), SegmentKind::Wildcard(name.to_string()))
                } else {
                    (s.to_string(), SegmentKind::Static)
                }
            })
            .collect()
    }

    /// Inserts segments into the tree recursively.
    fn insert_segments(&mut self, segments: &[(String, SegmentKind)], value: T) {
        if segments.is_empty() {
            // First registration wins; the table registers in sorted order.
            if self.value.is_none() {
                self.value = Some(value);
            }
            return;
        }

        let (segment, kind) = &segments[0];
        let remaining = &segments[1..];

        match kind {
            SegmentKind::Static => {
                if let Some(child) = self
                    .static_children
                    .iter_mut()
                    .find(|c| c.segment == *segment)
                {
                    child.insert_segments(remaining, value);
                } else {
                    let mut child = Node::new_static(segment);
                    child.insert_segments(remaining, value);
                    self.static_children.push(child);
                    // Keep sorted for binary search
                    self.static_children
                        .sort_by(|a, b| a.segment.cmp(&b.segment));
                }
            }
            SegmentKind::Param(name) => {
                if self.param_child.is_none() {
                    self.param_child = Some(Box::new(Node::new_param(name)));
                }
                if let Some(child) = &mut self.param_child {
                    child.insert_segments(remaining, value);
                }
            }
            SegmentKind::Wildcard(name) => {
                assert!(
                    remaining.is_empty(),
                    "catch-all must be the last segment in pattern"
                );
                if let Some(child) = &mut self.wildcard_child {
                    if child.value.is_none() {
                        child.value = Some(value);
                    }
                } else {
                    let mut child = Node::new_wildcard(name);
                    child.value = Some(value);
                    self.wildcard_child = Some(Box::new(child));
                }
            }
        }
    }

    /// Matches a concrete path against the tree.
    ///
    /// Returns the route value and extracted parameters if found.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<(&T, Params)> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut params = Params::new();
        self.match_segments(&segments, &mut params)
    }

    /// Matches segments against the tree recursively.
    fn match_segments<'a>(
        &'a self,
        segments: &[&str],
        params: &mut Params,
    ) -> Option<(&'a T, Params)> {
        if segments.is_empty() {
            return self.value.as_ref().map(|v| (v, params.clone()));
        }

        let segment = segments[0];
        let remaining = &segments[1..];

        // Static match first (highest priority)
        if let Some(child) = self.find_static_child(segment) {
            if let Some(result) = child.match_segments(remaining, params) {
                return Some(result);
            }
        }

        // Dynamic match
        if let Some(child) = &self.param_child {
            if let SegmentKind::Param(name) = &child.kind {
                params.push(name.clone(), segment.to_string());
                if let Some(result) = child.match_segments(remaining, params) {
                    return Some(result);
                }
                params.pop();
            }
        }

        // Catch-all match (lowest priority, consumes the remainder)
        if let Some(child) = &self.wildcard_child {
            if let SegmentKind::Wildcard(name) = &child.kind {
                let remaining_path = segments.join("/");
                params.push(name.clone(), remaining_path);
                return child.value.as_ref().map(|v| (v, params.clone()));
            }
        }

        None
    }

    /// Finds a static child by segment using binary search.
    fn find_static_child(&self, segment: &str) -> Option<&Node<T>> {
        self.static_children
            .binary_search_by(|c| c.segment.as_str().cmp(segment))
            .ok()
            .map(|i| &self.static_children[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_static_node() {
        let node: Node<()> = Node::new_static("blog");
        assert_eq!(node.segment, "blog");
        assert_eq!(node.kind, SegmentKind::Static);
    }

    #[test]
    fn new_param_node() {
        let node: Node<()> = Node::new_param("slug");
        assert_eq!(node.segment, "{slug}");
        assert_eq!(node.kind, SegmentKind::Param("slug".to_string()));
    }

    #[test]
    fn new_wildcard_node() {
        let node: Node<()> = Node::new_wildcard("path");
        assert_eq!(node.segment, "*path");
        assert_eq!(node.kind, SegmentKind::Wildcard("path".to_string()));
    }

    #[test]
    fn parse_pattern_kinds() {
        let segments = Node::<()>::parse_pattern("/blog/{slug}/*rest");
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0], ("blog".to_string(), SegmentKind::Static));
        assert_eq!(
            segments[1],
            ("{slug}".to_string(), SegmentKind::Param("slug".to_string()))
        );
        assert_eq!(
            segments[2],
            ("*rest".to_string(), SegmentKind::Wildcard("rest".to_string()))
        );
    }

    #[test]
    fn insert_and_match_static() {
        let mut root = Node::root();
        root.insert("/docs", 7u8);

        let (value, params) = root.match_path("/docs").unwrap();
        assert_eq!(*value, 7);
        assert!(params.is_empty());
    }

    #[test]
    fn insert_and_match_param() {
        let mut root = Node::root();
        root.insert("/docs/{page}", "page");

        let (value, params) = root.match_path("/docs/setup").unwrap();
        assert_eq!(*value, "page");
        assert_eq!(params.get("page"), Some("setup"));
    }

    #[test]
    fn insert_and_match_wildcard() {
        let mut root = Node::root();
        root.insert("/assets/*path", "assets");

        let (value, params) = root.match_path("/assets/css/site.css").unwrap();
        assert_eq!(*value, "assets");
        assert_eq!(params.get("path"), Some("css/site.css"));
    }

    #[test]
    fn static_priority_over_param() {
        let mut root = Node::root();
        root.insert("/docs/latest", "latest");
        root.insert("/docs/{version}", "versioned");

        let (value, _) = root.match_path("/docs/latest").unwrap();
        assert_eq!(*value, "latest");

        let (value, params) = root.match_path("/docs/v2").unwrap();
        assert_eq!(*value, "versioned");
        assert_eq!(params.get("version"), Some("v2"));
    }

    #[test]
    fn param_backtracks_when_subtree_dead_ends() {
        let mut root = Node::root();
        root.insert("/a/{x}/edit", "edit");
        root.insert("/a/*rest", "rest");

        // `{x}` matches "b" but the subtree has no "view"; the catch-all
        // must still see the full remainder without a stale capture.
        let (value, params) = root.match_path("/a/b/view").unwrap();
        assert_eq!(*value, "rest");
        assert_eq!(params.get("rest"), Some("b/view"));
        assert_eq!(params.get("x"), None);
    }

    #[test]
    fn first_registration_wins() {
        let mut root = Node::root();
        root.insert("/docs", "first");
        root.insert("/docs", "second");

        let (value, _) = root.match_path("/docs").unwrap();
        assert_eq!(*value, "first");
    }

    #[test]
    fn no_match() {
        let mut root = Node::root();
        root.insert("/docs", ());
        assert!(root.match_path("/blog").is_none());
    }
}
