//! Route parameter extraction and storage.
//!
//! Parameters captured from dynamic and catch-all segments are stored as
//! (name, value) pairs with a small-vector optimization, since almost every
//! route has at most a handful of captures.

use smallvec::SmallVec;

/// Maximum number of parameters stored inline (stack allocated).
const INLINE_PARAMS: usize = 4;

/// Parameters extracted from a matched URL.
///
/// # Example
///
/// ```rust
/// use daedalus_router::Params;
///
/// let mut params = Params::new();
/// params.push("slug", "hello-world");
///
/// assert_eq!(params.get("slug"), Some("hello-world"));
/// assert_eq!(params.get("missing"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Params {
    /// Storage for parameter (name, value) pairs
    inner: SmallVec<[(String, String); INLINE_PARAMS]>,
}

impl Params {
    /// Creates a new empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter to the set.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.push((name.into(), value.into()));
    }

    /// Removes the most recently added parameter.
    ///
    /// Used by the matcher to undo a speculative capture when a subtree
    /// fails to match.
    pub fn pop(&mut self) -> Option<(String, String)> {
        self.inner.pop()
    }

    /// Returns the value for a parameter by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns an iterator over the parameters.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = (&'a str, &'a str);
    type IntoIter = std::iter::Map<
        std::slice::Iter<'a, (String, String)>,
        fn(&'a (String, String)) -> (&'a str, &'a str),
    >;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for Params {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_get() {
        let mut params = Params::new();
        params.push("slug", "intro");
        params.push("section", "docs");

        assert_eq!(params.get("slug"), Some("intro"));
        assert_eq!(params.get("section"), Some("docs"));
        assert_eq!(params.get("missing"), None);
    }

    #[test]
    fn pop_removes_last() {
        let mut params = Params::new();
        params.push("a", "1");
        params.push("b", "2");

        assert_eq!(params.pop(), Some(("b".to_string(), "2".to_string())));
        assert_eq!(params.get("b"), None);
        assert_eq!(params.get("a"), Some("1"));
    }

    #[test]
    fn iter_preserves_order() {
        let mut params = Params::new();
        params.push("a", "1");
        params.push("b", "2");

        let pairs: Vec<_> = params.iter().collect();
        assert_eq!(pairs, vec![("a", "1"), ("b", "2")]);
    }

    #[test]
    fn spills_past_inline_capacity() {
        let mut params = Params::new();
        for i in 0..10 {
            params.push(format!("key{i}"), format!("value{i}"));
        }

        assert_eq!(params.len(), 10);
        assert_eq!(params.get("key7"), Some("value7"));
    }

    #[test]
    fn from_iterator() {
        let pairs = vec![
            ("a".to_string(), "1".to_string()),
            ("b".to_string(), "2".to_string()),
        ];

        let params: Params = pairs.into_iter().collect();
        assert_eq!(params.len(), 2);
        assert_eq!(params.get("b"), Some("2"));
    }
}
