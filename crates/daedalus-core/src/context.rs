//! Per-request context.
//!
//! A fresh [`RequestContext`] is allocated when a request enters the
//! dispatcher and dropped when the response completes. It carries request
//! metadata, the parameters captured from the matched URL pattern, and a
//! mutable typed state container shared by the middleware chain and handler
//! of that request only. While an error boundary executes, the context also
//! carries the captured failure.

use crate::error::Failure;
use bytes::Bytes;
use daedalus_router::Params;
use http::{HeaderMap, Method, Uri};
use serde::{Deserialize, Serialize};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

/// A unique identifier for each request, using UUID v7.
///
/// UUID v7 is time-ordered, which makes it ideal for request tracking
/// and log correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new unique request ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-request state threaded through the composed chain.
///
/// The typed state container is exclusively owned by one request's chain
/// execution: middleware mutate it in place and later stages observe the
/// mutations. Nothing is shared across requests.
///
/// # Example
///
/// ```
/// use daedalus_core::RequestContext;
/// use http::Method;
///
/// #[derive(Debug, PartialEq)]
/// struct Session(u64);
///
/// let mut ctx = RequestContext::for_test(Method::GET, "/blog/intro?draft=1");
/// ctx.set_state(Session(42));
///
/// assert_eq!(ctx.state::<Session>(), Some(&Session(42)));
/// assert_eq!(ctx.query("draft"), Some("1"));
/// ```
pub struct RequestContext {
    /// Unique identifier for this request.
    request_id: RequestId,

    /// HTTP method of the request.
    method: Method,

    /// Full request URI.
    uri: Uri,

    /// Request headers.
    headers: HeaderMap,

    /// Parameters captured from the matched URL pattern.
    params: Params,

    /// Parsed query string pairs, in order of appearance.
    query: Vec<(String, String)>,

    /// Collected request body.
    body: Bytes,

    /// Type-keyed mutable state shared along this request's chain.
    state: HashMap<TypeId, Box<dyn Any + Send + Sync>>,

    /// Captured failure, present only while an error boundary executes.
    error: Option<Arc<Failure>>,

    /// When the request started processing.
    started_at: Instant,
}

impl RequestContext {
    /// Creates a context for an incoming request.
    #[must_use]
    pub fn new(method: Method, uri: Uri, headers: HeaderMap, params: Params) -> Self {
        let query = parse_query(uri.query().unwrap_or(""));
        Self {
            request_id: RequestId::new(),
            method,
            uri,
            headers,
            params,
            query,
            body: Bytes::new(),
            state: HashMap::new(),
            error: None,
            started_at: Instant::now(),
        }
    }

    /// Creates a bare context for tests from a method and URI string.
    ///
    /// # Panics
    ///
    /// Panics if the URI string is invalid.
    #[must_use]
    pub fn for_test(method: Method, uri: &str) -> Self {
        Self::new(
            method,
            uri.parse().expect("valid test uri"),
            HeaderMap::new(),
            Params::new(),
        )
    }

    /// Returns the request ID.
    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns the HTTP method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request path.
    #[must_use]
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Returns the full request URI.
    #[must_use]
    pub const fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Returns the request headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the parameters captured from the matched pattern.
    #[must_use]
    pub const fn params(&self) -> &Params {
        &self.params
    }

    /// Returns a single captured parameter by name.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    /// Returns the first query-string value for a key.
    #[must_use]
    pub fn query(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns all parsed query pairs in order of appearance.
    #[must_use]
    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    /// Attaches the collected request body.
    #[must_use]
    pub fn with_body(mut self, body: Bytes) -> Self {
        self.body = body;
        self
    }

    /// Returns the collected request body.
    #[must_use]
    pub const fn body(&self) -> &Bytes {
        &self.body
    }

    /// Stores a typed state value, replacing any previous value of the type.
    pub fn set_state<T: Send + Sync + 'static>(&mut self, value: T) {
        self.state.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Retrieves a typed state value.
    #[must_use]
    pub fn state<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.state
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref())
    }

    /// Retrieves a mutable reference to a typed state value.
    pub fn state_mut<T: Send + Sync + 'static>(&mut self) -> Option<&mut T> {
        self.state
            .get_mut(&TypeId::of::<T>())
            .and_then(|v| v.downcast_mut())
    }

    /// Removes and returns a typed state value.
    pub fn remove_state<T: Send + Sync + 'static>(&mut self) -> Option<T> {
        self.state
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast().ok())
            .map(|b| *b)
    }

    /// Returns the captured failure while an error boundary executes.
    #[must_use]
    pub fn error(&self) -> Option<&Failure> {
        self.error.as_deref()
    }

    /// Records the captured failure before invoking an error boundary.
    pub fn set_error(&mut self, failure: Arc<Failure>) {
        self.error = Some(failure);
    }

    /// Returns the elapsed time since the request entered the dispatcher.
    #[must_use]
    pub fn elapsed(&self) -> std::time::Duration {
        self.started_at.elapsed()
    }
}

impl std::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("request_id", &self.request_id)
            .field("method", &self.method)
            .field("uri", &self.uri)
            .field("params", &self.params)
            .field("state_entries", &self.state.len())
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

/// Parses a raw query string into ordered key/value pairs.
///
/// Keys without `=` map to an empty value. No percent-decoding is applied;
/// callers needing decoded values decode at the edge.
fn parse_query(raw: &str) -> Vec<(String, String)> {
    raw.split('&')
        .filter(|part| !part.is_empty())
        .map(|part| match part.split_once('=') {
            Some((k, v)) => (k.to_string(), v.to_string()),
            None => (part.to_string(), String::new()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[test]
    fn request_ids_are_unique() {
        assert_ne!(RequestId::new(), RequestId::new());
    }

    #[test]
    fn request_id_display_is_uuid() {
        let id = RequestId::new();
        assert_eq!(id.to_string().len(), 36);
    }

    #[test]
    fn context_exposes_method_and_path() {
        let ctx = RequestContext::for_test(Method::POST, "/blog/new");
        assert_eq!(ctx.method(), &Method::POST);
        assert_eq!(ctx.path(), "/blog/new");
    }

    #[test]
    fn context_parses_query_pairs() {
        let ctx = RequestContext::for_test(Method::GET, "/search?q=routing&page=2&flag");
        assert_eq!(ctx.query("q"), Some("routing"));
        assert_eq!(ctx.query("page"), Some("2"));
        assert_eq!(ctx.query("flag"), Some(""));
        assert_eq!(ctx.query("missing"), None);
        assert_eq!(ctx.query_pairs().len(), 3);
    }

    #[test]
    fn context_exposes_route_params() {
        let mut params = Params::new();
        params.push("slug", "intro");

        let ctx = RequestContext::new(
            Method::GET,
            "/blog/intro".parse().unwrap(),
            HeaderMap::new(),
            params,
        );
        assert_eq!(ctx.param("slug"), Some("intro"));
        assert_eq!(ctx.param("other"), None);
    }

    #[test]
    fn typed_state_round_trip() {
        #[derive(Debug, PartialEq)]
        struct Counter(u32);

        let mut ctx = RequestContext::for_test(Method::GET, "/");
        assert!(ctx.state::<Counter>().is_none());

        ctx.set_state(Counter(1));
        ctx.state_mut::<Counter>().unwrap().0 += 1;
        assert_eq!(ctx.state::<Counter>(), Some(&Counter(2)));

        let removed = ctx.remove_state::<Counter>();
        assert_eq!(removed, Some(Counter(2)));
        assert!(ctx.state::<Counter>().is_none());
    }

    #[test]
    fn captured_error_is_visible() {
        let mut ctx = RequestContext::for_test(Method::GET, "/");
        assert!(ctx.error().is_none());

        ctx.set_error(Arc::new(
            Failure::new("boom").with_status(StatusCode::BAD_GATEWAY),
        ));
        let failure = ctx.error().unwrap();
        assert_eq!(failure.message(), "boom");
        assert_eq!(failure.status_or_default(), StatusCode::BAD_GATEWAY);
    }
}
