//! Stage functions of the composed chain.
//!
//! Every route resolves to a chain of stages: middleware run first, the
//! route handler runs at the end of the middleware chain, and view stages
//! (page component, layouts, app shell) turn the handler's data into markup.
//! All stages are async and all stage failures are explicit `Err` values
//! that the dispatcher routes to the chain's error boundary.
//!
//! Stage functions are `Arc`-wrapped trait objects so a routing table built
//! once can be shared across every worker and request.

use crate::context::RequestContext;
use crate::error::StageResult;
use crate::types::Response;
use http::{HeaderMap, Method, StatusCode};
use indexmap::IndexMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// A boxed future bounded by the lifetime of its borrows.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A route handler stage.
///
/// Handlers receive mutable access to the request context and either return
/// a terminal [`Response`] or [`Render`] instructions for the view stages.
pub type HandlerFn = Arc<
    dyn for<'a> Fn(&'a mut RequestContext) -> BoxFuture<'a, StageResult<HandlerOutcome>>
        + Send
        + Sync,
>;

/// A middleware stage.
///
/// Middleware may mutate the context, short-circuit with a response of
/// their own, or delegate to the rest of the chain via [`Next`] and then
/// observe or rewrite the downstream response.
pub type MiddlewareFn = Arc<
    dyn for<'a> Fn(&'a mut RequestContext, Next<'a>) -> BoxFuture<'a, StageResult<Response>>
        + Send
        + Sync,
>;

/// A view stage: page component, layout, app shell, or boundary component.
///
/// The `child` argument is `None` for the innermost view (the page or
/// boundary component) and carries the markup produced by the previous view
/// for every wrapping stage.
pub type RenderFn = Arc<
    dyn for<'a> Fn(
            &'a RequestContext,
            &'a Render,
            Option<&'a str>,
        ) -> BoxFuture<'a, StageResult<ViewOutcome>>
        + Send
        + Sync,
>;

/// Wraps a handler closure or fn item as a shareable [`HandlerFn`].
pub fn handler_fn<F>(f: F) -> HandlerFn
where
    F: for<'a> Fn(&'a mut RequestContext) -> BoxFuture<'a, StageResult<HandlerOutcome>>
        + Send
        + Sync
        + 'static,
{
    Arc::new(f)
}

/// Wraps a middleware closure or fn item as a shareable [`MiddlewareFn`].
pub fn middleware_fn<F>(f: F) -> MiddlewareFn
where
    F: for<'a> Fn(&'a mut RequestContext, Next<'a>) -> BoxFuture<'a, StageResult<Response>>
        + Send
        + Sync
        + 'static,
{
    Arc::new(f)
}

/// Wraps a view closure or fn item as a shareable [`RenderFn`].
pub fn render_fn<F>(f: F) -> RenderFn
where
    F: for<'a> Fn(
            &'a RequestContext,
            &'a Render,
            Option<&'a str>,
        ) -> BoxFuture<'a, StageResult<ViewOutcome>>
        + Send
        + Sync
        + 'static,
{
    Arc::new(f)
}

/// The terminal stage invoked when the middleware chain is exhausted.
type Terminal<'a> =
    Box<dyn FnOnce(&'a mut RequestContext) -> BoxFuture<'a, StageResult<Response>> + Send + 'a>;

/// Continuation handle passed to each middleware.
///
/// Calling [`Next::run`] consumes the handle and executes the remainder of
/// the chain. A middleware that never calls it short-circuits: downstream
/// middleware, the handler, and the view stages all stay untouched.
pub struct Next<'a> {
    /// Middleware not yet executed, outermost first.
    chain: &'a [MiddlewareFn],
    /// Runs once every middleware has delegated.
    terminal: Terminal<'a>,
}

impl<'a> Next<'a> {
    /// Creates a continuation over `chain` ending in `terminal`.
    #[must_use]
    pub fn new(
        chain: &'a [MiddlewareFn],
        terminal: impl FnOnce(&'a mut RequestContext) -> BoxFuture<'a, StageResult<Response>>
            + Send
            + 'a,
    ) -> Self {
        Self {
            chain,
            terminal: Box::new(terminal),
        }
    }

    /// Executes the rest of the chain.
    pub fn run(self, ctx: &'a mut RequestContext) -> BoxFuture<'a, StageResult<Response>> {
        match self.chain.split_first() {
            Some((current, rest)) => {
                let next = Next {
                    chain: rest,
                    terminal: self.terminal,
                };
                current(ctx, next)
            }
            None => (self.terminal)(ctx),
        }
    }
}

impl std::fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Next")
            .field("remaining", &self.chain.len())
            .finish_non_exhaustive()
    }
}

/// Render instructions produced by a handler for the view stages.
///
/// Carries the data the page component receives plus optional response
/// metadata (status, extra headers, head markup) merged into the final
/// response.
#[derive(Debug, Clone, Default)]
pub struct Render {
    /// Data passed to the page component.
    data: serde_json::Value,
    /// Markup injected into the document head by the outermost view.
    head: Option<String>,
    /// Extra headers merged into the response.
    headers: Option<HeaderMap>,
    /// Status override for the response; defaults to `200 OK`.
    status: Option<StatusCode>,
}

impl Render {
    /// Creates render instructions with the given component data.
    #[must_use]
    pub fn new(data: serde_json::Value) -> Self {
        Self {
            data,
            head: None,
            headers: None,
            status: None,
        }
    }

    /// Creates render instructions with no component data.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(serde_json::Value::Null)
    }

    /// Sets head markup.
    #[must_use]
    pub fn with_head(mut self, head: impl Into<String>) -> Self {
        self.head = Some(head.into());
        self
    }

    /// Sets extra response headers.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = Some(headers);
        self
    }

    /// Sets a response status override.
    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }

    /// Returns the component data.
    #[must_use]
    pub fn data(&self) -> &serde_json::Value {
        &self.data
    }

    /// Returns the head markup, if any.
    #[must_use]
    pub fn head(&self) -> Option<&str> {
        self.head.as_deref()
    }

    /// Returns the extra response headers, if any.
    #[must_use]
    pub fn headers(&self) -> Option<&HeaderMap> {
        self.headers.as_ref()
    }

    /// Returns the status override, if any.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }
}

/// What a handler stage produced.
#[derive(Debug)]
pub enum HandlerOutcome {
    /// A terminal response; view stages are skipped.
    Response(Response),
    /// Instructions for the view stages.
    Render(Render),
}

/// What a view stage produced.
#[derive(Debug)]
pub enum ViewOutcome {
    /// Markup handed to the next wrapping view.
    Markup(String),
    /// A terminal response that aborts the remaining view stages.
    Response(Response),
}

/// How a route responds to HTTP methods.
#[derive(Clone)]
pub enum RouteHandler {
    /// One handler for every method.
    Any(HandlerFn),
    /// Per-method handlers; unlisted methods are rejected.
    ByMethod(MethodMap),
}

impl RouteHandler {
    /// Resolves the handler for a request method.
    ///
    /// `HEAD` requests without an explicit `HEAD` handler fall back to the
    /// `GET` handler; the dispatcher strips the body afterwards.
    #[must_use]
    pub fn resolve(&self, method: &Method) -> Resolved<'_> {
        match self {
            Self::Any(handler) => Resolved::Handler(handler),
            Self::ByMethod(map) => match map.get(method) {
                Some(handler) => Resolved::Handler(handler),
                None if *method == Method::HEAD => match map.get(&Method::GET) {
                    Some(handler) => Resolved::HeadFromGet(handler),
                    None => Resolved::NotAllowed(map.allowed()),
                },
                None => Resolved::NotAllowed(map.allowed()),
            },
        }
    }
}

impl std::fmt::Debug for RouteHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Any(_) => f.write_str("RouteHandler::Any"),
            Self::ByMethod(map) => f
                .debug_tuple("RouteHandler::ByMethod")
                .field(&map.allowed())
                .finish(),
        }
    }
}

/// Result of resolving a request method against a [`RouteHandler`].
pub enum Resolved<'a> {
    /// A handler registered for the method.
    Handler(&'a HandlerFn),
    /// The `GET` handler reused for a `HEAD` request.
    HeadFromGet(&'a HandlerFn),
    /// No handler; carries the methods the route does accept.
    NotAllowed(Vec<Method>),
}

/// Per-method handler registrations for one route.
///
/// Insertion order is preserved so the `Allow` header lists methods the way
/// the route declared them.
///
/// # Example
///
/// ```ignore
/// let handlers = MethodMap::new()
///     .get(list_posts)
///     .post(create_post);
/// ```
#[derive(Clone, Default)]
pub struct MethodMap {
    handlers: IndexMap<Method, HandlerFn>,
}

impl MethodMap {
    /// Creates an empty method map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a `GET` handler.
    #[must_use]
    pub fn get_method(self, handler: HandlerFn) -> Self {
        self.method(Method::GET, handler)
    }

    /// Registers a `POST` handler.
    #[must_use]
    pub fn post(self, handler: HandlerFn) -> Self {
        self.method(Method::POST, handler)
    }

    /// Registers a `PUT` handler.
    #[must_use]
    pub fn put(self, handler: HandlerFn) -> Self {
        self.method(Method::PUT, handler)
    }

    /// Registers a `DELETE` handler.
    #[must_use]
    pub fn delete(self, handler: HandlerFn) -> Self {
        self.method(Method::DELETE, handler)
    }

    /// Registers a `PATCH` handler.
    #[must_use]
    pub fn patch(self, handler: HandlerFn) -> Self {
        self.method(Method::PATCH, handler)
    }

    /// Registers a `HEAD` handler.
    #[must_use]
    pub fn head(self, handler: HandlerFn) -> Self {
        self.method(Method::HEAD, handler)
    }

    /// Registers an `OPTIONS` handler.
    #[must_use]
    pub fn options(self, handler: HandlerFn) -> Self {
        self.method(Method::OPTIONS, handler)
    }

    /// Registers a handler for an arbitrary method.
    #[must_use]
    pub fn method(mut self, method: Method, handler: HandlerFn) -> Self {
        self.handlers.insert(method, handler);
        self
    }

    /// Looks up the handler registered for a method.
    #[must_use]
    pub fn get(&self, method: &Method) -> Option<&HandlerFn> {
        self.handlers.get(method)
    }

    /// Returns the accepted methods in registration order.
    ///
    /// `HEAD` is included implicitly when a `GET` handler exists.
    #[must_use]
    pub fn allowed(&self) -> Vec<Method> {
        let mut methods: Vec<Method> = self.handlers.keys().cloned().collect();
        if self.handlers.contains_key(&Method::GET) && !self.handlers.contains_key(&Method::HEAD) {
            methods.push(Method::HEAD);
        }
        methods
    }

    /// Returns true if no handlers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for MethodMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("MethodMap").field(&self.allowed()).finish()
    }
}
