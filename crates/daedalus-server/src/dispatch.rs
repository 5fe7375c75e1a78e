//! Request dispatch over the composed-chain table.
//!
//! Each request runs the state machine: match the URL and method, execute
//! the inherited middleware chain with continuation semantics, run the
//! handler, wrap its render data through the layout and app-shell views,
//! and produce the response. A failure from any stage is redirected to the
//! chain's error boundary; a failure from the boundary itself is terminal.
//!
//! The dispatcher owns no mutable state: it reads the immutable
//! [`RouteTable`] and allocates one [`RequestContext`] per request.

use bytes::Bytes;
use daedalus_core::error::Failure;
use daedalus_core::stage::{
    BoxFuture, HandlerFn, HandlerOutcome, Next, Render, RenderFn, Resolved, ViewOutcome,
};
use daedalus_core::{RequestContext, Response, ResponseExt, StageResult};
use daedalus_manifest::{ComposedChain, RouteTable};
use http::{HeaderMap, Method, StatusCode, Uri};
use http_body_util::Full;
use std::sync::Arc;
use tracing::{debug, error};

/// The dispatch result handed back to the transport layer.
///
/// `NotFound` and `MethodNotAllowed` are outcomes, not errors; the server
/// maps them to its default 404/405 responses.
#[derive(Debug)]
pub enum DispatchOutcome {
    /// A response produced by the matched chain.
    Response(Response),
    /// No registered pattern matched the URL.
    NotFound,
    /// A pattern matched but the route does not accept the method; carries
    /// the methods it does accept.
    MethodNotAllowed(Vec<Method>),
}

/// What runs at the end of the middleware chain.
enum HandlerPlan {
    /// A resolved handler function.
    Invoke(HandlerFn),
    /// No handler; render the page component with empty data.
    DefaultRender,
}

/// Executes composed chains for incoming requests.
#[derive(Clone)]
pub struct Dispatcher {
    table: Arc<RouteTable>,
}

impl Dispatcher {
    /// Creates a dispatcher over a frozen routing table.
    #[must_use]
    pub fn new(table: Arc<RouteTable>) -> Self {
        Self { table }
    }

    /// The routing table being served.
    #[must_use]
    pub fn table(&self) -> &Arc<RouteTable> {
        &self.table
    }

    /// Runs the full dispatch state machine for one request.
    pub async fn dispatch(
        &self,
        method: Method,
        uri: Uri,
        headers: HeaderMap,
        body: Bytes,
    ) -> DispatchOutcome {
        let Some((chain, params)) = self.table.match_path(uri.path()) else {
            return DispatchOutcome::NotFound;
        };

        let (plan, strip_body) = match chain.handler() {
            Some(handler) => match handler.resolve(&method) {
                Resolved::Handler(h) => (HandlerPlan::Invoke(h.clone()), false),
                Resolved::HeadFromGet(h) => (HandlerPlan::Invoke(h.clone()), true),
                Resolved::NotAllowed(allowed) => {
                    return DispatchOutcome::MethodNotAllowed(allowed);
                }
            },
            // Component-only pages render on GET, with HEAD synthesized.
            None => match method {
                Method::GET => (HandlerPlan::DefaultRender, false),
                Method::HEAD => (HandlerPlan::DefaultRender, true),
                _ => {
                    return DispatchOutcome::MethodNotAllowed(vec![Method::GET, Method::HEAD]);
                }
            },
        };

        let mut ctx = RequestContext::new(method, uri, headers, params).with_body(body);
        debug!(
            request_id = %ctx.request_id(),
            method = %ctx.method(),
            path = ctx.path(),
            route = chain.source_path(),
            "dispatching request"
        );

        let handler = match plan {
            HandlerPlan::Invoke(h) => Some(h),
            HandlerPlan::DefaultRender => None,
        };
        let terminal_chain = chain.clone();
        let result = Next::new(chain.middlewares(), move |ctx: &mut RequestContext| {
            execute_route(terminal_chain, handler, ctx)
        })
        .run(&mut ctx)
        .await;

        let response = match result {
            Ok(response) => response,
            Err(failure) => handle_failure(&chain, &mut ctx, failure).await,
        };

        debug!(
            request_id = %ctx.request_id(),
            status = %response.status(),
            elapsed_ms = ctx.elapsed().as_millis() as u64,
            "request completed"
        );

        if strip_body {
            DispatchOutcome::Response(without_body(response))
        } else {
            DispatchOutcome::Response(response)
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("table", &self.table)
            .finish()
    }
}

/// The terminal stage: handler, then the view wrap sequence.
fn execute_route<'a>(
    chain: Arc<ComposedChain>,
    handler: Option<HandlerFn>,
    ctx: &'a mut RequestContext,
) -> BoxFuture<'a, StageResult<Response>> {
    Box::pin(async move {
        let outcome = match handler {
            Some(handler) => handler(&mut *ctx).await?,
            None => HandlerOutcome::Render(Render::empty()),
        };

        match outcome {
            HandlerOutcome::Response(response) => Ok(response),
            HandlerOutcome::Render(render) => {
                render_views(
                    &chain,
                    &*ctx,
                    &render,
                    chain.component(),
                    StatusCode::OK,
                )
                .await
            }
        }
    })
}

/// Wraps render data through component → layouts (innermost first) → app
/// shell. Any stage may return a terminal response, which short-circuits
/// the remaining wrapping.
async fn render_views(
    chain: &ComposedChain,
    ctx: &RequestContext,
    render: &Render,
    component: Option<&RenderFn>,
    default_status: StatusCode,
) -> StageResult<Response> {
    let component =
        component.ok_or_else(|| Failure::new("render requested but route has no component"))?;

    let mut markup = match component(ctx, render, None).await? {
        ViewOutcome::Markup(markup) => markup,
        ViewOutcome::Response(response) => return Ok(response),
    };

    for layout in chain.layouts().iter().rev() {
        let outcome = layout(ctx, render, Some(markup.as_str())).await?;
        markup = match outcome {
            ViewOutcome::Markup(markup) => markup,
            ViewOutcome::Response(response) => return Ok(response),
        };
    }

    if let Some(shell) = chain.app_shell() {
        let outcome = shell(ctx, render, Some(markup.as_str())).await?;
        markup = match outcome {
            ViewOutcome::Markup(markup) => markup,
            ViewOutcome::Response(response) => return Ok(response),
        };
    }

    let mut response = Response::html(render.status().unwrap_or(default_status), &markup);
    if let Some(extra) = render.headers() {
        for (name, value) in extra {
            response.headers_mut().insert(name, value.clone());
        }
    }
    Ok(response)
}

/// Redirects a stage failure to the chain's error boundary.
///
/// The boundary sees the captured failure on the context. A failure raised
/// by the boundary itself is terminal: it is never retried against this or
/// any other boundary.
async fn handle_failure(
    chain: &Arc<ComposedChain>,
    ctx: &mut RequestContext,
    failure: Failure,
) -> Response {
    let status = failure.status_or_default();
    error!(
        request_id = %ctx.request_id(),
        route = chain.source_path(),
        error = %failure,
        "request stage failed"
    );

    let Some(boundary) = chain.boundary() else {
        return Response::error(status, "Internal Server Error");
    };

    let failure = Arc::new(failure);
    ctx.set_error(failure.clone());

    let outcome = match &boundary.handler {
        Some(handler) => match handler(&mut *ctx).await {
            Ok(outcome) => outcome,
            Err(again) => return terminal_failure(ctx, &again),
        },
        None => {
            let data = failure
                .payload()
                .cloned()
                .unwrap_or(serde_json::Value::Null);
            HandlerOutcome::Render(Render::new(data))
        }
    };

    match outcome {
        HandlerOutcome::Response(response) => response,
        HandlerOutcome::Render(render) => {
            match render_views(chain, &*ctx, &render, boundary.component.as_ref(), status).await {
                Ok(response) => response,
                Err(again) => terminal_failure(ctx, &again),
            }
        }
    }
}

/// The unrecoverable path: log and answer with a generic 500.
fn terminal_failure(ctx: &RequestContext, failure: &Failure) -> Response {
    error!(
        request_id = %ctx.request_id(),
        error = %failure,
        "error boundary failed; no further fallback"
    );
    Response::error(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
}

/// Drops the body while preserving status and headers, for HEAD responses.
fn without_body(response: Response) -> Response {
    let (parts, _) = response.into_parts();
    http::Response::from_parts(parts, Full::new(Bytes::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use daedalus_core::stage::{handler_fn, render_fn, MethodMap, RouteHandler};
    use daedalus_manifest::{ArtifactExports, RouteManifest};

    fn text_handler(text: &'static str) -> HandlerFn {
        handler_fn(move |_ctx: &mut RequestContext| {
            Box::pin(async move {
                Ok(HandlerOutcome::Response(Response::error(
                    StatusCode::OK,
                    text,
                )))
            })
        })
    }

    fn marker_view(marker: &'static str) -> RenderFn {
        render_fn(
            move |_ctx: &RequestContext, _render: &Render, child: Option<&str>| {
                let wrapped = match child {
                    Some(child) => format!("{marker}({child})"),
                    None => marker.to_string(),
                };
                Box::pin(async move { Ok(ViewOutcome::Markup(wrapped)) })
            },
        )
    }

    fn dispatcher(table: RouteTable) -> Dispatcher {
        Dispatcher::new(Arc::new(table))
    }

    async fn get(dispatcher: &Dispatcher, path: &str) -> DispatchOutcome {
        dispatcher
            .dispatch(
                Method::GET,
                path.parse().unwrap(),
                HeaderMap::new(),
                Bytes::new(),
            )
            .await
    }

    #[tokio::test]
    async fn unmatched_path_is_not_found() {
        let table = RouteManifest::new()
            .register(
                "index.tsx",
                ArtifactExports::new().component(marker_view("home")),
            )
            .unwrap()
            .build()
            .unwrap();

        assert!(matches!(
            get(&dispatcher(table), "/missing").await,
            DispatchOutcome::NotFound
        ));
    }

    #[tokio::test]
    async fn method_map_rejects_unlisted_methods() {
        let table = RouteManifest::new()
            .register(
                "api/posts.ts",
                ArtifactExports::new().handler(RouteHandler::ByMethod(
                    MethodMap::new().post(text_handler("created")),
                )),
            )
            .unwrap()
            .build()
            .unwrap();
        let dispatcher = dispatcher(table);

        match get(&dispatcher, "/api/posts").await {
            DispatchOutcome::MethodNotAllowed(allowed) => {
                assert_eq!(allowed, vec![Method::POST]);
            }
            other => panic!("expected MethodNotAllowed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn component_only_page_accepts_get_and_head_only() {
        let table = RouteManifest::new()
            .register(
                "about.tsx",
                ArtifactExports::new().component(marker_view("about")),
            )
            .unwrap()
            .build()
            .unwrap();
        let dispatcher = dispatcher(table);

        assert!(matches!(
            get(&dispatcher, "/about").await,
            DispatchOutcome::Response(_)
        ));
        let outcome = dispatcher
            .dispatch(
                Method::POST,
                "/about".parse().unwrap(),
                HeaderMap::new(),
                Bytes::new(),
            )
            .await;
        assert!(matches!(outcome, DispatchOutcome::MethodNotAllowed(_)));
    }
}
