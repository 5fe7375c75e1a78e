//! Composition of per-route execution chains.
//!
//! For every page the builder walks the directory tree from the root to the
//! page's directory and accumulates the inherited stages: middleware in
//! walk order, layouts in walk order (rendering wraps them in reverse, so
//! the accumulated order is outermost first), the nearest app shell, and
//! the nearest error boundary. Inheritance flags prune the accumulation as
//! the walk proceeds.

use crate::artifact::RouteConfig;
use crate::tree::{BoundaryRecord, PageRecord, RouteTree};
use daedalus_core::stage::{MiddlewareFn, RenderFn, RouteHandler};

/// The fully resolved execution plan for one matched route.
///
/// Built once during table construction, then read-only and shared across
/// every request that matches the route.
#[derive(Clone)]
pub struct ComposedChain {
    pattern: String,
    source_path: String,
    middlewares: Vec<MiddlewareFn>,
    /// Outermost first; rendering applies them innermost to outermost.
    layouts: Vec<RenderFn>,
    app_shell: Option<RenderFn>,
    boundary: Option<BoundaryRecord>,
    handler: Option<RouteHandler>,
    component: Option<RenderFn>,
}

impl ComposedChain {
    /// The URL pattern this chain is registered under.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The relative source path of the page artifact.
    #[must_use]
    pub fn source_path(&self) -> &str {
        &self.source_path
    }

    /// Inherited middleware, outermost ancestor first.
    #[must_use]
    pub fn middlewares(&self) -> &[MiddlewareFn] {
        &self.middlewares
    }

    /// Inherited layouts, outermost first.
    #[must_use]
    pub fn layouts(&self) -> &[RenderFn] {
        &self.layouts
    }

    /// The nearest enclosing app shell, unless suppressed.
    #[must_use]
    pub fn app_shell(&self) -> Option<&RenderFn> {
        self.app_shell.as_ref()
    }

    /// The nearest enclosing error boundary, if any.
    #[must_use]
    pub fn boundary(&self) -> Option<&BoundaryRecord> {
        self.boundary.as_ref()
    }

    /// The page's request handler, if any.
    #[must_use]
    pub fn handler(&self) -> Option<&RouteHandler> {
        self.handler.as_ref()
    }

    /// The page's render component, if any.
    #[must_use]
    pub fn component(&self) -> Option<&RenderFn> {
        self.component.as_ref()
    }
}

impl std::fmt::Debug for ComposedChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComposedChain")
            .field("pattern", &self.pattern)
            .field("source_path", &self.source_path)
            .field("middlewares", &self.middlewares.len())
            .field("layouts", &self.layouts.len())
            .field("app_shell", &self.app_shell.is_some())
            .field("boundary", &self.boundary.is_some())
            .finish_non_exhaustive()
    }
}

/// Walks root → page directory and assembles the chain.
pub(crate) fn compose(
    tree: &RouteTree,
    dir: usize,
    page: &PageRecord,
    pattern: String,
) -> ComposedChain {
    let mut middlewares: Vec<MiddlewareFn> = Vec::new();
    let mut layouts: Vec<RenderFn> = Vec::new();
    let mut app_shell: Option<RenderFn> = None;
    let mut shell_suppressed = false;
    let mut boundary: Option<BoundaryRecord> = None;

    for index in tree.path_from_root(dir) {
        let node = tree.node(index);

        middlewares.extend(node.middleware.iter().cloned());

        if let Some(shell) = &node.app_shell {
            // A nearer app shell re-applies even under an ancestor's
            // suppression.
            app_shell = Some(shell.clone());
            shell_suppressed = false;
        }

        if let Some(layout) = &node.layout {
            apply_config(&layout.config, &mut layouts, &mut shell_suppressed);
            layouts.push(layout.component.clone());
        }

        if let Some(found) = &node.boundary {
            boundary = Some(found.clone());
        }
    }

    apply_config(&page.config, &mut layouts, &mut shell_suppressed);

    ComposedChain {
        pattern,
        source_path: page.source_path.clone(),
        middlewares,
        layouts,
        app_shell: if shell_suppressed { None } else { app_shell },
        boundary,
        handler: page.handler.clone(),
        component: page.component.clone(),
    }
}

/// Applies a layout's or page's inheritance flags to the accumulation.
///
/// `skip_inherited_layouts` clears the ancestors collected so far; on a
/// layout the layout itself is pushed afterwards and still applies.
fn apply_config(config: &RouteConfig, layouts: &mut Vec<RenderFn>, shell_suppressed: &mut bool) {
    if config.skip_inherited_layouts {
        layouts.clear();
    }
    if config.skip_app_wrapper {
        *shell_suppressed = true;
    }
}
