//! In-memory directory tree of registered artifacts.
//!
//! The tree is an arena of directory nodes built during registration and
//! consumed by chain composition. Each node owns at most one middleware
//! sequence, one layout, one app shell, and one error boundary, plus any
//! number of pages. Route-group directories are ordinary nodes here; only
//! URL production treats them specially.

use crate::artifact::{ArtifactKind, RouteConfig};
use daedalus_core::error::{BuildError, BuildResult};
use daedalus_core::stage::{HandlerFn, MiddlewareFn, RenderFn, RouteHandler};
use indexmap::IndexMap;

/// An error boundary's executable parts.
#[derive(Clone)]
pub struct BoundaryRecord {
    /// Handler invoked with the captured failure on the context.
    pub handler: Option<HandlerFn>,
    /// Fallback component rendered when no handler exists (or the handler
    /// asks for a render).
    pub component: Option<RenderFn>,
}

impl std::fmt::Debug for BoundaryRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundaryRecord")
            .field("handler", &self.handler.is_some())
            .field("component", &self.component.is_some())
            .finish()
    }
}

/// A layout artifact attached to a directory.
#[derive(Clone)]
pub struct LayoutRecord {
    /// The wrapping view.
    pub component: RenderFn,
    /// Inheritance flags.
    pub config: RouteConfig,
}

/// A page artifact attached to a directory.
#[derive(Clone)]
pub struct PageRecord {
    /// Relative source path the page was registered under.
    pub source_path: String,
    /// Request handler, if any.
    pub handler: Option<RouteHandler>,
    /// Default render component, if any.
    pub component: Option<RenderFn>,
    /// Inheritance flags.
    pub config: RouteConfig,
}

pub(crate) struct DirNode {
    /// Raw directory name as registered (groups keep their parentheses).
    pub(crate) name: String,
    pub(crate) parent: Option<usize>,
    pub(crate) children: IndexMap<String, usize>,
    pub(crate) middleware: Vec<MiddlewareFn>,
    pub(crate) layout: Option<LayoutRecord>,
    pub(crate) app_shell: Option<RenderFn>,
    pub(crate) boundary: Option<BoundaryRecord>,
    pub(crate) pages: Vec<PageRecord>,
}

impl DirNode {
    fn new(name: String, parent: Option<usize>) -> Self {
        Self {
            name,
            parent,
            children: IndexMap::new(),
            middleware: Vec::new(),
            layout: None,
            app_shell: None,
            boundary: None,
            pages: Vec::new(),
        }
    }
}

/// Arena of directory nodes; index 0 is the routes root.
pub(crate) struct RouteTree {
    nodes: Vec<DirNode>,
}

impl RouteTree {
    pub(crate) fn new() -> Self {
        Self {
            nodes: vec![DirNode::new(String::new(), None)],
        }
    }

    pub(crate) fn node(&self, index: usize) -> &DirNode {
        &self.nodes[index]
    }

    /// Walks `segments` from the root, creating directories as needed.
    pub(crate) fn ensure_dir(&mut self, segments: &[&str]) -> usize {
        let mut current = 0;
        for segment in segments {
            if let Some(&child) = self.nodes[current].children.get(*segment) {
                current = child;
                continue;
            }
            let child = self.nodes.len();
            self.nodes.push(DirNode::new((*segment).to_string(), Some(current)));
            self.nodes[current]
                .children
                .insert((*segment).to_string(), child);
            current = child;
        }
        current
    }

    /// Indices from the root down to `index`, inclusive.
    pub(crate) fn path_from_root(&self, index: usize) -> Vec<usize> {
        let mut path = Vec::new();
        let mut current = Some(index);
        while let Some(i) = current {
            path.push(i);
            current = self.nodes[i].parent;
        }
        path.reverse();
        path
    }

    /// Reconstructs the directory's slash-joined source path for errors.
    pub(crate) fn dir_path(&self, index: usize) -> String {
        let names: Vec<&str> = self
            .path_from_root(index)
            .into_iter()
            .filter_map(|i| {
                let name = self.nodes[i].name.as_str();
                (!name.is_empty()).then_some(name)
            })
            .collect();
        if names.is_empty() {
            ".".to_string()
        } else {
            names.join("/")
        }
    }

    pub(crate) fn attach_middleware(
        &mut self,
        dir: usize,
        middleware: Vec<MiddlewareFn>,
    ) -> BuildResult<()> {
        if !self.nodes[dir].middleware.is_empty() {
            return Err(self.duplicate(ArtifactKind::Middleware, dir));
        }
        self.nodes[dir].middleware = middleware;
        Ok(())
    }

    pub(crate) fn attach_layout(&mut self, dir: usize, layout: LayoutRecord) -> BuildResult<()> {
        if self.nodes[dir].layout.is_some() {
            return Err(self.duplicate(ArtifactKind::Layout, dir));
        }
        self.nodes[dir].layout = Some(layout);
        Ok(())
    }

    pub(crate) fn attach_app_shell(&mut self, dir: usize, shell: RenderFn) -> BuildResult<()> {
        if self.nodes[dir].app_shell.is_some() {
            return Err(self.duplicate(ArtifactKind::AppShell, dir));
        }
        self.nodes[dir].app_shell = Some(shell);
        Ok(())
    }

    pub(crate) fn attach_boundary(
        &mut self,
        dir: usize,
        boundary: BoundaryRecord,
    ) -> BuildResult<()> {
        if self.nodes[dir].boundary.is_some() {
            return Err(self.duplicate(ArtifactKind::ErrorBoundary, dir));
        }
        self.nodes[dir].boundary = Some(boundary);
        Ok(())
    }

    pub(crate) fn attach_page(&mut self, dir: usize, page: PageRecord) {
        self.nodes[dir].pages.push(page);
    }

    fn duplicate(&self, kind: ArtifactKind, dir: usize) -> BuildError {
        BuildError::DuplicateArtifact {
            kind: kind.name(),
            dir: self.dir_path(dir),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use daedalus_core::stage::middleware_fn;
    use daedalus_core::{BoxFuture, Next, RequestContext, Response, StageResult};

    fn noop<'a>(ctx: &'a mut RequestContext, next: Next<'a>) -> BoxFuture<'a, StageResult<Response>> {
        next.run(ctx)
    }

    #[test]
    fn ensure_dir_reuses_existing_nodes() {
        let mut tree = RouteTree::new();
        let a = tree.ensure_dir(&["blog", "(archive)"]);
        let b = tree.ensure_dir(&["blog", "(archive)"]);
        let c = tree.ensure_dir(&["blog"]);

        assert_eq!(a, b);
        assert_eq!(tree.node(a).parent, Some(c));
        assert_eq!(tree.path_from_root(a), vec![0, c, a]);
    }

    #[test]
    fn dir_path_joins_raw_names() {
        let mut tree = RouteTree::new();
        let dir = tree.ensure_dir(&["blog", "(archive)", "[year]"]);
        assert_eq!(tree.dir_path(dir), "blog/(archive)/[year]");
        assert_eq!(tree.dir_path(0), ".");
    }

    #[test]
    fn duplicate_middleware_is_rejected() {
        let mut tree = RouteTree::new();
        let dir = tree.ensure_dir(&["blog"]);
        tree.attach_middleware(dir, vec![middleware_fn(noop)]).unwrap();

        let err = tree
            .attach_middleware(dir, vec![middleware_fn(noop)])
            .unwrap_err();
        assert!(matches!(err, BuildError::DuplicateArtifact { kind: "middleware", .. }));
    }
}
