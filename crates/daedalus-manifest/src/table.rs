//! Manifest registration and routing-table construction.
//!
//! [`RouteManifest`] is the explicit registration API: each routable source
//! file is registered with its path and exports, validated eagerly, and the
//! whole set is frozen into an immutable [`RouteTable`] in one build step.
//! Construction fails fast; a partial table is never produced.

use crate::artifact::{ArtifactExports, ArtifactKind};
use crate::compose::{compose, ComposedChain};
use crate::pattern::{is_excluded_path, translate, translate_with_extension};
use crate::sort::sort_route_paths;
use crate::tree::{BoundaryRecord, LayoutRecord, PageRecord, RouteTree};
use daedalus_core::error::{BuildError, BuildResult};
use daedalus_core::stage::RouteHandler;
use daedalus_router::{Params, Router};
use http::Method;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};

/// One registration tuple handed to the matcher, in registration order.
#[derive(Debug, Clone)]
pub struct Registration {
    pattern: String,
    method: Option<Method>,
    chain: Arc<ComposedChain>,
}

impl Registration {
    /// The URL pattern.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The HTTP method, or `None` for any-method registrations.
    #[must_use]
    pub fn method(&self) -> Option<&Method> {
        self.method.as_ref()
    }

    /// The composed chain bound to the pattern.
    #[must_use]
    pub fn chain(&self) -> &Arc<ComposedChain> {
        &self.chain
    }
}

/// Collects artifact registrations before the table is built.
///
/// # Example
///
/// ```ignore
/// let table = RouteManifest::new()
///     .register("_app.tsx", ArtifactExports::new().component(shell))?
///     .register("index.tsx", ArtifactExports::new().component(home))?
///     .build()?;
/// ```
#[derive(Debug, Default)]
pub struct RouteManifest {
    entries: Vec<(String, ArtifactExports)>,
    seen: HashSet<String>,
}

impl RouteManifest {
    /// Creates an empty manifest.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one source file with its exports.
    ///
    /// Validation happens immediately: malformed or kind-mismatched exports
    /// and duplicate paths abort registration.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] describing the offending artifact.
    pub fn register(
        mut self,
        path: impl Into<String>,
        exports: ArtifactExports,
    ) -> BuildResult<Self> {
        let path = path.into();
        let path = path.trim_start_matches('/').to_string();

        if !self.seen.insert(path.clone()) {
            return Err(BuildError::DuplicateRegistration { path });
        }
        exports.validate(&path)?;

        debug!(path = %path, "registered route artifact");
        self.entries.push((path, exports));
        Ok(self)
    }

    /// Number of artifacts registered so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Freezes the manifest into an immutable routing table.
    ///
    /// Artifacts are ordered by [`sort_route_paths`], attached to the
    /// directory tree, and each page's chain is composed and registered.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] for duplicate per-directory artifacts,
    /// invalid patterns, or unresolvable URL collisions.
    pub fn build(mut self) -> BuildResult<RouteTable> {
        self.entries
            .sort_by(|(a, _), (b, _)| sort_route_paths(a, b));

        let mut tree = RouteTree::new();
        let mut pages: Vec<(usize, PageRecord)> = Vec::new();

        for (path, exports) in self.entries {
            let kind = ArtifactKind::from_path(&path);
            let (handler, middleware, component, config) = exports.into_parts();

            if kind != ArtifactKind::Page && is_excluded_path(&path) {
                continue;
            }

            let dir_segments: Vec<&str> = {
                let parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
                parts[..parts.len().saturating_sub(1)].to_vec()
            };

            let mismatched = || BuildError::MismatchedExports {
                path: path.clone(),
                kind: kind.name(),
            };

            match kind {
                ArtifactKind::Middleware => {
                    let dir = tree.ensure_dir(&dir_segments);
                    tree.attach_middleware(dir, middleware)?;
                }
                ArtifactKind::Layout => {
                    let component = component.ok_or_else(mismatched)?;
                    let dir = tree.ensure_dir(&dir_segments);
                    tree.attach_layout(dir, LayoutRecord { component, config })?;
                }
                ArtifactKind::AppShell => {
                    let component = component.ok_or_else(mismatched)?;
                    let dir = tree.ensure_dir(&dir_segments);
                    tree.attach_app_shell(dir, component)?;
                }
                ArtifactKind::ErrorBoundary => {
                    let handler = match handler {
                        Some(RouteHandler::Any(h)) => Some(h),
                        Some(RouteHandler::ByMethod(_)) => return Err(mismatched()),
                        None => None,
                    };
                    let dir = tree.ensure_dir(&dir_segments);
                    tree.attach_boundary(dir, BoundaryRecord { handler, component })?;
                }
                ArtifactKind::Page => {
                    // Excluded subtrees surface here as a skipped pattern.
                    if translate(&path)?.is_none() {
                        continue;
                    }
                    let dir = tree.ensure_dir(&dir_segments);
                    let record = PageRecord {
                        source_path: path,
                        handler,
                        component,
                        config,
                    };
                    tree.attach_page(dir, record.clone());
                    pages.push((dir, record));
                }
            }
        }

        let mut router: Router<Arc<ComposedChain>> = Router::new();
        let mut registrations: Vec<Registration> = Vec::new();
        let mut claimed: HashMap<String, String> = HashMap::new();

        for (dir, page) in &pages {
            let pattern = claim_pattern(&mut claimed, &page.source_path)?;
            let chain = Arc::new(compose(&tree, *dir, page, pattern.clone()));

            router.insert(&pattern, chain.clone());
            for method in registration_methods(chain.handler()) {
                debug!(
                    pattern = %pattern,
                    method = method.as_ref().map_or("*", Method::as_str),
                    source = %chain.source_path(),
                    "route registered"
                );
                registrations.push(Registration {
                    pattern: pattern.clone(),
                    method,
                    chain: chain.clone(),
                });
            }
        }

        info!(
            routes = registrations.len(),
            patterns = router.len(),
            "routing table built"
        );
        Ok(RouteTable {
            registrations,
            router,
        })
    }
}

/// Resolves a page's URL pattern, re-applying the source extension when two
/// artifacts would otherwise collide.
fn claim_pattern(claimed: &mut HashMap<String, String>, path: &str) -> BuildResult<String> {
    let translated = translate(path)?.ok_or_else(|| BuildError::MalformedArtifact {
        path: path.to_string(),
    })?;

    if !claimed.contains_key(&translated.pattern) {
        claimed.insert(translated.pattern.clone(), path.to_string());
        return Ok(translated.pattern);
    }

    let with_ext = translate_with_extension(path)?.ok_or_else(|| BuildError::MalformedArtifact {
        path: path.to_string(),
    })?;
    if claimed.contains_key(&with_ext.pattern) {
        return Err(BuildError::DuplicateRegistration {
            path: path.to_string(),
        });
    }
    claimed.insert(with_ext.pattern.clone(), path.to_string());
    Ok(with_ext.pattern)
}

/// The method tuples emitted for one page's registration.
fn registration_methods(handler: Option<&RouteHandler>) -> Vec<Option<Method>> {
    match handler {
        Some(RouteHandler::Any(_)) => vec![None],
        Some(RouteHandler::ByMethod(map)) => {
            map.allowed().into_iter().map(Some).collect()
        }
        // Component-only pages render on GET; HEAD is synthesized from it.
        None => vec![Some(Method::GET), Some(Method::HEAD)],
    }
}

/// The immutable routing table: ordered registrations plus the matcher.
///
/// Built once, then shared read-only across every request-handling task.
pub struct RouteTable {
    registrations: Vec<Registration>,
    router: Router<Arc<ComposedChain>>,
}

impl RouteTable {
    /// The ordered registration tuples, as handed to the matcher.
    #[must_use]
    pub fn registrations(&self) -> &[Registration] {
        &self.registrations
    }

    /// Matches a request path, returning the chain and captured parameters.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<(Arc<ComposedChain>, Params)> {
        self.router
            .match_path(path)
            .map(|(chain, params)| (chain.clone(), params))
    }

    /// Number of distinct URL patterns.
    #[must_use]
    pub fn pattern_count(&self) -> usize {
        self.router.len()
    }
}

impl std::fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteTable")
            .field("registrations", &self.registrations.len())
            .field("patterns", &self.router.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::RouteConfig;
    use daedalus_core::stage::{handler_fn, middleware_fn, render_fn, MethodMap};
    use daedalus_core::{
        BoxFuture, HandlerOutcome, Next, Render, RequestContext, Response, StageResult,
        ViewOutcome,
    };

    fn handler<'a>(_ctx: &'a mut RequestContext) -> BoxFuture<'a, StageResult<HandlerOutcome>> {
        Box::pin(async { Ok(HandlerOutcome::Render(Render::empty())) })
    }

    fn view<'a>(
        _ctx: &'a RequestContext,
        _render: &'a Render,
        _child: Option<&'a str>,
    ) -> BoxFuture<'a, StageResult<ViewOutcome>> {
        Box::pin(async { Ok(ViewOutcome::Markup(String::new())) })
    }

    fn mw<'a>(ctx: &'a mut RequestContext, next: Next<'a>) -> BoxFuture<'a, StageResult<Response>> {
        next.run(ctx)
    }

    fn page_exports() -> ArtifactExports {
        ArtifactExports::new().component(render_fn(view))
    }

    #[test]
    fn builds_a_table_with_inheritance() {
        let table = RouteManifest::new()
            .register("_app.tsx", ArtifactExports::new().component(render_fn(view)))
            .unwrap()
            .register(
                "blog/_middleware.ts",
                ArtifactExports::new().middleware(middleware_fn(mw)),
            )
            .unwrap()
            .register(
                "blog/_layout.tsx",
                ArtifactExports::new().component(render_fn(view)),
            )
            .unwrap()
            .register("blog/[slug].tsx", page_exports())
            .unwrap()
            .register("index.tsx", page_exports())
            .unwrap()
            .build()
            .unwrap();

        let (chain, params) = table.match_path("/blog/first-post").unwrap();
        assert_eq!(params.get("slug"), Some("first-post"));
        assert_eq!(chain.middlewares().len(), 1);
        assert_eq!(chain.layouts().len(), 1);
        assert!(chain.app_shell().is_some());

        let (home, _) = table.match_path("/").unwrap();
        assert!(home.middlewares().is_empty());
        assert!(home.layouts().is_empty());
        assert!(home.app_shell().is_some());
    }

    #[test]
    fn registration_order_follows_path_sort() {
        let table = RouteManifest::new()
            .register("blog/[slug].tsx", page_exports())
            .unwrap()
            .register("blog/index.tsx", page_exports())
            .unwrap()
            .register("about.tsx", page_exports())
            .unwrap()
            .build()
            .unwrap();

        let patterns: Vec<&str> = table
            .registrations()
            .iter()
            .map(Registration::pattern)
            .collect();
        // GET + synthesized HEAD per component-only page.
        assert_eq!(
            patterns,
            vec!["/about", "/about", "/blog", "/blog", "/blog/{slug}", "/blog/{slug}"]
        );
    }

    #[test]
    fn per_method_handlers_emit_one_tuple_per_method() {
        let handlers = RouteHandler::ByMethod(
            MethodMap::new()
                .get_method(handler_fn(handler))
                .post(handler_fn(handler)),
        );
        let table = RouteManifest::new()
            .register("api/posts.ts", ArtifactExports::new().handler(handlers))
            .unwrap()
            .build()
            .unwrap();

        let methods: Vec<Option<&Method>> = table
            .registrations()
            .iter()
            .map(Registration::method)
            .collect();
        assert_eq!(
            methods,
            vec![
                Some(&Method::GET),
                Some(&Method::POST),
                Some(&Method::HEAD)
            ]
        );
    }

    #[test]
    fn url_collision_keeps_extension_on_later_entry() {
        let table = RouteManifest::new()
            .register("about.tsx", page_exports())
            .unwrap()
            .register("about.js", page_exports())
            .unwrap()
            .build()
            .unwrap();

        assert!(table.match_path("/about").is_some());
        assert!(table.match_path("/about.js").is_some());
        let (clean, _) = table.match_path("/about").unwrap();
        assert_eq!(clean.source_path(), "about.tsx");
    }

    #[test]
    fn duplicate_path_rejected_at_registration() {
        let err = RouteManifest::new()
            .register("about.tsx", page_exports())
            .unwrap()
            .register("about.tsx", page_exports())
            .unwrap_err();
        assert!(matches!(err, BuildError::DuplicateRegistration { .. }));
    }

    #[test]
    fn excluded_subtrees_produce_no_routes() {
        let table = RouteManifest::new()
            .register("(_drafts)/secret.tsx", page_exports())
            .unwrap()
            .register("(_drafts)/_layout.tsx", ArtifactExports::new().component(render_fn(view)))
            .unwrap()
            .register("(site)/pricing.tsx", page_exports())
            .unwrap()
            .build()
            .unwrap();

        assert!(table.match_path("/secret").is_none());
        assert!(table.match_path("/(_drafts)/secret").is_none());
        assert!(table.match_path("/pricing").is_some());
    }

    #[test]
    fn duplicate_layout_in_directory_fails_build() {
        let err = RouteManifest::new()
            .register("blog/_layout.tsx", ArtifactExports::new().component(render_fn(view)))
            .unwrap()
            .register("blog/_layout.ts", ArtifactExports::new().component(render_fn(view)))
            .unwrap()
            .build()
            .unwrap_err();
        assert!(matches!(err, BuildError::DuplicateArtifact { kind: "layout", .. }));
    }

    #[test]
    fn group_directories_scope_inheritance_invisibly() {
        let table = RouteManifest::new()
            .register(
                "(admin)/_layout.tsx",
                ArtifactExports::new()
                    .component(render_fn(view))
                    .config(RouteConfig::new().skip_app_wrapper()),
            )
            .unwrap()
            .register("(admin)/panel.tsx", page_exports())
            .unwrap()
            .register("_app.tsx", ArtifactExports::new().component(render_fn(view)))
            .unwrap()
            .register("index.tsx", page_exports())
            .unwrap()
            .build()
            .unwrap();

        let (panel, _) = table.match_path("/panel").unwrap();
        assert_eq!(panel.layouts().len(), 1);
        assert!(panel.app_shell().is_none());

        let (home, _) = table.match_path("/").unwrap();
        assert!(home.layouts().is_empty());
        assert!(home.app_shell().is_some());
    }
}
