//! Artifact classification and registration exports.
//!
//! Every routable unit is registered explicitly with the exports it
//! provides; the classifier derives the artifact's kind from its source
//! path and validates that the exports fit that kind. Registration fails
//! fast on malformed artifacts so a partial table is never served.

use crate::pattern::split_extension;
use daedalus_core::error::{BuildError, BuildResult};
use daedalus_core::stage::{MiddlewareFn, RenderFn, RouteHandler};

/// What a registered source file contributes to routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// An ordinary routable page.
    Page,
    /// Request-phase functions inherited by the subtree (`_middleware`).
    Middleware,
    /// A wrapping view inherited by the subtree (`_layout`).
    Layout,
    /// The outermost wrapping view for a branch (`_app`).
    AppShell,
    /// The failure fallback for a branch (`_error`).
    ErrorBoundary,
}

impl ArtifactKind {
    /// Classifies a base filename (extension already stripped).
    #[must_use]
    pub fn from_stem(stem: &str) -> Self {
        match stem {
            "_middleware" => Self::Middleware,
            "_layout" => Self::Layout,
            "_app" => Self::AppShell,
            "_error" => Self::ErrorBoundary,
            _ => Self::Page,
        }
    }

    /// Classifies a relative source path by its final segment.
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        let file = path.rsplit('/').next().unwrap_or(path);
        let (stem, _) = split_extension(file);
        Self::from_stem(stem)
    }

    /// Human-readable kind name used in errors and logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::Middleware => "middleware",
            Self::Layout => "layout",
            Self::AppShell => "app shell",
            Self::ErrorBoundary => "error boundary",
        }
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-artifact configuration accepted on layouts and pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteConfig {
    /// Removes the app shell for this artifact and everything beneath it.
    pub skip_app_wrapper: bool,
    /// Discards all ancestor layouts collected so far.
    pub skip_inherited_layouts: bool,
}

impl RouteConfig {
    /// Creates the default configuration (inherit everything).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes the app shell for this subtree.
    #[must_use]
    pub const fn skip_app_wrapper(mut self) -> Self {
        self.skip_app_wrapper = true;
        self
    }

    /// Discards ancestor layouts for this subtree.
    #[must_use]
    pub const fn skip_inherited_layouts(mut self) -> Self {
        self.skip_inherited_layouts = true;
        self
    }
}

/// The exports supplied when registering one source file.
///
/// Mirrors what a routable file may provide: a request handler (single or
/// per-method), a middleware sequence, a default render component, and an
/// optional configuration object.
///
/// # Example
///
/// ```ignore
/// manifest.register(
///     "blog/[slug].tsx",
///     ArtifactExports::new()
///         .handler(RouteHandler::Any(show_post))
///         .component(post_component),
/// )?;
/// ```
#[derive(Clone, Default)]
pub struct ArtifactExports {
    handler: Option<RouteHandler>,
    middleware: Vec<MiddlewareFn>,
    component: Option<RenderFn>,
    config: Option<RouteConfig>,
}

impl ArtifactExports {
    /// Creates an empty export set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Supplies the request handler.
    #[must_use]
    pub fn handler(mut self, handler: RouteHandler) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Appends one middleware function.
    #[must_use]
    pub fn middleware(mut self, middleware: MiddlewareFn) -> Self {
        self.middleware.push(middleware);
        self
    }

    /// Supplies a whole middleware sequence, executed in order.
    #[must_use]
    pub fn middleware_sequence(mut self, middleware: Vec<MiddlewareFn>) -> Self {
        self.middleware.extend(middleware);
        self
    }

    /// Supplies the default render component.
    #[must_use]
    pub fn component(mut self, component: RenderFn) -> Self {
        self.component = Some(component);
        self
    }

    /// Supplies the configuration object.
    #[must_use]
    pub fn config(mut self, config: RouteConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Returns true if no recognized export was supplied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handler.is_none()
            && self.middleware.is_empty()
            && self.component.is_none()
            && self.config.is_none()
    }

    pub(crate) fn into_parts(
        self,
    ) -> (
        Option<RouteHandler>,
        Vec<MiddlewareFn>,
        Option<RenderFn>,
        RouteConfig,
    ) {
        (
            self.handler,
            self.middleware,
            self.component,
            self.config.unwrap_or_default(),
        )
    }

    /// Validates the export set against the kind derived from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::MalformedArtifact`] when no recognized export
    /// is present and [`BuildError::MismatchedExports`] when the exports do
    /// not fit the classified kind.
    pub fn validate(&self, path: &str) -> BuildResult<ArtifactKind> {
        if self.is_empty() {
            return Err(BuildError::MalformedArtifact {
                path: path.to_string(),
            });
        }

        let kind = ArtifactKind::from_path(path);
        let mismatched = || BuildError::MismatchedExports {
            path: path.to_string(),
            kind: kind.name(),
        };

        match kind {
            ArtifactKind::Middleware => {
                if self.middleware.is_empty() || self.component.is_some() || self.handler.is_some()
                {
                    return Err(mismatched());
                }
            }
            ArtifactKind::Layout => {
                if self.component.is_none() || !self.middleware.is_empty() || self.handler.is_some()
                {
                    return Err(mismatched());
                }
            }
            ArtifactKind::AppShell => {
                if self.component.is_none()
                    || !self.middleware.is_empty()
                    || self.handler.is_some()
                    || self.config.is_some()
                {
                    return Err(mismatched());
                }
            }
            ArtifactKind::ErrorBoundary => {
                if (self.handler.is_none() && self.component.is_none())
                    || !self.middleware.is_empty()
                {
                    return Err(mismatched());
                }
                // A boundary runs for whatever method failed; a per-method
                // map makes no sense there.
                if matches!(self.handler, Some(RouteHandler::ByMethod(_))) {
                    return Err(mismatched());
                }
            }
            ArtifactKind::Page => {
                // A page needs something to serve; a bare config object is
                // recognized but cannot answer a request.
                if (self.handler.is_none() && self.component.is_none())
                    || !self.middleware.is_empty()
                {
                    return Err(mismatched());
                }
            }
        }

        Ok(kind)
    }
}

impl std::fmt::Debug for ArtifactExports {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactExports")
            .field("handler", &self.handler.is_some())
            .field("middleware", &self.middleware.len())
            .field("component", &self.component.is_some())
            .field("config", &self.config)
            .finish()
    }
}
