//! Error types for Daedalus.
//!
//! Two distinct failure surfaces exist:
//!
//! - [`BuildError`] — fatal setup-time errors raised while the routing table
//!   is constructed. Registration fails fast; a partial table is never
//!   served.
//! - [`Failure`] — the explicit per-request failure value that stages
//!   (middleware, handlers, layouts, the app shell, page components) return
//!   instead of raising. Failures propagate up the composed chain to the
//!   nearest error boundary.

use http::StatusCode;
use thiserror::Error;

/// Result type alias for setup-time operations.
pub type BuildResult<T> = Result<T, BuildError>;

/// Result type alias for chain-stage execution.
pub type StageResult<T> = Result<T, Failure>;

/// Fatal errors raised while building the routing table.
///
/// Any of these aborts the whole registration process.
#[derive(Debug, Error)]
pub enum BuildError {
    /// An artifact supplied none of the recognized exports.
    #[error("artifact '{path}' exposes no recognized export")]
    MalformedArtifact {
        /// Relative source path of the offending artifact.
        path: String,
    },

    /// An artifact's exports do not fit its classified kind
    /// (e.g. a middleware file without a middleware export).
    #[error("artifact '{path}' classified as {kind} but its exports do not match")]
    MismatchedExports {
        /// Relative source path of the offending artifact.
        path: String,
        /// Classified artifact kind.
        kind: &'static str,
    },

    /// A directory holds more than one artifact of a per-level-unique kind.
    #[error("duplicate {kind} artifact in directory '{dir}'")]
    DuplicateArtifact {
        /// Artifact kind that may appear at most once per directory.
        kind: &'static str,
        /// Directory containing the duplicates.
        dir: String,
    },

    /// The same source path was registered twice.
    #[error("artifact '{path}' registered more than once")]
    DuplicateRegistration {
        /// Relative source path registered twice.
        path: String,
    },

    /// A catch-all segment appeared before the final position.
    #[error("catch-all segment must be the final segment in '{path}'")]
    CatchAllNotLast {
        /// Relative source path of the offending artifact.
        path: String,
    },

    /// A dynamic or catch-all segment has an empty capture name.
    #[error("segment '{segment}' in '{path}' has an empty capture name")]
    EmptyCaptureName {
        /// The offending segment.
        segment: String,
        /// Relative source path of the offending artifact.
        path: String,
    },
}

/// The explicit failure value carried through a composed chain.
///
/// A `Failure` replaces thrown exceptions: stages return `Err(Failure)` and
/// the dispatcher redirects it to the chain's error boundary. It carries a
/// human-readable message, an optional status-code hint, an optional
/// structured payload surfaced to boundary components, and an optional
/// source error for logging.
///
/// # Example
///
/// ```
/// use daedalus_core::Failure;
/// use http::StatusCode;
///
/// let failure = Failure::new("post not found").with_status(StatusCode::NOT_FOUND);
/// assert_eq!(failure.status_or_default(), StatusCode::NOT_FOUND);
/// ```
#[derive(Debug)]
pub struct Failure {
    /// Human-readable failure message.
    message: String,

    /// Status-code hint for the eventual response.
    status: Option<StatusCode>,

    /// Structured payload made available to error boundaries.
    payload: Option<serde_json::Value>,

    /// Underlying error, kept for logs and never exposed to clients.
    source: Option<anyhow::Error>,
}

impl Failure {
    /// Creates a failure with a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
            payload: None,
            source: None,
        }
    }

    /// Attaches a status-code hint.
    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }

    /// Attaches a structured payload.
    #[must_use]
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Attaches an underlying source error.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Returns the failure message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the status-code hint, if any.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Returns the status-code hint or `500 Internal Server Error`.
    #[must_use]
    pub fn status_or_default(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Returns the structured payload, if any.
    #[must_use]
    pub fn payload(&self) -> Option<&serde_json::Value> {
        self.payload.as_ref()
    }

    /// Returns the underlying source error, if any.
    #[must_use]
    pub fn source_error(&self) -> Option<&anyhow::Error> {
        self.source.as_ref()
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Failure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(anyhow::Error::as_ref)
    }
}

impl From<anyhow::Error> for Failure {
    fn from(source: anyhow::Error) -> Self {
        Self::new(source.to_string()).with_source(source)
    }
}
