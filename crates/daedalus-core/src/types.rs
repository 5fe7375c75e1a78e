//! HTTP request/response types shared across the workspace.

use bytes::Bytes;
use http_body_util::Full;

/// The HTTP request type used throughout dispatch.
pub type Request = http::Request<Full<Bytes>>;

/// The HTTP response type used throughout dispatch.
pub type Response = http::Response<Full<Bytes>>;

/// Extension trait for building common responses.
pub trait ResponseExt {
    /// Creates a plain-text error response.
    fn error(status: http::StatusCode, message: &str) -> Response;

    /// Creates an HTML response with the given status and markup.
    fn html(status: http::StatusCode, markup: &str) -> Response;
}

impl ResponseExt for Response {
    fn error(status: http::StatusCode, message: &str) -> Response {
        http::Response::builder()
            .status(status)
            .header(http::header::CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(Full::new(Bytes::from(message.to_string())))
            .expect("failed to build error response")
    }

    fn html(status: http::StatusCode, markup: &str) -> Response {
        http::Response::builder()
            .status(status)
            .header(http::header::CONTENT_TYPE, "text/html; charset=utf-8")
            .body(Full::new(Bytes::from(markup.to_string())))
            .expect("failed to build HTML response")
    }
}
