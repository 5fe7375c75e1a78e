//! HTTP server implementation.
//!
//! Built on Hyper and Tokio:
//!
//! - TCP listener bound to the configured address
//! - One spawned task per connection, tracked for graceful shutdown
//! - Requests dispatched through the composed-chain [`Dispatcher`]
//!
//! # Example
//!
//! ```rust,ignore
//! use daedalus_server::{Server, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let table = build_routes()?;
//!     let config = ServerConfig::builder().http_addr("0.0.0.0:8080").build();
//!
//!     Server::new(config, table).run().await?;
//!     Ok(())
//! }
//! ```

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http::{header, Method, StatusCode};
use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use thiserror::Error;
use tokio::net::TcpListener;

use daedalus_core::{Response, ResponseExt};
use daedalus_manifest::RouteTable;

use crate::config::ServerConfig;
use crate::dispatch::{DispatchOutcome, Dispatcher};
use crate::shutdown::{ConnectionTracker, ShutdownSignal};

/// Server error types.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind to the configured address.
    #[error("bind error: {0}")]
    Bind(String),

    /// I/O error during server operation.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// The Daedalus HTTP server.
///
/// Serves a frozen routing table until shutdown.
pub struct Server {
    /// Server configuration
    config: ServerConfig,

    /// Composed-chain dispatcher
    dispatcher: Dispatcher,
}

impl Server {
    /// Creates a server over a built routing table.
    #[must_use]
    pub fn new(config: ServerConfig, table: RouteTable) -> Self {
        Self {
            config,
            dispatcher: Dispatcher::new(Arc::new(table)),
        }
    }

    /// Returns the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the dispatcher.
    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Runs the server until SIGTERM or SIGINT.
    ///
    /// # Errors
    ///
    /// Returns an error if the server cannot bind to the configured
    /// address or an I/O error occurs.
    pub async fn run(self) -> Result<(), ServerError> {
        let shutdown = ShutdownSignal::with_os_signals();
        self.run_with_shutdown(shutdown).await
    }

    /// Runs the server with a custom shutdown signal.
    ///
    /// Useful for tests and for controlling shutdown programmatically.
    ///
    /// # Errors
    ///
    /// Returns an error if the server cannot bind or an I/O error occurs.
    pub async fn run_with_shutdown(self, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let addr = self.config.socket_addr().map_err(|e| {
            ServerError::Bind(format!(
                "invalid address '{}': {}",
                self.config.http_addr(),
                e
            ))
        })?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Bind(format!("failed to bind to {addr}: {e}")))?;

        tracing::info!(
            addr = %addr,
            routes = self.dispatcher.table().registrations().len(),
            "server listening"
        );

        let server = Arc::new(self);
        let tracker = ConnectionTracker::new();

        // Accept connections until shutdown
        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, remote_addr)) => {
                            let server = Arc::clone(&server);
                            let token = tracker.acquire();
                            let shutdown_clone = shutdown.clone();

                            tokio::spawn(async move {
                                if let Err(e) = server.handle_connection(stream, remote_addr, shutdown_clone).await {
                                    tracing::error!("connection error from {}: {}", remote_addr, e);
                                }
                                drop(token);
                            });
                        }
                        Err(e) => {
                            tracing::error!("failed to accept connection: {}", e);
                        }
                    }
                }

                _ = shutdown.recv() => {
                    tracing::info!("shutdown signal received, stopping server");
                    break;
                }
            }
        }

        // Wait for in-flight connections with timeout
        let shutdown_timeout = server.config.shutdown_timeout();
        tracing::info!(
            "waiting up to {:?} for {} connections to close",
            shutdown_timeout,
            tracker.active_connections()
        );

        tokio::select! {
            _ = tracker.wait_for_drain() => {
                tracing::info!("all connections closed");
            }
            _ = tokio::time::sleep(shutdown_timeout) => {
                tracing::warn!(
                    "shutdown timeout reached, {} connections still active",
                    tracker.active_connections()
                );
            }
        }

        tracing::info!("server stopped");
        Ok(())
    }

    /// Handles a single connection.
    async fn handle_connection(
        self: &Arc<Self>,
        stream: tokio::net::TcpStream,
        remote_addr: SocketAddr,
        shutdown: ShutdownSignal,
    ) -> Result<(), hyper::Error> {
        let io = TokioIo::new(stream);
        let server = Arc::clone(self);

        let service = service_fn(move |req: http::Request<Incoming>| {
            let server = Arc::clone(&server);
            async move { server.handle_request(req).await }
        });

        let conn = http1::Builder::new().serve_connection(io, service);

        tokio::select! {
            result = conn => {
                result
            }
            _ = shutdown.recv() => {
                tracing::debug!("connection from {} closed due to shutdown", remote_addr);
                Ok(())
            }
        }
    }

    /// Handles a single HTTP request end to end.
    async fn handle_request(
        self: &Arc<Self>,
        req: http::Request<Incoming>,
    ) -> Result<Response, Infallible> {
        let (parts, body) = req.into_parts();

        // Collect request body with timeout
        let body = match tokio::time::timeout(self.config.request_timeout(), collect_body(body))
            .await
        {
            Ok(Ok(body)) => body,
            Ok(Err(e)) => {
                tracing::error!("failed to collect request body: {}", e);
                return Ok(Response::error(
                    StatusCode::BAD_REQUEST,
                    "failed to read request body",
                ));
            }
            Err(_) => {
                tracing::warn!("request body collection timed out");
                return Ok(Response::error(
                    StatusCode::REQUEST_TIMEOUT,
                    "request body collection timed out",
                ));
            }
        };

        let method = parts.method.clone();
        let path = parts.uri.path().to_string();
        let outcome = tokio::time::timeout(
            self.config.request_timeout(),
            self.dispatcher
                .dispatch(parts.method, parts.uri, parts.headers, body),
        )
        .await;

        match outcome {
            Ok(outcome) => Ok(outcome_response(outcome)),
            Err(_) => {
                tracing::warn!("dispatch timed out for {} {}", method, path);
                Ok(Response::error(
                    StatusCode::GATEWAY_TIMEOUT,
                    "request timed out",
                ))
            }
        }
    }
}

/// Collects the request body into bytes.
async fn collect_body(body: Incoming) -> Result<Bytes, hyper::Error> {
    let collected = body.collect().await?;
    Ok(collected.to_bytes())
}

/// Maps dispatch outcomes to the server's default responses.
fn outcome_response(outcome: DispatchOutcome) -> Response {
    match outcome {
        DispatchOutcome::Response(response) => response,
        DispatchOutcome::NotFound => Response::error(StatusCode::NOT_FOUND, "Not Found"),
        DispatchOutcome::MethodNotAllowed(allowed) => {
            let mut response = Response::error(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
            if let Ok(value) = allow_header(&allowed).parse() {
                response.headers_mut().insert(header::ALLOW, value);
            }
            response
        }
    }
}

/// Renders the `Allow` header value for a 405 response.
fn allow_header(allowed: &[Method]) -> String {
    allowed
        .iter()
        .map(Method::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use daedalus_manifest::RouteManifest;
    use std::time::Duration;

    fn empty_table() -> RouteTable {
        RouteManifest::new().build().unwrap()
    }

    #[test]
    fn outcome_not_found_maps_to_404() {
        let response = outcome_response(DispatchOutcome::NotFound);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn outcome_method_not_allowed_sets_allow_header() {
        let response =
            outcome_response(DispatchOutcome::MethodNotAllowed(vec![Method::GET, Method::POST]));
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            response.headers().get(header::ALLOW).unwrap(),
            "GET, POST"
        );
    }

    #[tokio::test]
    async fn run_rejects_invalid_address() {
        let config = ServerConfig::builder()
            .http_addr("not-a-valid-address")
            .build();
        let server = Server::new(config, empty_table());

        let result = server.run_with_shutdown(ShutdownSignal::new()).await;
        assert!(matches!(result, Err(ServerError::Bind(_))));
    }

    #[tokio::test]
    async fn run_stops_on_shutdown() {
        let config = ServerConfig::builder()
            .http_addr("127.0.0.1:0")
            .shutdown_timeout(Duration::from_millis(100))
            .build();
        let server = Server::new(config, empty_table());

        let shutdown = ShutdownSignal::new();
        shutdown.trigger();

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            server.run_with_shutdown(shutdown),
        )
        .await;

        assert!(result.is_ok());
        assert!(result.unwrap().is_ok());
    }
}
