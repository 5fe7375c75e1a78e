//! # Daedalus Server
//!
//! The request dispatcher and HTTP transport. The dispatcher executes the
//! composed chain for each matched route (middleware → handler → views →
//! error boundary); the server binds a TCP listener, feeds requests to the
//! dispatcher, and shuts down gracefully.
//!
//! Requests are independent tasks: no state is shared between them, and
//! within a request the stages run strictly in sequence.

pub mod config;
pub mod dispatch;
pub mod server;
pub mod shutdown;

pub use config::{ServerConfig, ServerConfigBuilder};
pub use dispatch::{DispatchOutcome, Dispatcher};
pub use server::{Server, ServerError};
pub use shutdown::{ConnectionTracker, ShutdownSignal};
