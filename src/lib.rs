//! # roster
//!
//! A small user directory served over HTTP: CRUD over an in-memory list of
//! users, behind an explicit middleware pipeline.
//!
//! ## Request path
//!
//! ```text
//! hyper ─▶ Server (buffers body) ─▶ Recover ─▶ TokenAuth ─▶ RequestLog ─▶ Router ─▶ handler
//! ```
//!
//! - Radix-tree routing, O(path-length) lookup via [`matchit`]
//! - Middleware with one contract, `(Request, Next) -> Response`, see [`middleware`]
//! - Graceful shutdown on SIGTERM / Ctrl-C, drains in-flight requests
//!
//! Request bodies are capped (413 past the limit). TLS and rate limiting are
//! left to the reverse proxy in front of the service.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use roster::users::MemoryStore;
//! use roster::{Config, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), roster::Error> {
//!     let config = Config::default();
//!     let app = roster::app(&config, Arc::new(MemoryStore::seeded()));
//!     Server::bind(config.addr)
//!         .body_limit(config.max_body_bytes)
//!         .serve(app)
//!         .await
//! }
//! ```

mod app;
mod config;
mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod status;

pub mod middleware;
pub mod users;

pub use app::app;
pub use config::{Config, DEFAULT_BODY_LOG_LIMIT, DEFAULT_MAX_BODY_BYTES, DEFAULT_TOKEN};
pub use error::Error;
pub use handler::Handler;
pub use middleware::BoxFuture;
pub use method::{Method, UnknownMethod};
pub use request::Request;
pub use response::{ContentType, IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
pub use status::Status;
