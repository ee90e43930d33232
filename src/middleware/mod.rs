//! Middleware layer.
//!
//! Middleware intercepts requests and responses and is the right place for
//! cross-cutting concerns: failure recovery, authentication, request logging.
//!
//! Every stage has the same contract, `(Request, Next) -> Response`. A stage
//! may inspect the request, answer it on the spot (short-circuit), or call
//! [`Next::run`] and post-process what comes back. Stages are listed once at
//! startup, outermost first, and frozen into an [`App`]:
//!
//! ```text
//! request ─▶ Recover ─▶ TokenAuth ─▶ RequestLog ─▶ Router
//! response ◀────────────────────────────────────────┘
//! ```
//!
//! ```rust,no_run
//! use roster::middleware::{Pipeline, Recover, RequestLog, TokenAuth};
//! use roster::Router;
//!
//! let app = Pipeline::new(Router::new())
//!     .layer(Recover)
//!     .layer(TokenAuth::new("/users", "Bearer mysecrettoken"))
//!     .layer(RequestLog::new(4096))
//!     .build();
//! ```
//!
//! Built-in middleware:
//! - [`Recover`]: panics and handler errors become a generic 500
//! - [`TokenAuth`]: shared-secret `Authorization` check for a path prefix
//! - [`RequestLog`]: method, path, status and capped bodies via `tracing`
//! - [`HttpsRedirect`]: 307 to `https://` for requests that arrived over http

mod auth;
#[cfg(test)]
mod capture;
mod https;
mod log;
mod recover;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::Response;
use crate::router::Router;

pub use auth::TokenAuth;
pub use https::HttpsRedirect;
pub use log::RequestLog;
pub use recover::Recover;

/// The future every pipeline stage and handler returns.
pub type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// One stage of the request pipeline.
///
/// Implement it on a struct for configurable stages, or wrap an async closure
/// with [`from_fn`].
pub trait Middleware: Send + Sync + 'static {
    fn handle(&self, req: Request, next: Next) -> BoxFuture;
}

type BoxedMiddleware = Arc<dyn Middleware>;

/// The remainder of the pipeline after the current stage.
///
/// Consumed by [`run`](Next::run), so a stage calls inward at most once.
pub struct Next {
    stack: Arc<[BoxedMiddleware]>,
    index: usize,
    router: Arc<Router>,
}

impl Next {
    /// Passes `req` to the next stage, or to the router after the last one.
    pub fn run(self, req: Request) -> BoxFuture {
        let Some(stage) = self.stack.get(self.index).cloned() else {
            return self.router.dispatch(req);
        };
        let next = Next { index: self.index + 1, ..self };
        stage.handle(req, next)
    }
}

/// Builder for the ordered middleware list around a [`Router`].
pub struct Pipeline {
    stack: Vec<BoxedMiddleware>,
    router: Router,
}

impl Pipeline {
    pub fn new(router: Router) -> Self {
        Self { stack: Vec::new(), router }
    }

    /// Adds a stage inside every stage added before it. Returns `self` for
    /// chaining.
    pub fn layer(mut self, middleware: impl Middleware) -> Self {
        self.stack.push(Arc::new(middleware));
        self
    }

    /// Like [`layer`](Pipeline::layer), but only when `enabled`.
    pub fn layer_if(self, enabled: bool, middleware: impl Middleware) -> Self {
        if enabled { self.layer(middleware) } else { self }
    }

    /// Freezes the pipeline. Cheap to clone afterwards.
    pub fn build(self) -> App {
        App {
            stack: self.stack.into(),
            router: Arc::new(self.router),
        }
    }
}

/// A frozen pipeline, shared by every connection the server accepts.
#[derive(Clone)]
pub struct App {
    stack: Arc<[BoxedMiddleware]>,
    router: Arc<Router>,
}

impl App {
    /// Runs one request through every stage and the router.
    pub fn call(&self, req: Request) -> BoxFuture {
        Next {
            stack: Arc::clone(&self.stack),
            index: 0,
            router: Arc::clone(&self.router),
        }
        .run(req)
    }
}

impl From<Pipeline> for App {
    fn from(pipeline: Pipeline) -> Self { pipeline.build() }
}

impl From<Router> for App {
    fn from(router: Router) -> Self { Pipeline::new(router).build() }
}

/// Turns an async closure into a [`Middleware`].
///
/// ```rust
/// use roster::middleware::{from_fn, Next};
/// use roster::{Request, Response};
///
/// let timing = from_fn(|req: Request, next: Next| async move {
///     let started = std::time::Instant::now();
///     let res: Response = next.run(req).await;
///     tracing::debug!(elapsed = ?started.elapsed(), "served");
///     res
/// });
/// ```
pub fn from_fn<F, Fut>(f: F) -> FromFn<F>
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    FromFn(f)
}

/// Middleware built by [`from_fn`].
pub struct FromFn<F>(F);

impl<F, Fut> Middleware for FromFn<F>
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    fn handle(&self, req: Request, next: Next) -> BoxFuture {
        Box::pin((self.0)(req, next))
    }
}
