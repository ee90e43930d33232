//! Route handlers.
//!
//! A handler is the last stage of the pipeline: it gets the request after
//! every middleware has run and produces the response. The router stores
//! handlers of different concrete types side by side as `Arc<dyn Handler>`.

use std::future::Future;
use std::sync::Arc;

use crate::middleware::BoxFuture;
use crate::request::Request;
use crate::response::IntoResponse;

/// Anything that can answer a routed request.
///
/// Async functions and closures of the shape
/// `Fn(Request) -> impl Future<Output = impl IntoResponse>` implement it
/// already. Implement it by hand for handlers that carry configuration.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, req: Request) -> BoxFuture;
}

pub(crate) type SharedHandler = Arc<dyn Handler>;

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        let fut = self(req);
        Box::pin(async move { fut.await.into_response() })
    }
}
