//! The user directory: records, field rules, storage and the `/users` routes.

mod handlers;
mod model;
mod store;
mod validate;

use std::future::Future;
use std::sync::Arc;

use crate::{IntoResponse, Method, Request, Router};

pub use model::{User, UserDraft};
pub use store::{MemoryStore, UserStore};
pub use validate::{validate, ValidationError};

/// Registers the `/users` CRUD routes on `router`, all sharing `store`.
pub fn routes(router: Router, store: Arc<dyn UserStore>) -> Router {
    router
        .on(Method::Get,    "/users",      with_store(&store, handlers::list))
        .on(Method::Post,   "/users",      with_store(&store, handlers::create))
        .on(Method::Get,    "/users/{id}", with_store(&store, handlers::get))
        .on(Method::Put,    "/users/{id}", with_store(&store, handlers::update))
        .on(Method::Delete, "/users/{id}", with_store(&store, handlers::delete))
}

/// Adapts a `(store, request)` handler to the router's `(request)` shape.
fn with_store<F, Fut, R>(
    store: &Arc<dyn UserStore>,
    handler: F,
) -> impl Fn(Request) -> Fut + Send + Sync + 'static
where
    F: Fn(Arc<dyn UserStore>, Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    let store = Arc::clone(store);
    move |req: Request| handler(Arc::clone(&store), req)
}
