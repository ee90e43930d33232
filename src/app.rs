//! The assembled service: routes plus the middleware chain around them.

use std::sync::Arc;

use crate::config::Config;
use crate::middleware::{App, HttpsRedirect, Pipeline, Recover, RequestLog, TokenAuth};
use crate::users::{self, UserStore};
use crate::{Method, Request, Router};

/// Builds the request pipeline, outermost stage first:
///
/// 1. [`Recover`]: everything inside it may fail without leaking detail
/// 2. [`TokenAuth`] on `/users`: rejected requests never reach the log or router
/// 3. [`RequestLog`]
/// 4. [`HttpsRedirect`], when enabled
/// 5. the router
pub fn app(config: &Config, store: Arc<dyn UserStore>) -> App {
    let router = Router::new().on(Method::Get, "/", hello);
    let router = users::routes(router, store);

    Pipeline::new(router)
        .layer(Recover)
        .layer(TokenAuth::new("/users", config.token.clone()))
        .layer(RequestLog::new(config.body_log_limit))
        .layer_if(config.https_redirect, HttpsRedirect)
        .build()
}

async fn hello(_req: Request) -> &'static str {
    "Hello World!"
}
