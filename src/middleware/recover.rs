//! Outermost safety net.

use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tracing::error;

use crate::request::Request;
use crate::response::Response;
use crate::status::Status;

use super::{BoxFuture, Middleware, Next};

const INTERNAL_ERROR_BODY: &[u8] = br#"{"error":"Internal server error."}"#;

/// Converts unexpected failures from any inner stage into a generic 500.
///
/// Two kinds of failure are caught: a panic while polling the inner chain,
/// and a handler that returned `Err` (carried on the response, see
/// [`IntoResponse`](crate::IntoResponse) for `Result`). Either way the partial
/// response is dropped, the detail goes to the log, and the caller only sees
/// `{"error":"Internal server error."}`.
///
/// Register it first so it wraps every other stage.
pub struct Recover;

impl Middleware for Recover {
    fn handle(&self, req: Request, next: Next) -> BoxFuture {
        let method = req.method();
        let path = req.path().to_owned();
        // `run` is called inside the guarded future so a stage that panics
        // before returning its future is caught too.
        let inner = async move { next.run(req).await };

        Box::pin(async move {
            match AssertUnwindSafe(inner).catch_unwind().await {
                Ok(mut res) => match res.failure.take() {
                    None => res,
                    Some(err) => {
                        error!(%method, %path, "request failed: {err:#}");
                        internal_error()
                    }
                },
                Err(panic) => {
                    error!(%method, %path, "request panicked: {}", panic_message(panic.as_ref()));
                    internal_error()
                }
            }
        })
    }
}

fn internal_error() -> Response {
    Response::builder()
        .status(Status::InternalServerError)
        .json(INTERNAL_ERROR_BODY.to_vec())
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    payload.downcast_ref::<&str>().copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("<non-string panic payload>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::Pipeline;
    use crate::middleware::capture::CapturedLogs;
    use crate::{Method, Router};

    async fn boom(_req: Request) -> Response {
        panic!("handler defect");
    }

    async fn fails(_req: Request) -> anyhow::Result<Response> {
        anyhow::bail!("disk on fire")
    }

    async fn fine(_req: Request) -> &'static str { "fine" }

    fn app() -> crate::middleware::App {
        let router = Router::new()
            .on(Method::Get, "/boom", boom)
            .on(Method::Get, "/fails", fails)
            .on(Method::Get, "/fine", fine);
        Pipeline::new(router).layer(Recover).build()
    }

    #[tokio::test]
    async fn panic_becomes_generic_500() {
        let res = app().call(Request::new(Method::Get, "/boom")).await;
        assert_eq!(res.status_code(), 500);
        assert_eq!(res.header("content-type"), Some("application/json"));
        assert_eq!(res.body(), INTERNAL_ERROR_BODY);
    }

    #[tokio::test]
    async fn handler_error_becomes_generic_500_without_detail() {
        let res = app().call(Request::new(Method::Get, "/fails")).await;
        assert_eq!(res.status_code(), 500);
        assert_eq!(res.body(), INTERNAL_ERROR_BODY);
        assert!(!String::from_utf8_lossy(res.body()).contains("disk"));
    }

    #[tokio::test]
    async fn failure_detail_goes_to_the_log() {
        let (logs, _guard) = CapturedLogs::install();

        app().call(Request::new(Method::Get, "/boom")).await;
        app().call(Request::new(Method::Get, "/fails")).await;

        let panicked = logs.line("request panicked");
        assert!(panicked.contains("ERROR"), "{panicked}");
        assert!(panicked.contains("handler defect"), "{panicked}");
        assert!(panicked.contains("path=/boom"), "{panicked}");

        let failed = logs.line("request failed");
        assert!(failed.contains("disk on fire"), "{failed}");
        assert!(failed.contains("method=GET"), "{failed}");
    }

    #[tokio::test]
    async fn healthy_responses_are_not_logged_as_errors() {
        let (logs, _guard) = CapturedLogs::install();
        app().call(Request::new(Method::Get, "/fine")).await;
        assert!(logs.lines().iter().all(|l| !l.contains("ERROR")), "{:#?}", logs.lines());
    }

    #[tokio::test]
    async fn healthy_responses_pass_through() {
        let res = app().call(Request::new(Method::Get, "/fine")).await;
        assert_eq!(res.status_code(), 200);
        assert_eq!(res.body(), b"fine");
    }

    #[test]
    fn reads_both_panic_payload_shapes() {
        let owned: Box<dyn std::any::Any + Send> = Box::new(String::from("owned"));
        let borrowed: Box<dyn std::any::Any + Send> = Box::new("borrowed");
        assert_eq!(panic_message(owned.as_ref()), "owned");
        assert_eq!(panic_message(borrowed.as_ref()), "borrowed");
    }
}
