//! Plain-HTTP to HTTPS redirect.

use tracing::debug;

use crate::request::Request;
use crate::response::Response;
use crate::status::Status;

use super::{BoxFuture, Middleware, Next};

/// Redirects requests that reached the proxy over plain HTTP.
///
/// TLS ends at the reverse proxy, so the original scheme is read from
/// `x-forwarded-proto`. Requests without that header are served as-is. The
/// redirect is a `307` so clients repeat the method and body.
pub struct HttpsRedirect;

impl HttpsRedirect {
    fn location(req: &Request) -> Option<String> {
        let proto = req.header("x-forwarded-proto")?;
        if !proto.trim().eq_ignore_ascii_case("http") {
            return None;
        }
        let host = req.header("x-forwarded-host").or_else(|| req.header("host"))?;
        let mut location = format!("https://{host}{}", req.path());
        if let Some(query) = req.query() {
            location.push('?');
            location.push_str(query);
        }
        Some(location)
    }
}

impl Middleware for HttpsRedirect {
    fn handle(&self, req: Request, next: Next) -> BoxFuture {
        match Self::location(&req) {
            Some(location) => {
                debug!(path = req.path(), %location, "redirecting to https");
                let res = Response::builder()
                    .status(Status::TemporaryRedirect)
                    .header("location", &location)
                    .no_body();
                Box::pin(async move { res })
            }
            None => next.run(req),
        }
    }
}
