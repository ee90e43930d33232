//! Request/response logging.

use std::borrow::Cow;
use std::fmt;

use tracing::info;

use crate::request::Request;

use super::{BoxFuture, Middleware, Next};

/// Logs every request on the way in and its response on the way out.
///
/// Method, path and headers are always logged. Header values outside a
/// fixed allow-list print as `[Redacted]`; `Authorization` is on the list,
/// so rejected tokens can be diagnosed from the log. Bodies are logged only
/// for text and JSON content types and only up to `body_limit` bytes;
/// anything past the limit is cut and marked. The request body is already
/// buffered by the server, so the handler still reads it in full, and the
/// response is passed on untouched.
pub struct RequestLog {
    body_limit: usize,
}

impl RequestLog {
    pub fn new(body_limit: usize) -> Self {
        Self { body_limit }
    }
}

impl Middleware for RequestLog {
    fn handle(&self, req: Request, next: Next) -> BoxFuture {
        let limit = self.body_limit;
        let method = req.method();
        let path = req.path().to_owned();
        let headers = Headers { pairs: req.headers(), shown: REQUEST_HEADERS };

        match loggable_body(req.header("content-type"), req.body(), limit) {
            Some(body) => info!(%method, %path, %headers, %body, "request"),
            None => info!(%method, %path, %headers, "request"),
        }

        let inner = next.run(req);
        Box::pin(async move {
            let res = inner.await;
            let status = res.status_code();
            let headers = Headers { pairs: res.headers(), shown: RESPONSE_HEADERS };
            match loggable_body(res.header("content-type"), res.body(), limit) {
                Some(body) => info!(%method, %path, status, %headers, %body, "response"),
                None => info!(%method, %path, status, %headers, "response"),
            }
            res
        })
    }
}

const REQUEST_HEADERS: &[&str] = &[
    "accept",
    "accept-charset",
    "accept-encoding",
    "accept-language",
    "authorization",
    "cache-control",
    "connection",
    "content-encoding",
    "content-length",
    "content-type",
    "date",
    "expect",
    "host",
    "range",
    "te",
    "transfer-encoding",
    "upgrade",
    "user-agent",
    "x-forwarded-host",
    "x-forwarded-proto",
    "x-requested-with",
];

const RESPONSE_HEADERS: &[&str] = &[
    "allow",
    "content-length",
    "content-type",
    "location",
    "transfer-encoding",
];

/// `name: value` pairs joined by `, `, with values outside `shown` redacted.
struct Headers<'a> {
    pairs: &'a [(String, String)],
    shown: &'static [&'static str],
}

impl fmt::Display for Headers<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.pairs.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            if self.shown.iter().any(|s| s.eq_ignore_ascii_case(name)) {
                write!(f, "{name}: {value}")?;
            } else {
                write!(f, "{name}: [Redacted]")?;
            }
        }
        Ok(())
    }
}

fn is_textual(content_type: &str) -> bool {
    let mime = content_type.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    mime.starts_with("text/") || mime == "application/json" || mime.ends_with("+json")
}

/// The body as it should appear in the log, or `None` when it should not
/// appear at all.
fn loggable_body<'a>(content_type: Option<&str>, body: &'a [u8], limit: usize) -> Option<Cow<'a, str>> {
    if body.is_empty() || !content_type.is_some_and(is_textual) {
        return None;
    }
    if body.len() <= limit {
        return Some(String::from_utf8_lossy(body));
    }
    let mut head = String::from_utf8_lossy(&body[..limit]).into_owned();
    head.push_str(&format!("… [truncated, {} bytes total]", body.len()));
    Some(Cow::Owned(head))
}
