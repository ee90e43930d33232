//! Shared-secret gate for a path prefix.

use tracing::warn;

use crate::request::Request;
use crate::response::Response;
use crate::status::Status;

use super::{BoxFuture, Middleware, Next};

/// Requires `Authorization` to equal a fixed token for every path under
/// `prefix`.
///
/// The prefix matches whole segments, case-insensitively: with `/users`,
/// `/users` and `/Users/7` are protected, `/usersettings` is not. A missing
/// or different header is answered with `401 Unauthorized` and the inner
/// stages never run.
///
/// The token is compared as an opaque string. This is not a credential
/// scheme, only a shared secret.
pub struct TokenAuth {
    prefix: String,
    token: String,
}

impl TokenAuth {
    pub fn new(prefix: impl Into<String>, token: impl Into<String>) -> Self {
        Self { prefix: prefix.into(), token: token.into() }
    }

    fn protects(&self, path: &str) -> bool {
        let prefix = self.prefix.trim_end_matches('/');
        match path.get(..prefix.len()) {
            Some(head) if head.eq_ignore_ascii_case(prefix) => {
                let rest = &path[prefix.len()..];
                rest.is_empty() || rest.starts_with('/')
            }
            _ => false,
        }
    }
}

impl Middleware for TokenAuth {
    fn handle(&self, req: Request, next: Next) -> BoxFuture {
        if self.protects(req.path()) && req.header("authorization") != Some(self.token.as_str()) {
            warn!(method = %req.method(), path = req.path(), "rejected: missing or wrong token");
            return Box::pin(async {
                Response::builder().status(Status::Unauthorized).text("Unauthorized")
            });
        }
        next.run(req)
    }
}
