//! HTTP server and graceful shutdown.
//!
//! On SIGTERM or Ctrl-C the server stops accepting, lets every in-flight
//! connection finish, then returns from [`Server::serve`].

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;

use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Incoming};
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::config::DEFAULT_MAX_BODY_BYTES;
use crate::error::Error;
use crate::method::Method;
use crate::middleware::App;
use crate::request::Request;
use crate::response::Response;
use crate::status::Status;

/// The HTTP server.
pub struct Server {
    addr: SocketAddr,
    body_limit: usize,
}

impl Server {
    /// Configures the server to bind to `addr` when [`serve`](Server::serve)
    /// is called.
    pub fn bind(addr: SocketAddr) -> Self {
        Self { addr, body_limit: DEFAULT_MAX_BODY_BYTES }
    }

    /// Largest request body read before answering `413 Content Too Large`.
    pub fn body_limit(mut self, bytes: usize) -> Self {
        self.body_limit = bytes;
        self
    }

    /// Starts accepting connections and running each request through `app`.
    ///
    /// Returns only after a full graceful shutdown (SIGTERM or Ctrl-C,
    /// followed by all in-flight requests completing).
    pub async fn serve(self, app: impl Into<App>) -> Result<(), Error> {
        self.serve_until(app, shutdown_signal()).await
    }

    /// Like [`serve`](Server::serve), but stops when `shutdown` resolves.
    pub async fn serve_until(
        self,
        app: impl Into<App>,
        shutdown: impl Future<Output = ()>,
    ) -> Result<(), Error> {
        let listener = TcpListener::bind(self.addr)
            .await
            .map_err(|source| Error::Bind { addr: self.addr, source })?;
        let app: App = app.into();
        let body_limit = self.body_limit;

        info!(addr = %self.addr, "roster listening");

        let mut tasks = tokio::task::JoinSet::new();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                // Shutdown is checked first so a signal stops accepting even
                // when more connections are queued.
                biased;

                () = &mut shutdown => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, peer) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let app = app.clone();
                    let io = TokioIo::new(stream);

                    tasks.spawn(async move {
                        // Called once per request on the connection.
                        let svc = service_fn(move |req| {
                            let app = app.clone();
                            async move { dispatch(app, req, peer, body_limit).await }
                        });

                        if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                            .serve_connection(io, svc)
                            .await
                        {
                            error!(%peer, "connection error: {e}");
                        }
                    });
                }

                // Reap finished connection tasks so the set stays small.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        while tasks.join_next().await.is_some() {}

        info!("roster stopped");
        Ok(())
    }
}

/// Buffers one request, runs it through the pipeline, converts the result.
///
/// Every failure is answered with a status code, so hyper never sees an error.
async fn dispatch(
    app: App,
    req: hyper::Request<Incoming>,
    peer: SocketAddr,
    body_limit: usize,
) -> Result<http::Response<Full<Bytes>>, Infallible> {
    let (parts, body) = req.into_parts();

    let method = match Method::try_from(&parts.method) {
        Ok(m) => m,
        Err(e) => {
            warn!(%peer, path = parts.uri.path(), "{e}");
            return Ok(Response::status(Status::MethodNotAllowed).into_inner());
        }
    };

    let body = match read_body(body, body_limit).await {
        Ok(body) => body,
        Err(res) => {
            warn!(%peer, path = parts.uri.path(), status = res.status_code(), "request body rejected");
            return Ok(res.into_inner());
        }
    };

    let response = app.call(Request::from_parts(parts, method, body)).await;
    Ok(response.into_inner())
}

/// Buffers a request body of at most `limit` bytes.
///
/// Too large is a 413, anything else that stops the read is a 400.
async fn read_body<B>(body: B, limit: usize) -> Result<Bytes, Response>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            Err(Response::status(Status::ContentTooLarge))
        }
        Err(e) => {
            debug!("failed to read request body: {e}");
            Err(Response::status(Status::BadRequest))
        }
    }
}

/// Resolves on SIGTERM or SIGINT (Ctrl-C). Windows only has Ctrl-C.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let sigterm = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn body_within_the_limit_is_read_whole() {
        let body = read_body(Full::new(Bytes::from_static(b"{\"name\":\"Dana\"}")), 64).await.unwrap();
        assert_eq!(&body[..], b"{\"name\":\"Dana\"}");
    }

    #[tokio::test]
    async fn body_past_the_limit_is_413() {
        let res = read_body(Full::new(Bytes::from(vec![b'x'; 65])), 64).await.unwrap_err();
        assert_eq!(res.status_code(), 413);
    }

    #[tokio::test]
    async fn body_exactly_at_the_limit_is_accepted() {
        let body = read_body(Full::new(Bytes::from(vec![b'x'; 64])), 64).await.unwrap();
        assert_eq!(body.len(), 64);
    }
}
