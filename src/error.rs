//! Unified error type.

use thiserror::Error;

/// The error type returned by roster's fallible server operations.
///
/// Application-level outcomes (400, 404, 401) are expressed as HTTP
/// [`Response`](crate::Response) values, not as `Error`s, and unexpected
/// handler failures travel as [`anyhow::Error`] until the
/// [`Recover`](crate::middleware::Recover) stage turns them into a 500.
/// This type surfaces infrastructure failures, such as binding to a port.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },
}
