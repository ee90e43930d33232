//! Runtime configuration.
//!
//! Every setting is a command-line flag that can also come from the
//! environment, so the same binary runs unchanged under a process manager or
//! in a container.

use std::net::{Ipv4Addr, SocketAddr};

use clap::Parser;

/// The shared secret `/users` requests must present in `Authorization`.
pub const DEFAULT_TOKEN: &str = "Bearer mysecrettoken";

/// Largest request body the server reads before answering 413.
pub const DEFAULT_MAX_BODY_BYTES: usize = 30_000_000;

/// Bytes of each request or response body written to the log.
pub const DEFAULT_BODY_LOG_LIMIT: usize = 4096;

#[derive(Clone, Debug, Parser)]
#[command(name = "roster", version, about = "In-memory user directory over HTTP")]
pub struct Config {
    /// Address to listen on.
    #[arg(long, env = "ROSTER_ADDR", default_value = "0.0.0.0:3000")]
    pub addr: SocketAddr,

    /// Exact `Authorization` header value required for /users.
    #[arg(long, env = "ROSTER_TOKEN", default_value = DEFAULT_TOKEN, hide_env_values = true)]
    pub token: String,

    /// Largest request body accepted, in bytes.
    #[arg(long, env = "ROSTER_MAX_BODY_BYTES", default_value_t = DEFAULT_MAX_BODY_BYTES)]
    pub max_body_bytes: usize,

    /// Maximum body bytes logged per request and per response.
    #[arg(long, env = "ROSTER_BODY_LOG_LIMIT", default_value_t = DEFAULT_BODY_LOG_LIMIT)]
    pub body_log_limit: usize,

    /// Redirect requests forwarded as plain http to https.
    #[arg(long, env = "ROSTER_HTTPS_REDIRECT")]
    pub https_redirect: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 3000)),
            token: DEFAULT_TOKEN.to_owned(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            body_log_limit: DEFAULT_BODY_LOG_LIMIT,
            https_redirect: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let config = Config::try_parse_from([
            "roster",
            "--addr", "127.0.0.1:8080",
            "--token", "Bearer other",
            "--body-log-limit", "128",
            "--max-body-bytes", "1024",
            "--https-redirect",
        ])
        .unwrap();
        assert_eq!(config.addr, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.token, "Bearer other");
        assert_eq!(config.body_log_limit, 128);
        assert_eq!(config.max_body_bytes, 1024);
        assert!(config.https_redirect);
    }

    #[test]
    fn defaults_match_the_documented_values() {
        let config = Config::try_parse_from(["roster"]).unwrap();
        assert_eq!(config.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
        assert_eq!(config.body_log_limit, DEFAULT_BODY_LOG_LIMIT);
        assert_eq!(config.token, DEFAULT_TOKEN);
    }

    #[test]
    fn rejects_bad_address() {
        assert!(Config::try_parse_from(["roster", "--addr", "not-an-addr"]).is_err());
    }
}
