//! Transport errors.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("tls: {0}")]
    Tls(String),

    #[error("http: {0}")]
    Http(#[from] hyper::Error),

    #[error("request build: {0}")]
    Request(#[from] http::Error),

    #[error("timed out after {0:?}")]
    Timeout(Duration),
}
