//! vigil-http — minimal HTTP/1.1 client used by the health probe and the
//! webhook notifier.
//!
//! Every request opens a fresh connection (plain TCP or rustls), sends one
//! request, collects the full response body and closes. There is no pooling
//! and no retry; the whole exchange runs under a single timeout.

pub mod client;
pub mod error;
pub mod tls;

pub use client::{HttpClient, HttpResponse};
pub use error::HttpError;
pub use tls::TlsConfig;
