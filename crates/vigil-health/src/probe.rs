//! Health probe: fetch one target's status document.

use std::future::Future;

use thiserror::Error;
use tracing::debug;
use vigil_http::HttpClient;

/// Why a target's document could not be obtained.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The request never produced a response (DNS, connect, TLS, timeout).
    #[error("{0}")]
    Connection(String),

    /// A response arrived but its body is not JSON.
    #[error("invalid JSON response: {0}")]
    Parse(String),
}

/// Fetches a target's health document.
pub trait HealthProbe: Send + Sync {
    fn fetch(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<serde_json::Value, ProbeError>> + Send;
}

/// Probe issuing a plain GET over [`HttpClient`].
///
/// The response status is not interpreted: endpoints commonly answer 503
/// together with a valid status document, which the evaluator then reads.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: HttpClient,
}

impl HttpProbe {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }
}

impl HealthProbe for HttpProbe {
    async fn fetch(&self, url: &str) -> Result<serde_json::Value, ProbeError> {
        let response = self.client.get(url).await.map_err(|e| {
            debug!(error = %e, %url, "health probe request failed");
            ProbeError::Connection(e.to_string())
        })?;

        if !response.status.is_success() {
            debug!(status = %response.status, %url, "health probe non-2xx");
        }

        serde_json::from_slice(&response.body).map_err(|e| {
            debug!(error = %e, %url, bytes = response.body.len(), "health probe body is not JSON");
            ProbeError::Parse(e.to_string())
        })
    }
}
