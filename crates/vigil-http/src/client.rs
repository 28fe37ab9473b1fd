//! One-shot HTTP/1.1 requests over hyper.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::header::{CONTENT_TYPE, HOST, USER_AGENT};
use http::{Method, Request, StatusCode, Uri};
use http_body_util::{BodyExt, Full};
use hyper_util::rt::TokioIo;
use rustls::pki_types::ServerName;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::HttpError;
use crate::tls::TlsConfig;

const AGENT: &str = concat!("vigil/", env!("CARGO_PKG_VERSION"));

/// Status and fully collected body of a response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

/// HTTP client shared by the probe and the notifier.
#[derive(Debug, Clone)]
pub struct HttpClient {
    tls: TlsConfig,
    timeout: Duration,
}

impl HttpClient {
    pub fn new(tls: TlsConfig, timeout: Duration) -> Self {
        Self { tls, timeout }
    }

    /// GET `url` and collect the response body.
    pub async fn get(&self, url: &str) -> Result<HttpResponse, HttpError> {
        self.send(Method::GET, url, None, Bytes::new()).await
    }

    /// POST a JSON document to `url`.
    pub async fn post_json(&self, url: &str, body: Vec<u8>) -> Result<HttpResponse, HttpError> {
        self.send(
            Method::POST,
            url,
            Some("application/json"),
            Bytes::from(body),
        )
        .await
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        content_type: Option<&str>,
        body: Bytes,
    ) -> Result<HttpResponse, HttpError> {
        let endpoint = Endpoint::parse(url)?;

        let mut builder = Request::builder()
            .method(method)
            .uri(endpoint.path.as_str())
            .header(HOST, endpoint.authority.as_str())
            .header(USER_AGENT, AGENT);
        if let Some(content_type) = content_type {
            builder = builder.header(CONTENT_TYPE, content_type);
        }
        let request = builder.body(Full::new(body))?;

        match tokio::time::timeout(self.timeout, self.dispatch(&endpoint, request)).await {
            Ok(result) => result,
            Err(_) => {
                debug!(%url, timeout = ?self.timeout, "http request timed out");
                Err(HttpError::Timeout(self.timeout))
            }
        }
    }

    async fn dispatch(
        &self,
        endpoint: &Endpoint,
        request: Request<Full<Bytes>>,
    ) -> Result<HttpResponse, HttpError> {
        let addr = format!("{}:{}", endpoint.host, endpoint.port);
        let stream = TcpStream::connect((endpoint.host.as_str(), endpoint.port))
            .await
            .map_err(|source| HttpError::Connect {
                addr: addr.clone(),
                source,
            })?;
        let _ = stream.set_nodelay(true);

        debug!(%addr, tls = endpoint.https, "http connection established");

        if !endpoint.https {
            return exchange(stream, request).await;
        }

        let server_name = ServerName::try_from(endpoint.host.clone())
            .map_err(|e| HttpError::Tls(format!("invalid server name '{}': {e}", endpoint.host)))?;
        let connector = tokio_rustls::TlsConnector::from(Arc::clone(&self.tls.client_config));
        let stream = connector
            .connect(server_name, stream)
            .await
            .map_err(|e| HttpError::Tls(format!("handshake with {addr}: {e}")))?;

        exchange(stream, request).await
    }
}

/// Send one request on an established stream and collect the response.
async fn exchange<S>(stream: S, request: Request<Full<Bytes>>) -> Result<HttpResponse, HttpError>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let (mut sender, conn) = hyper::client::conn::http1::handshake(TokioIo::new(stream)).await?;

    // Drive the connection in the background; aborted when we return.
    let _conn = AbortOnDrop(tokio::spawn(async move {
        if let Err(e) = conn.await {
            debug!(error = %e, "http connection closed with error");
        }
    }));

    let response = sender.send_request(request).await?;
    let status = response.status();
    let body = response.into_body().collect().await?.to_bytes();

    debug!(%status, bytes = body.len(), "http response received");
    Ok(HttpResponse { status, body })
}

struct AbortOnDrop(JoinHandle<()>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Connection details extracted from an absolute URL.
#[derive(Debug, PartialEq, Eq)]
struct Endpoint {
    https: bool,
    /// Host without IPv6 brackets, used to connect and for SNI.
    host: String,
    port: u16,
    /// `host[:port]` as written, for the `Host` header.
    authority: String,
    /// Path and query, the request target.
    path: String,
}

impl Endpoint {
    fn parse(url: &str) -> Result<Self, HttpError> {
        let invalid = |reason: &str| HttpError::InvalidUrl {
            url: url.to_string(),
            reason: reason.to_string(),
        };

        let uri: Uri = url.parse().map_err(|e: http::uri::InvalidUri| invalid(&e.to_string()))?;
        let https = match uri.scheme_str() {
            Some("https") => true,
            Some("http") => false,
            Some(_) => return Err(invalid("unsupported scheme")),
            None => return Err(invalid("missing scheme")),
        };
        let authority = uri.authority().ok_or_else(|| invalid("missing host"))?;
        let host = authority
            .host()
            .trim_start_matches('[')
            .trim_end_matches(']')
            .to_string();
        if host.is_empty() {
            return Err(invalid("missing host"));
        }
        let port = authority.port_u16().unwrap_or(if https { 443 } else { 80 });
        let path = uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .filter(|pq| !pq.is_empty())
            .unwrap_or("/")
            .to_string();

        Ok(Self {
            https,
            host,
            port,
            authority: authority.as_str().to_string(),
            path,
        })
    }
}
