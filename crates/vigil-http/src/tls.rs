//! TLS client configuration.

use std::sync::Arc;

use crate::error::HttpError;

/// Configuration for TLS connections.
#[derive(Clone)]
pub struct TlsConfig {
    /// Pre-built `rustls` client configuration.
    pub client_config: Arc<rustls::ClientConfig>,
    insecure: bool,
}

impl std::fmt::Debug for TlsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsConfig")
            .field("insecure", &self.insecure)
            .finish_non_exhaustive()
    }
}

impl TlsConfig {
    /// Verify servers against the Mozilla root certificate store.
    pub fn with_system_roots() -> Result<Self, HttpError> {
        let mut root_store = rustls::RootCertStore::empty();
        root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

        let config = rustls::ClientConfig::builder_with_provider(
            rustls::crypto::ring::default_provider().into(),
        )
        .with_safe_default_protocol_versions()
        .map_err(|e| HttpError::Tls(format!("protocol version error: {e}")))?
        .with_root_certificates(root_store)
        .with_no_client_auth();

        Ok(Self {
            client_config: Arc::new(config),
            insecure: false,
        })
    }

    /// Skip certificate chain and host name validation.
    ///
    /// For health endpoints behind self-signed or internal certificates. The
    /// peer is not authenticated.
    pub fn insecure() -> Result<Self, HttpError> {
        let config = rustls::ClientConfig::builder_with_provider(
            rustls::crypto::ring::default_provider().into(),
        )
        .with_safe_default_protocol_versions()
        .map_err(|e| HttpError::Tls(format!("protocol version error: {e}")))?
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(trust_all::AcceptAnyServerCert::new()))
        .with_no_client_auth();

        Ok(Self {
            client_config: Arc::new(config),
            insecure: true,
        })
    }

    /// Pick [`insecure`](Self::insecure) or
    /// [`with_system_roots`](Self::with_system_roots).
    pub fn from_settings(insecure: bool) -> Result<Self, HttpError> {
        if insecure {
            Self::insecure()
        } else {
            Self::with_system_roots()
        }
    }

    pub fn is_insecure(&self) -> bool {
        self.insecure
    }
}

// ── Unverified server certificates ──────────────────────────────────

/// Verifier behind `tls.insecure`: any certificate chain is accepted for any
/// host name, but handshake signatures are still checked against the
/// presented certificate.
mod trust_all {
    use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
    use rustls::crypto::{WebPkiSupportedAlgorithms, verify_tls12_signature, verify_tls13_signature};
    use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
    use rustls::{DigitallySignedStruct, Error, SignatureScheme};

    #[derive(Debug)]
    pub struct AcceptAnyServerCert {
        algorithms: WebPkiSupportedAlgorithms,
    }

    impl AcceptAnyServerCert {
        pub fn new() -> Self {
            Self {
                algorithms: rustls::crypto::ring::default_provider()
                    .signature_verification_algorithms,
            }
        }
    }

    impl ServerCertVerifier for AcceptAnyServerCert {
        fn verify_server_cert(
            &self,
            _end_entity: &CertificateDer<'_>,
            _intermediates: &[CertificateDer<'_>],
            _server_name: &ServerName<'_>,
            _ocsp_response: &[u8],
            _now: UnixTime,
        ) -> Result<ServerCertVerified, Error> {
            Ok(ServerCertVerified::assertion())
        }

        fn verify_tls12_signature(
            &self,
            message: &[u8],
            cert: &CertificateDer<'_>,
            dss: &DigitallySignedStruct,
        ) -> Result<HandshakeSignatureValid, Error> {
            verify_tls12_signature(message, cert, dss, &self.algorithms)
        }

        fn verify_tls13_signature(
            &self,
            message: &[u8],
            cert: &CertificateDer<'_>,
            dss: &DigitallySignedStruct,
        ) -> Result<HandshakeSignatureValid, Error> {
            verify_tls13_signature(message, cert, dss, &self.algorithms)
        }

        fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
            self.algorithms.supported_schemes()
        }
    }
}
