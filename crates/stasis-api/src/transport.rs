// Shared transport configuration for building reqwest::Client instances.
//
// The HTTP operation client and the description loader share TLS and
// timeout settings through this module. The event WebSocket reuses the
// same `TlsMode` when choosing a connector.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{CryptoProvider, verify_tls12_signature, verify_tls13_signature};
use rustls::{ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme};
use rustls_pki_types::pem::PemObject;
use rustls_pki_types::{CertificateDer, ServerName, UnixTime};
use tokio_tungstenite::Connector;

use crate::error::Error;

const USER_AGENT: &str = concat!("stasis/", env!("CARGO_PKG_VERSION"));

/// TLS verification mode (api-level mirror of core's TlsVerification).
#[derive(Debug, Clone)]
pub enum TlsMode {
    /// Use the system certificate store.
    System,
    /// Use a custom CA certificate from the given PEM file.
    CustomCa(PathBuf),
    /// Accept any certificate (for self-signed lab servers).
    DangerAcceptInvalid,
}

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::System,
            timeout: Duration::from_secs(30),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT);

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                let cert_pem = std::fs::read(path)
                    .map_err(|e| Error::Tls(format!("failed to read CA cert: {e}")))?;
                let cert = reqwest::Certificate::from_pem(&cert_pem)
                    .map_err(|e| Error::Tls(format!("invalid CA cert: {e}")))?;
                builder = builder.add_root_certificate(cert);
            }
            TlsMode::DangerAcceptInvalid => {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }
}

// ── WebSocket TLS ───────────────────────────────────────────────────

impl TlsMode {
    /// Connector for `wss://` event streams. `None` means the default
    /// connector with the bundled web PKI roots.
    ///
    /// A custom CA is the only trust anchor for the event stream.
    pub fn websocket_connector(&self) -> Result<Option<Connector>, Error> {
        let config = match self {
            Self::System => return Ok(None),
            Self::CustomCa(path) => {
                let provider = Arc::new(rustls::crypto::ring::default_provider());
                config_builder(&provider)?
                    .with_root_certificates(custom_roots(path)?)
                    .with_no_client_auth()
            }
            Self::DangerAcceptInvalid => {
                let provider = Arc::new(rustls::crypto::ring::default_provider());
                config_builder(&provider)?
                    .dangerous()
                    .with_custom_certificate_verifier(Arc::new(AcceptAnyCert(Arc::clone(&provider))))
                    .with_no_client_auth()
            }
        };
        Ok(Some(Connector::Rustls(Arc::new(config))))
    }
}

fn config_builder(
    provider: &Arc<CryptoProvider>,
) -> Result<rustls::ConfigBuilder<ClientConfig, rustls::WantsVerifier>, Error> {
    ClientConfig::builder_with_provider(Arc::clone(provider))
        .with_safe_default_protocol_versions()
        .map_err(|e| Error::Tls(format!("failed to configure TLS: {e}")))
}

fn custom_roots(path: &Path) -> Result<RootCertStore, Error> {
    let mut roots = RootCertStore::empty();
    let certs = CertificateDer::pem_file_iter(path)
        .map_err(|e| Error::Tls(format!("failed to read CA cert: {e}")))?;
    for cert in certs {
        let cert = cert.map_err(|e| Error::Tls(format!("invalid CA cert: {e}")))?;
        roots
            .add(cert)
            .map_err(|e| Error::Tls(format!("invalid CA cert: {e}")))?;
    }
    if roots.is_empty() {
        return Err(Error::Tls(format!("no certificates in {}", path.display())));
    }
    Ok(roots)
}

/// Skips chain and name checks; handshake signatures are still verified.
#[derive(Debug)]
struct AcceptAnyCert(Arc<CryptoProvider>);

impl ServerCertVerifier for AcceptAnyCert {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls12_signature(message, cert, dss, &self.0.signature_verification_algorithms)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls13_signature(message, cert, dss, &self.0.signature_verification_algorithms)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.0.signature_verification_algorithms.supported_schemes()
    }
}
