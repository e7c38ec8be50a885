//! TLS transport over tokio + rustls.
//!
//! OMP managers listen on plain TLS (default port 9390) and almost always
//! present a self-signed certificate generated at install time, so the
//! default [`TlsOptions`] accept any server certificate. Supply a PEM CA
//! bundle to turn verification on.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{CryptoProvider, verify_tls12_signature, verify_tls13_signature};
use rustls::pki_types::pem::PemObject;
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_rustls::TlsConnector;
use tokio_rustls::client::TlsStream;

use crate::{Transport, TransportError};

// ─── TlsOptions ───────────────────────────────────────────────────────────────

/// How the client authenticates the manager's certificate.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TlsOptions {
    /// PEM-encoded CA certificates to trust. When set, the server
    /// certificate is verified against these and `accept_invalid_certs` is
    /// ignored.
    pub ca_pem: Option<Vec<u8>>,
    /// Accept any server certificate when no CA bundle is given.
    pub accept_invalid_certs: bool,
    /// Name to present via SNI and verify against, instead of the host.
    pub server_name: Option<String>,
}

impl Default for TlsOptions {
    fn default() -> Self {
        Self { ca_pem: None, accept_invalid_certs: true, server_name: None }
    }
}

impl TlsOptions {
    /// Verify the server against the given PEM CA bundle.
    pub fn with_ca_pem(pem: impl Into<Vec<u8>>) -> Self {
        Self { ca_pem: Some(pem.into()), accept_invalid_certs: false, server_name: None }
    }

    /// Override the name used for SNI and certificate verification.
    pub fn server_name(mut self, name: impl Into<String>) -> Self {
        self.server_name = Some(name.into()); self
    }

    fn client_config(&self) -> Result<ClientConfig, TransportError> {
        let provider = Arc::new(rustls::crypto::ring::default_provider());
        let builder = ClientConfig::builder_with_provider(provider.clone())
            .with_safe_default_protocol_versions()
            .map_err(|e| TransportError::Tls(format!("protocol versions: {e}")))?;

        if let Some(pem) = &self.ca_pem {
            let mut roots = RootCertStore::empty();
            for cert in CertificateDer::pem_slice_iter(pem) {
                let cert = cert.map_err(|e| TransportError::Tls(format!("bad CA certificate: {e}")))?;
                roots
                    .add(cert)
                    .map_err(|e| TransportError::Tls(format!("cannot trust CA certificate: {e}")))?;
            }
            if roots.is_empty() {
                return Err(TransportError::Tls("CA bundle contains no certificates".into()));
            }
            return Ok(builder.with_root_certificates(roots).with_no_client_auth());
        }

        if !self.accept_invalid_certs {
            return Err(TransportError::Tls(
                "no CA bundle given and certificate checks are enabled".into(),
            ));
        }
        Ok(builder
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(AcceptAnyCert(provider)))
            .with_no_client_auth())
    }
}

/// Skips chain validation but still checks handshake signatures.
#[derive(Debug)]
struct AcceptAnyCert(Arc<CryptoProvider>);

impl ServerCertVerifier for AcceptAnyCert {
    fn verify_server_cert(
        &self,
        _end_entity:    &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name:   &ServerName<'_>,
        _ocsp_response: &[u8],
        _now:           UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert:    &CertificateDer<'_>,
        dss:     &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls12_signature(message, cert, dss, &self.0.signature_verification_algorithms)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert:    &CertificateDer<'_>,
        dss:     &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls13_signature(message, cert, dss, &self.0.signature_verification_algorithms)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.0.signature_verification_algorithms.supported_schemes()
    }
}

// ─── TlsTransport ─────────────────────────────────────────────────────────────

/// A [`Transport`] holding at most one TLS-over-TCP stream.
pub struct TlsTransport {
    connector:       TlsConnector,
    server_name:     Option<String>,
    connect_timeout: Duration,
    stream:          Option<TlsStream<TcpStream>>,
}

impl TlsTransport {
    /// Build an unopened transport. TCP connect and the TLS handshake are
    /// each bounded by `connect_timeout`.
    pub fn new(options: &TlsOptions, connect_timeout: Duration) -> Result<Self, TransportError> {
        let config = options.client_config()?;
        Ok(Self {
            connector: TlsConnector::from(Arc::new(config)),
            server_name: options.server_name.clone(),
            connect_timeout,
            stream: None,
        })
    }
}

impl Transport for TlsTransport {
    async fn open(&mut self, host: &str, port: u16) -> Result<(), TransportError> {
        self.close().await;

        let addr = format!("{host}:{port}");
        log::info!("[omp] Connecting to {addr} …");
        let tcp = match timeout(self.connect_timeout, TcpStream::connect((host, port))).await {
            Ok(Ok(tcp)) => tcp,
            Ok(Err(source)) => return Err(TransportError::Connect { addr, source }),
            Err(_) => {
                let source = io::Error::new(io::ErrorKind::TimedOut, "connect timed out");
                return Err(TransportError::Connect { addr, source });
            }
        };
        if let Err(e) = tcp.set_nodelay(true) {
            log::debug!("[omp] TCP_NODELAY not set: {e}");
        }

        let name = self.server_name.as_deref().unwrap_or(host).to_owned();
        let server_name = ServerName::try_from(name.clone())
            .map_err(|e| TransportError::Tls(format!("invalid server name {name:?}: {e}")))?;

        let stream = match timeout(self.connect_timeout, self.connector.connect(server_name, tcp)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => return Err(TransportError::Tls(format!("handshake with {addr} failed: {e}"))),
            Err(_) => return Err(TransportError::Tls(format!("handshake with {addr} timed out"))),
        };
        log::info!("[omp] TLS session with {addr} established ✓");
        self.stream = Some(stream);
        Ok(())
    }

    async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            match timeout(self.connect_timeout, stream.shutdown()).await {
                Ok(Ok(())) => log::debug!("[omp] connection closed"),
                Ok(Err(e)) => log::debug!("[omp] shutdown failed, dropping stream: {e}"),
                Err(_) => log::debug!("[omp] shutdown timed out, dropping stream"),
            }
        }
    }

    fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    async fn write_all(&mut self, data: &[u8]) -> Result<(), TransportError> {
        let stream = self.stream.as_mut().ok_or(TransportError::NotConnected)?;
        stream.write_all(data).await?;
        stream.flush().await?;
        Ok(())
    }

    async fn read_some(&mut self, max: usize, wait: Duration) -> Result<Vec<u8>, TransportError> {
        let stream = self.stream.as_mut().ok_or(TransportError::NotConnected)?;
        let mut buf = vec![0u8; max];
        match timeout(wait, stream.read(&mut buf)).await {
            Err(_) => Ok(Vec::new()),
            Ok(Ok(0)) => Err(TransportError::Closed),
            Ok(Ok(n)) => {
                buf.truncate(n);
                Ok(buf)
            }
            Ok(Err(e)) if e.kind() == io::ErrorKind::UnexpectedEof => Err(TransportError::Closed),
            Ok(Err(e)) => Err(TransportError::Io(e)),
        }
    }
}
