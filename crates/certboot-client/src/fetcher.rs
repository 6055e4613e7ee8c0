//! Single-attempt leaf certificate discovery.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use certboot_core::{Address, BootstrapError, Result, TrustedCertificate};
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{verify_tls12_signature, verify_tls13_signature, CryptoProvider};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, SignatureScheme};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tracing::debug;

/// Default limit on one raw handshake attempt
const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Fetches the leaf certificate a server presents on first contact.
///
/// Implementations make exactly one attempt; retrying is the caller's job.
#[async_trait]
pub trait CertificateFetcher: Send + Sync {
    /// Perform one raw handshake with `address` and return the peer's leaf
    /// certificate.
    ///
    /// Fails with [`BootstrapError::Transport`] when the handshake does not
    /// complete and [`BootstrapError::NoCertificate`] when it completes
    /// without a certificate.
    async fn fetch(&self, address: &Address) -> Result<TrustedCertificate>;
}

/// [`CertificateFetcher`] performing a rustls handshake that accepts any
/// certificate.
#[derive(Clone)]
pub struct RustlsFetcher {
    connector: TlsConnector,
    timeout: Option<Duration>,
}

impl std::fmt::Debug for RustlsFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RustlsFetcher")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl Default for RustlsFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl RustlsFetcher {
    /// Create a fetcher using the ring crypto provider
    #[must_use]
    pub fn new() -> Self {
        Self::with_provider(Arc::new(rustls::crypto::ring::default_provider()))
            .expect("ring provider supports the default protocol versions")
    }

    /// Create a fetcher using a specific crypto provider
    pub fn with_provider(provider: Arc<CryptoProvider>) -> Result<Self> {
        let verifier = Arc::new(AcceptAnyServerCert {
            provider: provider.clone(),
        });
        let config = ClientConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .map_err(|e| BootstrapError::InvalidArgument(format!("crypto provider: {e}")))?
            .dangerous()
            .with_custom_certificate_verifier(verifier)
            .with_no_client_auth();

        Ok(Self {
            connector: TlsConnector::from(Arc::new(config)),
            timeout: Some(DEFAULT_FETCH_TIMEOUT),
        })
    }

    /// Set the per-attempt limit on TCP connect plus handshake
    #[must_use]
    pub const fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    async fn handshake(
        &self,
        address: &Address,
    ) -> io::Result<Option<Vec<CertificateDer<'static>>>> {
        let server_name = ServerName::try_from(address.host().to_owned())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

        let tcp = TcpStream::connect(address.to_string()).await?;
        let tls = self.connector.connect(server_name, tcp).await?;

        let (_, session) = tls.get_ref();
        let chain = session
            .peer_certificates()
            .map(|certs| certs.iter().map(|c| c.clone().into_owned()).collect());
        // The probe connection is never reused
        drop(tls);
        Ok(chain)
    }
}

#[async_trait]
impl CertificateFetcher for RustlsFetcher {
    async fn fetch(&self, address: &Address) -> Result<TrustedCertificate> {
        debug!(address = %address, "probing peer certificate");

        let outcome = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.handshake(address))
                .await
                .unwrap_or_else(|_| {
                    Err(io::Error::new(
                        io::ErrorKind::TimedOut,
                        format!("handshake did not finish within {limit:?}"),
                    ))
                }),
            None => self.handshake(address).await,
        };

        let chain = outcome.map_err(|e| BootstrapError::transport(address.to_string(), e))?;
        leaf_certificate(address, chain.as_deref())
    }
}

/// Pick the leaf out of a presented chain.
pub(crate) fn leaf_certificate(
    address: &Address,
    chain: Option<&[CertificateDer<'static>]>,
) -> Result<TrustedCertificate> {
    chain
        .and_then(<[_]>::first)
        .map(|leaf| TrustedCertificate::from_der(leaf.clone()))
        .ok_or_else(|| BootstrapError::NoCertificate {
            address: address.to_string(),
        })
}

/// Accepts whatever certificate the peer presents.
///
/// Chain and name checks are skipped on purpose; handshake signatures are
/// still verified against the presented certificate, so the peer must hold
/// its private key.
#[derive(Debug)]
struct AcceptAnyServerCert {
    provider: Arc<CryptoProvider>,
}

impl ServerCertVerifier for AcceptAnyServerCert {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> std::result::Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls12_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls13_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}
