//! Authenticated dial against a bootstrapped trust store.

use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context as TaskContext, Poll};

use async_trait::async_trait;
use certboot_core::{Address, BootstrapError, Result, TrustedCertificate};
use rustls::crypto::CryptoProvider;
use rustls::pki_types::ServerName;
use rustls::{ClientConfig, RootCertStore};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, ReadBuf};
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;
use tokio_rustls::TlsConnector;
use tracing::debug;

use crate::config::DialOptions;

/// A live authenticated connection.
#[async_trait]
pub trait Connection: Send {
    /// Report liveness without blocking.
    ///
    /// May take pending bytes off the wire, but must keep any application
    /// data available to later reads.
    fn is_alive(&mut self) -> bool;

    /// Shut the connection down
    async fn close(&mut self) -> io::Result<()>;
}

/// Builds trust configurations and dials with them.
///
/// The client only ever reaches the network through this trait and
/// [`CertificateFetcher`](crate::CertificateFetcher).
#[async_trait]
pub trait Transport: Send + Sync {
    /// Trust configuration derived from a single certificate
    type Trust: Clone + fmt::Debug + Send + Sync;

    /// Connection produced by a successful dial
    type Connection: Connection;

    /// Build a trust configuration whose only root is `certificate`
    fn build_trust(&self, certificate: &TrustedCertificate) -> Result<Self::Trust>;

    /// Dial `address`, validating the peer against `trust`
    async fn dial(
        &self,
        address: &Address,
        trust: &Self::Trust,
        options: &DialOptions,
    ) -> io::Result<Self::Connection>;
}

/// A rustls root store holding exactly one bootstrapped certificate.
#[derive(Clone)]
pub struct TlsTrust {
    roots: Arc<RootCertStore>,
    fingerprint: String,
}

impl TlsTrust {
    /// The root store handed to rustls
    #[must_use]
    pub fn roots(&self) -> &RootCertStore {
        &self.roots
    }

    /// Fingerprint of the trusted certificate
    #[must_use]
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

impl fmt::Debug for TlsTrust {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TlsTrust")
            .field("anchors", &self.roots.len())
            .field("fingerprint", &self.fingerprint)
            .finish()
    }
}

/// [`Transport`] dialing TLS over TCP with rustls.
#[derive(Clone)]
pub struct RustlsTransport {
    provider: Arc<CryptoProvider>,
}

impl fmt::Debug for RustlsTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RustlsTransport").finish_non_exhaustive()
    }
}

impl Default for RustlsTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl RustlsTransport {
    /// Create a transport using the ring crypto provider
    #[must_use]
    pub fn new() -> Self {
        Self::with_provider(Arc::new(rustls::crypto::ring::default_provider()))
    }

    /// Create a transport using a specific crypto provider
    #[must_use]
    pub const fn with_provider(provider: Arc<CryptoProvider>) -> Self {
        Self { provider }
    }

    fn client_config(&self, trust: &TlsTrust, options: &DialOptions) -> io::Result<ClientConfig> {
        let mut config = ClientConfig::builder_with_provider(self.provider.clone())
            .with_safe_default_protocol_versions()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?
            .with_root_certificates(trust.roots.clone())
            .with_no_client_auth();
        config.alpn_protocols.clone_from(&options.alpn_protocols);
        Ok(config)
    }
}

#[async_trait]
impl Transport for RustlsTransport {
    type Trust = TlsTrust;
    type Connection = TlsConnection;

    fn build_trust(&self, certificate: &TrustedCertificate) -> Result<TlsTrust> {
        let mut roots = RootCertStore::empty();
        roots
            .add(certificate.der().clone())
            .map_err(|e| BootstrapError::InvalidCertificate(e.to_string()))?;

        Ok(TlsTrust {
            roots: Arc::new(roots),
            fingerprint: certificate.fingerprint(),
        })
    }

    async fn dial(
        &self,
        address: &Address,
        trust: &TlsTrust,
        options: &DialOptions,
    ) -> io::Result<TlsConnection> {
        let config = self.client_config(trust, options)?;
        let name = options.server_name.as_deref().unwrap_or_else(|| address.host());
        let server_name = ServerName::try_from(name.to_owned())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

        let connect = async {
            let tcp = TcpStream::connect(address.to_string()).await?;
            tcp.set_nodelay(options.nodelay)?;
            TlsConnector::from(Arc::new(config))
                .connect(server_name, tcp)
                .await
        };

        let stream = match options.connect_timeout {
            Some(limit) => tokio::time::timeout(limit, connect)
                .await
                .map_err(|_| {
                    io::Error::new(
                        io::ErrorKind::TimedOut,
                        format!("dial did not finish within {limit:?}"),
                    )
                })??,
            None => connect.await?,
        };

        debug!(
            address = %address,
            server_name = name,
            alpn = ?stream.get_ref().1.alpn_protocol(),
            "authenticated TLS session established"
        );

        Ok(TlsConnection { stream })
    }
}

/// TLS-over-TCP connection validated against a [`TlsTrust`].
///
/// Reads and writes go through the TLS session.
pub struct TlsConnection {
    stream: TlsStream<TcpStream>,
}

impl TlsConnection {
    /// The underlying TLS stream
    #[must_use]
    pub const fn get_ref(&self) -> &TlsStream<TcpStream> {
        &self.stream
    }

    /// The underlying TLS stream, mutably
    pub fn get_mut(&mut self) -> &mut TlsStream<TcpStream> {
        &mut self.stream
    }

    /// Protocol agreed through ALPN, if any
    #[must_use]
    pub fn alpn_protocol(&self) -> Option<&[u8]> {
        self.stream.get_ref().1.alpn_protocol()
    }

    /// Remote socket address
    pub fn peer_addr(&self) -> io::Result<SocketAddr> {
        self.stream.get_ref().0.peer_addr()
    }

    /// Give up the wrapper and keep the stream
    #[must_use]
    pub fn into_inner(self) -> TlsStream<TcpStream> {
        self.stream
    }
}

impl fmt::Debug for TlsConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TlsConnection")
            .field("peer", &self.peer_addr().ok())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Connection for TlsConnection {
    fn is_alive(&mut self) -> bool {
        let (tcp, session) = self.stream.get_mut();

        // Feed whatever records are already queued into the session so a
        // close_notify behind session tickets is seen. Decrypted application
        // data stays buffered in the session for the next read.
        while session.wants_read() {
            match session.read_tls(&mut NonBlockingReader(tcp)) {
                Ok(0) => return false,
                Ok(_) => match session.process_new_packets() {
                    Ok(state) if state.peer_has_closed() => return false,
                    Ok(_) => {}
                    Err(_) => return false,
                },
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(_) => return false,
            }
        }
        true
    }

    async fn close(&mut self) -> io::Result<()> {
        self.stream.shutdown().await
    }
}

/// `std::io::Read` over a tokio socket that never waits for readiness
struct NonBlockingReader<'a>(&'a TcpStream);

impl io::Read for NonBlockingReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.try_read(buf)
    }
}

impl AsyncRead for TlsConnection {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut TaskContext<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.stream).poll_read(cx, buf)
    }
}

impl AsyncWrite for TlsConnection {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut TaskContext<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.stream).poll_write(cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.stream).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.stream).poll_shutdown(cx)
    }
}
