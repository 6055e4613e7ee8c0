//! Trust-on-first-use TLS bootstrap for services whose certificate is not
//! known in advance.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use certboot::{BootstrapClient, Context, DialOptions};
//!
//! #[tokio::main]
//! async fn main() -> certboot::Result<()> {
//!     let client = BootstrapClient::new();
//!
//!     // Fetch the leaf certificate, retrying while the server starts up,
//!     // then dial again trusting only that certificate
//!     let mut handle = client
//!         .connect(&Context::background(), "svc.internal", "443", DialOptions::new())
//!         .await?;
//!
//!     println!("Fingerprint: {}", handle.certificate().fingerprint());
//!     println!("Alive: {}", handle.is_alive());
//!
//!     println!("{}", handle.close().await?);
//!     Ok(())
//! }
//! ```
//!
//! The first handshake accepts any certificate, so the bootstrap is only as
//! trustworthy as the network path at that moment.

#![doc(html_root_url = "https://docs.rs/certboot/0.1.0")]

// Re-export core types
pub use certboot_core::*;

// Re-export client
pub use certboot_client::{
    BootstrapClient, BootstrapClientBuilder, BootstrapObserver, CancelHandle, CertificateFetcher,
    ConnectState, Connection, ConnectionHandle, Context, DialOptions, RetryPolicy, RustlsFetcher,
    RustlsTransport, TlsConnection, TlsTrust, TracingObserver, Transport, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_RETRY_INTERVAL,
};

// Re-export runtime for convenience
pub use tokio;
