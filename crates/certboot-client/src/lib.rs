//! Retrying certificate bootstrap and authenticated TLS dial.
//!
//! This crate provides the [`BootstrapClient`], which discovers a server's
//! leaf certificate over a trust-nothing handshake, retries while the server
//! is not yet listening, and then dials the server again trusting exactly
//! that certificate. The result is a [`ConnectionHandle`].

#![doc(html_root_url = "https://docs.rs/certboot-client/0.1.0")]

mod client;
mod config;
mod context;
mod fetcher;
mod handle;
mod observer;
mod transport;

pub use client::{BootstrapClient, BootstrapClientBuilder};
pub use config::*;
pub use context::{CancelHandle, Context};
pub use fetcher::{CertificateFetcher, RustlsFetcher};
pub use handle::ConnectionHandle;
pub use observer::{BootstrapObserver, ConnectState, TracingObserver};
pub use transport::{Connection, RustlsTransport, TlsConnection, TlsTrust, Transport};
pub use certboot_core::{Address, BootstrapError, Phase, Result, TrustedCertificate};
