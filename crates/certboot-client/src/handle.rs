//! The result of a successful connect call.

use certboot_core::{Address, BootstrapError, Result, TrustedCertificate};
use tracing::debug;

use crate::transport::{Connection, TlsConnection, TlsTrust};

/// Confirmation returned by [`ConnectionHandle::close`]
const CLOSED: &str = "connection closed";

/// A live authenticated connection and the record of how it was built.
///
/// The address, certificate and trust configuration never change. The
/// connection itself is released exactly once by [`close`](Self::close);
/// afterwards every accessor fails with [`BootstrapError::NotConnected`].
/// Dropping the handle does not send a TLS `close_notify`.
#[derive(Debug)]
pub struct ConnectionHandle<C = TlsConnection, S = TlsTrust> {
    connection: Option<C>,
    address: Address,
    certificate: TrustedCertificate,
    trust: S,
}

impl<C: Connection, S> ConnectionHandle<C, S> {
    pub(crate) const fn new(
        connection: C,
        address: Address,
        certificate: TrustedCertificate,
        trust: S,
    ) -> Self {
        Self {
            connection: Some(connection),
            address,
            certificate,
            trust,
        }
    }

    /// Non-blocking liveness check; false once the handle is closed or the
    /// peer has shut the connection down
    pub fn is_alive(&mut self) -> bool {
        self.connection.as_mut().is_some_and(C::is_alive)
    }

    /// Close the connection.
    ///
    /// The connection is released even when closing reports an error, so a
    /// second call always fails with [`BootstrapError::NotConnected`].
    pub async fn close(&mut self) -> Result<&'static str> {
        let mut connection = self.connection.take().ok_or(BootstrapError::NotConnected)?;
        connection.close().await.map_err(BootstrapError::Close)?;
        debug!(address = %self.address, "connection closed");
        Ok(CLOSED)
    }

    /// The live connection
    pub fn connection(&self) -> Result<&C> {
        self.connection.as_ref().ok_or(BootstrapError::NotConnected)
    }

    /// The live connection, mutably
    pub fn connection_mut(&mut self) -> Result<&mut C> {
        self.connection.as_mut().ok_or(BootstrapError::NotConnected)
    }

    /// Target the connection was dialed to
    pub const fn address(&self) -> &Address {
        &self.address
    }

    /// Certificate the connection trusts
    pub const fn certificate(&self) -> &TrustedCertificate {
        &self.certificate
    }

    /// Trust configuration used for the dial
    pub const fn trust_config(&self) -> &S {
        &self.trust
    }
}
