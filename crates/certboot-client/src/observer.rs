//! Progress reporting for connect calls.

use std::fmt;

use certboot_core::{Address, BootstrapError, TrustedCertificate};
use tracing::{debug, info, warn};

/// States of a single connect call.
///
/// `Connected`, `CertificateFetchFailed`, `DialFailed` and `Cancelled` are
/// terminal; nothing returns to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectState {
    /// Nothing has happened yet
    Idle,
    /// Retry loop running
    FetchingCertificate,
    /// A certificate was captured
    CertificateFetched,
    /// The retry loop gave up
    CertificateFetchFailed,
    /// Authenticated dial in progress
    Dialing,
    /// Handle returned to the caller
    Connected,
    /// Authenticated dial failed
    DialFailed,
    /// The caller's context ended the call
    Cancelled,
}

impl ConnectState {
    /// Returns true if no further transition follows
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Connected | Self::CertificateFetchFailed | Self::DialFailed | Self::Cancelled
        )
    }
}

impl fmt::Display for ConnectState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::FetchingCertificate => "fetching-certificate",
            Self::CertificateFetched => "certificate-fetched",
            Self::CertificateFetchFailed => "certificate-fetch-failed",
            Self::Dialing => "dialing",
            Self::Connected => "connected",
            Self::DialFailed => "dial-failed",
            Self::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Receives progress events from [`BootstrapClient`](crate::BootstrapClient).
///
/// Every method defaults to doing nothing.
pub trait BootstrapObserver: Send + Sync {
    /// The connect call for `address` entered `state`
    fn on_state(&self, address: &Address, state: ConnectState) {
        let _ = (address, state);
    }

    /// Fetch attempt `attempt` of `max_attempts` failed and was absorbed or
    /// ended the loop
    fn on_fetch_failed(
        &self,
        address: &Address,
        attempt: u32,
        max_attempts: u32,
        error: &BootstrapError,
    ) {
        let _ = (address, attempt, max_attempts, error);
    }

    /// Fetch attempt `attempt` captured `certificate`
    fn on_certificate(&self, address: &Address, attempt: u32, certificate: &TrustedCertificate) {
        let _ = (address, attempt, certificate);
    }
}

/// Observer that writes events to `tracing`. Used by default.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl BootstrapObserver for TracingObserver {
    fn on_state(&self, address: &Address, state: ConnectState) {
        debug!(address = %address, state = %state, "connect state changed");
    }

    fn on_fetch_failed(
        &self,
        address: &Address,
        attempt: u32,
        max_attempts: u32,
        error: &BootstrapError,
    ) {
        warn!(
            address = %address,
            attempt,
            max_attempts,
            error = %error,
            "error fetching certificate"
        );
    }

    fn on_certificate(&self, address: &Address, attempt: u32, certificate: &TrustedCertificate) {
        info!(
            address = %address,
            attempt,
            fingerprint = %certificate.fingerprint(),
            "fetched peer certificate"
        );
    }
}
