use std::io;
use thiserror::Error;

/// Result type alias for bootstrap operations
pub type Result<T> = std::result::Result<T, BootstrapError>;

/// The stage of a connect call an error belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Argument and policy validation, before any I/O
    Validation,
    /// Raw handshake and certificate retry loop
    CertificateFetch,
    /// Trust store construction and authenticated dial
    Dial,
    /// Operations on an established connection handle
    Handle,
    /// The caller's context was cancelled or expired
    Context,
}

/// Errors that can occur while bootstrapping a trusted connection
#[derive(Error, Debug)]
pub enum BootstrapError {
    /// Empty host or port, or an unusable retry policy
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A single raw handshake attempt failed
    #[error("TLS handshake with {address} failed: {source}")]
    Transport {
        /// Target address of the attempt
        address: String,
        /// Underlying I/O or TLS error
        #[source]
        source: io::Error,
    },

    /// The peer finished the handshake but presented no certificate
    #[error("{address} completed the handshake without presenting a certificate")]
    NoCertificate {
        /// Target address of the attempt
        address: String,
    },

    /// Every allowed fetch attempt failed
    #[error("failed to fetch certificate after {attempts} attempts: {last}")]
    FetchExhausted {
        /// Number of attempts performed
        attempts: u32,
        /// Error observed on the final attempt
        #[source]
        last: Box<BootstrapError>,
    },

    /// The fetched certificate could not be turned into a trust anchor
    #[error("invalid certificate: {0}")]
    InvalidCertificate(String),

    /// The authenticated dial failed
    #[error("failed to dial {address}: {source}")]
    Dial {
        /// Target address of the dial
        address: String,
        /// Underlying I/O or TLS error
        #[source]
        source: io::Error,
    },

    /// The handle no longer holds a live connection
    #[error("connection is not established")]
    NotConnected,

    /// Closing the underlying connection reported an error
    #[error("error while closing connection: {0}")]
    Close(#[source] io::Error),

    /// The caller cancelled the operation
    #[error("operation cancelled")]
    Cancelled,

    /// The caller's deadline passed
    #[error("deadline exceeded")]
    DeadlineExceeded,
}

impl BootstrapError {
    /// Build a [`BootstrapError::Transport`] for `address`
    pub fn transport(address: impl Into<String>, source: io::Error) -> Self {
        Self::Transport {
            address: address.into(),
            source,
        }
    }

    /// Build a [`BootstrapError::Dial`] for `address`
    pub fn dial(address: impl Into<String>, source: io::Error) -> Self {
        Self::Dial {
            address: address.into(),
            source,
        }
    }

    /// Returns true if a fetch attempt failing with this error may be retried
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::NoCertificate { .. })
    }

    /// Returns true if the caller's context ended the operation
    #[must_use]
    pub const fn is_context_error(&self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded)
    }

    /// The phase of the connect call this error comes from
    #[must_use]
    pub const fn phase(&self) -> Phase {
        match self {
            Self::InvalidArgument(_) => Phase::Validation,
            Self::Transport { .. } | Self::NoCertificate { .. } | Self::FetchExhausted { .. } => {
                Phase::CertificateFetch
            }
            Self::InvalidCertificate(_) | Self::Dial { .. } => Phase::Dial,
            Self::NotConnected | Self::Close(_) => Phase::Handle,
            Self::Cancelled | Self::DeadlineExceeded => Phase::Context,
        }
    }

    /// The final attempt's error when the retry loop gave up
    #[must_use]
    pub fn last_attempt_error(&self) -> Option<&Self> {
        match self {
            Self::FetchExhausted { last, .. } => Some(last.as_ref()),
            _ => None,
        }
    }
}
