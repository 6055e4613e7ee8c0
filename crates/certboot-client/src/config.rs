//! Client configuration types.

use std::time::Duration;

/// Default number of certificate fetch attempts
pub const DEFAULT_MAX_ATTEMPTS: u32 = 20;

/// Default pause between certificate fetch attempts
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_millis(10);

/// Retry policy for the certificate fetch phase.
///
/// Backoff is flat: every pause between two attempts lasts `interval`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of fetch attempts, including the first one
    pub max_attempts: u32,

    /// Pause between consecutive attempts
    pub interval: Duration,

    /// Whether a peer that presents no certificate is retried
    pub retry_on_missing_certificate: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl RetryPolicy {
    /// Create the default policy: 20 attempts, 10ms apart
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            interval: DEFAULT_RETRY_INTERVAL,
            retry_on_missing_certificate: true,
        }
    }

    /// Set the maximum number of attempts
    #[must_use]
    pub const fn max_attempts(mut self, max: u32) -> Self {
        self.max_attempts = max;
        self
    }

    /// Set the pause between attempts
    #[must_use]
    pub const fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Choose whether a missing peer certificate is retried
    #[must_use]
    pub const fn retry_on_missing_certificate(mut self, retry: bool) -> Self {
        self.retry_on_missing_certificate = retry;
        self
    }

    /// Upper bound on the time spent sleeping if every attempt fails
    #[must_use]
    pub fn worst_case_wait(&self) -> Duration {
        self.interval
            .saturating_mul(self.max_attempts.saturating_sub(1))
    }
}

/// Caller-supplied options for the authenticated dial.
///
/// These never carry transport credentials: trust always comes from the
/// bootstrapped certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialOptions {
    /// Name checked against the certificate instead of the address host
    pub server_name: Option<String>,

    /// Limit on TCP connect plus TLS handshake
    pub connect_timeout: Option<Duration>,

    /// ALPN protocols offered during the handshake
    pub alpn_protocols: Vec<Vec<u8>>,

    /// Disable Nagle's algorithm on the socket
    pub nodelay: bool,
}

impl Default for DialOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl DialOptions {
    /// Options with no overrides and `TCP_NODELAY` enabled
    #[must_use]
    pub const fn new() -> Self {
        Self {
            server_name: None,
            connect_timeout: None,
            alpn_protocols: Vec::new(),
            nodelay: true,
        }
    }

    /// Override the name used for SNI and certificate name checks
    #[must_use]
    pub fn server_name(mut self, name: impl Into<String>) -> Self {
        self.server_name = Some(name.into());
        self
    }

    /// Bound the dial duration
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Offer an ALPN protocol, e.g. `h2`
    #[must_use]
    pub fn alpn(mut self, protocol: impl Into<Vec<u8>>) -> Self {
        self.alpn_protocols.push(protocol.into());
        self
    }

    /// Toggle `TCP_NODELAY`
    #[must_use]
    pub const fn nodelay(mut self, nodelay: bool) -> Self {
        self.nodelay = nodelay;
        self
    }
}
