//! Connection targets.

use std::fmt;

use crate::error::{BootstrapError, Result};

/// A validated `host:port` connection target.
///
/// Both parts are kept as strings: the port is handed to the resolver
/// unchanged, so service names and numeric ports are treated alike until
/// the first dial.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    host: String,
    port: String,
}

impl Address {
    /// Create an address, rejecting an empty host or port before any I/O
    pub fn new(host: impl Into<String>, port: impl Into<String>) -> Result<Self> {
        let host = host.into();
        let port = port.into();

        if host.trim().is_empty() {
            return Err(BootstrapError::InvalidArgument(
                "host cannot be empty".into(),
            ));
        }
        if port.trim().is_empty() {
            return Err(BootstrapError::InvalidArgument(
                "port cannot be empty".into(),
            ));
        }

        // Brackets are only formatting; store the bare host
        let host = match (host.starts_with('['), host.ends_with(']')) {
            (true, true) => host[1..host.len() - 1].to_owned(),
            (false, false) => host,
            _ => {
                return Err(BootstrapError::InvalidArgument(format!(
                    "unbalanced brackets in host {host:?}"
                )))
            }
        };
        if host.trim().is_empty() {
            return Err(BootstrapError::InvalidArgument(
                "host cannot be empty".into(),
            ));
        }

        Ok(Self { host, port })
    }

    /// Host part, without IPv6 brackets
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Port part as given
    #[must_use]
    pub fn port(&self) -> &str {
        &self.port
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // IPv6 literals need brackets to stay parseable as host:port
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}
