//! The certificate captured on first contact.

use std::net::IpAddr;

use chrono::{DateTime, TimeZone, Utc};
use ring::digest::{digest, SHA256};
use rustls_pki_types::CertificateDer;
use serde::{Deserialize, Serialize};
use x509_parser::extensions::GeneralName;

use crate::error::{BootstrapError, Result};

/// A leaf certificate observed on a successful raw handshake.
///
/// The DER bytes are never modified after capture. Parsing happens lazily in
/// [`TrustedCertificate::summary`] so an exotic certificate still reaches the
/// trust store untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustedCertificate {
    der: CertificateDer<'static>,
}

impl TrustedCertificate {
    /// Wrap the DER encoding of a peer's leaf certificate
    pub fn from_der(der: impl Into<CertificateDer<'static>>) -> Self {
        Self { der: der.into() }
    }

    /// DER encoding as handed to the TLS stack
    #[must_use]
    pub const fn der(&self) -> &CertificateDer<'static> {
        &self.der
    }

    /// Raw DER bytes
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.der.as_ref()
    }

    /// Hex SHA-256 over the DER bytes
    #[must_use]
    pub fn fingerprint(&self) -> String {
        hex::encode(digest(&SHA256, self.as_bytes()).as_ref())
    }

    /// Parse the certificate into a human-readable summary.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError::InvalidCertificate`] if the DER bytes are not
    /// a well-formed X.509 certificate.
    pub fn summary(&self) -> Result<CertificateSummary> {
        let (_, cert) = x509_parser::parse_x509_certificate(self.as_bytes())
            .map_err(|e| BootstrapError::InvalidCertificate(e.to_string()))?;

        let subject = cert.subject().to_string();
        let issuer = cert.issuer().to_string();
        let not_before = asn1_to_utc(cert.validity().not_before);
        let not_after = asn1_to_utc(cert.validity().not_after);

        let mut subject_alt_names = Vec::new();
        if let Ok(Some(san)) = cert.subject_alternative_name() {
            for name in &san.value.general_names {
                match name {
                    GeneralName::DNSName(dns) => subject_alt_names.push((*dns).to_string()),
                    GeneralName::IPAddress(raw) => {
                        if let Some(ip) = ip_from_bytes(raw) {
                            subject_alt_names.push(ip.to_string());
                        }
                    }
                    _ => {}
                }
            }
        }

        Ok(CertificateSummary {
            self_signed: subject == issuer,
            subject,
            issuer,
            serial: cert.raw_serial_as_string(),
            not_before,
            not_after,
            expired: Utc::now() > not_after,
            subject_alt_names,
            fingerprint: self.fingerprint(),
        })
    }
}

impl From<CertificateDer<'static>> for TrustedCertificate {
    fn from(der: CertificateDer<'static>) -> Self {
        Self { der }
    }
}

/// Parsed view of a [`TrustedCertificate`] for logs and CLI output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CertificateSummary {
    /// Subject distinguished name
    pub subject: String,
    /// Issuer distinguished name
    pub issuer: String,
    /// Serial number (hex)
    pub serial: String,
    /// Not valid before
    pub not_before: DateTime<Utc>,
    /// Not valid after
    pub not_after: DateTime<Utc>,
    /// Whether the certificate is past `not_after`
    pub expired: bool,
    /// Subject and issuer are identical
    pub self_signed: bool,
    /// DNS names and IP addresses from the SAN extension
    pub subject_alt_names: Vec<String>,
    /// SHA-256 fingerprint of the DER bytes (hex)
    pub fingerprint: String,
}

fn asn1_to_utc(t: x509_parser::time::ASN1Time) -> DateTime<Utc> {
    Utc.timestamp_opt(t.timestamp(), 0)
        .single()
        .unwrap_or_default()
}

fn ip_from_bytes(raw: &[u8]) -> Option<IpAddr> {
    match raw.len() {
        4 => <[u8; 4]>::try_from(raw).ok().map(IpAddr::from),
        16 => <[u8; 16]>::try_from(raw).ok().map(IpAddr::from),
        _ => None,
    }
}
