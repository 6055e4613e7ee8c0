//! Strongly-typed values passed between the fetcher, the client and callers.

mod address;
mod certificate;

pub use address::Address;
pub use certificate::{CertificateSummary, TrustedCertificate};
