//! Command implementations.

pub mod config;
pub mod connect;
pub mod fetch;

use std::time::Duration;

use certboot::{BootstrapClient, CertificateSummary, RetryPolicy};
use colored::Colorize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::config::Config;
use crate::output::OutputFormat;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Output format
    pub output_format: OutputFormat,

    /// Retry policy for the fetch phase
    pub policy: RetryPolicy,

    /// Default limit on the authenticated dial
    pub connect_timeout: Option<Duration>,

    /// Overall deadline for the operation
    pub timeout: Option<Duration>,

    /// Configuration as loaded from disk
    pub config: Config,
}

impl Context {
    /// Create a bootstrap client with the resolved retry policy.
    pub fn client(&self) -> BootstrapClient {
        BootstrapClient::builder().retry(self.policy.clone()).build()
    }

    /// Cancellation context bounding one operation.
    pub fn operation(&self) -> certboot::Context {
        let ctx = certboot::Context::background();
        match self.timeout {
            Some(timeout) => ctx.with_timeout(timeout),
            None => ctx,
        }
    }
}

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Field")]
    field: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

/// Print a certificate summary as a two-column table.
pub(crate) fn print_certificate(summary: &CertificateSummary) {
    let validity = if summary.expired {
        "expired".red().bold().to_string()
    } else {
        "valid".green().to_string()
    };

    let rows = vec![
        FieldRow {
            field: "Subject",
            value: summary.subject.clone(),
        },
        FieldRow {
            field: "Issuer",
            value: summary.issuer.clone(),
        },
        FieldRow {
            field: "Serial",
            value: summary.serial.clone(),
        },
        FieldRow {
            field: "Not before",
            value: summary.not_before.to_rfc3339(),
        },
        FieldRow {
            field: "Not after",
            value: format!("{} ({validity})", summary.not_after.to_rfc3339()),
        },
        FieldRow {
            field: "Self-signed",
            value: summary.self_signed.to_string(),
        },
        FieldRow {
            field: "Alt names",
            value: summary.subject_alt_names.join(", "),
        },
    ];

    println!("{}", Table::new(rows).with(Style::rounded()));
    println!("  {} {}", "SHA-256:".bold(), summary.fingerprint.cyan());
}
