//! certprobe - trust-on-first-use TLS probe
//!
//! Fetches a server's certificate and connects to it trusting only that
//! certificate.

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    certboot_cli::run().await
}
