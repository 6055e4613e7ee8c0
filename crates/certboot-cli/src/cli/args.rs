//! Command-line argument definitions using clap.

use clap::{Args, Parser, Subcommand};

use crate::output::OutputFormat;

/// Trust-on-first-use TLS probe
///
/// Fetches the certificate a server presents, retrying while the server
/// starts up, then connects again trusting only that certificate.
#[derive(Parser, Debug)]
#[command(name = "certprobe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(short, long, global = true, value_enum)]
    pub output: Option<OutputFormat>,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Maximum number of certificate fetch attempts
    #[arg(long, global = true, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_attempts: Option<u32>,

    /// Pause between fetch attempts, in milliseconds
    #[arg(long, global = true)]
    pub interval_ms: Option<u64>,

    /// Give up on the whole operation after this many seconds
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch and summarize the certificate a server presents
    Fetch(FetchArgs),

    /// Bootstrap trust and open an authenticated connection
    Connect(ConnectArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),
}

// ============================================================================
// Fetch command
// ============================================================================

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Server host name or IP address
    pub host: String,

    /// Server port
    pub port: String,
}

// ============================================================================
// Connect command
// ============================================================================

#[derive(Args, Debug)]
pub struct ConnectArgs {
    /// Server host name or IP address
    pub host: String,

    /// Server port
    pub port: String,

    /// Name to verify the certificate against instead of the host
    #[arg(long)]
    pub server_name: Option<String>,

    /// ALPN protocol to offer (repeatable)
    #[arg(long)]
    pub alpn: Vec<String>,

    /// Limit on the authenticated dial, in milliseconds
    #[arg(long)]
    pub connect_timeout_ms: Option<u64>,
}

// ============================================================================
// Config command
// ============================================================================

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the configuration file contents
    Show,

    /// Set a configuration value
    Set {
        /// Key (max_attempts, interval_ms, connect_timeout_ms,
        /// retry_on_missing_certificate, output_format)
        key: String,

        /// Value to store
        value: String,
    },

    /// Print the configuration file location
    Path,
}
