//! CLI argument parsing and command dispatch.

pub mod args;
pub mod commands;

use std::time::Duration;

use anyhow::Result;
use args::{Cli, Commands};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Run the CLI application.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);
    if cli.no_color {
        colored::control::set_override(false);
    }

    // Load configuration
    let config = Config::load()?;

    // Create context for commands
    let ctx = build_context(&cli, config);
    debug!(
        max_attempts = ctx.policy.max_attempts,
        interval = ?ctx.policy.interval,
        timeout = ?ctx.timeout,
        "resolved settings"
    );

    // Dispatch to appropriate command
    match cli.command {
        Commands::Fetch(args) => commands::fetch::execute(ctx, args).await,
        Commands::Connect(args) => commands::connect::execute(ctx, args).await,
        Commands::Config(args) => commands::config::execute(ctx, args),
    }
}

/// Log to stderr; `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let default = if verbose {
        "certboot_client=debug,certboot_cli=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Flags override the config file, which overrides the library defaults.
fn build_context(cli: &Cli, config: Config) -> commands::Context {
    let mut policy = config.retry_policy();
    if let Some(max) = cli.max_attempts {
        policy = policy.max_attempts(max);
    }
    if let Some(ms) = cli.interval_ms {
        policy = policy.interval(Duration::from_millis(ms));
    }

    commands::Context {
        output_format: cli.output.or(config.output_format).unwrap_or_default(),
        policy,
        connect_timeout: config.connect_timeout(),
        timeout: cli.timeout_secs.map(Duration::from_secs),
        config,
    }
}
