//! `certprobe connect` - Full bootstrap, liveness check and close.

use std::time::Duration;

use anyhow::Result;
use certboot::{CertificateSummary, Connection, ConnectionHandle, DialOptions, TlsConnection};
use colored::Colorize;
use tracing::warn;

use super::{print_certificate, Context};
use crate::cli::args::ConnectArgs;
use crate::output::OutputFormat;

fn dial_options(ctx: &Context, args: &ConnectArgs) -> DialOptions {
    let mut options = DialOptions::new();
    if let Some(name) = &args.server_name {
        options = options.server_name(name.clone());
    }
    for protocol in &args.alpn {
        options = options.alpn(protocol.as_bytes());
    }
    if let Some(timeout) = args
        .connect_timeout_ms
        .map(Duration::from_millis)
        .or(ctx.connect_timeout)
    {
        options = options.connect_timeout(timeout);
    }
    options
}

/// What the command reports about one bootstrapped connection.
#[derive(Debug)]
struct Session {
    alive: bool,
    peer: Option<String>,
    alpn: Option<String>,
    fingerprint: String,
    certificate: Option<CertificateSummary>,
    closed: &'static str,
}

/// Inspect the handle, then close it before anything that can fail.
///
/// A certificate that does not parse into a summary is still reported by
/// fingerprint.
async fn inspect_and_close<C, S>(
    handle: &mut ConnectionHandle<C, S>,
    describe: impl FnOnce(&C) -> (Option<String>, Option<String>),
) -> Result<Session>
where
    C: Connection,
{
    let alive = handle.is_alive();
    let (peer, alpn) = handle.connection().map(describe).unwrap_or_default();
    let closed = handle.close().await?;

    let certificate = match handle.certificate().summary() {
        Ok(summary) => Some(summary),
        Err(e) => {
            warn!(error = %e, "could not summarize certificate");
            None
        }
    };

    Ok(Session {
        alive,
        peer,
        alpn,
        fingerprint: handle.certificate().fingerprint(),
        certificate,
        closed,
    })
}

fn describe_tls(connection: &TlsConnection) -> (Option<String>, Option<String>) {
    let peer = connection.peer_addr().ok().map(|addr| addr.to_string());
    let alpn = connection
        .alpn_protocol()
        .map(|p| String::from_utf8_lossy(p).into_owned());
    (peer, alpn)
}

pub async fn execute(ctx: Context, args: ConnectArgs) -> Result<()> {
    let options = dial_options(&ctx, &args);

    let client = ctx.client();
    let mut handle = client
        .connect(&ctx.operation(), &args.host, &args.port, options)
        .await?;
    let session = inspect_and_close(&mut handle, describe_tls).await?;

    match ctx.output_format {
        OutputFormat::Json => {
            let report = serde_json::json!({
                "address": handle.address().to_string(),
                "peer": session.peer,
                "alpn": session.alpn,
                "alive": session.alive,
                "fingerprint": session.fingerprint,
                "certificate": session.certificate,
                "close": session.closed,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Pretty => {
            let status = if session.alive {
                "alive".green().bold()
            } else {
                "not alive".red().bold()
            };
            println!(
                "{} {} ({})",
                "Connected to".bold(),
                handle.address().to_string().cyan().bold(),
                status
            );
            if let Some(peer) = &session.peer {
                println!("  {} {}", "Peer:".bold(), peer);
            }
            if let Some(alpn) = &session.alpn {
                println!("  {} {}", "ALPN:".bold(), alpn);
            }
            println!();
            match &session.certificate {
                Some(summary) => print_certificate(summary),
                None => println!("  {} {}", "SHA-256:".bold(), session.fingerprint.cyan()),
            }
            println!();
            println!("{}", session.closed.dimmed());
        }
    }

    Ok(())
}
