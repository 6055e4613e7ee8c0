//! `certprobe fetch` - Capture the certificate a server presents.

use anyhow::Result;
use certboot::Address;
use colored::Colorize;

use super::{print_certificate, Context};
use crate::cli::args::FetchArgs;
use crate::output::OutputFormat;

pub async fn execute(ctx: Context, args: FetchArgs) -> Result<()> {
    let address = Address::new(args.host, args.port)?;

    let client = ctx.client();
    let certificate = client.fetch_certificate(&ctx.operation(), &address).await?;
    let summary = certificate.summary()?;

    match ctx.output_format {
        OutputFormat::Json => {
            let report = serde_json::json!({
                "address": address.to_string(),
                "certificate": summary,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Pretty => {
            println!("{} {}", "Certificate for".bold(), address.to_string().cyan().bold());
            println!();
            print_certificate(&summary);
        }
    }

    Ok(())
}
