//! `certprobe config` - CLI configuration management.

use anyhow::Result;
use colored::Colorize;

use super::Context;
use crate::cli::args::{ConfigArgs, ConfigCommands};
use crate::config::Config;
use crate::output::OutputFormat;

pub fn execute(ctx: Context, args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommands::Show => {
            show_config(&ctx);
            Ok(())
        }
        ConfigCommands::Set { key, value } => {
            let mut config = ctx.config;
            set_value(&mut config, &key, &value)?;
            config.save()?;
            println!("{} {} set to {}.", "Success:".green().bold(), key, value.cyan());
            Ok(())
        }
        ConfigCommands::Path => {
            println!("{}", Config::path()?.display());
            Ok(())
        }
    }
}

fn show_config(ctx: &Context) {
    let config = &ctx.config;

    if ctx.output_format == OutputFormat::Json {
        println!("{}", serde_json::json!(config));
        return;
    }

    println!("{}", "Current Configuration:".bold());
    println!();

    let unset = || "(not set)".dimmed().to_string();
    let show = |key: &str, value: Option<String>| {
        println!("  {} {}", format!("{key}:").bold(), value.unwrap_or_else(unset));
    };

    show("max_attempts", config.max_attempts.map(|v| v.to_string()));
    show("interval_ms", config.interval_ms.map(|v| v.to_string()));
    show("connect_timeout_ms", config.connect_timeout_ms.map(|v| v.to_string()));
    show(
        "retry_on_missing_certificate",
        config.retry_on_missing_certificate.map(|v| v.to_string()),
    );
    show("output_format", config.output_format.map(|v| v.to_string()));
}

fn set_value(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "max_attempts" => {
            let max: u32 = value.parse()?;
            if max == 0 {
                anyhow::bail!("max_attempts must be at least 1");
            }
            config.max_attempts = Some(max);
        }
        "interval_ms" => config.interval_ms = Some(value.parse()?),
        "connect_timeout_ms" => config.connect_timeout_ms = Some(value.parse()?),
        "retry_on_missing_certificate" => {
            config.retry_on_missing_certificate = Some(value.parse()?);
        }
        "output_format" | "output" => config.output_format = Some(value.parse()?),
        _ => anyhow::bail!(
            "Unknown config key: {key}\n\n\
             Available keys:\n  \
             max_attempts                  - Certificate fetch attempts\n  \
             interval_ms                   - Pause between attempts\n  \
             connect_timeout_ms            - Limit on the authenticated dial\n  \
             retry_on_missing_certificate  - Retry peers that present no certificate\n  \
             output_format                 - Default output (pretty, json)"
        ),
    }
    Ok(())
}
