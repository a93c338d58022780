//! Implementation of the `docval health` command.

use super::CommandContext;
use super::output::print_json;
use crate::cli::OutputFormat;
use crate::error::Result;
use chrono::{SecondsFormat, Utc};
use serde_json::{Value, json};

/// Health payload: status, current time, environment, and version.
fn health_status(ctx: &CommandContext) -> Value {
    json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        "environment": ctx.config.environment,
        "version": env!("CARGO_PKG_VERSION"),
    })
}

/// Execute the `docval health` command.
pub fn cmd_health(ctx: &CommandContext) -> Result<()> {
    let status = health_status(ctx);

    match ctx.format {
        OutputFormat::Text => {
            println!(
                "status: {}\nenvironment: {}\nversion: {}\ntimestamp: {}",
                status["status"].as_str().unwrap_or_default(),
                ctx.config.environment,
                env!("CARGO_PKG_VERSION"),
                status["timestamp"].as_str().unwrap_or_default()
            );
            Ok(())
        }
        OutputFormat::Json => print_json(&status),
    }
}
