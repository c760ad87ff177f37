//! Configuration display.

use anyhow::Result;

use super::{ConfigArgs, ConfigCommand};
use crate::context::Context;

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Path => show_path(ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    let config = &ctx.config;
    if ctx.output.is_json() {
        ctx.output.json(config);
        return Ok(());
    }

    ctx.output.header("Configuration");
    match &ctx.config_path {
        Some(path) => ctx.output.kv("File", &path.display().to_string()),
        None => ctx.output.kv("File", "(defaults)"),
    }

    ctx.output.info("");
    ctx.output.info("Database:");
    ctx.output.kv("URL", &config.database.url);
    ctx.output
        .kv("Max connections", &config.database.max_connections.to_string());

    ctx.output.info("");
    ctx.output.info("Accounts:");
    ctx.output.kv(
        "Staff self-registration",
        if config.accounts.allow_staff_self_registration {
            "allowed"
        } else {
            "refused"
        },
    );
    ctx.output.kv(
        "Argon2",
        &format!(
            "m={} KiB, t={}, p={}",
            config.accounts.hash_memory_kib,
            config.accounts.hash_iterations,
            config.accounts.hash_parallelism
        ),
    );

    ctx.output.info("");
    ctx.output.info("Catalog:");
    ctx.output.kv(
        "Low stock threshold",
        &config.catalog.low_stock_threshold.to_string(),
    );

    ctx.output.info("");
    ctx.output.info("Logging:");
    ctx.output.kv("Level", &config.logging.level);
    ctx.output.kv("Format", &format!("{:?}", config.logging.format).to_lowercase());

    Ok(())
}

fn show_path(ctx: &Context) -> Result<()> {
    match &ctx.config_path {
        Some(path) => {
            if ctx.output.is_json() {
                ctx.output
                    .json(&serde_json::json!({ "path": path.display().to_string() }));
            } else {
                println!("{}", path.display());
            }
        }
        None => ctx.output.warn("No config file found; using defaults"),
    }
    Ok(())
}
