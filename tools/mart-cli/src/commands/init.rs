//! Create a config file and the database schema.

use anyhow::{bail, Context as _, Result};
use mart_db::Db;
use mart_storefront::config::{generate_default_config, CONFIG_FILES};

use super::InitArgs;
use crate::context::Context;

/// Run the init command.
pub async fn run(args: InitArgs, ctx: &Context) -> Result<()> {
    ctx.output.header("Initializing FreshMart store");

    let config_path = ctx.cwd.join(CONFIG_FILES[0]);
    if config_path.exists() && !args.force {
        bail!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        );
    }

    ctx.output.step(1, 2, "Writing configuration");
    std::fs::write(&config_path, generate_default_config(&args.database))
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    ctx.output.debug(&format!("Wrote {}", config_path.display()));

    ctx.output.step(2, 2, "Creating database schema");
    let db = Db::connect(&args.database)
        .await
        .with_context(|| format!("Failed to open database {}", args.database))?;
    db.migrate().await.context("Failed to create schema")?;
    db.close().await;

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({
            "config": config_path.display().to_string(),
            "database": args.database,
        }));
    } else {
        ctx.output.success("Store initialized");
        ctx.output.info("");
        ctx.output.info("Next steps:");
        ctx.output.list_item("mart admin create --username <name> --email <email>");
    }

    Ok(())
}
