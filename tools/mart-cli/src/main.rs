//! Mart CLI - administration tool for a FreshMart store database.
//!
//! Commands:
//! - `mart init` - Write a config file and create the schema
//! - `mart admin` - Bootstrap an admin account
//! - `mart products` - List the catalog
//! - `mart users` - List or delete accounts
//! - `mart export` - Export products, orders or users as CSV
//! - `mart invoice` - Render an order invoice as PDF
//! - `mart stats` - Show dashboard figures
//! - `mart config` - Show configuration

mod commands;
mod context;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use mart_storefront::{LogFormat, LoggingConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commands::{
    AdminArgs, ConfigArgs, ExportArgs, InitArgs, InvoiceArgs, ProductsArgs, StatsArgs, UsersArgs,
};

/// Mart CLI - Manage a FreshMart store
#[derive(Parser)]
#[command(name = "mart")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a config file and the database schema
    Init(InitArgs),

    /// Manage admin accounts
    Admin(AdminArgs),

    /// Browse the catalog
    Products(ProductsArgs),

    /// Manage user accounts
    Users(UsersArgs),

    /// Export a listing as CSV
    Export(ExportArgs),

    /// Render an order invoice
    Invoice(InvoiceArgs),

    /// Show store figures
    Stats(StatsArgs),

    /// Show configuration
    Config(ConfigArgs),
}

/// Log to stderr so command output on stdout stays clean. `RUST_LOG`
/// overrides the configured level.
fn init_tracing(logging: &LoggingConfig, verbose: bool) {
    let default_level = if verbose { "debug" } else { logging.level.as_str() };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let registry = tracing_subscriber::registry().with(filter);
    match logging.format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let output = output::Output::new(cli.verbose, cli.json);

    let config_path = cli.config.as_deref();
    let ctx = match context::Context::load(config_path, output.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            output.error(&format!("{:#}", e));
            std::process::exit(1);
        }
    };
    init_tracing(&ctx.config.logging, cli.verbose);

    let result = match cli.command {
        Commands::Init(args) => commands::init::run(args, &ctx).await,
        Commands::Admin(args) => commands::admin::run(args, &ctx).await,
        Commands::Products(args) => commands::products::run(args, &ctx).await,
        Commands::Users(args) => commands::users::run(args, &ctx).await,
        Commands::Export(args) => commands::export::run(args, &ctx).await,
        Commands::Invoice(args) => commands::invoice::run(args, &ctx).await,
        Commands::Stats(args) => commands::stats::run(args, &ctx).await,
        Commands::Config(args) => commands::config::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_export() {
        let cli = Cli::parse_from([
            "mart", "--json", "export", "orders", "--status", "pending", "-o", "orders.csv",
        ]);
        assert!(cli.json);
        match cli.command {
            Commands::Export(args) => {
                assert!(matches!(args.kind, commands::ExportKind::Orders));
                assert_eq!(args.status.as_deref(), Some("pending"));
                assert_eq!(args.output.as_deref(), Some("orders.csv"));
            }
            _ => panic!("expected export"),
        }
    }
}
