//! CLI command implementations.

pub mod admin;
pub mod config;
pub mod export;
pub mod init;
pub mod invoice;
pub mod products;
pub mod stats;
pub mod users;

use clap::{Args, Subcommand, ValueEnum};

/// Arguments for the init command.
#[derive(Args)]
pub struct InitArgs {
    /// Database URL written to the new config.
    #[arg(long, default_value = "sqlite:freshmart.db")]
    pub database: String,

    /// Overwrite an existing config file.
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the admin command.
#[derive(Args)]
pub struct AdminArgs {
    #[command(subcommand)]
    pub command: AdminCommand,
}

#[derive(Subcommand)]
pub enum AdminCommand {
    /// Create an admin account.
    Create {
        /// Display name.
        #[arg(short, long)]
        username: String,

        /// Login email.
        #[arg(short, long)]
        email: String,

        /// Password. Prompted for when omitted.
        #[arg(short, long)]
        password: Option<String>,

        /// Postal address.
        #[arg(long, default_value = "")]
        address: String,

        /// Phone number.
        #[arg(long, default_value = "")]
        contact: String,
    },
}

/// Arguments for the products command.
#[derive(Args)]
pub struct ProductsArgs {
    #[command(subcommand)]
    pub command: ProductsCommand,
}

#[derive(Subcommand)]
pub enum ProductsCommand {
    /// List the catalog.
    List {
        /// Match product names containing this text.
        #[arg(short, long)]
        search: Option<String>,

        /// Stock bucket: low, medium or high.
        #[arg(long)]
        stock: Option<String>,

        /// Sort order, e.g. name_asc or price_desc.
        #[arg(long)]
        sort: Option<String>,
    },
}

/// Arguments for the users command.
#[derive(Args)]
pub struct UsersArgs {
    #[command(subcommand)]
    pub command: UsersCommand,
}

#[derive(Subcommand)]
pub enum UsersCommand {
    /// List accounts.
    List {
        /// Match usernames or emails containing this text.
        #[arg(short, long)]
        search: Option<String>,

        /// Only this role.
        #[arg(short, long)]
        role: Option<String>,

        /// Sort order, e.g. name_asc or email_desc.
        #[arg(long)]
        sort: Option<String>,
    },
    /// Delete an account.
    Delete {
        /// Account id.
        id: i64,

        /// Skip confirmation.
        #[arg(short, long)]
        yes: bool,
    },
}

/// What to export.
#[derive(Clone, Copy, ValueEnum)]
pub enum ExportKind {
    Products,
    Orders,
    Users,
}

/// Arguments for the export command.
#[derive(Args)]
pub struct ExportArgs {
    /// Listing to export.
    #[arg(value_enum)]
    pub kind: ExportKind,

    /// Output file path. Defaults to stdout.
    #[arg(short, long)]
    pub output: Option<String>,

    /// Name, email or text filter.
    #[arg(short, long)]
    pub search: Option<String>,

    /// Sort order for the chosen listing.
    #[arg(long)]
    pub sort: Option<String>,

    /// Stock bucket (products only).
    #[arg(long)]
    pub stock: Option<String>,

    /// Order status (orders only).
    #[arg(long)]
    pub status: Option<String>,

    /// First day, YYYY-MM-DD (orders only).
    #[arg(long)]
    pub from: Option<String>,

    /// Last day, YYYY-MM-DD (orders only).
    #[arg(long)]
    pub to: Option<String>,

    /// Role (users only).
    #[arg(long)]
    pub role: Option<String>,
}

/// Arguments for the invoice command.
#[derive(Args)]
pub struct InvoiceArgs {
    /// Order id.
    pub order_id: i64,

    /// Output file path. Defaults to invoice-<id>.pdf.
    #[arg(short, long)]
    pub output: Option<String>,
}

/// Arguments for the stats command.
#[derive(Args)]
pub struct StatsArgs {
    /// Stock level at or below which a product is listed as low.
    #[arg(long)]
    pub low_stock: Option<i64>,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration.
    Show,
    /// Print the path of the loaded config file.
    Path,
}
