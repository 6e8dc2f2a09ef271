//! # Storefront CLI
//!
//! Operator command line over the storefront document store.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        storefront (binary)                              │
//! │                                                                         │
//! │  Cli::parse() ──► init_tracing() ──► AppConfig::from_env()             │
//! │                                          │  + --db/--owner/--currency   │
//! │                                          ▼                              │
//! │                          Database::new(DbConfig) (migrations run)      │
//! │                                          │                              │
//! │                                          ▼                              │
//! │   item │ sell │ mark-paid │ sales │ receipt │ dashboard │ settings     │
//! │   import │ seed                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Environment
//! - `STOREFRONT_DB_PATH`, `STOREFRONT_OWNER_ID`, `STOREFRONT_CURRENCY_SYMBOL`
//! - `RUST_LOG` overrides the log filter

mod commands;
mod config;

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{ArgAction, Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use storefront_core::{PaymentMethod, Session};
use storefront_db::{Database, DbConfig};

use crate::commands::item::ItemCommand;
use crate::commands::sale::{parse_cart_line, parse_payment};
use crate::commands::settings::SettingsCommand;
use crate::commands::Context;
use crate::config::AppConfig;

#[derive(Debug, Parser)]
#[command(name = "storefront")]
#[command(about = "Storefront inventory, sales ledger and dashboard")]
struct Cli {
    /// SQLite database file (overrides STOREFRONT_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Owner to act as (overrides STOREFRONT_OWNER_ID)
    #[arg(long, global = true)]
    owner: Option<String>,

    /// Currency symbol for amounts (overrides STOREFRONT_CURRENCY_SYMBOL)
    #[arg(long, global = true)]
    currency: Option<String>,

    /// Print JSON instead of tables
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Manage inventory items
    Item {
        #[command(subcommand)]
        command: ItemCommand,
    },
    /// Record a sale
    Sell {
        /// Cart line as <item-id>=<quantity>; repeat for more lines
        #[arg(long = "item", value_parser = parse_cart_line, required = true)]
        items: Vec<(String, i64)>,
        /// paid (cash), upi or unpaid
        #[arg(long, value_parser = parse_payment, default_value = "paid")]
        payment: PaymentMethod,
        #[arg(long)]
        buyer_name: Option<String>,
        #[arg(long)]
        buyer_number: Option<String>,
    },
    /// Mark an unpaid sale as paid
    MarkPaid { sale_id: String },
    /// List sales, newest first
    Sales {
        /// Only sales still awaiting payment
        #[arg(long, default_value_t = false)]
        unpaid: bool,
    },
    /// Print the bill for a sale
    Receipt {
        sale_id: String,
        /// Also print a WhatsApp share link
        #[arg(long, default_value_t = false)]
        share: bool,
        /// Number to share with instead of the buyer's
        #[arg(long)]
        phone: Option<String>,
    },
    /// Show dashboard metrics
    Dashboard {
        /// Keep running and reprint on every change
        #[arg(long, default_value_t = false)]
        watch: bool,
    },
    /// Business profile shown on bills
    Settings {
        #[command(subcommand)]
        command: SettingsCommand,
    },
    /// Import a JSON export (items, sales, appSettings)
    Import { file: PathBuf },
    /// Fill an empty store with demo data
    Seed {
        #[arg(long, default_value_t = 20)]
        items: usize,
        #[arg(long, default_value_t = 12)]
        sales: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = AppConfig::from_env()?.with_overrides(cli.db, cli.owner, cli.currency);
    debug!(?config, "Configuration loaded");

    let session = Session::new(config.owner_id.clone()).context("Invalid owner id")?;
    let db = open_database(&config).await?;

    let ctx = Context {
        db,
        session,
        config,
        json: cli.json,
    };

    let result = dispatch(&ctx, cli.command).await;
    ctx.db.close().await;
    result
}

async fn dispatch(ctx: &Context, command: Commands) -> Result<()> {
    match command {
        Commands::Item { command } => commands::item::run(ctx, command).await,
        Commands::Sell {
            items,
            payment,
            buyer_name,
            buyer_number,
        } => commands::sale::sell(ctx, items, payment, buyer_name, buyer_number).await,
        Commands::MarkPaid { sale_id } => commands::sale::mark_paid(ctx, &sale_id).await,
        Commands::Sales { unpaid } => commands::sale::list(ctx, unpaid).await,
        Commands::Receipt { sale_id, share, phone } => commands::sale::receipt(ctx, &sale_id, share, phone).await,
        Commands::Dashboard { watch } => commands::dashboard::run(ctx, watch).await,
        Commands::Settings { command } => commands::settings::run(ctx, command).await,
        Commands::Import { file } => commands::import::run(ctx, &file).await,
        Commands::Seed { items, sales } => commands::seed::run(ctx, items, sales).await,
    }
}

/// Initializes the tracing subscriber on stderr, so stdout stays clean
/// for tables and JSON.
///
/// ## Log Levels
/// - `RUST_LOG=...` wins when set
/// - `-v`: `info,storefront=debug,sqlx=warn`
/// - `-vv`: `debug,sqlx=info`
/// - Default: `warn`
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info,storefront=debug,sqlx=warn",
        _ => "debug,sqlx=info",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Opens (and migrates) the configured database, creating its directory.
async fn open_database(config: &AppConfig) -> Result<Database> {
    if let Some(dir) = config.db_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).with_context(|| format!("Cannot create {}", dir.display()))?;
    }

    let db = Database::new(DbConfig::new(&config.db_path))
        .await
        .with_context(|| format!("Cannot open database at {}", config.db_path.display()))?;
    info!(path = %config.db_path.display(), "Database ready");
    Ok(db)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_sell() {
        let cli = Cli::try_parse_from([
            "storefront",
            "--owner",
            "alice",
            "sell",
            "--item",
            "pen=3",
            "--item",
            "ink=1",
            "--payment",
            "unpaid",
            "--buyer-name",
            "Ravi",
        ])
        .unwrap();

        assert_eq!(cli.owner.as_deref(), Some("alice"));
        match cli.command {
            Commands::Sell {
                items,
                payment,
                buyer_name,
                ..
            } => {
                assert_eq!(items, vec![("pen".to_string(), 3), ("ink".to_string(), 1)]);
                assert_eq!(payment, PaymentMethod::Unpaid);
                assert_eq!(buyer_name.as_deref(), Some("Ravi"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_sell_requires_an_item() {
        assert!(Cli::try_parse_from(["storefront", "sell"]).is_err());
    }
}
