//! # CLI Commands
//!
//! One module per command group. Every handler receives the [`Context`]
//! built in `main` and prints its own output.
//!
//! - [`item`] - Inventory CRUD
//! - [`sale`] - Record, list and settle sales, print receipts
//! - [`dashboard`] - Metrics, once or live
//! - [`settings`] - Business profile
//! - [`import`] - JSON document export import
//! - [`seed`] - Demo data

pub mod dashboard;
pub mod import;
pub mod item;
pub mod sale;
pub mod seed;
pub mod settings;

use serde::Serialize;
use storefront_core::{Money, Session};
use storefront_db::Database;

use crate::config::AppConfig;

/// Everything a command needs.
pub struct Context {
    pub db: Database,
    pub session: Session,
    pub config: AppConfig,
    /// Print JSON instead of tables.
    pub json: bool,
}

impl Context {
    /// Formats an amount with the configured currency symbol.
    pub fn money(&self, amount: Money) -> String {
        amount.format_with_symbol(&self.config.currency_symbol)
    }

    pub fn print_json<T: Serialize>(&self, value: &T) -> anyhow::Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}

/// Trims a string to `width` characters, for table columns.
pub(crate) fn clip(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}
