//! `storefront item ...`: inventory CRUD.

use anyhow::{Context as _, Result};
use clap::Subcommand;
use tracing::debug;

use storefront_core::{Item, ItemUpdate, Money, NewItem};
use storefront_db::ItemStore;

use super::{clip, Context};

#[derive(Debug, Subcommand)]
pub enum ItemCommand {
    /// Add an item
    Add {
        #[arg(long)]
        name: String,
        /// Selling price, e.g. 10 or 12.50
        #[arg(long)]
        price: f64,
        /// Cost price
        #[arg(long, default_value_t = 0.0)]
        cost: f64,
        #[arg(long, default_value_t = 0)]
        stock: i64,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        barcode: Option<String>,
    },
    /// List items, most recently updated first
    List,
    /// Change some fields of an item
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        price: Option<f64>,
        #[arg(long)]
        cost: Option<f64>,
        #[arg(long)]
        stock: Option<i64>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        barcode: Option<String>,
    },
    /// Delete an item
    Delete { id: String },
}

pub async fn run(ctx: &Context, command: ItemCommand) -> Result<()> {
    match command {
        ItemCommand::Add {
            name,
            price,
            cost,
            stock,
            category,
            barcode,
        } => {
            let item = ctx
                .db
                .create_item(
                    &ctx.session,
                    NewItem {
                        name,
                        category,
                        selling_price: Money::from_decimal(price),
                        cost_price: Money::from_decimal(cost),
                        stock,
                        barcode,
                    },
                )
                .await
                .context("Failed to add item")?;

            if ctx.json {
                ctx.print_json(&item)?;
            } else {
                println!("Added {} ({})", item.name, item.id);
            }
        }
        ItemCommand::List => {
            let items = ctx.db.list_items(&ctx.session).await?;
            if ctx.json {
                ctx.print_json(&items)?;
            } else {
                print_table(ctx, &items);
            }
        }
        ItemCommand::Edit {
            id,
            name,
            price,
            cost,
            stock,
            category,
            barcode,
        } => {
            let update = ItemUpdate {
                name,
                category,
                selling_price: price.map(Money::from_decimal),
                cost_price: cost.map(Money::from_decimal),
                stock,
                barcode,
            };
            if update.is_empty() {
                anyhow::bail!("Nothing to change; pass at least one field flag");
            }

            debug!(id = %id, "Editing item");
            let item = ctx
                .db
                .update_item(&ctx.session, &id, update)
                .await
                .with_context(|| format!("Failed to update item {}", id))?;

            if ctx.json {
                ctx.print_json(&item)?;
            } else {
                println!("Updated {} ({}), stock {}", item.name, item.id, item.stock);
            }
        }
        ItemCommand::Delete { id } => {
            ctx.db
                .delete_item(&ctx.session, &id)
                .await
                .with_context(|| format!("Failed to delete item {}", id))?;
            println!("Deleted {}", id);
        }
    }
    Ok(())
}

fn print_table(ctx: &Context, items: &[Item]) {
    if items.is_empty() {
        println!("No items yet. Add one with `storefront item add`.");
        return;
    }

    println!(
        "{:<36}  {:<20}  {:>10}  {:>10}  {:>6}  {}",
        "ID", "Name", "Price", "Cost", "Stock", "Flag"
    );
    for item in items {
        let flag = if item.is_out_of_stock() {
            "OUT"
        } else if item.is_low_stock() {
            "LOW"
        } else {
            ""
        };
        println!(
            "{:<36}  {:<20}  {:>10}  {:>10}  {:>6}  {}",
            item.id,
            clip(&item.name, 20),
            ctx.money(item.selling_price),
            ctx.money(item.cost_price),
            item.stock,
            flag
        );
    }
}
