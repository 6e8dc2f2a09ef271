//! # Seed Data Generator
//!
//! `storefront seed` populates an empty store with demo items and a few
//! sales recorded through the ledger, so the dashboard has something to
//! show.
//!
//! ## Generated Data
//! - Items across categories (stationery, snacks, beverages, household),
//!   with deterministic prices, costs (60-80% of price) and stock (5-104)
//! - Sales cycling through paid, UPI and unpaid, one to three lines each
//!
//! Seeding is skipped when the owner already has items.

use std::time::Instant;

use anyhow::Result;
use tracing::warn;

use storefront_core::{Cart, Item, Money, NewItem, PaymentMethod, SaleMeta};
use storefront_db::{ItemStore, SalesLedger};

use super::Context;

/// Item names per category.
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Stationery",
        &["Pen", "Pencil", "Eraser", "Notebook", "Ruler", "Glue Stick", "Marker", "Stapler"],
    ),
    (
        "Snacks",
        &["Potato Chips", "Biscuits", "Namkeen", "Chocolate Bar", "Peanuts", "Cookies"],
    ),
    (
        "Beverages",
        &["Tea Pack", "Coffee Jar", "Mango Juice", "Soda", "Mineral Water", "Lassi"],
    ),
    (
        "Household",
        &["Soap", "Detergent", "Toothpaste", "Matchbox", "Candles", "Broom"],
    ),
];

const PAYMENT_CYCLE: &[PaymentMethod] = &[PaymentMethod::Paid, PaymentMethod::Upi, PaymentMethod::Paid, PaymentMethod::Unpaid];

const BUYERS: &[(&str, &str)] = &[("Asha", "9123456780"), ("Ravi", "9876543210"), ("Meena", "9988776655")];

pub async fn run(ctx: &Context, item_count: usize, sale_count: usize) -> Result<()> {
    let existing = ctx.db.items().count(ctx.session.owner_id()).await?;
    if existing > 0 {
        println!("Store already has {} items, skipping seed.", existing);
        return Ok(());
    }

    let start = Instant::now();
    let mut items = Vec::with_capacity(item_count);
    for seed in 0..item_count {
        let item = ctx.db.create_item(&ctx.session, generate_item(seed)).await?;
        items.push(item);
    }

    let ledger = SalesLedger::new(ctx.db.clone());
    let mut recorded = 0;
    for seed in 0..sale_count {
        let cart = generate_cart(&items, seed);
        if cart.is_empty() {
            continue;
        }
        match ledger.record_sale(&ctx.session, &cart, generate_meta(seed)).await {
            Ok(_) => recorded += 1,
            Err(e) => warn!(seed, error = %e, "Skipping seed sale"),
        }
        // the cart snapshots are stale after each sale; refresh them
        items = ctx.db.list_items(&ctx.session).await?;
    }

    println!(
        "Seeded {} items and {} sales in {:?}",
        items.len(),
        recorded,
        start.elapsed()
    );
    Ok(())
}

/// Deterministic item number `seed`; names repeat with a numeric suffix
/// once every category is used up.
pub fn generate_item(seed: usize) -> NewItem {
    let total: usize = CATEGORIES.iter().map(|(_, names)| names.len()).sum();
    let mut index = seed % total;
    let round = seed / total;

    let (category, name) = CATEGORIES
        .iter()
        .find_map(|(category, names)| {
            if index < names.len() {
                Some((*category, names[index]))
            } else {
                index -= names.len();
                None
            }
        })
        .unwrap_or(("General", "Item"));

    let name = if round == 0 {
        name.to_string()
    } else {
        format!("{} {}", name, round + 1)
    };

    // 10.00 - 209.50 in steps of 0.50
    let price_cents = 1000 + ((seed * 37) % 400) as i64 * 50;
    let cost_pct = 60 + (seed % 21) as i64;

    NewItem {
        name,
        category: Some(category.to_string()),
        selling_price: Money::from_cents(price_cents),
        cost_price: Money::from_cents(price_cents * cost_pct / 100),
        stock: 5 + ((seed * 13) % 100) as i64,
        barcode: Some(format!("890{:010}", seed)),
    }
}

fn generate_cart(items: &[Item], seed: usize) -> Cart {
    let mut cart = Cart::new();
    if items.is_empty() {
        return cart;
    }
    let lines = 1 + seed % 3;
    for line in 0..lines {
        let item = &items[(seed * 7 + line * 3) % items.len()];
        let quantity = 1 + ((seed + line) % 4) as i64;
        // out-of-stock picks are simply left out
        let _ = cart.add_item(item, quantity.min(item.stock));
    }
    cart
}

fn generate_meta(seed: usize) -> SaleMeta {
    let method = PAYMENT_CYCLE[seed % PAYMENT_CYCLE.len()];
    let meta = SaleMeta::new(method);
    if seed % 2 == 0 {
        let (name, number) = BUYERS[seed % BUYERS.len()];
        meta.with_buyer(Some(name.to_string()), Some(number.to_string()))
    } else {
        meta
    }
}
