//! # Cart
//!
//! The transient cart assembled on the sale screen before a sale is recorded.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Operator Action          Method                  Cart Change           │
//! │  ───────────────          ──────                  ───────────           │
//! │                                                                         │
//! │  Pick item ──────────────► add_item() ──────────► push or merge qty    │
//! │                                                                         │
//! │  Change quantity ────────► update_quantity() ───► lines[i].qty = n     │
//! │                                                                         │
//! │  Remove ─────────────────► remove_item() ───────► lines.remove(i)      │
//! │                                                                         │
//! │  Record sale ────────────► build_sale_draft() ──► (consumed)           │
//! │                                                                         │
//! │  NOTE: the stock check uses the item snapshot taken when the item was  │
//! │        added, not the live stock at commit time.                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::Item;
use crate::validation::validate_quantity;

/// One entry in the cart.
///
/// `item` is a frozen copy of the inventory record at the time it was added,
/// so the cart keeps showing the same name and price even if the item is
/// edited meanwhile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartLine {
    pub item: Item,
    pub quantity: i64,
}

impl CartLine {
    /// `quantity × selling_price` of the snapshot.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.item.selling_price.multiply_quantity(self.quantity)
    }
}

/// The cart.
///
/// ## Invariants
/// - Lines are unique by item id (adding the same item merges quantities)
/// - Lines keep insertion order
/// - Every quantity is > 0 and ≤ the snapshot stock
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { lines: Vec::new() }
    }

    /// Adds an item, or increases its quantity if already present.
    ///
    /// The snapshot of the first add is kept; later adds only merge the
    /// quantity.
    ///
    /// ## Errors
    /// - `Validation` when `quantity` is not positive
    /// - `InsufficientStock` when the merged quantity exceeds the snapshot stock
    pub fn add_item(&mut self, item: &Item, quantity: i64) -> CoreResult<()> {
        validate_quantity(quantity)?;

        if let Some(line) = self.lines.iter_mut().find(|l| l.item.id == item.id) {
            let merged = line.quantity.saturating_add(quantity);
            check_stock(&line.item, merged)?;
            line.quantity = merged;
            return Ok(());
        }

        check_stock(item, quantity)?;
        self.lines.push(CartLine {
            item: item.clone(),
            quantity,
        });
        Ok(())
    }

    /// Sets the quantity of a line. Zero removes the line.
    pub fn update_quantity(&mut self, item_id: &str, quantity: i64) -> CoreResult<()> {
        if quantity == 0 {
            return self.remove_item(item_id);
        }
        validate_quantity(quantity)?;

        let line = self
            .lines
            .iter_mut()
            .find(|l| l.item.id == item_id)
            .ok_or_else(|| CoreError::ItemNotFound(item_id.to_string()))?;
        check_stock(&line.item, quantity)?;
        line.quantity = quantity;
        Ok(())
    }

    /// Removes a line by item id.
    pub fn remove_item(&mut self, item_id: &str) -> CoreResult<()> {
        let initial_len = self.lines.len();
        self.lines.retain(|l| l.item.id != item_id);

        if self.lines.len() == initial_len {
            Err(CoreError::ItemNotFound(item_id.to_string()))
        } else {
            Ok(())
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Number of distinct items.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total quantity of all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Σ quantity × selling price.
    pub fn total(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }
}

fn check_stock(item: &Item, requested: i64) -> CoreResult<()> {
    if requested > item.stock {
        return Err(CoreError::InsufficientStock {
            item: item.name.clone(),
            available: item.stock,
            requested,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_item(id: &str, price_cents: i64, stock: i64) -> Item {
        Item {
            id: id.to_string(),
            name: format!("Item {}", id),
            category: None,
            selling_price: Money::from_cents(price_cents),
            cost_price: Money::zero(),
            stock,
            initial_stock: stock,
            barcode: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_cart_add_item() {
        let mut cart = Cart::new();
        cart.add_item(&test_item("1", 999, 10), 2).unwrap();

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.total_quantity(), 2);
        assert_eq!(cart.total().cents(), 1998);
    }

    #[test]
    fn test_cart_add_same_item_merges_quantity() {
        let mut cart = Cart::new();
        let item = test_item("1", 999, 10);

        cart.add_item(&item, 2).unwrap();
        cart.add_item(&item, 3).unwrap();

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.total_quantity(), 5);
    }

    #[test]
    fn test_cart_rejects_more_than_snapshot_stock() {
        let mut cart = Cart::new();
        let item = test_item("1", 999, 4);

        cart.add_item(&item, 3).unwrap();
        let err = cart.add_item(&item, 2).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientStock { available: 4, requested: 5, .. }
        ));
        assert_eq!(cart.total_quantity(), 3);
    }

    #[test]
    fn test_cart_rejects_non_positive_quantity() {
        let mut cart = Cart::new();
        assert!(matches!(
            cart.add_item(&test_item("1", 100, 5), 0),
            Err(CoreError::Validation(_))
        ));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_cart_update_and_remove() {
        let mut cart = Cart::new();
        cart.add_item(&test_item("1", 100, 5), 1).unwrap();
        cart.add_item(&test_item("2", 200, 5), 1).unwrap();

        cart.update_quantity("1", 4).unwrap();
        assert_eq!(cart.lines()[0].quantity, 4);
        assert!(cart.update_quantity("1", 6).is_err());
        assert!(cart.update_quantity("missing", 1).is_err());

        cart.update_quantity("1", 0).unwrap();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.lines()[0].item.id, "2");

        cart.clear();
        assert!(cart.is_empty());
        assert!(cart.remove_item("2").is_err());
    }
}
