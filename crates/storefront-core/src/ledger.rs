//! # Sale Drafts
//!
//! Turns a cart plus payment metadata into everything a sale write needs:
//! the frozen line items, the total and one signed stock delta per line.
//! Nothing here touches storage; `storefront-db` commits the draft in a
//! single transaction.
//!
//! ## Draft Flow
//! ```text
//! ┌──────────┐  build_sale_draft()  ┌──────────────────────────────────┐
//! │   Cart   │ ───────────────────► │ SaleDraft                        │
//! │ + Meta   │                      │  lines[]      (cart order)       │
//! └──────────┘                      │  total_amount = Σ line_total     │
//!      │                            │  stock_deltas = [-qty per line]  │
//!      ▼                            └───────────────┬──────────────────┘
//!  validation errors                                │ atomic_write()
//!  (zero writes)                                    ▼
//!                                   INSERT sale + UPDATE stock (1 tx)
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::Cart;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{LineItem, PaymentMethod, Sale, SaleLines};
use crate::validation::validate_quantity;

/// Payment metadata collected on the sale-info screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleMeta {
    pub payment_method: PaymentMethod,
    pub buyer_name: Option<String>,
    pub buyer_number: Option<String>,
}

impl SaleMeta {
    pub fn new(payment_method: PaymentMethod) -> Self {
        SaleMeta {
            payment_method,
            buyer_name: None,
            buyer_number: None,
        }
    }

    pub fn with_buyer(mut self, name: Option<String>, number: Option<String>) -> Self {
        self.buyer_name = name;
        self.buyer_number = number;
        self
    }
}

/// A signed change to one item's stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StockDelta {
    pub item_id: String,
    /// Negative for a sale. Applied as `stock = stock + delta`, no floor.
    pub delta: i64,
}

/// A validated sale, ready to be committed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleDraft {
    pub lines: Vec<LineItem>,
    pub total_amount: Money,
    pub payment_method: PaymentMethod,
    pub buyer_name: Option<String>,
    pub buyer_number: Option<String>,
    pub stock_deltas: Vec<StockDelta>,
}

impl SaleDraft {
    /// The sale as it will read back once stored under `id` at `timestamp`.
    pub fn to_sale(&self, id: impl Into<String>, timestamp: DateTime<Utc>) -> Sale {
        Sale {
            id: id.into(),
            lines: SaleLines::Grouped(self.lines.clone()),
            total_amount: self.total_amount,
            payment_method: self.payment_method,
            buyer_name: self.buyer_name.clone(),
            buyer_number: self.buyer_number.clone(),
            timestamp: Some(timestamp),
        }
    }
}

/// Builds the draft for recording `cart` as one sale.
///
/// ## Checks (all before any write)
/// - the cart has at least one line
/// - every quantity is positive
/// - every quantity is ≤ the stock snapshotted in the cart
///
/// The live stock is NOT consulted; concurrent sales can still oversell.
pub fn build_sale_draft(cart: &Cart, meta: SaleMeta) -> CoreResult<SaleDraft> {
    if cart.is_empty() {
        return Err(CoreError::EmptyCart);
    }

    let mut lines = Vec::with_capacity(cart.len());
    let mut stock_deltas = Vec::with_capacity(cart.len());

    for line in cart.lines() {
        validate_quantity(line.quantity)?;
        if line.quantity > line.item.stock {
            return Err(CoreError::InsufficientStock {
                item: line.item.name.clone(),
                available: line.item.stock,
                requested: line.quantity,
            });
        }

        lines.push(LineItem::new(
            Some(line.item.id.clone()),
            line.item.name.clone(),
            line.quantity,
            line.item.selling_price,
        ));
        stock_deltas.push(StockDelta {
            item_id: line.item.id.clone(),
            delta: -line.quantity,
        });
    }

    let total_amount = lines.iter().map(|l| l.line_total).sum();

    Ok(SaleDraft {
        lines,
        total_amount,
        payment_method: meta.payment_method,
        buyer_name: non_blank(meta.buyer_name),
        buyer_number: non_blank(meta.buyer_number),
        stock_deltas,
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Item;

    fn item(id: &str, name: &str, price_cents: i64, stock: i64) -> Item {
        Item {
            id: id.to_string(),
            name: name.to_string(),
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
    fn test_draft_total_matches_lines() {
        let mut cart = Cart::new();
        cart.add_item(&item("pen", "Pen", 1000, 50), 3).unwrap();
        cart.add_item(&item("ink", "Ink", 2550, 5), 2).unwrap();

        let draft = build_sale_draft(&cart, SaleMeta::new(PaymentMethod::Paid)).unwrap();

        assert_eq!(draft.lines.len(), 2);
        assert_eq!(draft.lines[0].item_name, "Pen");
        assert_eq!(draft.lines[1].line_total.cents(), 5100);
        let sum: Money = draft.lines.iter().map(|l| l.line_total).sum();
        assert_eq!(draft.total_amount, sum);
        assert_eq!(draft.total_amount.cents(), 8100);
    }

    #[test]
    fn test_one_decrement_per_line() {
        let mut cart = Cart::new();
        cart.add_item(&item("pen", "Pen", 1000, 50), 3).unwrap();
        cart.add_item(&item("ink", "Ink", 2550, 5), 2).unwrap();

        let draft = build_sale_draft(&cart, SaleMeta::new(PaymentMethod::Upi)).unwrap();

        assert_eq!(
            draft.stock_deltas,
            vec![
                StockDelta { item_id: "pen".into(), delta: -3 },
                StockDelta { item_id: "ink".into(), delta: -2 },
            ]
        );
    }

    #[test]
    fn test_empty_cart_rejected() {
        let result = build_sale_draft(&Cart::new(), SaleMeta::new(PaymentMethod::Paid));
        assert!(matches!(result, Err(CoreError::EmptyCart)));
    }

    #[test]
    fn test_buyer_fields_trimmed() {
        let mut cart = Cart::new();
        cart.add_item(&item("pen", "Pen", 1000, 50), 1).unwrap();

        let meta = SaleMeta::new(PaymentMethod::Unpaid)
            .with_buyer(Some("  Asha ".to_string()), Some("   ".to_string()));
        let draft = build_sale_draft(&cart, meta).unwrap();

        assert_eq!(draft.buyer_name.as_deref(), Some("Asha"));
        assert_eq!(draft.buyer_number, None);
    }

    #[test]
    fn test_to_sale_is_grouped_and_dated() {
        let mut cart = Cart::new();
        cart.add_item(&item("pen", "Pen", 1000, 50), 3).unwrap();
        let draft = build_sale_draft(&cart, SaleMeta::new(PaymentMethod::Paid)).unwrap();

        let now = Utc::now();
        let sale = draft.to_sale("s1", now);
        assert_eq!(sale.timestamp, Some(now));
        assert_eq!(sale.effective_total().cents(), 3000);
        assert!(!sale.lines.is_legacy());
    }
}
