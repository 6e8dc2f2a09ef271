//! # Domain Types
//!
//! Core domain types used throughout the storefront ledger.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Item       │   │      Sale       │   │ BusinessProfile │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  business_name  │       │
//! │  │  selling_price  │   │  lines ─────────┼─┐ │  phone          │       │
//! │  │  cost_price     │   │  total_amount   │ │ │  upi_id         │       │
//! │  │  stock          │   │  payment_method │ │ └─────────────────┘       │
//! │  │  initial_stock  │   │  timestamp      │ │                           │
//! │  └─────────────────┘   └─────────────────┘ │                           │
//! │                                            ▼                           │
//! │  ┌─────────────────┐   ┌─────────────────────────────────┐             │
//! │  │ PaymentMethod   │   │ SaleLines                       │             │
//! │  │  Paid           │   │  Grouped(Vec<LineItem>)  (cart) │             │
//! │  │  Upi            │   │  Legacy(LineItem)  (flat docs)  │             │
//! │  │  Unpaid ──► Paid│   └─────────────────────────────────┘             │
//! │  └─────────────────┘                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::LOW_STOCK_THRESHOLD_BPS;

// =============================================================================
// Item
// =============================================================================

/// An inventory record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Item {
    /// Opaque identifier (UUID v4 for items created here).
    pub id: String,

    /// Display name, also the grouping key on the best-seller board.
    pub name: String,

    pub category: Option<String>,

    /// Price charged per unit.
    pub selling_price: Money,

    /// Purchase cost per unit, zero when unknown.
    pub cost_price: Money,

    /// On-hand quantity. May go negative when concurrent sales oversell.
    pub stock: i64,

    /// Stock at creation time, the base of the low-stock threshold.
    pub initial_stock: i64,

    pub barcode: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// Stock is strictly between zero and 10% of the initial stock.
    ///
    /// ## Boundary
    /// ```text
    /// initial_stock = 100  →  threshold = 10
    ///   stock 10  → NOT low (10 is not < 10)
    ///   stock  9  → low
    ///   stock  0  → NOT low (out of stock is its own bucket)
    /// ```
    pub fn is_low_stock(&self) -> bool {
        // stock < initial * bps / 10000, kept in integers
        self.stock > 0
            && (self.stock as i128) * 10_000 < (self.initial_stock as i128) * LOW_STOCK_THRESHOLD_BPS as i128
    }

    /// Nothing left on the shelf (or oversold).
    #[inline]
    pub fn is_out_of_stock(&self) -> bool {
        self.stock <= 0
    }

    /// Value of the on-hand stock at cost.
    #[inline]
    pub fn stock_value(&self) -> Money {
        self.cost_price.multiply_quantity(self.stock)
    }
}

/// Fields for creating an item. `initial_stock` is taken from `stock`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewItem {
    pub name: String,
    pub category: Option<String>,
    pub selling_price: Money,
    pub cost_price: Money,
    pub stock: i64,
    pub barcode: Option<String>,
}

/// Partial update of an item; `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ItemUpdate {
    pub name: Option<String>,
    pub category: Option<String>,
    pub selling_price: Option<Money>,
    pub cost_price: Option<Money>,
    pub stock: Option<i64>,
    pub barcode: Option<String>,
}

impl ItemUpdate {
    /// True when the update would not touch any field.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.selling_price.is_none()
            && self.cost_price.is_none()
            && self.stock.is_none()
            && self.barcode.is_none()
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// How a sale was settled.
///
/// ## State Machine
/// ```text
///   Paid ●      Upi ●      Unpaid ──mark_paid──► Paid ●
///  (● = terminal)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum PaymentMethod {
    /// Settled in cash.
    Paid,
    /// Settled over UPI.
    Upi,
    /// Goods handed over, payment pending.
    Unpaid,
}

impl PaymentMethod {
    /// Stored label.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Paid => "paid",
            PaymentMethod::Upi => "upi",
            PaymentMethod::Unpaid => "unpaid",
        }
    }

    /// Parses a label, case-insensitively. `cash` and `pending` are the
    /// labels the sale screen shows and are accepted as aliases.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "paid" | "cash" => Some(PaymentMethod::Paid),
            "upi" => Some(PaymentMethod::Upi),
            "unpaid" | "pending" => Some(PaymentMethod::Unpaid),
            _ => None,
        }
    }

    #[inline]
    pub fn is_unpaid(&self) -> bool {
        *self == PaymentMethod::Unpaid
    }

    /// Applies the "mark as paid" action.
    ///
    /// ## Errors
    /// `InvalidPaymentTransition` unless the current state is `Unpaid`.
    pub fn mark_paid(self, sale_id: &str) -> CoreResult<PaymentMethod> {
        match self {
            PaymentMethod::Unpaid => Ok(PaymentMethod::Paid),
            from => Err(CoreError::InvalidPaymentTransition {
                sale_id: sale_id.to_string(),
                from,
                to: PaymentMethod::Paid,
            }),
        }
    }

    /// Bill line "Payment: ...".
    pub fn method_label(&self) -> &'static str {
        match self {
            PaymentMethod::Paid => "Cash",
            PaymentMethod::Upi => "UPI",
            PaymentMethod::Unpaid => "Not Paid",
        }
    }

    /// Bill line "Status: ...".
    pub fn status_label(&self) -> &'static str {
        match self {
            PaymentMethod::Unpaid => "Unpaid",
            PaymentMethod::Paid | PaymentMethod::Upi => "Paid",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PaymentMethod::from_label(s).ok_or_else(|| ValidationError::InvalidFormat {
            field: "payment method".to_string(),
            reason: format!("'{}' is not one of paid, upi, unpaid", s.trim()),
        })
    }
}

// =============================================================================
// Sale
// =============================================================================

/// One line of a sale.
/// Name and price are frozen at the time of sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LineItem {
    /// Referenced item; old flat records may not carry one.
    pub item_id: Option<String>,
    pub item_name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub line_total: Money,
}

impl LineItem {
    /// Builds a line with `line_total = quantity × unit_price`.
    pub fn new(item_id: Option<String>, item_name: impl Into<String>, quantity: i64, unit_price: Money) -> Self {
        LineItem {
            item_id,
            item_name: item_name.into(),
            quantity,
            unit_price,
            line_total: unit_price.multiply_quantity(quantity),
        }
    }

    /// `quantity × unit_price`, ignoring the stored line total.
    #[inline]
    pub fn computed_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

/// The two sale shapes found in the store, resolved once when a document
/// is read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum SaleLines {
    /// Cart sale with an items array.
    Grouped(Vec<LineItem>),
    /// Single-item record with flat fields.
    Legacy(LineItem),
}

impl SaleLines {
    /// All lines, whatever the shape.
    pub fn lines(&self) -> &[LineItem] {
        match self {
            SaleLines::Grouped(lines) => lines,
            SaleLines::Legacy(line) => std::slice::from_ref(line),
        }
    }

    #[inline]
    pub fn is_legacy(&self) -> bool {
        matches!(self, SaleLines::Legacy(_))
    }
}

/// A recorded transaction, normalised from its store document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Sale {
    pub id: String,
    pub lines: SaleLines,
    /// Total as stored on the document (legacy `total` for flat records).
    pub total_amount: Money,
    pub payment_method: PaymentMethod,
    pub buyer_name: Option<String>,
    pub buyer_number: Option<String>,
    /// Server-assigned creation time; `None` when the document has no
    /// resolvable date.
    #[ts(as = "Option<String>")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Sale {
    /// Total used for aggregation.
    ///
    /// ## Fallback Order
    /// 1. `total_amount` when nonzero
    /// 2. Σ `quantity × unit_price` over grouped lines
    /// 3. `quantity × unit_price` of a legacy flat record
    pub fn effective_total(&self) -> Money {
        if !self.total_amount.is_zero() {
            return self.total_amount;
        }
        match &self.lines {
            SaleLines::Grouped(lines) => lines.iter().map(LineItem::computed_total).sum(),
            SaleLines::Legacy(line) => line.computed_total(),
        }
    }

    #[inline]
    pub fn is_unpaid(&self) -> bool {
        self.payment_method.is_unpaid()
    }

    /// Units across all lines.
    pub fn units(&self) -> i64 {
        self.lines.lines().iter().map(|l| l.quantity).sum()
    }
}

// =============================================================================
// Business Profile
// =============================================================================

/// Business details shown on bills. Free-form; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct BusinessProfile {
    pub business_name: Option<String>,
    pub owner_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub upi_id: Option<String>,
}

impl BusinessProfile {
    /// Overlays the non-empty fields of `update` onto `self`.
    pub fn merge(&mut self, update: BusinessProfile) {
        fn overlay(slot: &mut Option<String>, value: Option<String>) {
            if let Some(v) = value {
                let v = v.trim();
                if !v.is_empty() {
                    *slot = Some(v.to_string());
                }
            }
        }

        overlay(&mut self.business_name, update.business_name);
        overlay(&mut self.owner_name, update.owner_name);
        overlay(&mut self.phone, update.phone);
        overlay(&mut self.email, update.email);
        overlay(&mut self.upi_id, update.upi_id);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
