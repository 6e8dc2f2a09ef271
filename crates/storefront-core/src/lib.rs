//! # storefront-core: Pure Business Logic for the Storefront Ledger
//!
//! This crate holds every rule of the shop that can be expressed without
//! touching a database: what an item and a sale look like, how a cart turns
//! into a sale draft, and how the dashboard numbers are derived.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Storefront Ledger Architecture                      │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Operator CLI / mobile front end                 │   │
//! │  │     Inventory ──► Cart ──► Sale Info ──► Dashboard / Bill       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ storefront-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────────────┐  │   │
//! │  │   │  types   │ │   cart   │ │  ledger  │ │    analytics     │  │   │
//! │  │   │  Item    │ │  Cart    │ │ SaleDraft│ │ compute_metrics  │  │   │
//! │  │   │  Sale    │ │ CartLine │ │ deltas   │ │ best sellers     │  │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────────────┘  │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────────────┐  │   │
//! │  │   │ document │ │ receipt  │ │  share   │ │ money/validation │  │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             storefront-db (Document Store Layer)                │   │
//! │  │        SQLite, atomic sale writes, change subscriptions         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Item, Sale, PaymentMethod, BusinessProfile)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`session`] - Explicit per-owner context
//! - [`cart`] - Transient cart assembled before a sale
//! - [`ledger`] - Cart → sale draft + stock deltas
//! - [`document`] - Raw store documents → normalised domain types
//! - [`analytics`] - Dashboard aggregation
//! - [`receipt`] - Bill text rendering
//! - [`share`] - WhatsApp share links
//! - [`error`] / [`validation`] - Typed errors and input rules
//!
//! ## Example Usage
//!
//! ```rust
//! use storefront_core::money::Money;
//!
//! let price = Money::from_cents(1050); // 10.50
//! let line_total = price.multiply_quantity(3);
//! assert_eq!(line_total.cents(), 3150);
//! assert_eq!(line_total.to_string(), "31.50");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod analytics;
pub mod cart;
pub mod document;
pub mod error;
pub mod ledger;
pub mod money;
pub mod receipt;
pub mod session;
pub mod share;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use analytics::{compute_metrics, BestSeller, Metrics, PeriodTotals};
pub use cart::{Cart, CartLine};
pub use error::{CoreError, CoreResult, ValidationError};
pub use ledger::{build_sale_draft, SaleDraft, SaleMeta, StockDelta};
pub use money::Money;
pub use session::Session;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Items whose stock falls strictly below this share of their initial stock
/// are reported as low stock. Expressed in basis points (1000 = 10%).
pub const LOW_STOCK_THRESHOLD_BPS: i64 = 1000;

/// Number of entries on the best-seller board.
pub const BEST_SELLER_LIMIT: usize = 5;

/// Length of the rolling "this week" window, in days.
pub const WEEK_WINDOW_DAYS: i64 = 7;
