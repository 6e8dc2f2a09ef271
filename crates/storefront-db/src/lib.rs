//! # storefront-db: Document Store Layer for the Storefront Ledger
//!
//! SQLite-backed storage for items, sales and settings, the atomic sales
//! ledger writer, and push subscriptions that feed the live dashboard.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Storefront Data Flow                             │
//! │                                                                         │
//! │  CLI command (sell, dashboard --watch)                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  storefront-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   SalesLedger ──► SaleStore::atomic_write ──┐                   │   │
//! │  │   LiveDashboard ◄── subscribe_items/sales ──┤                   │   │
//! │  │                                             ▼                   │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │◄───│ Item / Sale / │    │  (embedded)  │  │   │
//! │  │   │ + ChangeFeed  │    │ Settings      │    │ 001_init.sql │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database (one file, rows scoped by owner_id)                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Item, sale and settings repositories
//! - [`store`] - Store traits and their SQLite implementation
//! - [`feed`] - Change feed and subscriptions
//! - [`ledger`] - Sales ledger writer
//! - [`dashboard`] - Live metrics recomputation
//!
//! ## Usage
//!
//! ```rust,ignore
//! use storefront_db::{Database, DbConfig, SalesLedger};
//!
//! let db = Database::new(DbConfig::new("storefront.db")).await?;
//! let ledger = SalesLedger::new(db.clone());
//! let sale_id = ledger.record_sale(&session, &cart, SaleMeta::new(PaymentMethod::Paid)).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod dashboard;
pub mod error;
pub mod feed;
pub mod ledger;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use dashboard::LiveDashboard;
pub use error::{DbError, DbResult};
pub use feed::{ChangeFeed, Collection, Subscription};
pub use ledger::SalesLedger;
pub use pool::{Database, DbConfig};
pub use store::{ItemStore, SaleStore, SettingsStore};

// Repository re-exports for convenience
pub use repository::item::ItemRepository;
pub use repository::sale::SaleRepository;
pub use repository::settings::SettingsRepository;
