//! # Repository Module
//!
//! Database repository implementations for the storefront store.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Store trait / CLI command                                             │
//! │       │                                                                 │
//! │       │  db.sales().mark_paid(owner_id, sale_id)                       │
//! │       ▼                                                                 │
//! │  SaleRepository { pool, feed }                                         │
//! │  ├── SQL against SqlitePool                                            │
//! │  └── feed.publish(owner, Sales) after every committed write            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ItemRepository`](item::ItemRepository) - Inventory CRUD
//! - [`SaleRepository`](sale::SaleRepository) - Atomic sale writes, payment updates, imports
//! - [`SettingsRepository`](settings::SettingsRepository) - Business profile blob

pub mod item;
pub mod sale;
pub mod settings;
