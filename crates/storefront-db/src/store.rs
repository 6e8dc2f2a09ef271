//! # Store Contracts
//!
//! The three collections the ledger, the dashboard and the CLI depend on.
//! [`crate::Database`] implements all of them over SQLite; tests wrap it to
//! inject failures.
//!
//! ## Contracts
//! ```text
//! ┌──────────────────┐  ┌──────────────────────┐  ┌──────────────────┐
//! │    ItemStore     │  │      SaleStore       │  │  SettingsStore   │
//! │  create_item     │  │  atomic_write (1 tx) │  │  load_settings   │
//! │  update_item     │  │  mark_paid           │  │  save_settings   │
//! │  delete_item     │  │  get_sale            │  │  subscribe_...   │
//! │  get_item        │  │  list_sales          │  └──────────────────┘
//! │  list_items      │  │  import_document     │
//! │  subscribe_items │  │  subscribe_sales     │
//! └──────────────────┘  └──────────────────────┘
//! ```
//!
//! Every method takes the [`Session`] it is scoped to.

use serde_json::Value;
use storefront_core::{BusinessProfile, Item, ItemUpdate, NewItem, Sale, SaleDraft, Session};

use crate::error::DbResult;
use crate::feed::{spawn_watch, Collection, Subscription};
use crate::pool::Database;

// =============================================================================
// Contracts
// =============================================================================

/// Inventory collection.
#[allow(async_fn_in_trait)]
pub trait ItemStore {
    /// Validates and inserts a new item; `initial_stock` is set from `stock`.
    async fn create_item(&self, session: &Session, item: NewItem) -> DbResult<Item>;

    /// Applies the present fields of `update`.
    async fn update_item(&self, session: &Session, id: &str, update: ItemUpdate) -> DbResult<Item>;

    async fn delete_item(&self, session: &Session, id: &str) -> DbResult<()>;

    async fn get_item(&self, session: &Session, id: &str) -> DbResult<Option<Item>>;

    /// All items, most recently updated first.
    async fn list_items(&self, session: &Session) -> DbResult<Vec<Item>>;

    /// Delivers the item list now and after every item change.
    fn subscribe_items<F>(&self, session: &Session, on_items: F) -> Subscription
    where
        F: FnMut(Vec<Item>) + Send + 'static;
}

/// Sales collection.
#[allow(async_fn_in_trait)]
pub trait SaleStore {
    /// Inserts the sale and applies every stock delta in one transaction.
    /// Returns the new sale id. On error nothing was written.
    async fn atomic_write(&self, session: &Session, draft: &SaleDraft) -> DbResult<String>;

    /// The single legal payment transition, unpaid → paid.
    async fn mark_paid(&self, session: &Session, sale_id: &str) -> DbResult<()>;

    async fn get_sale(&self, session: &Session, sale_id: &str) -> DbResult<Option<Sale>>;

    /// All readable sales, newest first.
    async fn list_sales(&self, session: &Session) -> DbResult<Vec<Sale>>;

    /// Stores a raw sale document (either shape) under `id`, replacing any
    /// existing one. Stock is not touched.
    async fn import_document(&self, session: &Session, id: &str, document: &Value) -> DbResult<Sale>;

    /// Delivers the sale list now and after every sale change.
    fn subscribe_sales<F>(&self, session: &Session, on_sales: F) -> Subscription
    where
        F: FnMut(Vec<Sale>) + Send + 'static;
}

/// Per-owner settings blob.
#[allow(async_fn_in_trait)]
pub trait SettingsStore {
    /// The stored profile, or an empty one.
    async fn load_settings(&self, session: &Session) -> DbResult<BusinessProfile>;

    /// Merges the non-empty fields of `update` over the stored profile and
    /// returns the result.
    async fn save_settings(&self, session: &Session, update: BusinessProfile) -> DbResult<BusinessProfile>;

    fn subscribe_settings<F>(&self, session: &Session, on_settings: F) -> Subscription
    where
        F: FnMut(BusinessProfile) + Send + 'static;
}

// =============================================================================
// SQLite Implementation
// =============================================================================

impl ItemStore for Database {
    async fn create_item(&self, session: &Session, item: NewItem) -> DbResult<Item> {
        self.items().insert(session.owner_id(), item).await
    }

    async fn update_item(&self, session: &Session, id: &str, update: ItemUpdate) -> DbResult<Item> {
        self.items().update(session.owner_id(), id, update).await
    }

    async fn delete_item(&self, session: &Session, id: &str) -> DbResult<()> {
        self.items().delete(session.owner_id(), id).await
    }

    async fn get_item(&self, session: &Session, id: &str) -> DbResult<Option<Item>> {
        self.items().get(session.owner_id(), id).await
    }

    async fn list_items(&self, session: &Session) -> DbResult<Vec<Item>> {
        self.items().list(session.owner_id()).await
    }

    fn subscribe_items<F>(&self, session: &Session, on_items: F) -> Subscription
    where
        F: FnMut(Vec<Item>) + Send + 'static,
    {
        let repo = self.items();
        let owner_id = session.owner_id().to_string();
        let query_owner = owner_id.clone();

        spawn_watch(
            self.feed(),
            owner_id,
            Collection::Items,
            move || {
                let repo = repo.clone();
                let owner_id = query_owner.clone();
                async move { repo.list(&owner_id).await }
            },
            on_items,
        )
    }
}

impl SaleStore for Database {
    async fn atomic_write(&self, session: &Session, draft: &SaleDraft) -> DbResult<String> {
        self.sales().insert_draft(session.owner_id(), draft).await
    }

    async fn mark_paid(&self, session: &Session, sale_id: &str) -> DbResult<()> {
        self.sales().mark_paid(session.owner_id(), sale_id).await
    }

    async fn get_sale(&self, session: &Session, sale_id: &str) -> DbResult<Option<Sale>> {
        self.sales().get(session.owner_id(), sale_id).await
    }

    async fn list_sales(&self, session: &Session) -> DbResult<Vec<Sale>> {
        self.sales().list(session.owner_id()).await
    }

    async fn import_document(&self, session: &Session, id: &str, document: &Value) -> DbResult<Sale> {
        self.sales().import(session.owner_id(), id, document).await
    }

    fn subscribe_sales<F>(&self, session: &Session, on_sales: F) -> Subscription
    where
        F: FnMut(Vec<Sale>) + Send + 'static,
    {
        let repo = self.sales();
        let owner_id = session.owner_id().to_string();
        let query_owner = owner_id.clone();

        spawn_watch(
            self.feed(),
            owner_id,
            Collection::Sales,
            move || {
                let repo = repo.clone();
                let owner_id = query_owner.clone();
                async move { repo.list(&owner_id).await }
            },
            on_sales,
        )
    }
}

impl SettingsStore for Database {
    async fn load_settings(&self, session: &Session) -> DbResult<BusinessProfile> {
        self.settings().load(session.owner_id()).await
    }

    async fn save_settings(&self, session: &Session, update: BusinessProfile) -> DbResult<BusinessProfile> {
        self.settings().save(session.owner_id(), update).await
    }

    fn subscribe_settings<F>(&self, session: &Session, on_settings: F) -> Subscription
    where
        F: FnMut(BusinessProfile) + Send + 'static,
    {
        let repo = self.settings();
        let owner_id = session.owner_id().to_string();
        let query_owner = owner_id.clone();

        spawn_watch(
            self.feed(),
            owner_id,
            Collection::Settings,
            move || {
                let repo = repo.clone();
                let owner_id = query_owner.clone();
                async move { repo.load(&owner_id).await }
            },
            on_settings,
        )
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DbConfig;
    use std::time::Duration;
    use storefront_core::Money;
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    fn pen() -> NewItem {
        NewItem {
            name: "Pen".to_string(),
            selling_price: Money::from_cents(1000),
            cost_price: Money::from_cents(400),
            stock: 50,
            ..Default::default()
        }
    }

    async fn next<T>(rx: &mut mpsc::UnboundedReceiver<T>) -> T {
        timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("no snapshot within 5s")
            .expect("subscription ended")
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let alice = Session::new("alice").unwrap();
        let bob = Session::new("bob").unwrap();

        let item = db.create_item(&alice, pen()).await.unwrap();

        assert_eq!(db.list_items(&alice).await.unwrap().len(), 1);
        assert!(db.list_items(&bob).await.unwrap().is_empty());
        assert!(db.get_item(&bob, &item.id).await.unwrap().is_none());
        assert!(db.delete_item(&bob, &item.id).await.is_err());
    }

    #[tokio::test]
    async fn test_subscribe_items_initial_and_on_write() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let session = Session::new("owner-1").unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let _sub = db.subscribe_items(&session, move |items| {
            let _ = tx.send(items.len());
        });
        assert_eq!(next(&mut rx).await, 0);

        db.create_item(&session, pen()).await.unwrap();
        assert_eq!(next(&mut rx).await, 1);
    }

    #[tokio::test]
    async fn test_subscribe_settings_sees_saved_profile() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let session = Session::new("owner-1").unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let _sub = db.subscribe_settings(&session, move |profile| {
            let _ = tx.send(profile.business_name);
        });
        assert_eq!(next(&mut rx).await, None);

        db.save_settings(
            &session,
            BusinessProfile {
                business_name: Some("Corner Shop".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(next(&mut rx).await.as_deref(), Some("Corner Shop"));
        assert_eq!(
            db.load_settings(&session).await.unwrap().business_name.as_deref(),
            Some("Corner Shop")
        );
    }

    #[tokio::test]
    async fn test_other_owner_writes_do_not_notify() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let alice = Session::new("alice").unwrap();
        let bob = Session::new("bob").unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let _sub = db.subscribe_sales(&alice, move |sales| {
            let _ = tx.send(sales.len());
        });
        assert_eq!(next(&mut rx).await, 0);

        let doc = serde_json::json!({"itemName": "Pen", "quantity": 1, "unitPrice": 10, "total": 10});
        db.import_document(&bob, "legacy-1", &doc).await.unwrap();
        db.import_document(&alice, "legacy-2", &doc).await.unwrap();

        // the first notification alice sees is her own import
        assert_eq!(next(&mut rx).await, 1);
    }
}
