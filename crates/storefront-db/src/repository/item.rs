//! # Item Repository
//!
//! Database operations for inventory items.
//!
//! ## Key Operations
//! - CRUD scoped by owner
//! - Upsert for imported item documents
//!
//! ## Stock Changes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  Operator edits           → update()      stock = new value         │
//! │  Sale committed           → SaleRepository::insert_draft            │
//! │                             stock = stock + delta (delta < 0)       │
//! │                                                                     │
//! │  Deltas, not absolute values: two sales of 3 and 2 always end at    │
//! │  stock − 5, whatever order they commit in. There is no floor.       │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use storefront_core::validation::{validate_item_update, validate_new_item};
use storefront_core::{Item, ItemUpdate, NewItem};

use crate::error::{DbError, DbResult};
use crate::feed::{ChangeFeed, Collection};

const ITEM_COLUMNS: &str = "id, name, category, selling_price, cost_price, stock, \
                            initial_stock, barcode, created_at, updated_at";

/// Repository for item database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.items();
/// let pen = repo.insert("owner-1", new_item).await?;
/// let all = repo.list("owner-1").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ItemRepository {
    pool: SqlitePool,
    feed: ChangeFeed,
}

impl ItemRepository {
    /// Creates a new ItemRepository.
    pub fn new(pool: SqlitePool, feed: ChangeFeed) -> Self {
        ItemRepository { pool, feed }
    }

    /// Gets an item by ID.
    pub async fn get(&self, owner_id: &str, id: &str) -> DbResult<Option<Item>> {
        let sql = format!("SELECT {} FROM items WHERE owner_id = ?1 AND id = ?2", ITEM_COLUMNS);
        let item = sqlx::query_as::<_, Item>(&sql)
            .bind(owner_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(item)
    }

    /// Lists all items of an owner, most recently updated first.
    pub async fn list(&self, owner_id: &str) -> DbResult<Vec<Item>> {
        let sql = format!(
            "SELECT {} FROM items WHERE owner_id = ?1 ORDER BY updated_at DESC, id",
            ITEM_COLUMNS
        );
        let items = sqlx::query_as::<_, Item>(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;

        debug!(owner_id = %owner_id, count = items.len(), "Listed items");
        Ok(items)
    }

    /// Inserts a new item.
    ///
    /// ## What This Does
    /// 1. Validates name, prices and stock
    /// 2. Generates a UUID v4 id
    /// 3. Snapshots `initial_stock = stock`
    pub async fn insert(&self, owner_id: &str, new_item: NewItem) -> DbResult<Item> {
        validate_new_item(&new_item).map_err(storefront_core::CoreError::from)?;

        let now = Utc::now();
        let item = Item {
            id: Uuid::new_v4().to_string(),
            name: new_item.name.trim().to_string(),
            category: new_item.category,
            selling_price: new_item.selling_price,
            cost_price: new_item.cost_price,
            stock: new_item.stock,
            initial_stock: new_item.stock,
            barcode: new_item.barcode,
            created_at: now,
            updated_at: now,
        };

        debug!(owner_id = %owner_id, id = %item.id, name = %item.name, "Inserting item");

        sqlx::query(
            r#"
            INSERT INTO items (
                owner_id, id, name, category,
                selling_price, cost_price, stock, initial_stock,
                barcode, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(owner_id)
        .bind(&item.id)
        .bind(&item.name)
        .bind(&item.category)
        .bind(item.selling_price)
        .bind(item.cost_price)
        .bind(item.stock)
        .bind(item.initial_stock)
        .bind(&item.barcode)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await?;

        self.feed.publish(owner_id, Collection::Items);
        Ok(item)
    }

    /// Applies a partial update and returns the updated item.
    ///
    /// `initial_stock` is never changed by an update; it stays the baseline
    /// for the low-stock threshold.
    pub async fn update(&self, owner_id: &str, id: &str, update: ItemUpdate) -> DbResult<Item> {
        validate_item_update(&update).map_err(storefront_core::CoreError::from)?;

        debug!(owner_id = %owner_id, id = %id, "Updating item");

        let result = sqlx::query(
            r#"
            UPDATE items SET
                name          = COALESCE(?3, name),
                category      = COALESCE(?4, category),
                selling_price = COALESCE(?5, selling_price),
                cost_price    = COALESCE(?6, cost_price),
                stock         = COALESCE(?7, stock),
                barcode       = COALESCE(?8, barcode),
                updated_at    = ?9
            WHERE owner_id = ?1 AND id = ?2
            "#,
        )
        .bind(owner_id)
        .bind(id)
        .bind(update.name.map(|n| n.trim().to_string()))
        .bind(update.category)
        .bind(update.selling_price)
        .bind(update.cost_price)
        .bind(update.stock)
        .bind(update.barcode)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Item", id));
        }

        self.feed.publish(owner_id, Collection::Items);
        self.get(owner_id, id)
            .await?
            .ok_or_else(|| DbError::not_found("Item", id))
    }

    /// Deletes an item. Past sales keep their frozen line items.
    pub async fn delete(&self, owner_id: &str, id: &str) -> DbResult<()> {
        debug!(owner_id = %owner_id, id = %id, "Deleting item");

        let result = sqlx::query("DELETE FROM items WHERE owner_id = ?1 AND id = ?2")
            .bind(owner_id)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Item", id));
        }

        self.feed.publish(owner_id, Collection::Items);
        Ok(())
    }

    /// Inserts or replaces an item as-is, keeping its id and dates.
    pub async fn upsert(&self, owner_id: &str, item: &Item) -> DbResult<()> {
        debug!(owner_id = %owner_id, id = %item.id, "Upserting item");

        sqlx::query(
            r#"
            INSERT INTO items (
                owner_id, id, name, category,
                selling_price, cost_price, stock, initial_stock,
                barcode, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            ON CONFLICT (owner_id, id) DO UPDATE SET
                name          = excluded.name,
                category      = excluded.category,
                selling_price = excluded.selling_price,
                cost_price    = excluded.cost_price,
                stock         = excluded.stock,
                initial_stock = excluded.initial_stock,
                barcode       = excluded.barcode,
                created_at    = excluded.created_at,
                updated_at    = excluded.updated_at
            "#,
        )
        .bind(owner_id)
        .bind(&item.id)
        .bind(&item.name)
        .bind(&item.category)
        .bind(item.selling_price)
        .bind(item.cost_price)
        .bind(item.stock)
        .bind(item.initial_stock)
        .bind(&item.barcode)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await?;

        self.feed.publish(owner_id, Collection::Items);
        Ok(())
    }

    /// Counts the items of an owner.
    pub async fn count(&self, owner_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items WHERE owner_id = ?1")
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use storefront_core::Money;

    fn pen() -> NewItem {
        NewItem {
            name: "Pen".to_string(),
            category: Some("Stationery".to_string()),
            selling_price: Money::from_cents(1000),
            cost_price: Money::from_cents(400),
            stock: 50,
            barcode: None,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.items();

        let item = repo.insert("owner-1", pen()).await.unwrap();
        assert_eq!(item.initial_stock, 50);

        let loaded = repo.get("owner-1", &item.id).await.unwrap().unwrap();
        assert_eq!(loaded.name, "Pen");
        assert_eq!(loaded.selling_price.cents(), 1000);
        assert_eq!(loaded.category.as_deref(), Some("Stationery"));

        // other owners can't see it
        assert!(repo.get("owner-2", &item.id).await.unwrap().is_none());
        assert_eq!(repo.count("owner-1").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_insert_rejects_invalid_item() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut item = pen();
        item.name = "  ".to_string();

        let err = db.items().insert("owner-1", item).await.unwrap_err();
        assert!(matches!(err, DbError::Core(_)));
        assert_eq!(db.items().count("owner-1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_keeps_initial_stock() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.items();
        let item = repo.insert("owner-1", pen()).await.unwrap();

        let updated = repo
            .update(
                "owner-1",
                &item.id,
                ItemUpdate {
                    stock: Some(80),
                    selling_price: Some(Money::from_cents(1200)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.stock, 80);
        assert_eq!(updated.initial_stock, 50);
        assert_eq!(updated.selling_price.cents(), 1200);
        assert_eq!(updated.name, "Pen");
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_item() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.items();

        let err = repo
            .update("owner-1", "nope", ItemUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
        assert!(matches!(
            repo.delete("owner-1", "nope").await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_most_recent_first() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.items();
        let first = repo.insert("owner-1", pen()).await.unwrap();
        let mut ink = pen();
        ink.name = "Ink".to_string();
        repo.insert("owner-1", ink).await.unwrap();

        // touching the first item moves it to the top
        repo.update(
            "owner-1",
            &first.id,
            ItemUpdate {
                stock: Some(49),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let names: Vec<String> = repo
            .list("owner-1")
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(names, vec!["Pen", "Ink"]);
    }
}
