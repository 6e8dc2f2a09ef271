//! # Sale Repository
//!
//! Database operations for sales.
//!
//! Sales are stored as JSON documents (the shape other clients of the same
//! store read and write) plus a few indexed columns. Reads normalise every
//! document through [`storefront_core::document`], so callers only ever see
//! typed [`Sale`] values.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │  1. RECORD (one transaction)                                           │
//! │     └── insert_draft()                                                 │
//! │         ├── INSERT INTO sales (document, payment_method, timestamp)    │
//! │         ├── UPDATE items SET stock = stock + delta   (per line)        │
//! │         └── COMMIT   ── any failure ──► ROLLBACK, nothing applied      │
//! │                                                                         │
//! │  2. (OPTIONAL) SETTLE                                                  │
//! │     └── mark_paid()   unpaid → paid, payment field only                │
//! │                                                                         │
//! │  Sales are otherwise immutable.                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use storefront_core::document::{normalize_sale, sale_to_document};
use storefront_core::{CoreError, PaymentMethod, Sale, SaleDraft};

use crate::error::{DbError, DbResult};
use crate::feed::{ChangeFeed, Collection};

/// Raw row as stored.
#[derive(Debug, sqlx::FromRow)]
struct SaleRow {
    id: String,
    document: String,
    timestamp: Option<DateTime<Utc>>,
}

impl SaleRow {
    /// Normalises the stored document. Unreadable JSON is skipped, not fatal.
    fn into_sale(self) -> Option<Sale> {
        match serde_json::from_str::<Value>(&self.document) {
            Ok(doc) => Some(normalize_sale(&self.id, &doc, self.timestamp)),
            Err(e) => {
                warn!(id = %self.id, error = %e, "Skipping unreadable sale document");
                None
            }
        }
    }
}

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
    feed: ChangeFeed,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool, feed: ChangeFeed) -> Self {
        SaleRepository { pool, feed }
    }

    /// Gets a sale by ID.
    pub async fn get(&self, owner_id: &str, id: &str) -> DbResult<Option<Sale>> {
        let row = sqlx::query_as::<_, SaleRow>(
            "SELECT id, document, timestamp FROM sales WHERE owner_id = ?1 AND id = ?2",
        )
        .bind(owner_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.and_then(SaleRow::into_sale))
    }

    /// Lists all readable sales of an owner, newest first. Undated sales
    /// come last.
    pub async fn list(&self, owner_id: &str) -> DbResult<Vec<Sale>> {
        let rows = sqlx::query_as::<_, SaleRow>(
            r#"
            SELECT id, document, timestamp
            FROM sales
            WHERE owner_id = ?1
            ORDER BY timestamp IS NULL, timestamp DESC, created_at DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        let total = rows.len();
        let sales: Vec<Sale> = rows.into_iter().filter_map(SaleRow::into_sale).collect();

        debug!(owner_id = %owner_id, count = sales.len(), skipped = total - sales.len(), "Listed sales");
        Ok(sales)
    }

    /// Records a sale draft atomically.
    ///
    /// ## Transaction
    /// ```text
    /// BEGIN
    ///   INSERT sale document (server timestamp)
    ///   for each delta:
    ///     UPDATE items SET stock = stock + delta
    ///     0 rows? ──► ROLLBACK, NotFound(item)
    /// COMMIT ── failure? ──► TransactionFailed
    /// ```
    ///
    /// Any error drops the transaction, which rolls it back: either the sale
    /// and every decrement are applied, or none of them. Never retried.
    pub async fn insert_draft(&self, owner_id: &str, draft: &SaleDraft) -> DbResult<String> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let sale = draft.to_sale(id.clone(), now);
        let document = serde_json::to_string(&sale_to_document(&sale))?;

        debug!(owner_id = %owner_id, id = %id, lines = draft.lines.len(), "Recording sale");

        let mut tx = self.pool.begin().await.map_err(tx_failed)?;

        sqlx::query(
            r#"
            INSERT INTO sales (owner_id, id, document, payment_method, timestamp, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(owner_id)
        .bind(&id)
        .bind(&document)
        .bind(sale.payment_method)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(tx_failed)?;

        for delta in &draft.stock_deltas {
            let result = sqlx::query(
                "UPDATE items SET stock = stock + ?3 WHERE owner_id = ?1 AND id = ?2",
            )
            .bind(owner_id)
            .bind(&delta.item_id)
            .bind(delta.delta)
            .execute(&mut *tx)
            .await
            .map_err(tx_failed)?;

            if result.rows_affected() == 0 {
                tx.rollback().await.map_err(tx_failed)?;
                warn!(owner_id = %owner_id, item_id = %delta.item_id, "Sale references a missing item, rolled back");
                return Err(DbError::not_found("Item", &delta.item_id));
            }
        }

        tx.commit().await.map_err(tx_failed)?;

        info!(
            owner_id = %owner_id,
            id = %id,
            total = %sale.total_amount,
            payment_method = %sale.payment_method,
            "Sale recorded"
        );

        self.feed.publish(owner_id, Collection::Sales);
        self.feed.publish(owner_id, Collection::Items);
        Ok(id)
    }

    /// Marks an unpaid sale as paid. Touches only the payment field.
    ///
    /// ## Errors
    /// - `NotFound` for an unknown sale
    /// - `Core(InvalidPaymentTransition)` when the sale is not unpaid
    pub async fn mark_paid(&self, owner_id: &str, sale_id: &str) -> DbResult<()> {
        let from = self
            .payment_method(owner_id, sale_id)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", sale_id))?;
        self.settle(owner_id, sale_id, from).await
    }

    /// Current payment state of a sale, `None` when it does not exist.
    async fn payment_method(&self, owner_id: &str, sale_id: &str) -> DbResult<Option<PaymentMethod>> {
        let current: Option<String> = sqlx::query_scalar(
            "SELECT payment_method FROM sales WHERE owner_id = ?1 AND id = ?2",
        )
        .bind(owner_id)
        .bind(sale_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(current.map(|label| PaymentMethod::from_label(&label).unwrap_or(PaymentMethod::Paid)))
    }

    /// Settles a sale last seen in state `from`. The update is guarded on
    /// that state, so a concurrent settle loses cleanly and the error
    /// reports the state found afterwards.
    async fn settle(&self, owner_id: &str, sale_id: &str, from: PaymentMethod) -> DbResult<()> {
        let to = from.mark_paid(sale_id)?;

        let result = sqlx::query(
            r#"
            UPDATE sales SET
                payment_method = ?3,
                document = json_set(document, '$.paymentMethod', ?3)
            WHERE owner_id = ?1 AND id = ?2 AND payment_method = ?4
            "#,
        )
        .bind(owner_id)
        .bind(sale_id)
        .bind(to)
        .bind(from)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let observed = self
                .payment_method(owner_id, sale_id)
                .await?
                .ok_or_else(|| DbError::not_found("Sale", sale_id))?;
            warn!(owner_id = %owner_id, id = %sale_id, from = %from, observed = %observed, "Sale changed before it was settled");
            return Err(CoreError::InvalidPaymentTransition {
                sale_id: sale_id.to_string(),
                from: observed,
                to,
            }
            .into());
        }

        info!(owner_id = %owner_id, id = %sale_id, "Sale marked as paid");
        self.feed.publish(owner_id, Collection::Sales);
        Ok(())
    }

    /// Stores a raw document under `id`, replacing any existing one.
    ///
    /// The document is kept verbatim; only the indexed columns are derived
    /// from its normalised form.
    pub async fn import(&self, owner_id: &str, id: &str, document: &Value) -> DbResult<Sale> {
        let sale = normalize_sale(id, document, None);
        let raw = serde_json::to_string(document)?;

        debug!(owner_id = %owner_id, id = %id, legacy = sale.lines.is_legacy(), "Importing sale document");

        sqlx::query(
            r#"
            INSERT INTO sales (owner_id, id, document, payment_method, timestamp, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT (owner_id, id) DO UPDATE SET
                document       = excluded.document,
                payment_method = excluded.payment_method,
                timestamp      = excluded.timestamp
            "#,
        )
        .bind(owner_id)
        .bind(id)
        .bind(&raw)
        .bind(sale.payment_method)
        .bind(sale.timestamp)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        self.feed.publish(owner_id, Collection::Sales);
        Ok(sale)
    }

    /// Counts the stored sale documents of an owner, readable or not.
    pub async fn count(&self, owner_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales WHERE owner_id = ?1")
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

fn tx_failed(err: sqlx::Error) -> DbError {
    DbError::TransactionFailed(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use serde_json::json;
    use storefront_core::{build_sale_draft, Cart, Money, NewItem, SaleMeta};

    async fn setup() -> (Database, storefront_core::Item) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let pen = db
            .items()
            .insert(
                "owner-1",
                NewItem {
                    name: "Pen".to_string(),
                    selling_price: Money::from_cents(1000),
                    cost_price: Money::from_cents(400),
                    stock: 50,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        (db, pen)
    }

    fn draft_for(item: &storefront_core::Item, qty: i64, method: PaymentMethod) -> SaleDraft {
        let mut cart = Cart::new();
        cart.add_item(item, qty).unwrap();
        build_sale_draft(&cart, SaleMeta::new(method)).unwrap()
    }

    #[tokio::test]
    async fn test_insert_draft_writes_sale_and_stock() {
        let (db, pen) = setup().await;

        let id = db
            .sales()
            .insert_draft("owner-1", &draft_for(&pen, 3, PaymentMethod::Paid))
            .await
            .unwrap();

        let sale = db.sales().get("owner-1", &id).await.unwrap().unwrap();
        assert_eq!(sale.total_amount.cents(), 3000);
        assert!(sale.timestamp.is_some());
        assert_eq!(sale.lines.lines()[0].item_id.as_deref(), Some(pen.id.as_str()));

        let pen = db.items().get("owner-1", &pen.id).await.unwrap().unwrap();
        assert_eq!(pen.stock, 47);
    }

    #[tokio::test]
    async fn test_missing_item_rolls_back_everything() {
        let (db, pen) = setup().await;
        let mut ink = pen.clone();
        ink.id = "ink".to_string();
        ink.name = "Ink".to_string();

        let mut cart = Cart::new();
        cart.add_item(&pen, 2).unwrap();
        cart.add_item(&ink, 1).unwrap();
        let draft = build_sale_draft(&cart, SaleMeta::new(PaymentMethod::Paid)).unwrap();

        let err = db.sales().insert_draft("owner-1", &draft).await.unwrap_err();

        assert!(matches!(err, DbError::NotFound { .. }));
        assert_eq!(db.sales().count("owner-1").await.unwrap(), 0);
        let pen = db.items().get("owner-1", &pen.id).await.unwrap().unwrap();
        assert_eq!(pen.stock, 50);
    }

    #[tokio::test]
    async fn test_stock_can_go_negative() {
        let (db, pen) = setup().await;
        // two carts built from the same snapshot of 50
        let draft = draft_for(&pen, 30, PaymentMethod::Paid);
        db.sales().insert_draft("owner-1", &draft).await.unwrap();
        db.sales().insert_draft("owner-1", &draft).await.unwrap();

        let pen = db.items().get("owner-1", &pen.id).await.unwrap().unwrap();
        assert_eq!(pen.stock, -10);
    }

    #[tokio::test]
    async fn test_mark_paid_transitions() {
        let (db, pen) = setup().await;
        let repo = db.sales();
        let unpaid = repo
            .insert_draft("owner-1", &draft_for(&pen, 1, PaymentMethod::Unpaid))
            .await
            .unwrap();
        let upi = repo
            .insert_draft("owner-1", &draft_for(&pen, 1, PaymentMethod::Upi))
            .await
            .unwrap();

        repo.mark_paid("owner-1", &unpaid).await.unwrap();
        let sale = repo.get("owner-1", &unpaid).await.unwrap().unwrap();
        assert_eq!(sale.payment_method, PaymentMethod::Paid);
        assert_eq!(sale.total_amount.cents(), 1000);

        // paid → paid and upi → paid are both rejected
        assert!(matches!(
            repo.mark_paid("owner-1", &unpaid).await,
            Err(DbError::Core(CoreError::InvalidPaymentTransition { .. }))
        ));
        assert!(matches!(
            repo.mark_paid("owner-1", &upi).await,
            Err(DbError::Core(CoreError::InvalidPaymentTransition { .. }))
        ));
        assert!(matches!(
            repo.mark_paid("owner-1", "missing").await,
            Err(DbError::NotFound { .. })
        ));

        // stock untouched by the payment update
        let pen = db.items().get("owner-1", &pen.id).await.unwrap().unwrap();
        assert_eq!(pen.stock, 48);
    }

    #[tokio::test]
    async fn test_settle_reports_state_found_after_losing_race() {
        let (db, pen) = setup().await;
        let repo = db.sales();
        let id = repo
            .insert_draft("owner-1", &draft_for(&pen, 1, PaymentMethod::Upi))
            .await
            .unwrap();

        // last seen as unpaid, but already settled by UPI in the meantime
        match repo.settle("owner-1", &id, PaymentMethod::Unpaid).await {
            Err(DbError::Core(CoreError::InvalidPaymentTransition { from, to, .. })) => {
                assert_eq!(from, PaymentMethod::Upi);
                assert_eq!(to, PaymentMethod::Paid);
            }
            other => panic!("unexpected result {:?}", other),
        }

        // deleted before the update
        assert!(matches!(
            repo.settle("owner-1", "gone", PaymentMethod::Unpaid).await,
            Err(DbError::NotFound { .. })
        ));

        let sale = repo.get("owner-1", &id).await.unwrap().unwrap();
        assert_eq!(sale.payment_method, PaymentMethod::Upi);
    }

    #[tokio::test]
    async fn test_import_legacy_document_and_mark_paid() {
        let (db, _) = setup().await;
        let repo = db.sales();
        let doc = json!({
            "itemId": "pen",
            "itemName": "Pen",
            "quantity": 2,
            "unitPrice": 10,
            "total": 20,
            "paymentMethod": {"paymentMethod": "pending"},
            "timestamp": {"_seconds": 1710498600, "_nanoseconds": 0}
        });

        let sale = repo.import("owner-1", "legacy-1", &doc).await.unwrap();
        assert!(sale.lines.is_legacy());
        assert_eq!(sale.payment_method, PaymentMethod::Unpaid);

        repo.mark_paid("owner-1", "legacy-1").await.unwrap();
        let sale = repo.get("owner-1", "legacy-1").await.unwrap().unwrap();
        assert_eq!(sale.payment_method, PaymentMethod::Paid);
        assert_eq!(sale.total_amount.cents(), 2000);
    }

    #[tokio::test]
    async fn test_list_skips_unreadable_documents() {
        let (db, pen) = setup().await;
        db.sales()
            .insert_draft("owner-1", &draft_for(&pen, 1, PaymentMethod::Paid))
            .await
            .unwrap();
        sqlx::query(
            "INSERT INTO sales (owner_id, id, document, created_at) VALUES ('owner-1', 'bad', '{not json', '2024-01-01T00:00:00Z')",
        )
        .execute(db.pool())
        .await
        .unwrap();

        let sales = db.sales().list("owner-1").await.unwrap();
        assert_eq!(sales.len(), 1);
        assert_eq!(db.sales().count("owner-1").await.unwrap(), 2);
    }
}
