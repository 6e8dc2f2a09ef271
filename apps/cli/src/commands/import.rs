//! `storefront import <file>`: loads a JSON export of the document store.
//!
//! ## Accepted Shape
//! ```text
//! {
//!   "items":       { "<id>": {...}, ... }   or  [ {"id": ..., ...}, ... ]
//!   "sales":       { "<id>": {...}, ... }   or  [ ... ]
//!   "appSettings": { "<owner>": {...} }     or  { ...profile... }
//! }
//! ```
//!
//! Items are upserted as-is, sales are stored verbatim (legacy or current
//! shape) without touching stock, settings are merged.

use std::path::Path;

use anyhow::{bail, Context as _, Result};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use storefront_core::document::normalize_item;
use storefront_db::SaleStore;

use super::Context;

/// Counts of what an import stored.
#[derive(Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub items: usize,
    pub sales: usize,
    pub settings: bool,
}

pub async fn run(ctx: &Context, path: &Path) -> Result<()> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("Cannot read {}", path.display()))?;
    let export: Value = serde_json::from_str(&raw).with_context(|| format!("{} is not valid JSON", path.display()))?;

    let summary = import_export(ctx, &export).await?;
    info!(items = summary.items, sales = summary.sales, settings = summary.settings, "Import complete");

    if ctx.json {
        ctx.print_json(&summary)?;
    } else {
        println!(
            "Imported {} item(s), {} sale(s){}",
            summary.items,
            summary.sales,
            if summary.settings { " and settings" } else { "" }
        );
    }
    Ok(())
}

pub async fn import_export(ctx: &Context, export: &Value) -> Result<ImportSummary> {
    if !export.is_object() {
        bail!("Export must be a JSON object with items, sales or appSettings");
    }
    let owner_id = ctx.session.owner_id();
    let mut summary = ImportSummary::default();

    if let Some(items) = export.get("items") {
        let now = Utc::now();
        for (id, doc) in entries(items) {
            let item = normalize_item(&id, doc, now);
            ctx.db.items().upsert(owner_id, &item).await?;
            summary.items += 1;
        }
    }

    if let Some(sales) = export.get("sales") {
        for (id, doc) in entries(sales) {
            ctx.db.import_document(&ctx.session, &id, doc).await?;
            summary.sales += 1;
        }
    }

    if let Some(settings) = export.get("appSettings").or_else(|| export.get("settings")) {
        let doc = settings.get(owner_id).filter(|v| v.is_object()).unwrap_or(settings);
        ctx.db.settings().import(owner_id, doc).await?;
        summary.settings = true;
    }

    Ok(summary)
}

/// `(id, document)` pairs of a collection given as an id-keyed object or an
/// array. Array entries without a string `id` get a fresh one; entries that
/// are not objects are skipped.
pub fn entries(collection: &Value) -> Vec<(String, &Value)> {
    match collection {
        Value::Object(map) => map
            .iter()
            .filter(|(_, doc)| doc.is_object())
            .map(|(id, doc)| (id.clone(), doc))
            .collect(),
        Value::Array(docs) => docs
            .iter()
            .filter(|doc| doc.is_object())
            .map(|doc| {
                let id = doc
                    .get("id")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| Uuid::new_v4().to_string());
                (id, doc)
            })
            .collect(),
        other => {
            warn!(kind = %json_kind(other), "Ignoring collection that is neither an object nor an array");
            Vec::new()
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use serde_json::json;
    use std::path::PathBuf;
    use storefront_core::{PaymentMethod, Session};
    use storefront_db::{Database, DbConfig, ItemStore, SettingsStore};

    async fn context() -> Context {
        Context {
            db: Database::new(DbConfig::in_memory()).await.unwrap(),
            session: Session::new("owner-1").unwrap(),
            config: AppConfig {
                db_path: PathBuf::from(":memory:"),
                owner_id: "owner-1".to_string(),
                currency_symbol: "₹".to_string(),
            },
            json: false,
        }
    }

    #[test]
    fn test_entries_from_map_and_array() {
        let map = json!({"a": {"name": "Pen"}, "b": 5});
        let ids: Vec<String> = entries(&map).into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["a"]);

        let array = json!([{"id": "x", "name": "Pen"}, {"name": "Ink"}, "junk"]);
        let found = entries(&array);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].0, "x");
        assert!(!found[1].0.is_empty());

        assert!(entries(&json!("nope")).is_empty());
    }

    #[tokio::test]
    async fn test_import_full_export() {
        let ctx = context().await;
        let export = json!({
            "items": {
                "pen": {"name": "Pen", "sellingPrice": 10, "purchasePrice": 4, "stock": 47, "initialStock": 50}
            },
            "sales": {
                "s1": {
                    "items": [{"itemId": "pen", "itemName": "Pen", "quantity": 3, "unitPrice": 10, "total": 30}],
                    "totalAmount": 30,
                    "paymentMethod": "unpaid",
                    "timestamp": "2024-03-15T10:30:00Z"
                },
                "s2": {"itemId": "pen", "itemName": "Pen", "quantity": 1, "unitPrice": 10, "total": 10}
            },
            "appSettings": {"owner-1": {"businessDetails": {"businessName": "Corner Shop"}}}
        });

        let summary = import_export(&ctx, &export).await.unwrap();
        assert_eq!(
            summary,
            ImportSummary {
                items: 1,
                sales: 2,
                settings: true
            }
        );

        let pen = ctx.db.get_item(&ctx.session, "pen").await.unwrap().unwrap();
        assert_eq!(pen.cost_price.cents(), 400);
        assert_eq!(pen.initial_stock, 50);
        // importing sales never touches stock
        assert_eq!(pen.stock, 47);

        let s1 = ctx.db.get_sale(&ctx.session, "s1").await.unwrap().unwrap();
        assert_eq!(s1.payment_method, PaymentMethod::Unpaid);
        let s2 = ctx.db.get_sale(&ctx.session, "s2").await.unwrap().unwrap();
        assert!(s2.lines.is_legacy());

        let profile = ctx.db.load_settings(&ctx.session).await.unwrap();
        assert_eq!(profile.business_name.as_deref(), Some("Corner Shop"));
    }

    #[tokio::test]
    async fn test_import_rejects_non_object() {
        let ctx = context().await;
        assert!(import_export(&ctx, &json!([1, 2])).await.is_err());
    }
}
