//! # Document Normalisation
//!
//! Reads raw store documents (JSON) into the typed domain model, and writes
//! sales back out in the shape other clients of the same store expect.
//!
//! ## Tolerated Shapes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Sale documents                                                         │
//! │                                                                         │
//! │  Grouped (cart)                   Legacy (single item)                  │
//! │  ─────────────                    ────────────────────                  │
//! │  { items: [                       { itemId, itemName,                   │
//! │      { itemId, itemName,            quantity, unitPrice,                │
//! │        quantity, unitPrice,         total,                              │
//! │        total } ],                   paymentMethod,                      │
//! │    totalAmount,                     timestamp }                         │
//! │    paymentMethod,                                                       │
//! │    buyerName, buyerNumber,                 │                            │
//! │    timestamp }                             │                            │
//! │         │                                  │                            │
//! │         ▼                                  ▼                            │
//! │  SaleLines::Grouped(..)           SaleLines::Legacy(..)                 │
//! │                                                                         │
//! │  Field coercion (never an error):                                       │
//! │  • numbers: JSON number | numeric string | anything else → 0           │
//! │  • paymentMethod: "upi" | {paymentMethod: "upi"} | unknown → paid      │
//! │  • timestamp: RFC 3339 | epoch millis | {_seconds, _nanoseconds}       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};

use crate::money::Money;
use crate::types::{BusinessProfile, Item, LineItem, PaymentMethod, Sale, SaleLines};

// =============================================================================
// Sales
// =============================================================================

/// Normalises a sale document.
///
/// `fallback_timestamp` is used when the document itself carries no
/// resolvable timestamp (e.g. the storage layer tracked it separately).
pub fn normalize_sale(id: &str, doc: &Value, fallback_timestamp: Option<DateTime<Utc>>) -> Sale {
    let lines = match doc.get("items").and_then(Value::as_array) {
        Some(items) => SaleLines::Grouped(items.iter().map(normalize_line).collect()),
        None => SaleLines::Legacy(normalize_line(doc)),
    };

    let mut total_amount = money(doc.get("totalAmount"));
    if total_amount.is_zero() && lines.is_legacy() {
        total_amount = money(doc.get("total"));
    }

    Sale {
        id: id.to_string(),
        lines,
        total_amount,
        payment_method: payment_method(doc.get("paymentMethod")),
        buyer_name: text(doc.get("buyerName")),
        buyer_number: text(doc.get("buyerNumber")),
        timestamp: timestamp(doc.get("timestamp")).or(fallback_timestamp),
    }
}

fn normalize_line(doc: &Value) -> LineItem {
    let quantity = quantity(first(doc, &["quantity", "qty"]));
    let unit_price = money(first(doc, &["unitPrice", "price"]));
    let stated = money(first(doc, &["total", "lineTotal"]));

    LineItem {
        item_id: text(doc.get("itemId")),
        item_name: text(first(doc, &["itemName", "name"])).unwrap_or_default(),
        quantity,
        unit_price,
        line_total: if stated.is_zero() {
            unit_price.multiply_quantity(quantity)
        } else {
            stated
        },
    }
}

/// Writes a sale in the document shape it was read from.
///
/// Grouped sales get an `items` array and `totalAmount`; legacy sales keep
/// their flat fields and `total`. Amounts are written as plain decimals.
pub fn sale_to_document(sale: &Sale) -> Value {
    let mut doc = match &sale.lines {
        SaleLines::Grouped(lines) => {
            let items: Vec<Value> = lines.iter().map(line_to_document).collect();
            let mut doc = Map::new();
            doc.insert("items".to_string(), Value::Array(items));
            doc.insert("totalAmount".to_string(), json!(sale.total_amount.to_decimal()));
            doc
        }
        SaleLines::Legacy(line) => match line_to_document(line) {
            Value::Object(map) => map,
            _ => Map::new(),
        },
    };

    doc.insert("paymentMethod".to_string(), json!(sale.payment_method.as_str()));
    if let Some(name) = &sale.buyer_name {
        doc.insert("buyerName".to_string(), json!(name));
    }
    if let Some(number) = &sale.buyer_number {
        doc.insert("buyerNumber".to_string(), json!(number));
    }
    if let Some(ts) = sale.timestamp {
        doc.insert("timestamp".to_string(), json!(ts.to_rfc3339()));
    }

    Value::Object(doc)
}

fn line_to_document(line: &LineItem) -> Value {
    json!({
        "itemId": line.item_id,
        "itemName": line.item_name,
        "quantity": line.quantity,
        "unitPrice": line.unit_price.to_decimal(),
        "total": line.line_total.to_decimal(),
    })
}

// =============================================================================
// Items & Settings
// =============================================================================

/// Normalises an item document. Missing dates fall back to `now`.
pub fn normalize_item(id: &str, doc: &Value, now: DateTime<Utc>) -> Item {
    let stock = quantity(doc.get("stock"));
    let initial_stock = match doc.get("initialStock") {
        Some(v) if !v.is_null() => quantity(Some(v)),
        _ => stock,
    };
    let mut cost_price = money(doc.get("costPrice"));
    if cost_price.is_zero() {
        cost_price = money(doc.get("purchasePrice"));
    }

    Item {
        id: id.to_string(),
        name: text(doc.get("name")).unwrap_or_default(),
        category: text(doc.get("category")),
        selling_price: money(doc.get("sellingPrice")),
        cost_price,
        stock,
        initial_stock,
        barcode: text(doc.get("barcode")),
        created_at: timestamp(doc.get("createdAt")).unwrap_or(now),
        updated_at: timestamp(doc.get("updatedAt")).unwrap_or(now),
    }
}

/// Reads a settings blob, flat or nested under `businessDetails`.
pub fn normalize_profile(doc: &Value) -> BusinessProfile {
    let details = doc.get("businessDetails").unwrap_or(doc);
    BusinessProfile {
        business_name: text(details.get("businessName")),
        owner_name: text(details.get("ownerName")),
        phone: text(first(details, &["phone", "contactNumber"])),
        email: text(details.get("email")),
        upi_id: text(details.get("upiId")),
    }
}

// =============================================================================
// Field Coercion
// =============================================================================

fn first<'a>(doc: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| doc.get(*k))
        .find(|v| !v.is_null())
}

fn number(value: Option<&Value>) -> f64 {
    let n = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    if n.is_finite() {
        n
    } else {
        0.0
    }
}

fn money(value: Option<&Value>) -> Money {
    Money::from_decimal(number(value))
}

/// Quantities are whole units; fractions truncate toward zero.
fn quantity(value: Option<&Value>) -> i64 {
    number(value).trunc() as i64
}

fn text(value: Option<&Value>) -> Option<String> {
    let s = match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => return None,
    };
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

fn payment_method(value: Option<&Value>) -> PaymentMethod {
    let label = match value {
        Some(Value::String(s)) => Some(s.as_str()),
        Some(Value::Object(map)) => map.get("paymentMethod").and_then(Value::as_str),
        _ => None,
    };
    label
        .and_then(PaymentMethod::from_label)
        .unwrap_or(PaymentMethod::Paid)
}

/// Resolves the timestamp encodings found in exports.
pub fn timestamp(value: Option<&Value>) -> Option<DateTime<Utc>> {
    match value? {
        Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
            .and_then(DateTime::from_timestamp_millis),
        Value::Object(map) => {
            let seconds = map
                .get("_seconds")
                .or_else(|| map.get("seconds"))
                .and_then(Value::as_i64)?;
            let nanos = map
                .get("_nanoseconds")
                .or_else(|| map.get("nanoseconds"))
                .and_then(Value::as_u64)
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or(0);
            DateTime::from_timestamp(seconds, nanos)
        }
        _ => None,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
