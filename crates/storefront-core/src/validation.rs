//! # Validation Module
//!
//! Input validation utilities for the storefront ledger.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: CLI argument parsing (clap)                                  │
//! │  └── Type validation (numbers, payment labels)                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Item fields (name, prices, stock)                                 │
//! │  ├── Cart quantities                                                   │
//! │  └── Owner identifiers                                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  └── NOT NULL / PRIMARY KEY constraints                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Validation only guards NEW input. Documents already in the store are
//! never rejected; see [`crate::document`].
//!
//! ## Usage
//! ```rust
//! use storefront_core::validation::{validate_item_name, validate_quantity};
//!
//! validate_item_name("Pen").unwrap();
//! validate_quantity(5).unwrap();
//! assert!(validate_quantity(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{ItemUpdate, NewItem};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted item name, in characters.
pub const MAX_ITEM_NAME_LEN: usize = 200;

/// Longest accepted owner identifier, in characters.
pub const MAX_OWNER_ID_LEN: usize = 128;

// =============================================================================
// String Validators
// =============================================================================

/// Validates an item name.
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - At most 200 characters
///
/// ## Example
/// ```rust
/// use storefront_core::validation::validate_item_name;
///
/// assert!(validate_item_name("Blue Pen").is_ok());
/// assert!(validate_item_name("   ").is_err());
/// ```
pub fn validate_item_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > MAX_ITEM_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_ITEM_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates the identifier that scopes every query to one owner.
///
/// ## Rules
/// - Must not be empty
/// - At most 128 characters
/// - Must not contain `/` (the id is a single path segment in the store)
pub fn validate_owner_id(owner_id: &str) -> ValidationResult<()> {
    if owner_id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "owner id".to_string(),
        });
    }

    if owner_id.chars().count() > MAX_OWNER_ID_LEN {
        return Err(ValidationError::TooLong {
            field: "owner id".to_string(),
            max: MAX_OWNER_ID_LEN,
        });
    }

    if owner_id.contains('/') {
        return Err(ValidationError::InvalidFormat {
            field: "owner id".to_string(),
            reason: "must not contain '/'".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity value.
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Cart: Add Item                                                         │
/// │                                                                         │
/// │  Operator enters quantity: 5                                           │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_quantity(5) ← THIS FUNCTION                                  │
/// │       │                                                                 │
/// │       ├── qty <= 0? → Error: "quantity must be positive"               │
/// │       │                                                                 │
/// │       └── OK → stock check against the item snapshot                   │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates a price. Zero is allowed (free items, unknown cost).
///
/// ## Example
/// ```rust
/// use storefront_core::money::Money;
/// use storefront_core::validation::validate_price;
///
/// assert!(validate_price("selling price", Money::from_cents(1000)).is_ok());
/// assert!(validate_price("selling price", Money::from_cents(-1)).is_err());
/// ```
pub fn validate_price(field: &str, price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a stock level entered by the operator.
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::OutOfRange {
            field: "stock".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// Composite Validators
// =============================================================================

/// Validates every field of a new item.
pub fn validate_new_item(item: &NewItem) -> ValidationResult<()> {
    validate_item_name(&item.name)?;
    validate_price("selling price", item.selling_price)?;
    validate_price("cost price", item.cost_price)?;
    validate_stock(item.stock)?;
    Ok(())
}

/// Validates the fields present in an item update.
pub fn validate_item_update(update: &ItemUpdate) -> ValidationResult<()> {
    if let Some(name) = &update.name {
        validate_item_name(name)?;
    }
    if let Some(price) = update.selling_price {
        validate_price("selling price", price)?;
    }
    if let Some(price) = update.cost_price {
        validate_price("cost price", price)?;
    }
    if let Some(stock) = update.stock {
        validate_stock(stock)?;
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_item_name() {
        assert!(validate_item_name("Pen").is_ok());
        assert!(validate_item_name("").is_err());
        assert!(validate_item_name(&"x".repeat(201)).is_err());
        assert!(validate_item_name(&"é".repeat(200)).is_ok());
    }

    #[test]
    fn test_validate_owner_id() {
        assert!(validate_owner_id("uid-123").is_ok());
        assert!(matches!(
            validate_owner_id(""),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            validate_owner_id("a/b"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(validate_owner_id(&"u".repeat(129)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(10_000).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
    }

    #[test]
    fn test_validate_new_item() {
        let mut item = NewItem {
            name: "Pen".to_string(),
            selling_price: Money::from_cents(1000),
            cost_price: Money::from_cents(400),
            stock: 50,
            ..Default::default()
        };
        assert!(validate_new_item(&item).is_ok());

        item.stock = -1;
        assert!(validate_new_item(&item).is_err());
    }

    #[test]
    fn test_validate_item_update_only_checks_present_fields() {
        assert!(validate_item_update(&ItemUpdate::default()).is_ok());

        let update = ItemUpdate {
            cost_price: Some(Money::from_cents(-5)),
            ..Default::default()
        };
        assert!(validate_item_update(&update).is_err());
    }
}
