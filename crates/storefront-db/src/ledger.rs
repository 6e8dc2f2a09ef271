//! # Sales Ledger
//!
//! Records a cart as one sale: validation in `storefront-core`, then a
//! single atomic write through a [`SaleStore`].
//!
//! ## Record Flow
//! ```text
//! record_sale(session, cart, meta)
//!      │
//!      ▼
//! build_sale_draft()  ── Err ──► returned as-is, nothing written
//!      │
//!      ▼
//! store.atomic_write(draft)  ── Err ──► returned as-is, nothing applied
//!      │                                (no retry)
//!      ▼
//! Ok(sale_id)
//! ```

use tracing::{debug, info, warn};

use storefront_core::{build_sale_draft, Cart, SaleMeta, Session};

use crate::error::{DbError, DbResult};
use crate::store::SaleStore;

/// Writes sales for a session against any [`SaleStore`].
#[derive(Debug, Clone)]
pub struct SalesLedger<S> {
    store: S,
}

impl<S: SaleStore> SalesLedger<S> {
    pub fn new(store: S) -> Self {
        SalesLedger { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Records `cart` as one sale and returns the new sale id.
    ///
    /// Either the sale document and every stock decrement are stored, or
    /// none of them. The cart itself is left untouched; clearing it after a
    /// success is the caller's job.
    pub async fn record_sale(&self, session: &Session, cart: &Cart, meta: SaleMeta) -> DbResult<String> {
        let draft = build_sale_draft(cart, meta).map_err(DbError::from)?;

        debug!(
            owner_id = %session.owner_id(),
            lines = draft.lines.len(),
            total = %draft.total_amount,
            "Sale draft built"
        );

        match self.store.atomic_write(session, &draft).await {
            Ok(sale_id) => {
                info!(owner_id = %session.owner_id(), sale_id = %sale_id, "Sale committed");
                Ok(sale_id)
            }
            Err(e) => {
                warn!(owner_id = %session.owner_id(), error = %e, "Sale not recorded");
                Err(e)
            }
        }
    }

    /// Settles an unpaid sale.
    pub async fn mark_as_paid(&self, session: &Session, sale_id: &str) -> DbResult<()> {
        self.store.mark_paid(session, sale_id).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
