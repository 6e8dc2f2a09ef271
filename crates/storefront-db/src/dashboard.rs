//! # Live Dashboard
//!
//! Keeps [`Metrics`] current by subscribing to both the item and the sale
//! collections and recomputing whenever either snapshot changes.
//!
//! ```text
//! subscribe_items ──► items snapshot ──┐
//!                                      ├──► compute_metrics(items, sales, now) ──► on_metrics
//! subscribe_sales ──► sales snapshot ──┘
//! ```
//!
//! Nothing is emitted until both collections have delivered their first
//! snapshot. Calendar windows use the local time zone at the moment of
//! each recomputation.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::Local;
use tracing::debug;

use storefront_core::{compute_metrics, Item, Metrics, Sale, Session};

use crate::feed::Subscription;
use crate::store::{ItemStore, SaleStore};

type MetricsCallback = Box<dyn FnMut(Metrics) + Send>;

struct DashboardState {
    items: Option<Vec<Item>>,
    sales: Option<Vec<Sale>>,
    latest: Option<Metrics>,
    on_metrics: MetricsCallback,
}

impl DashboardState {
    fn recompute(&mut self) {
        let (Some(items), Some(sales)) = (&self.items, &self.sales) else {
            return;
        };

        let metrics = compute_metrics(items, sales, &Local::now());
        debug!(
            items = metrics.item_count,
            sales = metrics.sale_count,
            today = %metrics.today.revenue,
            "Dashboard metrics recomputed"
        );

        self.latest = Some(metrics.clone());
        (self.on_metrics)(metrics);
    }
}

/// A running dashboard. Dropping it (or calling [`stop`](Self::stop))
/// ends both subscriptions.
pub struct LiveDashboard {
    state: Arc<Mutex<DashboardState>>,
    items_sub: Subscription,
    sales_sub: Subscription,
}

impl LiveDashboard {
    /// Starts watching `session`'s items and sales.
    ///
    /// `on_metrics` runs on the subscription tasks, one call at a time.
    pub fn start<D, F>(store: &D, session: &Session, on_metrics: F) -> Self
    where
        D: ItemStore + SaleStore,
        F: FnMut(Metrics) + Send + 'static,
    {
        let state = Arc::new(Mutex::new(DashboardState {
            items: None,
            sales: None,
            latest: None,
            on_metrics: Box::new(on_metrics),
        }));

        let items_state = Arc::clone(&state);
        let items_sub = store.subscribe_items(session, move |items| {
            let mut state = items_state.lock().unwrap_or_else(PoisonError::into_inner);
            state.items = Some(items);
            state.recompute();
        });

        let sales_state = Arc::clone(&state);
        let sales_sub = store.subscribe_sales(session, move |sales| {
            let mut state = sales_state.lock().unwrap_or_else(PoisonError::into_inner);
            state.sales = Some(sales);
            state.recompute();
        });

        LiveDashboard {
            state,
            items_sub,
            sales_sub,
        }
    }

    /// The most recent metrics, if both snapshots have arrived.
    pub fn latest(&self) -> Option<Metrics> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .latest
            .clone()
    }

    pub fn is_running(&self) -> bool {
        self.items_sub.is_active() && self.sales_sub.is_active()
    }

    /// Stops both subscriptions.
    pub fn stop(self) {
        self.items_sub.unsubscribe();
        self.sales_sub.unsubscribe();
    }
}

impl std::fmt::Debug for LiveDashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveDashboard")
            .field("running", &self.is_running())
            .finish()
    }
}
