use parking_lot::RwLock;
use tracing::debug;

use crate::engine::error::{EngineError, EngineResult};
use crate::engine::types::{Order, OrderId, OrderStatus};

/// Insertion-ordered log of every submitted order, regardless of outcome.
///
/// This is the process-wide replacement for the ad-hoc global order array:
/// it is injected into the matcher at construction and can be cleared
/// between tests. Resting orders are intentionally duplicated between this
/// log and the book's aggregate levels; the log is a read model, not the
/// source of book liquidity.
#[derive(Debug, Default)]
pub struct OrderStore {
    orders: RwLock<Vec<Order>>,
}

impl OrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, order: Order) {
        debug!(id = %order.id, crop = %order.crop, status = ?order.status, "order recorded");
        self.orders.write().push(order);
    }

    pub fn get(&self, id: &OrderId) -> Option<Order> {
        self.orders.read().iter().find(|o| &o.id == id).cloned()
    }

    /// All orders in insertion order, optionally filtered by crop.
    pub fn list(&self, crop: Option<&str>) -> Vec<Order> {
        self.orders
            .read()
            .iter()
            .filter(|o| crop.map_or(true, |c| o.crop == c))
            .cloned()
            .collect()
    }

    /// Most recent filled orders, newest first, truncated to `limit`.
    pub fn recent_trades(&self, crop: Option<&str>, limit: usize) -> Vec<Order> {
        let mut trades: Vec<Order> = self
            .orders
            .read()
            .iter()
            .filter(|o| o.status == OrderStatus::Filled)
            .filter(|o| crop.map_or(true, |c| o.crop == c))
            .cloned()
            .collect();
        trades.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        trades.truncate(limit);
        trades
    }

    /// Transition a pending order to cancelled. Filled orders are terminal
    /// and stay untouched; cancelling twice is a no-op success.
    pub fn cancel(&self, id: &OrderId) -> EngineResult<Order> {
        let mut orders = self.orders.write();
        let order = orders
            .iter_mut()
            .find(|o| &o.id == id)
            .ok_or(EngineError::OrderNotFound)?;

        if order.status == OrderStatus::Filled {
            return Err(EngineError::OrderNotCancellable);
        }

        order.cancel();
        Ok(order.clone())
    }

    pub fn len(&self) -> usize {
        self.orders.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.read().is_empty()
    }

    /// Test-teardown hook; the store holds no other process state.
    pub fn clear(&self) {
        self.orders.write().clear();
    }
}
