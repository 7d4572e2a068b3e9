use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::info;

use crate::engine::book::{Book, MatchOutcome, MatchStrategy};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::store::OrderStore;
use crate::engine::types::{DepthSnapshot, NewOrder, Order, OrderId, Price, Quantity};

/// Trades endpoints return at most this many recent fills.
pub const RECENT_TRADES_LIMIT: usize = 50;

#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    pub strategy: MatchStrategy,
    /// Seed new books with the demo liquidity ladder on first access.
    pub seed_demo_liquidity: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            strategy: MatchStrategy::BestLevelOnly,
            seed_demo_liquidity: true,
        }
    }
}

/// The sole mutator of books. Each submission runs as one critical section
/// per instrument (the book's write lock); cross-instrument submissions run
/// in parallel.
#[derive(Debug)]
pub struct Matcher {
    books: DashMap<String, Arc<RwLock<Book>>>,
    orders: Arc<OrderStore>,
    config: EngineConfig,
}

impl Matcher {
    pub fn new(orders: Arc<OrderStore>, config: EngineConfig) -> Self {
        Self {
            books: DashMap::new(),
            orders,
            config,
        }
    }

    /// Book for `crop`, created on first access.
    pub fn book(&self, crop: &str) -> Arc<RwLock<Book>> {
        self.books
            .entry(crop.to_string())
            .or_insert_with(|| {
                info!("Creating book for crop: {}", crop);
                let book = if self.config.seed_demo_liquidity {
                    Book::seeded(crop.to_string())
                } else {
                    Book::empty(crop.to_string())
                };
                Arc::new(RwLock::new(book))
            })
            .clone()
    }

    /// Validate, match against the opposing side, and record the order.
    /// Returns the order as `filled` on a full match, `pending` otherwise.
    ///
    /// The book mutation and the store append happen under the book's write
    /// lock, so for one crop the log order always matches the order in which
    /// the book was mutated and no reader sees a fill in depth that is
    /// missing from the order views.
    pub fn submit(&self, request: NewOrder) -> EngineResult<Order> {
        let (quantity, price) = Self::validate(&request)?;

        let mut order = Order::new(
            request.crop.clone(),
            request.side,
            quantity,
            price,
            request.trader.unwrap_or_else(|| "anonymous".to_string()),
        );

        let book = self.book(&request.crop);
        {
            let mut book = book.write();
            let outcome = book.submit(request.side, price, quantity, self.config.strategy);
            if let MatchOutcome::Filled { execution_price } = outcome {
                order.fill(execution_price);
            }
            self.orders.insert(order.clone());
        }

        info!(
            id = %order.id,
            crop = %order.crop,
            side = %order.side,
            quantity = order.quantity,
            price = order.price,
            status = ?order.status,
            "order processed"
        );
        Ok(order)
    }

    /// Read-only depth view, initializing the book if absent.
    pub fn depth(&self, crop: &str) -> EngineResult<DepthSnapshot> {
        if crop.trim().is_empty() {
            return Err(EngineError::InvalidSymbol);
        }
        Ok(self.book(crop).read().depth_snapshot())
    }

    pub fn list_orders(&self, crop: Option<&str>) -> Vec<Order> {
        self.orders.list(crop)
    }

    pub fn recent_trades(&self, crop: Option<&str>) -> Vec<Order> {
        self.orders.recent_trades(crop, RECENT_TRADES_LIMIT)
    }

    pub fn cancel(&self, id: &OrderId) -> EngineResult<Order> {
        let order = self.orders.cancel(id)?;
        info!(id = %order.id, "order cancelled");
        Ok(order)
    }

    pub fn order_status(&self, id: &OrderId) -> EngineResult<Order> {
        self.orders.get(id).ok_or(EngineError::OrderNotFound)
    }

    /// Crops with an initialized book.
    pub fn crops(&self) -> Vec<String> {
        self.books.iter().map(|entry| entry.key().clone()).collect()
    }

    // Malformed requests are rejected here, before any book is touched.
    fn validate(request: &NewOrder) -> EngineResult<(Quantity, Price)> {
        if request.crop.trim().is_empty() {
            return Err(EngineError::InvalidSymbol);
        }
        if request.quantity <= 0 {
            return Err(EngineError::InvalidQuantity);
        }
        if request.price <= 0 {
            return Err(EngineError::InvalidPrice);
        }
        Ok((request.quantity as Quantity, request.price as Price))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::{OrderStatus, PriceLevel, Side};

    fn bare_matcher() -> Matcher {
        Matcher::new(
            Arc::new(OrderStore::new()),
            EngineConfig {
                strategy: MatchStrategy::BestLevelOnly,
                seed_demo_liquidity: false,
            },
        )
    }

    fn new_order(crop: &str, side: Side, quantity: i64, price: i64) -> NewOrder {
        NewOrder {
            crop: crop.to_string(),
            side,
            quantity,
            price,
            trader: None,
        }
    }

    #[test]
    fn test_submit_rests_on_empty_book() {
        let matcher = bare_matcher();
        let order = matcher
            .submit(new_order("wheat", Side::Buy, 100, 2150))
            .unwrap();

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.quantity, 100);

        let depth = matcher.depth("wheat").unwrap();
        assert_eq!(
            depth.bids,
            vec![PriceLevel {
                price: 2150,
                quantity: 100,
                order_count: 1
            }]
        );
    }

    #[test]
    fn test_submit_full_fill_against_resting_ask() {
        let matcher = bare_matcher();
        matcher
            .submit(new_order("wheat", Side::Sell, 120, 2160))
            .unwrap();

        let order = matcher
            .submit(new_order("wheat", Side::Buy, 50, 2165))
            .unwrap();
        assert_eq!(order.status, OrderStatus::Filled);
        assert_eq!(order.price, 2160);

        let depth = matcher.depth("wheat").unwrap();
        assert_eq!(depth.asks[0].quantity, 70);
        assert_eq!(depth.last_trade.unwrap().price, 2160);
        assert_eq!(depth.last_trade.unwrap().quantity, 50);
        assert_eq!(depth.volume_24h, 50);
    }

    #[test]
    fn test_submit_insufficient_quantity_rests_whole_order() {
        let matcher = bare_matcher();
        matcher
            .submit(new_order("wheat", Side::Sell, 30, 2160))
            .unwrap();

        let order = matcher
            .submit(new_order("wheat", Side::Buy, 50, 2165))
            .unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.quantity, 50);

        let depth = matcher.depth("wheat").unwrap();
        assert_eq!(depth.asks[0].quantity, 30);
        assert_eq!(depth.bids[0].price, 2165);
        assert_eq!(depth.bids[0].quantity, 50);
    }

    #[test]
    fn test_negative_quantity_rejected_without_mutation() {
        let matcher = bare_matcher();
        let result = matcher.submit(new_order("wheat", Side::Buy, -5, 2150));
        assert_eq!(result, Err(EngineError::InvalidQuantity));

        assert!(matcher.list_orders(None).is_empty());
        assert!(matcher.crops().is_empty());
    }

    #[test]
    fn test_zero_price_rejected() {
        let matcher = bare_matcher();
        assert_eq!(
            matcher.submit(new_order("wheat", Side::Buy, 5, 0)),
            Err(EngineError::InvalidPrice)
        );
        assert_eq!(
            matcher.submit(new_order("", Side::Buy, 5, 2100)),
            Err(EngineError::InvalidSymbol)
        );
    }

    #[test]
    fn test_cancel_filled_order_fails() {
        let matcher = bare_matcher();
        matcher
            .submit(new_order("wheat", Side::Sell, 50, 2160))
            .unwrap();
        let filled = matcher
            .submit(new_order("wheat", Side::Buy, 50, 2160))
            .unwrap();
        assert_eq!(filled.status, OrderStatus::Filled);

        assert_eq!(
            matcher.cancel(&filled.id),
            Err(EngineError::OrderNotCancellable)
        );
        assert_eq!(
            matcher.order_status(&filled.id).unwrap().status,
            OrderStatus::Filled
        );
    }

    #[test]
    fn test_cancel_pending_then_status() {
        let matcher = bare_matcher();
        let order = matcher
            .submit(new_order("wheat", Side::Buy, 100, 2100))
            .unwrap();

        let cancelled = matcher.cancel(&order.id).unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert_eq!(
            matcher.order_status(&order.id).unwrap().status,
            OrderStatus::Cancelled
        );
    }

    #[test]
    fn test_unknown_order_id() {
        let matcher = bare_matcher();
        let id = uuid::Uuid::new_v4();
        assert_eq!(matcher.order_status(&id), Err(EngineError::OrderNotFound));
        assert_eq!(matcher.cancel(&id), Err(EngineError::OrderNotFound));
    }

    #[test]
    fn test_depth_requery_is_idempotent() {
        let matcher = bare_matcher();
        matcher
            .submit(new_order("wheat", Side::Buy, 100, 2100))
            .unwrap();
        matcher
            .submit(new_order("wheat", Side::Sell, 80, 2160))
            .unwrap();

        let first = matcher.depth("wheat").unwrap();
        let second = matcher.depth("wheat").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_seeded_book_on_first_depth_access() {
        let matcher = Matcher::new(Arc::new(OrderStore::new()), EngineConfig::default());
        let depth = matcher.depth("cotton").unwrap();

        assert_eq!(depth.bids.len(), 3);
        assert_eq!(depth.asks.len(), 3);
        assert_eq!(depth.bids[0].price, 2100);
        assert_eq!(depth.asks[0].price, 2160);
        assert_eq!(depth.last_trade.unwrap().price, 2150);
    }

    #[test]
    fn test_trades_view_only_fills() {
        let matcher = bare_matcher();
        matcher
            .submit(new_order("wheat", Side::Sell, 50, 2160))
            .unwrap();
        matcher
            .submit(new_order("wheat", Side::Buy, 50, 2160))
            .unwrap();
        matcher
            .submit(new_order("rice", Side::Buy, 10, 3200))
            .unwrap();

        let trades = matcher.recent_trades(None);
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].status, OrderStatus::Filled);

        let rice_trades = matcher.recent_trades(Some("rice"));
        assert!(rice_trades.is_empty());
    }

    #[test]
    fn test_default_trader_is_anonymous() {
        let matcher = bare_matcher();
        let order = matcher
            .submit(new_order("wheat", Side::Buy, 10, 2100))
            .unwrap();
        assert_eq!(order.trader, "anonymous");
    }

    #[test]
    fn test_cross_instrument_books_are_independent() {
        let matcher = bare_matcher();
        matcher
            .submit(new_order("wheat", Side::Buy, 100, 2100))
            .unwrap();
        matcher
            .submit(new_order("rice", Side::Buy, 100, 3200))
            .unwrap();

        assert!(matcher.depth("wheat").unwrap().asks.is_empty());
        assert_eq!(matcher.depth("rice").unwrap().bids[0].price, 3200);
        let mut crops = matcher.crops();
        crops.sort();
        assert_eq!(crops, vec!["rice".to_string(), "wheat".to_string()]);
    }

    #[test]
    fn test_concurrent_submits_keep_log_and_book_consistent() {
        let matcher = Arc::new(bare_matcher());

        // Each worker rests a sell then crosses it with a buy. Whichever way
        // the submissions interleave, a buy never arrives before at least one
        // unconsumed sell is resting, so every buy fills.
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let matcher = Arc::clone(&matcher);
                std::thread::spawn(move || {
                    matcher
                        .submit(new_order("wheat", Side::Sell, 10, 2160))
                        .unwrap();
                    matcher
                        .submit(new_order("wheat", Side::Buy, 10, 2160))
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let depth = matcher.depth("wheat").unwrap();
        let orders = matcher.list_orders(Some("wheat"));
        let filled: Vec<_> = orders
            .iter()
            .filter(|o| o.status == OrderStatus::Filled)
            .collect();

        assert_eq!(orders.len(), 16);
        assert_eq!(filled.len(), 8);
        assert_eq!(
            depth.volume_24h,
            filled.iter().map(|o| o.quantity).sum::<u64>()
        );
        assert!(depth.asks.is_empty());
        assert!(depth.bids.is_empty());
    }

    #[test]
    fn test_sweep_strategy_configurable() {
        let matcher = Matcher::new(
            Arc::new(OrderStore::new()),
            EngineConfig {
                strategy: MatchStrategy::SweepBook,
                seed_demo_liquidity: false,
            },
        );
        matcher
            .submit(new_order("wheat", Side::Sell, 30, 2160))
            .unwrap();
        matcher
            .submit(new_order("wheat", Side::Sell, 40, 2165))
            .unwrap();

        let order = matcher
            .submit(new_order("wheat", Side::Buy, 50, 2165))
            .unwrap();
        assert_eq!(order.status, OrderStatus::Filled);
        assert_eq!(matcher.depth("wheat").unwrap().volume_24h, 50);
    }
}
