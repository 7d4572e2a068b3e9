use chrono::Utc;
use tracing::debug;

use crate::engine::types::{DepthSnapshot, LastTrade, Price, PriceLevel, Quantity, Side};

/// How an incoming order is matched against resting liquidity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchStrategy {
    /// Match against the single best-priced opposing level only. An order
    /// larger than that level rests in full, even if deeper levels could
    /// absorb it.
    #[default]
    BestLevelOnly,

    /// Walk crossing levels best-first. The order still fills all-or-nothing:
    /// if the crossing depth cannot cover it, the whole order rests.
    SweepBook,
}

/// Result of submitting an order against a book.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    /// Fully filled; execution price is the resting level's price (the last
    /// leg's price when sweeping).
    Filled { execution_price: Price },

    /// Not filled; the full quantity now rests on the order's own side.
    Rested,
}

/// Per-instrument resting liquidity and rolling market statistics.
///
/// Bids are kept strictly descending by price and asks strictly ascending,
/// with at most one level per price on a side. A level is removed the
/// moment its aggregate quantity reaches zero.
#[derive(Debug, Clone)]
pub struct Book {
    pub crop: String,
    bids: Vec<PriceLevel>,
    asks: Vec<PriceLevel>,
    last_trade: Option<LastTrade>,
    volume_24h: Quantity,
    high_24h: Price,
    low_24h: Price,
}

impl Book {
    pub fn empty(crop: String) -> Self {
        Self {
            crop,
            bids: Vec::new(),
            asks: Vec::new(),
            last_trade: None,
            volume_24h: 0,
            high_24h: 0,
            low_24h: 0,
        }
    }

    /// Demo book with the starter ladder every new instrument gets.
    pub fn seeded(crop: String) -> Self {
        let mut book = Self::empty(crop);
        book.bids = vec![
            PriceLevel {
                price: 2100,
                quantity: 100,
                order_count: 5,
            },
            PriceLevel {
                price: 2095,
                quantity: 150,
                order_count: 8,
            },
            PriceLevel {
                price: 2090,
                quantity: 200,
                order_count: 12,
            },
        ];
        book.asks = vec![
            PriceLevel {
                price: 2160,
                quantity: 120,
                order_count: 6,
            },
            PriceLevel {
                price: 2165,
                quantity: 180,
                order_count: 9,
            },
            PriceLevel {
                price: 2170,
                quantity: 250,
                order_count: 15,
            },
        ];
        book.last_trade = Some(LastTrade {
            price: 2150,
            quantity: 50,
            timestamp: Utc::now(),
        });
        book
    }

    /// Match an incoming order, mutating the book. Fills are all-or-nothing;
    /// anything that does not fill rests at its full original quantity.
    pub fn submit(
        &mut self,
        side: Side,
        limit: Price,
        quantity: Quantity,
        strategy: MatchStrategy,
    ) -> MatchOutcome {
        match strategy {
            MatchStrategy::BestLevelOnly => self.match_best_level(side, limit, quantity),
            MatchStrategy::SweepBook => self.match_sweep(side, limit, quantity),
        }
    }

    fn match_best_level(&mut self, side: Side, limit: Price, quantity: Quantity) -> MatchOutcome {
        // Opposing sides are sorted best-first, so only the front level can
        // cross; if it doesn't, no deeper level can either.
        let best = match side {
            Side::Buy => self.asks.first().filter(|level| level.price <= limit),
            Side::Sell => self.bids.first().filter(|level| level.price >= limit),
        };

        let Some(best) = best.copied() else {
            self.rest(side, limit, quantity);
            return MatchOutcome::Rested;
        };

        if best.quantity < quantity {
            // Insufficient resting quantity at the best level: no partial
            // execution, the whole order becomes book liquidity.
            self.rest(side, limit, quantity);
            return MatchOutcome::Rested;
        }

        let opposing = match side {
            Side::Buy => &mut self.asks,
            Side::Sell => &mut self.bids,
        };
        opposing[0].quantity -= quantity;
        if opposing[0].quantity == 0 {
            opposing.remove(0);
        }

        self.record_fill(best.price, quantity);
        debug!(
            crop = %self.crop,
            %side,
            price = best.price,
            quantity,
            "order filled at best level"
        );
        MatchOutcome::Filled {
            execution_price: best.price,
        }
    }

    fn match_sweep(&mut self, side: Side, limit: Price, quantity: Quantity) -> MatchOutcome {
        if self.crossing_depth(side, limit) < quantity {
            self.rest(side, limit, quantity);
            return MatchOutcome::Rested;
        }

        let opposing = match side {
            Side::Buy => &mut self.asks,
            Side::Sell => &mut self.bids,
        };

        let mut remaining = quantity;
        let mut legs: Vec<(Price, Quantity)> = Vec::new();
        while remaining > 0 {
            let take = remaining.min(opposing[0].quantity);
            opposing[0].quantity -= take;
            remaining -= take;
            legs.push((opposing[0].price, take));
            if opposing[0].quantity == 0 {
                opposing.remove(0);
            }
        }

        let mut execution_price = limit;
        for (price, qty) in legs {
            self.record_fill(price, qty);
            execution_price = price;
        }
        debug!(
            crop = %self.crop,
            %side,
            price = execution_price,
            quantity,
            "order filled sweeping the book"
        );
        MatchOutcome::Filled { execution_price }
    }

    /// Total opposing quantity at prices crossing the limit.
    fn crossing_depth(&self, side: Side, limit: Price) -> Quantity {
        let crosses = |price: Price| match side {
            Side::Buy => price <= limit,
            Side::Sell => price >= limit,
        };
        let opposing = match side {
            Side::Buy => &self.asks,
            Side::Sell => &self.bids,
        };
        opposing
            .iter()
            .take_while(|level| crosses(level.price))
            .map(|level| level.quantity)
            .sum()
    }

    /// Merge the quantity into the order's own side, creating the level if
    /// no resting liquidity exists at that price yet.
    fn rest(&mut self, side: Side, price: Price, quantity: Quantity) {
        let levels = match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };

        if let Some(level) = levels.iter_mut().find(|level| level.price == price) {
            level.quantity += quantity;
            level.order_count += 1;
        } else {
            levels.push(PriceLevel::new(price, quantity));
            match side {
                Side::Buy => levels.sort_by(|a, b| b.price.cmp(&a.price)),
                Side::Sell => levels.sort_by(|a, b| a.price.cmp(&b.price)),
            }
        }
        debug!(crop = %self.crop, %side, price, quantity, "order rested in book");
    }

    fn record_fill(&mut self, price: Price, quantity: Quantity) {
        self.last_trade = Some(LastTrade {
            price,
            quantity,
            timestamp: Utc::now(),
        });
        self.volume_24h += quantity;
        self.high_24h = self.high_24h.max(price);
        self.low_24h = if self.low_24h == 0 {
            price
        } else {
            self.low_24h.min(price)
        };
    }

    pub fn best_bid(&self) -> Option<Price> {
        self.bids.first().map(|level| level.price)
    }

    pub fn best_ask(&self) -> Option<Price> {
        self.asks.first().map(|level| level.price)
    }

    pub fn spread(&self) -> Option<Price> {
        match (self.best_ask(), self.best_bid()) {
            (Some(ask), Some(bid)) if ask > bid => Some(ask - bid),
            _ => None,
        }
    }

    pub fn bid_levels(&self) -> usize {
        self.bids.len()
    }

    pub fn ask_levels(&self) -> usize {
        self.asks.len()
    }

    pub fn volume_24h(&self) -> Quantity {
        self.volume_24h
    }

    pub fn last_trade(&self) -> Option<LastTrade> {
        self.last_trade
    }

    /// Owned copy of the current book state; mutating it does not touch the
    /// live book.
    pub fn depth_snapshot(&self) -> DepthSnapshot {
        DepthSnapshot {
            crop: self.crop.clone(),
            bids: self.bids.clone(),
            asks: self.asks.clone(),
            last_trade: self.last_trade,
            volume_24h: self.volume_24h,
            high_24h: self.high_24h,
            low_24h: self.low_24h,
        }
    }
}
