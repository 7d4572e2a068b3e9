use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub type OrderId = Uuid;
pub type Price = u64; // Whole-rupee quotes per quintal
pub type Quantity = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn opposite(&self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Filled,
    Cancelled,
}

impl OrderStatus {
    /// Filled and Cancelled are terminal; only Pending orders may transition.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Filled | OrderStatus::Cancelled)
    }
}

/// A submitted order. Orders either fill completely at submission time or
/// rest in the book at their original quantity; the record itself never
/// carries a partially reduced quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub crop: String,
    #[serde(rename = "type")]
    pub side: Side,
    pub quantity: Quantity,
    pub price: Price,
    pub status: OrderStatus,
    pub timestamp: DateTime<Utc>,
    pub trader: String,
}

impl Order {
    pub fn new(crop: String, side: Side, quantity: Quantity, price: Price, trader: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            crop,
            side,
            quantity,
            price,
            status: OrderStatus::Pending,
            timestamp: Utc::now(),
            trader,
        }
    }

    /// Mark the order fully filled at the resting level's price.
    pub fn fill(&mut self, execution_price: Price) {
        self.price = execution_price;
        self.status = OrderStatus::Filled;
    }

    pub fn cancel(&mut self) {
        self.status = OrderStatus::Cancelled;
    }

    /// Quantity times price, saturating at `u64::MAX`. Validation bounds
    /// each factor at `i64::MAX`, so the product can still exceed `u64`.
    pub fn notional(&self) -> u64 {
        self.quantity.saturating_mul(self.price)
    }
}

/// An order as submitted over the wire, before validation. Quantity and
/// price are signed so that malformed requests reach the validator instead
/// of being rejected by deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    pub crop: String,
    #[serde(rename = "type")]
    pub side: Side,
    pub quantity: i64,
    pub price: i64,
    #[serde(default)]
    pub trader: Option<String>,
}

/// An aggregated price point on one side of the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceLevel {
    pub price: Price,
    pub quantity: Quantity,
    #[serde(rename = "count")]
    pub order_count: u32,
}

impl PriceLevel {
    pub fn new(price: Price, quantity: Quantity) -> Self {
        Self {
            price,
            quantity,
            order_count: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastTrade {
    pub price: Price,
    pub quantity: Quantity,
    pub timestamp: DateTime<Utc>,
}

/// Read-only copy of one instrument's book. Mutating a snapshot has no
/// effect on the live book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepthSnapshot {
    pub crop: String,
    #[serde(rename = "buyOrders")]
    pub bids: Vec<PriceLevel>,
    #[serde(rename = "sellOrders")]
    pub asks: Vec<PriceLevel>,
    #[serde(rename = "lastTrade")]
    pub last_trade: Option<LastTrade>,
    #[serde(rename = "volume24h")]
    pub volume_24h: Quantity,
    #[serde(rename = "high24h")]
    pub high_24h: Price,
    #[serde(rename = "low24h")]
    pub low_24h: Price,
}
