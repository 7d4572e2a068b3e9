use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::{DepthSnapshot, NewOrder, Order, OrderId};

#[derive(Debug, Deserialize)]
pub struct TradingQuery {
    /// View selector: orders, depth or trades
    #[serde(rename = "type")]
    pub view: Option<String>,
    pub crop: Option<String>,
}

/// Tagged POST body. Each action carries exactly the payload it needs, so
/// malformed requests are rejected at deserialization instead of deep in
/// the engine.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TradingRequest {
    PlaceOrder {
        #[serde(rename = "orderData")]
        order_data: NewOrder,
    },
    CancelOrder {
        #[serde(rename = "orderData")]
        order_data: OrderRef,
    },
    GetOrderStatus {
        #[serde(rename = "orderData")]
        order_data: OrderRef,
    },
    SimulateTrading,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderRef {
    pub id: OrderId,
}

#[derive(Debug, Serialize)]
pub struct OrdersResponse {
    pub orders: Vec<Order>,
    pub total: usize,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct DepthResponse {
    #[serde(rename = "marketDepth")]
    pub market_depth: DepthSnapshot,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct TradesResponse {
    pub trades: Vec<Order>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub message: String,
    pub order: Order,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct OrderStatusResponse {
    pub order: Order,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_order_request_parses() {
        let body = serde_json::json!({
            "action": "place_order",
            "orderData": {
                "crop": "wheat",
                "type": "buy",
                "quantity": 100,
                "price": 2150
            }
        });
        let request: TradingRequest = serde_json::from_value(body).unwrap();
        match request {
            TradingRequest::PlaceOrder { order_data } => {
                assert_eq!(order_data.crop, "wheat");
                assert_eq!(order_data.quantity, 100);
                assert!(order_data.trader.is_none());
            }
            other => panic!("unexpected request: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_action_rejected() {
        let body = serde_json::json!({ "action": "settle_trades" });
        assert!(serde_json::from_value::<TradingRequest>(body).is_err());
    }

    #[test]
    fn test_cancel_requires_order_data() {
        let body = serde_json::json!({ "action": "cancel_order" });
        assert!(serde_json::from_value::<TradingRequest>(body).is_err());
    }
}
