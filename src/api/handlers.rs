use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde_json::json;
use tracing::warn;

use crate::api::error::ApiError;
use crate::api::models::{
    DepthResponse, OrderResponse, OrderStatusResponse, OrdersResponse, TradesResponse,
    TradingQuery, TradingRequest,
};
use crate::api::AppState;
use crate::engine::{simulation, NewOrder, Order, OrderStatus};

pub async fn get_trading(
    State(state): State<AppState>,
    Query(query): Query<TradingQuery>,
) -> Result<Response, ApiError> {
    let crop = query.crop.as_deref();

    let response = match query.view.as_deref() {
        Some("orders") => {
            let orders = state.engine.list_orders(crop);
            Json(OrdersResponse {
                total: orders.len(),
                orders,
                timestamp: Utc::now(),
            })
            .into_response()
        }

        Some("depth") => {
            let crop = crop
                .filter(|c| !c.trim().is_empty())
                .ok_or_else(|| {
                    ApiError::BadRequest("Crop parameter is required for market depth".to_string())
                })?;
            Json(DepthResponse {
                market_depth: state.engine.depth(crop)?,
                timestamp: Utc::now(),
            })
            .into_response()
        }

        Some("trades") => Json(TradesResponse {
            trades: state.engine.recent_trades(crop),
            timestamp: Utc::now(),
        })
        .into_response(),

        _ => Json(json!({
            "message": "Trading API endpoints",
            "endpoints": {
                "orders": "/trading?type=orders",
                "depth": "/trading?type=depth&crop=wheat",
                "trades": "/trading?type=trades"
            },
            "timestamp": Utc::now(),
        }))
        .into_response(),
    };

    Ok(response)
}

pub async fn post_trading(
    State(state): State<AppState>,
    payload: Result<Json<TradingRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!("Rejected trading request body: {}", rejection.body_text());
        ApiError::BadRequest(rejection.body_text())
    })?;

    match request {
        TradingRequest::PlaceOrder { order_data } => {
            place_order(&state, order_data, "Order placed successfully")
        }

        TradingRequest::CancelOrder { order_data } => {
            let order = state
                .metrics
                .time_cancel(|| state.engine.cancel(&order_data.id))?;
            state.metrics.increment_orders_cancelled();
            Ok(Json(OrderResponse {
                message: "Order cancelled successfully".to_string(),
                order,
                timestamp: Utc::now(),
            })
            .into_response())
        }

        TradingRequest::GetOrderStatus { order_data } => {
            let order = state.engine.order_status(&order_data.id)?;
            Ok(Json(OrderStatusResponse {
                order,
                timestamp: Utc::now(),
            })
            .into_response())
        }

        TradingRequest::SimulateTrading => place_order(
            &state,
            simulation::random_order(),
            "Trading simulation completed",
        ),
    }
}

fn place_order(state: &AppState, request: NewOrder, message: &str) -> Result<Response, ApiError> {
    let order: Order = state
        .metrics
        .time_submit(|| state.engine.submit(request))
        .map_err(|err| {
            state.metrics.increment_orders_rejected();
            err
        })?;

    state.metrics.increment_orders_placed();
    match order.status {
        OrderStatus::Filled => state
            .metrics
            .increment_orders_filled(order.quantity, order.notional()),
        OrderStatus::Pending => state.metrics.increment_orders_rested(),
        OrderStatus::Cancelled => {}
    }

    Ok(Json(OrderResponse {
        message: message.to_string(),
        order,
        timestamp: Utc::now(),
    })
    .into_response())
}
