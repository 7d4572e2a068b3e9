//! Crop Trading Server
//!
//! Serves the trading API and keeps the books moving with a background
//! stream of simulated mandi order flow.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{info, warn};

use mandi_trading_engine::api::{self, AppState};
use mandi_trading_engine::engine::{
    simulation, EngineConfig, Matcher, Order, OrderStatus, OrderStore,
};
use mandi_trading_engine::metrics::{EngineMetrics, MetricsReporter};
use mandi_trading_engine::utils::format_rupees;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt().with_env_filter("info").init();

    info!("Starting crop trading server...");

    if let Err(e) = metrics_exporter_prometheus::PrometheusBuilder::new().install() {
        warn!("Failed to install Prometheus exporter: {}", e);
    }

    let store = Arc::new(OrderStore::new());
    let engine = Arc::new(Matcher::new(store, EngineConfig::default()));
    let metrics = Arc::new(EngineMetrics::new());

    // Start metrics reporting
    let reporter = MetricsReporter::new(Arc::clone(&metrics), Duration::from_secs(5));
    tokio::spawn(async move {
        reporter.run().await;
    });

    // Start simulated order flow
    {
        let engine = Arc::clone(&engine);
        let metrics = Arc::clone(&metrics);
        tokio::spawn(async move {
            simulate_order_flow(engine, metrics).await;
        });
    }

    // Start per-book statistics reporting
    {
        let engine = Arc::clone(&engine);
        let metrics = Arc::clone(&metrics);
        tokio::spawn(async move {
            report_book_stats(engine, metrics).await;
        });
    }

    let state = AppState::new(Arc::clone(&engine), Arc::clone(&metrics));
    let app = api::router(state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Trading API listening on http://{}/trading", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down trading server...");

    // Print final statistics
    let mut crops = engine.crops();
    crops.sort();
    for crop in crops {
        if let Ok(depth) = engine.depth(&crop) {
            info!(
                "Final stats for {}: volume {} | last trade {:?}",
                crop,
                depth.volume_24h,
                depth.last_trade.map(|t| format_rupees(t.price))
            );
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
    }
}

/// Feed the books a steady stream of random demo orders.
async fn simulate_order_flow(engine: Arc<Matcher>, metrics: Arc<EngineMetrics>) {
    let mut interval = interval(Duration::from_millis(500));

    loop {
        interval.tick().await;

        let request = simulation::random_order();
        match metrics.time_submit(|| engine.submit(request)) {
            Ok(order) => record_placed(&metrics, &order),
            Err(e) => {
                metrics.increment_orders_rejected();
                warn!("Simulated order rejected: {}", e);
            }
        }
    }
}

fn record_placed(metrics: &EngineMetrics, order: &Order) {
    metrics.increment_orders_placed();
    match order.status {
        OrderStatus::Filled => metrics.increment_orders_filled(order.quantity, order.notional()),
        OrderStatus::Pending => metrics.increment_orders_rested(),
        OrderStatus::Cancelled => {}
    }
}

/// Log book state and refresh the per-crop gauges.
async fn report_book_stats(engine: Arc<Matcher>, metrics: Arc<EngineMetrics>) {
    let mut interval = interval(Duration::from_secs(10));

    loop {
        interval.tick().await;

        let mut crops = engine.crops();
        crops.sort();
        for crop in crops {
            let Ok(depth) = engine.depth(&crop) else {
                continue;
            };

            metrics.set_bid_levels(&crop, depth.bids.len() as u64);
            metrics.set_ask_levels(&crop, depth.asks.len() as u64);
            if let Some(trade) = depth.last_trade {
                metrics.set_last_trade_price(&crop, trade.price);
            }

            info!(
                "{} | bid {:?} | ask {:?} | levels {}x{} | volume {}",
                crop,
                depth.bids.first().map(|l| format_rupees(l.price)),
                depth.asks.first().map(|l| format_rupees(l.price)),
                depth.bids.len(),
                depth.asks.len(),
                depth.volume_24h
            );
        }
    }
}
