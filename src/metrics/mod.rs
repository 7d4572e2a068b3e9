use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::info;

use crate::utils::time::LatencyTimer;

/// Metrics collector for the matching engine
#[derive(Debug)]
pub struct EngineMetrics {
    // Latency tracking
    submit_latency: LatencyTracker,
    cancel_latency: LatencyTracker,

    // Throughput counters
    orders_placed: AtomicU64,
    orders_filled: AtomicU64,
    orders_rested: AtomicU64,
    orders_cancelled: AtomicU64,
    orders_rejected: AtomicU64,

    // Volume tracking
    total_volume: AtomicU64,
    total_notional: AtomicU64,
}

impl EngineMetrics {
    pub fn new() -> Self {
        describe_counter!("trading_orders_total", "Total number of orders processed");
        describe_counter!("trading_trades_total", "Total number of full fills");
        describe_counter!("trading_volume_total", "Cumulative filled quantity");
        describe_histogram!(
            "trading_operation_duration_seconds",
            "Duration of matching engine operations"
        );
        describe_gauge!(
            "trading_book_levels",
            "Number of price levels per book side"
        );
        describe_gauge!("trading_last_trade_price", "Most recent execution price");

        Self {
            submit_latency: LatencyTracker::new("submit"),
            cancel_latency: LatencyTracker::new("cancel"),
            orders_placed: AtomicU64::new(0),
            orders_filled: AtomicU64::new(0),
            orders_rested: AtomicU64::new(0),
            orders_cancelled: AtomicU64::new(0),
            orders_rejected: AtomicU64::new(0),
            total_volume: AtomicU64::new(0),
            total_notional: AtomicU64::new(0),
        }
    }

    // Latency measurement methods
    pub fn time_submit<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        self.submit_latency.time(f)
    }

    pub fn time_cancel<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        self.cancel_latency.time(f)
    }

    // Counter methods
    pub fn increment_orders_placed(&self) {
        self.orders_placed.fetch_add(1, Ordering::Relaxed);
        counter!("trading_orders_total", "outcome" => "placed").increment(1);
    }

    pub fn increment_orders_rested(&self) {
        self.orders_rested.fetch_add(1, Ordering::Relaxed);
        counter!("trading_orders_total", "outcome" => "rested").increment(1);
    }

    pub fn increment_orders_cancelled(&self) {
        self.orders_cancelled.fetch_add(1, Ordering::Relaxed);
        counter!("trading_orders_total", "outcome" => "cancelled").increment(1);
    }

    pub fn increment_orders_rejected(&self) {
        self.orders_rejected.fetch_add(1, Ordering::Relaxed);
        counter!("trading_orders_total", "outcome" => "rejected").increment(1);
    }

    pub fn increment_orders_filled(&self, quantity: u64, notional: u64) {
        self.orders_filled.fetch_add(1, Ordering::Relaxed);
        self.total_volume.fetch_add(quantity, Ordering::Relaxed);
        self.total_notional.fetch_add(notional, Ordering::Relaxed);

        counter!("trading_trades_total").increment(1);
        counter!("trading_volume_total").increment(quantity);
        counter!("trading_notional_total").increment(notional);
    }

    // Gauge methods
    pub fn set_bid_levels(&self, crop: &str, count: u64) {
        gauge!("trading_book_levels", "side" => "bid", "crop" => crop.to_string())
            .set(count as f64);
    }

    pub fn set_ask_levels(&self, crop: &str, count: u64) {
        gauge!("trading_book_levels", "side" => "ask", "crop" => crop.to_string())
            .set(count as f64);
    }

    pub fn set_last_trade_price(&self, crop: &str, price: u64) {
        gauge!("trading_last_trade_price", "crop" => crop.to_string()).set(price as f64);
    }

    // Getters for current values
    pub fn get_orders_placed(&self) -> u64 {
        self.orders_placed.load(Ordering::Relaxed)
    }

    pub fn get_orders_filled(&self) -> u64 {
        self.orders_filled.load(Ordering::Relaxed)
    }

    pub fn get_orders_rested(&self) -> u64 {
        self.orders_rested.load(Ordering::Relaxed)
    }

    pub fn get_orders_cancelled(&self) -> u64 {
        self.orders_cancelled.load(Ordering::Relaxed)
    }

    pub fn get_orders_rejected(&self) -> u64 {
        self.orders_rejected.load(Ordering::Relaxed)
    }

    pub fn get_total_volume(&self) -> u64 {
        self.total_volume.load(Ordering::Relaxed)
    }

    pub fn get_total_notional(&self) -> u64 {
        self.total_notional.load(Ordering::Relaxed)
    }

    pub fn get_latency_stats(&self) -> LatencyStats {
        LatencyStats {
            submit: self.submit_latency.get_stats(),
            cancel: self.cancel_latency.get_stats(),
        }
    }
}

impl Default for EngineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Latency tracker for individual operations
#[derive(Debug)]
struct LatencyTracker {
    operation: String,
    samples: AtomicU64,
    total_nanos: AtomicU64,
    min_nanos: AtomicU64,
    max_nanos: AtomicU64,
}

impl LatencyTracker {
    fn new(operation: &str) -> Self {
        Self {
            operation: operation.to_string(),
            samples: AtomicU64::new(0),
            total_nanos: AtomicU64::new(0),
            min_nanos: AtomicU64::new(u64::MAX),
            max_nanos: AtomicU64::new(0),
        }
    }

    fn time<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let timer = LatencyTimer::start();
        let result = f();
        self.record_latency(timer.stop());
        result
    }

    fn record_latency(&self, duration: Duration) {
        let nanos = duration.as_nanos() as u64;

        self.samples.fetch_add(1, Ordering::Relaxed);
        self.total_nanos.fetch_add(nanos, Ordering::Relaxed);
        self.min_nanos.fetch_min(nanos, Ordering::Relaxed);
        self.max_nanos.fetch_max(nanos, Ordering::Relaxed);

        histogram!(
            "trading_operation_duration_seconds",
            "operation" => self.operation.clone()
        )
        .record(duration.as_secs_f64());
    }

    fn get_stats(&self) -> OperationLatencyStats {
        let samples = self.samples.load(Ordering::Relaxed);
        let total = self.total_nanos.load(Ordering::Relaxed);
        let min = self.min_nanos.load(Ordering::Relaxed);
        let max = self.max_nanos.load(Ordering::Relaxed);

        let avg = if samples > 0 { total / samples } else { 0 };

        OperationLatencyStats {
            operation: self.operation.clone(),
            samples,
            avg_nanos: avg,
            min_nanos: if min == u64::MAX { 0 } else { min },
            max_nanos: max,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LatencyStats {
    pub submit: OperationLatencyStats,
    pub cancel: OperationLatencyStats,
}

#[derive(Debug, Clone)]
pub struct OperationLatencyStats {
    pub operation: String,
    pub samples: u64,
    pub avg_nanos: u64,
    pub min_nanos: u64,
    pub max_nanos: u64,
}

impl OperationLatencyStats {
    pub fn avg_micros(&self) -> f64 {
        self.avg_nanos as f64 / 1_000.0
    }
}

/// Background metrics reporter
pub struct MetricsReporter {
    metrics: Arc<EngineMetrics>,
    interval: Duration,
}

impl MetricsReporter {
    pub fn new(metrics: Arc<EngineMetrics>, interval: Duration) -> Self {
        Self { metrics, interval }
    }

    pub async fn run(&self) {
        let mut interval = interval(self.interval);

        loop {
            interval.tick().await;

            let stats = self.metrics.get_latency_stats();

            info!(
                "Engine metrics - Orders: placed={} filled={} rested={} cancelled={} rejected={} | Volume: {} | Latency (us): submit={:.2} cancel={:.2}",
                self.metrics.get_orders_placed(),
                self.metrics.get_orders_filled(),
                self.metrics.get_orders_rested(),
                self.metrics.get_orders_cancelled(),
                self.metrics.get_orders_rejected(),
                self.metrics.get_total_volume(),
                stats.submit.avg_micros(),
                stats.cancel.avg_micros()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let metrics = EngineMetrics::new();

        metrics.increment_orders_placed();
        metrics.increment_orders_placed();
        metrics.increment_orders_filled(50, 50 * 2160);
        metrics.increment_orders_rejected();

        assert_eq!(metrics.get_orders_placed(), 2);
        assert_eq!(metrics.get_orders_filled(), 1);
        assert_eq!(metrics.get_total_volume(), 50);
        assert_eq!(metrics.get_total_notional(), 50 * 2160);
        assert_eq!(metrics.get_orders_rejected(), 1);
    }

    #[test]
    fn test_latency_tracking() {
        let metrics = EngineMetrics::new();

        let value = metrics.time_submit(|| {
            std::thread::sleep(Duration::from_millis(1));
            42
        });
        assert_eq!(value, 42);

        let stats = metrics.get_latency_stats();
        assert_eq!(stats.submit.samples, 1);
        assert!(stats.submit.avg_nanos >= 1_000_000);
        assert!(stats.submit.min_nanos <= stats.submit.max_nanos);
        assert_eq!(stats.cancel.samples, 0);
        assert_eq!(stats.cancel.min_nanos, 0);
    }
}
