//! Mandi Trading Engine
//!
//! In-memory order matching and market depth simulator for crop commodity
//! markets. Incoming limit orders either fill completely against the best
//! opposing price level or rest in the book at their full quantity; a small
//! HTTP API exposes order placement, cancellation and the read views.

pub mod api;
pub mod engine;
pub mod metrics;
pub mod utils;

pub use engine::{Book, EngineConfig, EngineError, MatchStrategy, Matcher, OrderStore};
pub use metrics::EngineMetrics;
