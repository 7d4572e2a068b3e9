//! Order matching core for crop commodity markets
//!
//! This module contains the per-instrument book, the matcher that is its
//! sole mutator, and the order log backing the query surface.

pub mod book;
pub mod error;
pub mod matcher;
pub mod simulation;
pub mod store;
pub mod types;

// Re-export main types for convenience
pub use book::{Book, MatchOutcome, MatchStrategy};
pub use error::{EngineError, EngineResult};
pub use matcher::{EngineConfig, Matcher, RECENT_TRADES_LIMIT};
pub use store::OrderStore;
pub use types::{
    DepthSnapshot, LastTrade, NewOrder, Order, OrderId, OrderStatus, Price, PriceLevel, Quantity,
    Side,
};
