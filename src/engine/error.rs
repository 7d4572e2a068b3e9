use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineError {
    /// Order id not present in the order log
    OrderNotFound,

    /// Empty or missing instrument symbol
    InvalidSymbol,

    /// Quantity is zero or negative
    InvalidQuantity,

    /// Price is zero or negative
    InvalidPrice,

    /// Order is already filled and can no longer be cancelled
    OrderNotCancellable,
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::OrderNotFound => write!(f, "Order not found"),
            EngineError::InvalidSymbol => write!(f, "Crop symbol is required"),
            EngineError::InvalidQuantity => write!(f, "Quantity must be positive"),
            EngineError::InvalidPrice => write!(f, "Price must be positive"),
            EngineError::OrderNotCancellable => write!(f, "Cannot cancel filled order"),
        }
    }
}

impl std::error::Error for EngineError {}

/// Result type for matching engine operations
pub type EngineResult<T> = Result<T, EngineError>;
