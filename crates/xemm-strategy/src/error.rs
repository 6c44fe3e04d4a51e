//! Strategy error types.

use thiserror::Error;
use xemm_core::TradingPair;

#[derive(Debug, Error)]
pub enum StrategyError {
    /// Book data that cannot be walked (bad prices, negative sizes, unsorted).
    #[error("Invalid order book: {0}")]
    InvalidBook(String),

    /// Negative target volumes or amounts passed to a depth walk.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Order book unavailable for {0}")]
    BookUnavailable(TradingPair),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Connector error: {0}")]
    Connector(String),
}

pub type StrategyResult<T> = Result<T, StrategyError>;
