//! Core domain types for the XEMM triangular hedging engine.
//!
//! This crate provides the vocabulary shared by the strategy and the host:
//! - `Price`, `Size`: exact decimal newtypes
//! - `ExchangeId`, `TradingPair`: venue and market identifiers
//! - `OrderBook`, `OrderBookLevel`: immutable depth snapshots
//! - `OrderCandidate`, `ActiveOrder`, `FillEvent`: order lifecycle records

pub mod book;
pub mod decimal;
pub mod error;
pub mod execution;
pub mod market;
pub mod order;

pub use book::{OrderBook, OrderBookLevel};
pub use decimal::{Price, Size, BPS_DIVISOR};
pub use error::{CoreError, Result};
pub use execution::{ActiveOrder, FillEvent, OrderCandidate};
pub use market::{ExchangeId, TradingPair};
pub use order::{ClientOrderId, OrderSide, OrderType, TimeInForce};
