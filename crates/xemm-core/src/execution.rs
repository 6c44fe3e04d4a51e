//! Order lifecycle records exchanged between the engine and a connector.
//!
//! - `OrderCandidate`: an order the engine wants to send, before budget sizing
//! - `ActiveOrder`: an order the venue reports as open
//! - `FillEvent`: a (possibly partial) execution notification

use serde::{Deserialize, Serialize};

use crate::market::TradingPair;
use crate::order::{ClientOrderId, OrderSide, OrderType, TimeInForce};
use crate::{Price, Size};

// ============================================================================
// Outgoing
// ============================================================================

/// Proposed order, sized before any budget adjustment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCandidate {
    /// Client order ID, assigned up front so the engine can track the order.
    pub cloid: ClientOrderId,
    pub pair: TradingPair,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub tif: TimeInForce,
    /// True for resting maker quotes, false for hedge legs.
    pub is_maker: bool,
    pub amount: Size,
    pub price: Price,
}

impl OrderCandidate {
    /// Resting limit order for the maker venue.
    #[must_use]
    pub fn maker(pair: TradingPair, side: OrderSide, amount: Size, price: Price) -> Self {
        Self {
            cloid: ClientOrderId::new(),
            pair,
            side,
            order_type: OrderType::Limit,
            tif: TimeInForce::GoodTilCancelled,
            is_maker: true,
            amount,
            price,
        }
    }

    /// Immediate, price-bounded order for the taker venue.
    #[must_use]
    pub fn taker(pair: TradingPair, side: OrderSide, amount: Size, price: Price) -> Self {
        Self {
            cloid: ClientOrderId::new(),
            pair,
            side,
            order_type: OrderType::Limit,
            tif: TimeInForce::ImmediateOrCancel,
            is_maker: false,
            amount,
            price,
        }
    }

    /// Copy of this candidate with a different amount (budget adjustment).
    #[must_use]
    pub fn with_amount(mut self, amount: Size) -> Self {
        self.amount = amount;
        self
    }
}

// ============================================================================
// Incoming
// ============================================================================

/// Open order as reported by a venue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveOrder {
    pub order_id: ClientOrderId,
    pub pair: TradingPair,
    pub side: OrderSide,
    pub price: Price,
    /// Remaining (unfilled) amount.
    pub amount: Size,
    /// Creation timestamp (Unix milliseconds).
    pub created_at_ms: u64,
}

impl ActiveOrder {
    /// Age in whole milliseconds at `now_ms`.
    #[inline]
    pub fn age_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.created_at_ms)
    }
}

/// Fill notification for one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillEvent {
    pub order_id: ClientOrderId,
    pub pair: TradingPair,
    pub side: OrderSide,
    /// Base amount executed by this fill.
    pub filled_amount: Size,
    pub filled_price: Price,
    /// Execution timestamp (Unix milliseconds).
    pub timestamp_ms: u64,
}
