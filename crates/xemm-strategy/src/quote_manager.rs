//! Maker order lifecycle.
//!
//! Each side (bid, ask) runs an independent two-state machine:
//!
//! ```text
//! NoOrder ──place (every tick)──► Placed
//! Placed  ──age > max_order_age──► NoOrder   (cancel sent)
//! Placed  ──maker fill───────────► NoOrder   (via record_fill)
//! ```
//!
//! The manager never talks to a venue itself. It returns [`MakerAction`]s and
//! the engine executes them.

use xemm_core::{ActiveOrder, ClientOrderId, OrderCandidate, OrderSide, Price, Size, TradingPair};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::config::StrategyConfig;
use crate::pricer::SyntheticQuote;

/// State of the maker order on one side.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MakerOrderState {
    /// No live maker order on this side.
    #[default]
    NoOrder,
    /// One maker order submitted and not yet cancelled or filled.
    Placed {
        order_id: ClientOrderId,
        price: Price,
        created_at_ms: u64,
    },
}

impl MakerOrderState {
    pub fn is_placed(&self) -> bool {
        matches!(self, Self::Placed { .. })
    }

    pub fn order_id(&self) -> Option<&ClientOrderId> {
        match self {
            Self::Placed { order_id, .. } => Some(order_id),
            Self::NoOrder => None,
        }
    }

    fn place(&mut self, order_id: ClientOrderId, price: Price, now_ms: u64) {
        debug_assert!(!self.is_placed(), "placing over a live maker order");
        *self = Self::Placed {
            order_id,
            price,
            created_at_ms: now_ms,
        };
    }

    fn reset(&mut self) -> Option<ClientOrderId> {
        match std::mem::take(self) {
            Self::Placed { order_id, .. } => Some(order_id),
            Self::NoOrder => None,
        }
    }
}

/// Why a maker order is being cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// Older than `max_order_age_secs`.
    MaxAge,
    /// Synthetic price moved inside `min_spread_bps` of the order.
    SpreadBelowMin,
    /// Open on the venue but not tracked by this manager, and over age.
    Orphan,
}

impl CancelReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MaxAge => "max_age",
            Self::SpreadBelowMin => "spread",
            Self::Orphan => "orphan",
        }
    }
}

/// Actions the quote manager wants executed on the maker venue.
#[derive(Debug, Clone, PartialEq)]
pub enum MakerAction {
    /// Submit a budget-adjusted maker order.
    Place(OrderCandidate),
    /// Cancel an open maker order.
    Cancel {
        side: OrderSide,
        pair: TradingPair,
        order_id: ClientOrderId,
        reason: CancelReason,
    },
}

/// Tracks the single maker order per side and decides place/cancel.
#[derive(Debug)]
pub struct QuoteManager {
    config: StrategyConfig,
    buy: MakerOrderState,
    sell: MakerOrderState,
}

impl QuoteManager {
    /// Create a manager with both sides in `NoOrder`.
    pub fn new(config: StrategyConfig) -> Self {
        Self {
            config,
            buy: MakerOrderState::NoOrder,
            sell: MakerOrderState::NoOrder,
        }
    }

    /// Run one quote/cancel cycle.
    ///
    /// Sides without an order get a new one at the synthetic price, sized by
    /// `adjust` (the budget check). Then sides that were already placed when
    /// the tick began are aged out, and untracked venue orders past the age
    /// limit are cancelled.
    pub fn on_tick(
        &mut self,
        quote: &SyntheticQuote,
        active: &[ActiveOrder],
        now_ms: u64,
        adjust: impl Fn(OrderCandidate) -> OrderCandidate,
    ) -> Vec<MakerAction> {
        let mut actions = Vec::new();
        let placed_before = [self.buy.is_placed(), self.sell.is_placed()];

        for side in [OrderSide::Buy, OrderSide::Sell] {
            if !self.state(side).is_placed() {
                if let Some(candidate) = self.build_candidate(side, quote, &adjust) {
                    let (order_id, price) = (candidate.cloid.clone(), candidate.price);
                    self.state_mut(side).place(order_id, price, now_ms);
                    actions.push(MakerAction::Place(candidate));
                }
            }
        }

        for (side, was_placed) in [OrderSide::Buy, OrderSide::Sell].into_iter().zip(placed_before) {
            if !was_placed {
                continue;
            }
            if let Some(reason) = self.cancel_reason(side, quote, now_ms) {
                if let Some(order_id) = self.state_mut(side).reset() {
                    info!(
                        side = %side,
                        order_id = %order_id,
                        reason = reason.as_str(),
                        "Cancelling maker order"
                    );
                    actions.push(MakerAction::Cancel {
                        side,
                        pair: self.config.maker_pair.clone(),
                        order_id,
                        reason,
                    });
                }
            }
        }

        let max_age_ms = self.config.max_order_age_ms();
        for order in active {
            if order.pair != self.config.maker_pair || self.tracks(&order.order_id).is_some() {
                continue;
            }
            if order.age_ms(now_ms) > max_age_ms {
                let already = actions.iter().any(|a| {
                    matches!(a, MakerAction::Cancel { order_id, .. } if order_id == &order.order_id)
                });
                if !already {
                    info!(
                        side = %order.side,
                        order_id = %order.order_id,
                        age_ms = order.age_ms(now_ms),
                        "Cancelling untracked maker order"
                    );
                    actions.push(MakerAction::Cancel {
                        side: order.side,
                        pair: order.pair.clone(),
                        order_id: order.order_id.clone(),
                        reason: CancelReason::Orphan,
                    });
                }
            }
        }

        actions
    }

    /// Reset `side` after a maker fill; the next tick re-quotes it.
    ///
    /// Returns the order id that was tracked, if any.
    pub fn record_fill(&mut self, side: OrderSide) -> Option<ClientOrderId> {
        let previous = self.state_mut(side).reset();
        debug!(side = %side, previous = ?previous, "Maker side reset after fill");
        previous
    }

    /// Replace the tracked id on `side` with the id the venue acknowledged.
    pub fn confirm_order_id(&mut self, side: OrderSide, venue_id: ClientOrderId) {
        if let MakerOrderState::Placed { order_id, .. } = self.state_mut(side) {
            if *order_id != venue_id {
                debug!(side = %side, cloid = %order_id, venue_id = %venue_id, "Venue assigned a different order id");
                *order_id = venue_id;
            }
        }
    }

    /// Side of the tracked maker order with this id.
    pub fn tracks(&self, order_id: &ClientOrderId) -> Option<OrderSide> {
        [OrderSide::Buy, OrderSide::Sell]
            .into_iter()
            .find(|side| self.state(*side).order_id() == Some(order_id))
    }

    pub fn state(&self, side: OrderSide) -> &MakerOrderState {
        match side {
            OrderSide::Buy => &self.buy,
            OrderSide::Sell => &self.sell,
        }
    }

    /// Number of sides currently holding a maker order.
    pub fn placed_count(&self) -> usize {
        usize::from(self.buy.is_placed()) + usize::from(self.sell.is_placed())
    }

    // === Private helpers ===

    fn state_mut(&mut self, side: OrderSide) -> &mut MakerOrderState {
        match side {
            OrderSide::Buy => &mut self.buy,
            OrderSide::Sell => &mut self.sell,
        }
    }

    fn build_candidate(
        &self,
        side: OrderSide,
        quote: &SyntheticQuote,
        adjust: &impl Fn(OrderCandidate) -> OrderCandidate,
    ) -> Option<OrderCandidate> {
        let Some(price) = quote.price(side) else {
            warn!(side = %side, "No synthetic price (empty taker book side), not quoting");
            return None;
        };
        if self.config.require_full_depth && !quote.depth_complete(side) {
            warn!(side = %side, price = %price, "Taker depth insufficient, not quoting");
            return None;
        }

        let requested = Size::new(self.config.order_amount);
        let candidate = OrderCandidate::maker(self.config.maker_pair.clone(), side, requested, price);
        let mut adjusted = adjust(candidate);
        if adjusted.amount > requested {
            adjusted.amount = requested;
        }

        if adjusted.amount.inner() <= Decimal::ZERO {
            if self.config.skip_zero_amount_orders {
                warn!(side = %side, "Budget left zero amount, skipping maker order");
                return None;
            }
            warn!(side = %side, price = %price, "Budget left zero amount, submitting anyway");
        }

        info!(
            side = %side,
            price = %price,
            amount = %adjusted.amount,
            cloid = %adjusted.cloid,
            "Placing maker order"
        );
        Some(adjusted)
    }

    fn cancel_reason(&self, side: OrderSide, quote: &SyntheticQuote, now_ms: u64) -> Option<CancelReason> {
        let MakerOrderState::Placed {
            price,
            created_at_ms,
            ..
        } = self.state(side)
        else {
            return None;
        };

        if now_ms.saturating_sub(*created_at_ms) > self.config.max_order_age_ms() {
            return Some(CancelReason::MaxAge);
        }

        if self.config.spread_cancel_enabled {
            let min_spread = self.config.min_spread_bps;
            let breached = match side {
                OrderSide::Buy => quote
                    .bid_price
                    .is_some_and(|bid| *price > bid.shift_bps(-min_spread)),
                OrderSide::Sell => quote
                    .ask_price
                    .is_some_and(|ask| *price < ask.shift_bps(min_spread)),
            };
            if breached {
                return Some(CancelReason::SpreadBelowMin);
            }
        }

        None
    }
}
