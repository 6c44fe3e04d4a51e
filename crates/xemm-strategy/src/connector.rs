//! Collaborator interfaces the engine depends on.
//!
//! Exchange connectivity, book maintenance and balance tracking live outside
//! the strategy. A host supplies one value implementing all three traits
//! (see [`Connector`]); every call is synchronous and expected to return
//! promptly.

use xemm_core::{
    ActiveOrder, ClientOrderId, ExchangeId, OrderBook, OrderCandidate, OrderSide, Price, Size,
    TradingPair,
};

use crate::depth::{self, QuoteVolumeResult};
use crate::error::{StrategyError, StrategyResult};

/// Read access to current order book depth.
pub trait MarketDataSource {
    /// Fresh snapshot of both sides of `pair`, or `None` if no book is known.
    fn order_book(&self, pair: &TradingPair) -> Option<OrderBook>;

    /// Marginal price for a taker order of `amount` base on `side`.
    fn price_for_volume(
        &self,
        pair: &TradingPair,
        side: OrderSide,
        amount: Size,
    ) -> StrategyResult<Option<Price>> {
        let book = self
            .order_book(pair)
            .ok_or_else(|| StrategyError::BookUnavailable(pair.clone()))?;
        depth::price_for_volume(book.side_for_taker(side), amount)
    }

    /// Quote volume exchanged by a taker order of `amount` base on `side`.
    fn quote_volume_for_base_amount(
        &self,
        pair: &TradingPair,
        side: OrderSide,
        amount: Size,
    ) -> StrategyResult<QuoteVolumeResult> {
        let book = self
            .order_book(pair)
            .ok_or_else(|| StrategyError::BookUnavailable(pair.clone()))?;
        depth::quote_volume_for_base_amount(book.side_for_taker(side), amount)
    }
}

/// Budget-constrained order sizing.
pub trait BudgetChecker {
    /// Shrink `candidate.amount` to what the account on `exchange` can fund.
    ///
    /// Must never increase the amount. With `all_or_none`, an order that
    /// cannot be funded in full comes back with a zero amount.
    fn adjust_candidate(
        &self,
        exchange: &ExchangeId,
        candidate: OrderCandidate,
        all_or_none: bool,
    ) -> OrderCandidate;
}

/// Order transmission and open-order queries.
pub trait OrderGateway {
    /// Submit an order; returns the id the venue will report it under.
    fn submit_order(
        &mut self,
        exchange: &ExchangeId,
        candidate: &OrderCandidate,
    ) -> StrategyResult<ClientOrderId>;

    fn cancel_order(
        &mut self,
        exchange: &ExchangeId,
        pair: &TradingPair,
        order_id: &ClientOrderId,
    ) -> StrategyResult<()>;

    /// Orders currently open on `exchange`.
    fn active_orders(&self, exchange: &ExchangeId) -> Vec<ActiveOrder>;
}

/// Everything the engine needs from the outside world.
pub trait Connector: MarketDataSource + BudgetChecker + OrderGateway {}

impl<T: MarketDataSource + BudgetChecker + OrderGateway> Connector for T {}
