//! Hedge sizing for maker fills.
//!
//! A maker fill of `filled_amount` base on `A-B` is offset by two taker
//! trades: leg1 on `A-Q` moves the base asset, leg2 on `B-Q` moves the quote
//! asset of the maker pair, funded by (or funding) leg1's quote volume.
//!
//! | maker fill | leg1 (`A-Q`)        | leg2 (`B-Q`)         |
//! |------------|---------------------|----------------------|
//! | buy A      | sell A on bids      | buy B on asks        |
//! | sell A     | buy A on asks       | sell B on bids       |
//!
//! Both legs are IOC limit orders priced at their walk VWAP minus the
//! slippage buffer.

use rust_decimal::Decimal;
use xemm_core::{
    ExchangeId, FillEvent, OrderBook, OrderCandidate, OrderSide, OrderType, Price, Size,
    TimeInForce, TradingPair,
};
use tracing::{debug, warn};

use crate::config::StrategyConfig;
use crate::depth::{quote_volume_for_base_amount, walk, VolumeWalkResult};
use crate::error::StrategyResult;

/// One taker order of a hedge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HedgeInstruction {
    pub exchange: ExchangeId,
    pub pair: TradingPair,
    pub side: OrderSide,
    pub amount: Size,
    /// Limit sent with the order: `effective_price * (1 - buffer)`.
    pub limit_price: Price,
    /// VWAP from the depth walk that sized this leg.
    pub effective_price: Price,
    pub order_type: OrderType,
    pub tif: TimeInForce,
}

impl HedgeInstruction {
    fn from_walk(
        exchange: &ExchangeId,
        pair: &TradingPair,
        side: OrderSide,
        result: &VolumeWalkResult,
        buffer: Decimal,
    ) -> Self {
        Self {
            exchange: exchange.clone(),
            pair: pair.clone(),
            side,
            amount: result.base_amount,
            limit_price: Price::new(result.effective_price.inner() * (Decimal::ONE - buffer)),
            effective_price: result.effective_price,
            order_type: OrderType::Limit,
            tif: TimeInForce::ImmediateOrCancel,
        }
    }

    /// Taker candidate for budget adjustment and submission.
    pub fn to_candidate(&self) -> OrderCandidate {
        OrderCandidate::taker(self.pair.clone(), self.side, self.amount, self.limit_price)
    }
}

/// Both legs of a hedge for one maker fill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HedgePlan {
    /// Side of the maker order that was filled.
    pub maker_side: OrderSide,
    pub leg1: HedgeInstruction,
    pub leg2: HedgeInstruction,
    /// Whether both taker books were deep enough for the full hedge.
    pub depth_complete: bool,
}

impl HedgePlan {
    pub fn legs(&self) -> [&HedgeInstruction; 2] {
        [&self.leg1, &self.leg2]
    }
}

/// Turns maker fills into hedge plans.
#[derive(Debug, Clone)]
pub struct HedgeExecutor {
    taker_exchange: ExchangeId,
    leg1_pair: TradingPair,
    leg2_pair: TradingPair,
    buffer: Decimal,
}

impl HedgeExecutor {
    pub fn new(config: &StrategyConfig) -> Self {
        Self {
            taker_exchange: config.taker_exchange.clone(),
            leg1_pair: config.taker_pair1.clone(),
            leg2_pair: config.taker_pair2.clone(),
            buffer: config.slippage_fraction(),
        }
    }

    /// Size both legs for `event` against the current taker books.
    ///
    /// Pure: nothing is submitted here. Thin books produce a smaller hedge
    /// with `depth_complete = false` instead of an error.
    pub fn plan(
        &self,
        event: &FillEvent,
        leg1_book: &OrderBook,
        leg2_book: &OrderBook,
    ) -> StrategyResult<HedgePlan> {
        let maker_side = event.side;
        let leg1_side = maker_side.opposite();
        let leg2_side = maker_side;

        let leg1_levels = leg1_book.side_for_taker(leg1_side);
        let target = quote_volume_for_base_amount(leg1_levels, event.filled_amount)?;
        let leg1 = walk(leg1_levels, target.quote_volume)?;

        // Leg2 moves exactly the quote volume leg1 produced or consumed.
        let leg2 = walk(leg2_book.side_for_taker(leg2_side), leg1.quote_volume)?;

        let depth_complete = target.is_complete() && leg2.is_complete();
        if !depth_complete {
            warn!(
                order_id = %event.order_id,
                filled = %event.filled_amount,
                leg1_base = %leg1.base_amount,
                leg2_base = %leg2.base_amount,
                "Taker depth insufficient for full hedge"
            );
        }

        let plan = HedgePlan {
            maker_side,
            leg1: HedgeInstruction::from_walk(
                &self.taker_exchange,
                &self.leg1_pair,
                leg1_side,
                &leg1,
                self.buffer,
            ),
            leg2: HedgeInstruction::from_walk(
                &self.taker_exchange,
                &self.leg2_pair,
                leg2_side,
                &leg2,
                self.buffer,
            ),
            depth_complete,
        };

        debug!(
            maker_side = %maker_side,
            leg1_side = %plan.leg1.side,
            leg1_amount = %plan.leg1.amount,
            leg1_limit = %plan.leg1.limit_price,
            leg2_side = %plan.leg2.side,
            leg2_amount = %plan.leg2.amount,
            leg2_limit = %plan.leg2.limit_price,
            "Hedge planned"
        );

        Ok(plan)
    }
}
