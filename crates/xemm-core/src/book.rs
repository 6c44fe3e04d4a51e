//! Order book snapshots.
//!
//! Snapshots are immutable and produced fresh per query by the market data
//! source. Bids are sorted by price descending, asks ascending, so index 0 is
//! always the best level on either side.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::market::TradingPair;
use crate::order::OrderSide;
use crate::{Price, Size};

/// One price/size pair on one side of a book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBookLevel {
    pub price: Price,
    pub amount: Size,
}

impl OrderBookLevel {
    pub fn new(price: Price, amount: Size) -> Self {
        Self { price, amount }
    }

    /// Quote-currency value resting at this level.
    #[inline]
    pub fn quote_volume(&self) -> Decimal {
        self.amount.notional(self.price)
    }
}

/// Depth snapshot for one trading pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBook {
    pub pair: TradingPair,
    /// Best (highest) bid first.
    pub bids: Vec<OrderBookLevel>,
    /// Best (lowest) ask first.
    pub asks: Vec<OrderBookLevel>,
}

impl OrderBook {
    pub fn new(pair: TradingPair, bids: Vec<OrderBookLevel>, asks: Vec<OrderBookLevel>) -> Self {
        Self { pair, bids, asks }
    }

    pub fn best_bid(&self) -> Option<Price> {
        self.bids.first().map(|l| l.price)
    }

    pub fn best_ask(&self) -> Option<Price> {
        self.asks.first().map(|l| l.price)
    }

    /// (best bid + best ask) / 2, when both sides are present.
    pub fn mid_price(&self) -> Option<Price> {
        let bid = self.best_bid()?;
        let ask = self.best_ask()?;
        Some(Price::new((bid.inner() + ask.inner()) / Decimal::TWO))
    }

    /// Levels consumed by a taker order on `side`: buys lift asks, sells hit bids.
    pub fn side_for_taker(&self, side: OrderSide) -> &[OrderBookLevel] {
        match side {
            OrderSide::Buy => &self.asks,
            OrderSide::Sell => &self.bids,
        }
    }

    /// Reject books that cannot be walked safely.
    ///
    /// Every level needs a positive price and a non-negative amount, and each
    /// side must be sorted best-first.
    pub fn validate(&self) -> Result<()> {
        validate_side(&self.bids, OrderSide::Buy)?;
        validate_side(&self.asks, OrderSide::Sell)
    }
}

fn validate_side(levels: &[OrderBookLevel], resting: OrderSide) -> Result<()> {
    for level in levels {
        if !level.price.is_positive() {
            return Err(CoreError::InvalidPrice(format!(
                "non-positive {resting} level price {}",
                level.price
            )));
        }
        if level.amount.is_negative() {
            return Err(CoreError::InvalidSize(format!(
                "negative {resting} level amount {}",
                level.amount
            )));
        }
    }
    let sorted = levels.windows(2).all(|w| match resting {
        OrderSide::Buy => w[0].price >= w[1].price,
        OrderSide::Sell => w[0].price <= w[1].price,
    });
    if !sorted {
        return Err(CoreError::InvalidPrice(format!(
            "{resting} levels not sorted best-first"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn lvl(price: Decimal, amount: Decimal) -> OrderBookLevel {
        OrderBookLevel::new(Price::new(price), Size::new(amount))
    }

    fn book() -> OrderBook {
        OrderBook::new(
            TradingPair::new("CKB", "USDT"),
            vec![lvl(dec!(0.0030), dec!(1000)), lvl(dec!(0.0029), dec!(2000))],
            vec![lvl(dec!(0.0031), dec!(1000)), lvl(dec!(0.0032), dec!(2000))],
        )
    }

    #[test]
    fn test_best_and_mid() {
        let b = book();
        assert_eq!(b.best_bid(), Some(Price::new(dec!(0.0030))));
        assert_eq!(b.best_ask(), Some(Price::new(dec!(0.0031))));
        assert_eq!(b.mid_price(), Some(Price::new(dec!(0.00305))));
    }

    #[test]
    fn test_side_for_taker() {
        let b = book();
        assert_eq!(b.side_for_taker(OrderSide::Buy)[0].price, Price::new(dec!(0.0031)));
        assert_eq!(b.side_for_taker(OrderSide::Sell)[0].price, Price::new(dec!(0.0030)));
    }

    #[test]
    fn test_mid_requires_both_sides() {
        let mut b = book();
        b.asks.clear();
        assert!(b.mid_price().is_none());
    }

    #[test]
    fn test_validate_ok() {
        assert!(book().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_price() {
        let mut b = book();
        b.bids[1].price = Price::ZERO;
        assert!(matches!(b.validate(), Err(CoreError::InvalidPrice(_))));
    }

    #[test]
    fn test_validate_rejects_negative_amount() {
        let mut b = book();
        b.asks[0].amount = Size::new(dec!(-1));
        assert!(matches!(b.validate(), Err(CoreError::InvalidSize(_))));
    }

    #[test]
    fn test_validate_rejects_unsorted() {
        let mut b = book();
        b.asks.swap(0, 1);
        assert!(b.validate().is_err());
    }
}
