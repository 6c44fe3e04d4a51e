//! Synthetic cross pricing.
//!
//! The maker pair `A-B` is never observed directly. Its achievable rate is
//! rebuilt from the two taker legs `A-Q` (leg1) and `B-Q` (leg2):
//!
//! - Maker bid (we buy A, pay B): hedging sells A on leg1 bids and buys B on
//!   leg2 asks. Price the B we must end up with (`order_amount * (1 + m)`) in
//!   Q, find how much A that Q volume fetches on leg1 bids, and quote
//!   `order_amount / A`.
//! - Maker ask (we sell A, receive B): mirror with leg1 asks, leg2 bids and
//!   `order_amount * (1 - m)`.
//!
//! `m` is `min_profitability`, so each quote leaves that margin after the
//! round trip through both legs at current depth.

use rust_decimal::Decimal;
use xemm_core::{OrderBook, OrderSide, Price, Size};

use crate::depth::{quote_volume_for_base_amount, walk};
use crate::error::StrategyResult;

/// Margin multipliers derived from `min_profitability`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfitFactors {
    /// `1 + min_profitability`
    pub buy: Decimal,
    /// `1 - min_profitability`
    pub sell: Decimal,
}

impl ProfitFactors {
    pub fn from_min_profitability(min_profitability: Decimal) -> Self {
        Self {
            buy: Decimal::ONE + min_profitability,
            sell: Decimal::ONE - min_profitability,
        }
    }
}

/// Maker-side prices derived from the taker legs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntheticQuote {
    /// Highest price we can bid and still hedge at the margin; `None` on an empty leg1 bid side.
    pub bid_price: Option<Price>,
    /// Lowest price we can ask and still hedge at the margin; `None` on an empty leg1 ask side.
    pub ask_price: Option<Price>,
    /// Both bid-side walks covered their targets.
    pub bid_depth_complete: bool,
    /// Both ask-side walks covered their targets.
    pub ask_depth_complete: bool,
}

impl SyntheticQuote {
    /// Price for the maker order on `side`.
    pub fn price(&self, side: OrderSide) -> Option<Price> {
        match side {
            OrderSide::Buy => self.bid_price,
            OrderSide::Sell => self.ask_price,
        }
    }

    pub fn depth_complete(&self, side: OrderSide) -> bool {
        match side {
            OrderSide::Buy => self.bid_depth_complete,
            OrderSide::Sell => self.ask_depth_complete,
        }
    }
}

/// Compute the synthetic maker bid and ask.
///
/// Pure: the same books and inputs always yield the same quote.
pub fn compute_synthetic_quote(
    order_amount: Size,
    leg1: &OrderBook,
    leg2: &OrderBook,
    factors: ProfitFactors,
) -> StrategyResult<SyntheticQuote> {
    let (bid_price, bid_depth_complete) =
        side_price(order_amount, leg1, leg2, OrderSide::Buy, factors.buy)?;
    let (ask_price, ask_depth_complete) =
        side_price(order_amount, leg1, leg2, OrderSide::Sell, factors.sell)?;

    Ok(SyntheticQuote {
        bid_price,
        ask_price,
        bid_depth_complete,
        ask_depth_complete,
    })
}

fn side_price(
    order_amount: Size,
    leg1: &OrderBook,
    leg2: &OrderBook,
    maker_side: OrderSide,
    profit_factor: Decimal,
) -> StrategyResult<(Option<Price>, bool)> {
    // Maker buy: sell A on leg1, buy B on leg2. Maker sell: the reverse.
    let leg1_side = maker_side.opposite();
    let leg2_side = maker_side;

    let leg2_base = order_amount * profit_factor;
    let leg2 = quote_volume_for_base_amount(leg2.side_for_taker(leg2_side), leg2_base)?;
    let leg1 = walk(leg1.side_for_taker(leg1_side), leg2.quote_volume)?;

    let price = if leg1.base_amount.is_positive() {
        Some(Price::new(order_amount.inner() / leg1.base_amount.inner()))
    } else {
        None
    };

    Ok((price, leg2.is_complete() && leg1.is_complete()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use xemm_core::{OrderBookLevel, TradingPair};

    fn lvl(price: Decimal, amount: Decimal) -> OrderBookLevel {
        OrderBookLevel::new(Price::new(price), Size::new(amount))
    }

    /// CKB-USDT around 0.003.
    fn leg1_book() -> OrderBook {
        OrderBook::new(
            TradingPair::new("CKB", "USDT"),
            vec![lvl(dec!(0.0030), dec!(500)), lvl(dec!(0.0025), dec!(100000))],
            vec![lvl(dec!(0.0031), dec!(500)), lvl(dec!(0.0040), dec!(100000))],
        )
    }

    /// BTC-USDT around 30000.
    fn leg2_book() -> OrderBook {
        OrderBook::new(
            TradingPair::new("BTC", "USDT"),
            vec![lvl(dec!(30000), dec!(10))],
            vec![lvl(dec!(30000), dec!(10))],
        )
    }

    #[test]
    fn test_profit_factors() {
        let f = ProfitFactors::from_min_profitability(dec!(0.001));
        assert_eq!(f.buy, dec!(1.001));
        assert_eq!(f.sell, dec!(0.999));
    }

    #[test]
    fn test_flat_books_bracket_fair_price() {
        let leg1 = OrderBook::new(
            TradingPair::new("CKB", "USDT"),
            vec![lvl(dec!(0.003), dec!(1000000))],
            vec![lvl(dec!(0.003), dec!(1000000))],
        );
        let quote = compute_synthetic_quote(
            Size::new(dec!(0.0001)),
            &leg1,
            &leg2_book(),
            ProfitFactors::from_min_profitability(dec!(0.001)),
        )
        .unwrap();

        // Leg2: 0.0001001 BTC costs 3.003 USDT -> 1001 CKB on leg1 bids.
        assert_eq!(quote.bid_price, Some(Price::new(dec!(0.0001) / dec!(1001))));
        // Leg2: 0.0000999 BTC fetches 2.997 USDT -> 999 CKB on leg1 asks.
        assert_eq!(quote.ask_price, Some(Price::new(dec!(0.0001) / dec!(999))));

        let fair = Price::new(dec!(0.0000001));
        assert!(quote.bid_price.unwrap() < fair);
        assert!(quote.ask_price.unwrap() > fair);
        assert!(quote.bid_depth_complete && quote.ask_depth_complete);
    }

    #[test]
    fn test_depth_pushes_quotes_apart() {
        let factors = ProfitFactors::from_min_profitability(dec!(0.001));
        let quote =
            compute_synthetic_quote(Size::new(dec!(0.0001)), &leg1_book(), &leg2_book(), factors)
                .unwrap();
        // 3.003 USDT: 1.5 USDT at 0.0030 (500 CKB), 1.503 at 0.0025 (601.2 CKB).
        assert_eq!(quote.bid_price, Some(Price::new(dec!(0.0001) / dec!(1101.2))));
        assert!(quote.bid_price.unwrap() < quote.ask_price.unwrap());
    }

    #[test]
    fn test_quote_is_idempotent() {
        let factors = ProfitFactors::from_min_profitability(dec!(0.002));
        let (l1, l2) = (leg1_book(), leg2_book());
        let a = compute_synthetic_quote(Size::new(dec!(0.0001)), &l1, &l2, factors).unwrap();
        let b = compute_synthetic_quote(Size::new(dec!(0.0001)), &l1, &l2, factors).unwrap();
        assert_eq!(a, b);
        assert_eq!(l1, leg1_book());
    }

    #[test]
    fn test_empty_leg1_side_has_no_price() {
        let mut leg1 = leg1_book();
        leg1.bids.clear();
        let quote = compute_synthetic_quote(
            Size::new(dec!(0.0001)),
            &leg1,
            &leg2_book(),
            ProfitFactors::from_min_profitability(dec!(0.001)),
        )
        .unwrap();
        assert!(quote.bid_price.is_none());
        assert!(!quote.bid_depth_complete);
        assert!(quote.ask_price.is_some());
    }

    #[test]
    fn test_thin_leg2_flags_incomplete_depth() {
        let leg2 = OrderBook::new(
            TradingPair::new("BTC", "USDT"),
            vec![lvl(dec!(30000), dec!(0.00001))],
            vec![lvl(dec!(30000), dec!(0.00001))],
        );
        let quote = compute_synthetic_quote(
            Size::new(dec!(0.0001)),
            &leg1_book(),
            &leg2,
            ProfitFactors::from_min_profitability(dec!(0.001)),
        )
        .unwrap();
        assert!(!quote.bid_depth_complete);
        assert!(!quote.ask_depth_complete);
        assert!(quote.bid_price.is_some());
    }

    #[test]
    fn test_side_accessors() {
        let quote = SyntheticQuote {
            bid_price: Some(Price::new(dec!(1))),
            ask_price: Some(Price::new(dec!(2))),
            bid_depth_complete: true,
            ask_depth_complete: false,
        };
        assert_eq!(quote.price(OrderSide::Buy), Some(Price::new(dec!(1))));
        assert_eq!(quote.price(OrderSide::Sell), Some(Price::new(dec!(2))));
        assert!(quote.depth_complete(OrderSide::Buy));
        assert!(!quote.depth_complete(OrderSide::Sell));
    }
}
