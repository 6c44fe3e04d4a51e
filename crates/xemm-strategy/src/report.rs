//! Read-only status views.
//!
//! Built from snapshots the engine already has; nothing here touches a venue.

use std::fmt;

use rust_decimal::Decimal;
use xemm_core::{ActiveOrder, ExchangeId, OrderBook, OrderSide, Price, Size};

use crate::config::StrategyConfig;
use crate::depth::price_for_volume;
use crate::pricer::SyntheticQuote;

/// Prices on one venue for an `order_amount`-sized trade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeRow {
    pub exchange: ExchangeId,
    pub market: String,
    pub mid_price: Option<Price>,
    pub buy_price: Option<Price>,
    pub sell_price: Option<Price>,
    pub buy_spread_bps: Option<Decimal>,
    pub sell_spread_bps: Option<Decimal>,
}

/// One open maker order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveOrderRow {
    pub exchange: ExchangeId,
    pub market: String,
    pub side: OrderSide,
    pub price: Price,
    pub amount: Size,
    /// Distance from the maker mid, positive when behind it.
    pub spread_mid_bps: Option<Decimal>,
    /// Distance to the spread-cancel threshold, positive when safe.
    pub spread_cancel_bps: Option<Decimal>,
    pub age_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub target_spread_bps: Decimal,
    pub exchanges: Vec<ExchangeRow>,
    pub active_orders: Vec<ActiveOrderRow>,
}

impl StatusReport {
    /// Assemble the report. `maker_book` and `quote` may be missing when the
    /// engine has not seen data yet; affected cells are left empty.
    pub fn build(
        config: &StrategyConfig,
        maker_book: Option<&OrderBook>,
        quote: Option<&SyntheticQuote>,
        active: &[ActiveOrder],
        now_ms: u64,
    ) -> Self {
        let amount = Size::new(config.order_amount);
        let maker_mid = maker_book.and_then(OrderBook::mid_price);
        let marginal = |side: OrderSide| {
            maker_book.and_then(|b| price_for_volume(b.side_for_taker(side), amount).ok().flatten())
        };
        let maker_buy = marginal(OrderSide::Buy);
        let maker_sell = marginal(OrderSide::Sell);

        let synth_bid = quote.and_then(|q| q.bid_price);
        let synth_ask = quote.and_then(|q| q.ask_price);
        let synth_mid = match (synth_bid, synth_ask) {
            (Some(b), Some(a)) => Some(Price::new((b.inner() + a.inner()) / Decimal::TWO)),
            _ => None,
        };

        // Buying on the maker is compared with buying through the taker legs
        // (the synthetic ask), selling with the synthetic bid.
        let buy_spread = spread_bps(maker_buy, synth_ask, maker_mid);
        let sell_spread = spread_bps(synth_bid, maker_sell, maker_mid);

        let exchanges = vec![
            ExchangeRow {
                exchange: config.maker_exchange.clone(),
                market: config.maker_pair.to_string(),
                mid_price: maker_mid,
                buy_price: maker_buy,
                sell_price: maker_sell,
                buy_spread_bps: buy_spread,
                sell_spread_bps: sell_spread,
            },
            ExchangeRow {
                exchange: config.taker_exchange.clone(),
                market: format!("{}/{}", config.taker_pair1, config.taker_pair2),
                mid_price: synth_mid,
                buy_price: synth_ask,
                sell_price: synth_bid,
                buy_spread_bps: buy_spread.map(|s| -s),
                sell_spread_bps: sell_spread.map(|s| -s),
            },
        ];

        let buy_threshold = synth_bid.map(|p| p.shift_bps(-config.min_spread_bps));
        let sell_threshold = synth_ask.map(|p| p.shift_bps(config.min_spread_bps));

        let mut active_orders: Vec<ActiveOrderRow> = active
            .iter()
            .filter(|o| o.pair == config.maker_pair)
            .map(|o| {
                let (spread_mid_bps, spread_cancel_bps) = match o.side {
                    OrderSide::Buy => (
                        maker_mid.and_then(|mid| o.price.bps_from(mid)).map(|b| -b),
                        buy_threshold.and_then(|t| o.price.bps_from(t)).map(|b| -b),
                    ),
                    OrderSide::Sell => (
                        maker_mid.and_then(|mid| o.price.bps_from(mid)),
                        sell_threshold.and_then(|t| o.price.bps_from(t)),
                    ),
                };
                ActiveOrderRow {
                    exchange: config.maker_exchange.clone(),
                    market: o.pair.to_string(),
                    side: o.side,
                    price: o.price,
                    amount: o.amount,
                    spread_mid_bps,
                    spread_cancel_bps,
                    age_ms: o.age_ms(now_ms),
                }
            })
            .collect();
        active_orders.sort_by(|a, b| {
            (a.market.as_str(), !a.side.is_buy()).cmp(&(b.market.as_str(), !b.side.is_buy()))
        });

        Self {
            target_spread_bps: config.spread_bps,
            exchanges,
            active_orders,
        }
    }
}

/// `(a - b) / mid` in basis points.
fn spread_bps(a: Option<Price>, b: Option<Price>, mid: Option<Price>) -> Option<Decimal> {
    let mid = mid?;
    Some(a?.bps_from(mid)? - b?.bps_from(mid)?)
}

fn cell<T: fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| v.to_string())
}

fn bps_cell(value: Option<Decimal>) -> String {
    cell(value.map(|v| v.round_dp(0).normalize()))
}

fn age_cell(age_ms: u64) -> String {
    if age_ms == 0 {
        return "n/a".to_string();
    }
    let secs = age_ms / 1000;
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "  Target spread: {} bps", self.target_spread_bps.normalize())?;
        writeln!(f)?;
        writeln!(f, "  Exchanges:")?;
        writeln!(
            f,
            "    {:<22} {:<20} {:>16} {:>16} {:>16} {:>10} {:>11}",
            "Exchange", "Market", "Mid Price", "Buy Price", "Sell Price", "Buy Spread", "Sell Spread"
        )?;
        for row in &self.exchanges {
            writeln!(
                f,
                "    {:<22} {:<20} {:>16} {:>16} {:>16} {:>10} {:>11}",
                row.exchange.as_str(),
                row.market,
                cell(row.mid_price),
                cell(row.buy_price),
                cell(row.sell_price),
                bps_cell(row.buy_spread_bps),
                bps_cell(row.sell_spread_bps),
            )?;
        }

        writeln!(f)?;
        if self.active_orders.is_empty() {
            return write!(f, "  No active maker orders.");
        }
        writeln!(f, "  Active Orders:")?;
        writeln!(
            f,
            "    {:<22} {:<10} {:<4} {:>16} {:>12} {:>10} {:>13} {:>8}",
            "Exchange", "Market", "Side", "Price", "Amount", "Spread Mid", "Spread Cancel", "Age"
        )?;
        for row in &self.active_orders {
            writeln!(
                f,
                "    {:<22} {:<10} {:<4} {:>16} {:>12} {:>10} {:>13} {:>8}",
                row.exchange.as_str(),
                row.market,
                row.side.to_string(),
                row.price.to_string(),
                row.amount.to_string(),
                bps_cell(row.spread_mid_bps),
                bps_cell(row.spread_cancel_bps),
                age_cell(row.age_ms),
            )?;
        }
        Ok(())
    }
}
