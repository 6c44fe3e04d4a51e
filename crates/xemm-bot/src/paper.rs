//! In-memory paper venue.
//!
//! Serves static books, sizes orders against per-exchange balances, rests
//! maker orders and fills them when the maker book crosses them, and
//! executes IOC taker orders immediately against the configured depth.
//! Books are never consumed; balances are.

use std::collections::HashMap;

use rust_decimal::Decimal;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use xemm_core::{
    ActiveOrder, ClientOrderId, ExchangeId, FillEvent, OrderBook, OrderCandidate, OrderSide,
    Price, Size, TimeInForce, TradingPair,
};
use xemm_strategy::{BudgetChecker, MarketDataSource, OrderGateway, StrategyError, StrategyResult};

use crate::config::PaperConfig;

#[derive(Debug, Clone)]
struct RestingOrder {
    exchange: ExchangeId,
    order: ActiveOrder,
}

/// Paper venue shared by the maker and taker exchanges.
#[derive(Debug)]
pub struct PaperExchange {
    books: HashMap<TradingPair, OrderBook>,
    balances: HashMap<ExchangeId, HashMap<String, Decimal>>,
    resting: Vec<RestingOrder>,
    fill_tx: mpsc::Sender<FillEvent>,
    now_ms: u64,
}

impl PaperExchange {
    pub fn new(config: &PaperConfig, fill_tx: mpsc::Sender<FillEvent>) -> Self {
        let books = config
            .books
            .iter()
            .map(|b| (b.pair.clone(), b.clone()))
            .collect();
        let balances = config
            .balances
            .iter()
            .map(|(exchange, assets)| (ExchangeId::new(exchange.clone()), assets.clone()))
            .collect();
        Self {
            books,
            balances,
            resting: Vec::new(),
            fill_tx,
            now_ms: 0,
        }
    }

    /// Move the venue clock; new orders are stamped with this time.
    pub fn advance_to(&mut self, now_ms: u64) {
        self.now_ms = self.now_ms.max(now_ms);
    }

    /// Replace (or add) the book for `book.pair`.
    pub fn set_book(&mut self, book: OrderBook) {
        self.books.insert(book.pair.clone(), book);
    }

    pub fn balance(&self, exchange: &ExchangeId, asset: &str) -> Decimal {
        self.balances
            .get(exchange)
            .and_then(|assets| assets.get(asset))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Fill every resting order its own pair's book now crosses.
    ///
    /// A resting buy fills when the best ask is at or below its price, a
    /// resting sell when the best bid is at or above it. Fills are for the
    /// whole remaining amount at the order price, and are published on the
    /// fill channel. Returns the events sent.
    pub fn match_resting(&mut self, now_ms: u64) -> Vec<FillEvent> {
        self.advance_to(now_ms);
        let mut fills = Vec::new();
        let mut still_resting = Vec::with_capacity(self.resting.len());

        for resting in std::mem::take(&mut self.resting) {
            let order = &resting.order;
            let crossed = self.books.get(&order.pair).is_some_and(|book| match order.side {
                OrderSide::Buy => book.best_ask().is_some_and(|ask| ask <= order.price),
                OrderSide::Sell => book.best_bid().is_some_and(|bid| bid >= order.price),
            });
            if !crossed || !order.amount.is_positive() {
                still_resting.push(resting);
                continue;
            }

            self.settle(&resting.exchange, &order.pair, order.side, order.amount, order.price);
            let event = FillEvent {
                order_id: order.order_id.clone(),
                pair: order.pair.clone(),
                side: order.side,
                filled_amount: order.amount,
                filled_price: order.price,
                timestamp_ms: self.now_ms,
            };
            info!(
                order_id = %event.order_id,
                side = %event.side,
                amount = %event.filled_amount,
                price = %event.filled_price,
                "Paper maker fill"
            );
            if let Err(e) = self.fill_tx.try_send(event.clone()) {
                warn!(error = %e, "Fill channel unavailable, dropping fill notification");
            }
            fills.push(event);
        }

        self.resting = still_resting;
        fills
    }

    // === Private helpers ===

    fn available(&self, exchange: &ExchangeId, asset: &str) -> Decimal {
        let locked: Decimal = self
            .resting
            .iter()
            .filter(|r| &r.exchange == exchange)
            .map(|r| {
                let o = &r.order;
                match o.side {
                    OrderSide::Buy if o.pair.quote() == asset => o.amount.notional(o.price),
                    OrderSide::Sell if o.pair.base() == asset => o.amount.inner(),
                    _ => Decimal::ZERO,
                }
            })
            .sum();
        (self.balance(exchange, asset) - locked).max(Decimal::ZERO)
    }

    fn settle(&mut self, exchange: &ExchangeId, pair: &TradingPair, side: OrderSide, amount: Size, price: Price) {
        let quote_amount = amount.notional(price);
        let (base_delta, quote_delta) = match side {
            OrderSide::Buy => (amount.inner(), -quote_amount),
            OrderSide::Sell => (-amount.inner(), quote_amount),
        };
        let assets = self.balances.entry(exchange.clone()).or_default();
        *assets.entry(pair.base().to_string()).or_default() += base_delta;
        *assets.entry(pair.quote().to_string()).or_default() += quote_delta;
    }

    /// Execute an IOC order against the book; returns (filled base, quote).
    fn execute_ioc(&self, candidate: &OrderCandidate) -> (Size, Decimal) {
        let Some(book) = self.books.get(&candidate.pair) else {
            return (Size::ZERO, Decimal::ZERO);
        };
        let mut remaining = candidate.amount.inner();
        let mut filled = Decimal::ZERO;
        let mut quote = Decimal::ZERO;

        for level in book.side_for_taker(candidate.side) {
            let within_limit = match candidate.side {
                OrderSide::Buy => level.price <= candidate.price,
                OrderSide::Sell => level.price >= candidate.price,
            };
            if remaining <= Decimal::ZERO || !within_limit {
                break;
            }
            let take = level.amount.inner().min(remaining);
            filled += take;
            quote += take * level.price.inner();
            remaining -= take;
        }
        (Size::new(filled), quote)
    }
}

impl MarketDataSource for PaperExchange {
    fn order_book(&self, pair: &TradingPair) -> Option<OrderBook> {
        self.books.get(pair).cloned()
    }
}

impl BudgetChecker for PaperExchange {
    fn adjust_candidate(
        &self,
        exchange: &ExchangeId,
        candidate: OrderCandidate,
        all_or_none: bool,
    ) -> OrderCandidate {
        let affordable = match candidate.side {
            OrderSide::Buy => {
                if !candidate.price.is_positive() {
                    return candidate.with_amount(Size::ZERO);
                }
                self.available(exchange, candidate.pair.quote()) / candidate.price.inner()
            }
            OrderSide::Sell => self.available(exchange, candidate.pair.base()),
        };

        if candidate.amount.inner() <= affordable {
            return candidate;
        }
        let adjusted = if all_or_none {
            Size::ZERO
        } else {
            Size::new(affordable)
        };
        debug!(
            exchange = %exchange,
            side = %candidate.side,
            requested = %candidate.amount,
            adjusted = %adjusted,
            "Order amount reduced by budget"
        );
        candidate.with_amount(adjusted)
    }
}

impl OrderGateway for PaperExchange {
    fn submit_order(
        &mut self,
        exchange: &ExchangeId,
        candidate: &OrderCandidate,
    ) -> StrategyResult<ClientOrderId> {
        if candidate.amount.is_negative() {
            return Err(StrategyError::Connector(format!(
                "negative amount {}",
                candidate.amount
            )));
        }

        match candidate.tif {
            TimeInForce::ImmediateOrCancel => {
                let (filled, quote) = self.execute_ioc(candidate);
                if filled.is_positive() {
                    let avg = Price::new(quote / filled.inner());
                    self.settle(exchange, &candidate.pair, candidate.side, filled, avg);
                }
                info!(
                    exchange = %exchange,
                    pair = %candidate.pair,
                    side = %candidate.side,
                    requested = %candidate.amount,
                    filled = %filled,
                    limit = %candidate.price,
                    "Paper IOC executed"
                );
            }
            TimeInForce::GoodTilCancelled => {
                self.resting.push(RestingOrder {
                    exchange: exchange.clone(),
                    order: ActiveOrder {
                        order_id: candidate.cloid.clone(),
                        pair: candidate.pair.clone(),
                        side: candidate.side,
                        price: candidate.price,
                        amount: candidate.amount,
                        created_at_ms: self.now_ms,
                    },
                });
            }
        }
        Ok(candidate.cloid.clone())
    }

    fn cancel_order(
        &mut self,
        exchange: &ExchangeId,
        pair: &TradingPair,
        order_id: &ClientOrderId,
    ) -> StrategyResult<()> {
        let before = self.resting.len();
        self.resting.retain(|r| {
            !(&r.exchange == exchange && &r.order.pair == pair && &r.order.order_id == order_id)
        });
        if self.resting.len() == before {
            return Err(StrategyError::Connector(format!(
                "order {order_id} not open on {exchange}"
            )));
        }
        Ok(())
    }

    fn active_orders(&self, exchange: &ExchangeId) -> Vec<ActiveOrder> {
        self.resting
            .iter()
            .filter(|r| &r.exchange == exchange)
            .map(|r| r.order.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use xemm_core::OrderBookLevel;

    fn lvl(price: Decimal, amount: Decimal) -> OrderBookLevel {
        OrderBookLevel::new(Price::new(price), Size::new(amount))
    }

    fn maker() -> ExchangeId {
        ExchangeId::new("maker")
    }

    fn paper() -> (PaperExchange, mpsc::Receiver<FillEvent>) {
        let mut balances = HashMap::new();
        balances.insert(
            "maker".to_string(),
            HashMap::from([("CKB".to_string(), dec!(100)), ("BTC".to_string(), dec!(10))]),
        );
        let config = PaperConfig {
            books: vec![OrderBook::new(
                TradingPair::new("CKB", "BTC"),
                vec![lvl(dec!(0.9), dec!(50))],
                vec![lvl(dec!(1.1), dec!(50)), lvl(dec!(1.2), dec!(50))],
            )],
            balances,
        };
        let (tx, rx) = mpsc::channel(16);
        (PaperExchange::new(&config, tx), rx)
    }

    fn candidate(side: OrderSide, amount: Decimal, price: Decimal) -> OrderCandidate {
        OrderCandidate::maker(
            TradingPair::new("CKB", "BTC"),
            side,
            Size::new(amount),
            Price::new(price),
        )
    }

    #[test]
    fn test_budget_caps_buy_by_quote_balance() {
        let (venue, _rx) = paper();
        let adjusted = venue.adjust_candidate(&maker(), candidate(OrderSide::Buy, dec!(50), dec!(0.5)), false);
        assert_eq!(adjusted.amount, Size::new(dec!(20)));
        let aon = venue.adjust_candidate(&maker(), candidate(OrderSide::Buy, dec!(50), dec!(0.5)), true);
        assert!(aon.amount.is_zero());
    }

    #[test]
    fn test_budget_caps_sell_by_base_balance() {
        let (venue, _rx) = paper();
        let ok = venue.adjust_candidate(&maker(), candidate(OrderSide::Sell, dec!(80), dec!(2)), false);
        assert_eq!(ok.amount, Size::new(dec!(80)));
        let capped = venue.adjust_candidate(&maker(), candidate(OrderSide::Sell, dec!(150), dec!(2)), false);
        assert_eq!(capped.amount, Size::new(dec!(100)));
    }

    #[test]
    fn test_unknown_exchange_has_no_budget() {
        let (venue, _rx) = paper();
        let c = venue.adjust_candidate(&ExchangeId::new("other"), candidate(OrderSide::Sell, dec!(1), dec!(1)), false);
        assert!(c.amount.is_zero());
    }

    #[test]
    fn test_resting_orders_lock_budget() {
        let (mut venue, _rx) = paper();
        venue
            .submit_order(&maker(), &candidate(OrderSide::Sell, dec!(60), dec!(2)))
            .unwrap();
        let c = venue.adjust_candidate(&maker(), candidate(OrderSide::Sell, dec!(60), dec!(2)), false);
        assert_eq!(c.amount, Size::new(dec!(40)));
    }

    #[test]
    fn test_rest_cancel_and_list() {
        let (mut venue, _rx) = paper();
        venue.advance_to(5_000);
        let c = candidate(OrderSide::Buy, dec!(1), dec!(0.8));
        let id = venue.submit_order(&maker(), &c).unwrap();
        assert_eq!(id, c.cloid);

        let active = venue.active_orders(&maker());
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].created_at_ms, 5_000);
        assert!(venue.active_orders(&ExchangeId::new("other")).is_empty());

        venue.cancel_order(&maker(), &c.pair, &id).unwrap();
        assert!(venue.active_orders(&maker()).is_empty());
        assert!(venue.cancel_order(&maker(), &c.pair, &id).is_err());
    }

    #[test]
    fn test_match_resting_fills_crossed_orders() {
        let (mut venue, mut rx) = paper();
        let crossed = candidate(OrderSide::Buy, dec!(2), dec!(1.1));
        let passive = candidate(OrderSide::Sell, dec!(2), dec!(1.5));
        venue.submit_order(&maker(), &crossed).unwrap();
        venue.submit_order(&maker(), &passive).unwrap();

        let fills = venue.match_resting(10_000);
        assert_eq!(fills.len(), 1);
        assert_eq!(fills[0].order_id, crossed.cloid);
        assert_eq!(fills[0].filled_amount, Size::new(dec!(2)));
        assert_eq!(fills[0].timestamp_ms, 10_000);

        let sent = rx.try_recv().unwrap();
        assert_eq!(sent, fills[0]);
        assert_eq!(venue.active_orders(&maker()).len(), 1);
        assert_eq!(venue.balance(&maker(), "CKB"), dec!(102));
        assert_eq!(venue.balance(&maker(), "BTC"), dec!(7.8));
    }

    #[test]
    fn test_ioc_executes_within_limit() {
        let (mut venue, _rx) = paper();
        let ioc = OrderCandidate::taker(
            TradingPair::new("CKB", "BTC"),
            OrderSide::Buy,
            Size::new(dec!(80)),
            Price::new(dec!(1.15)),
        );
        venue.submit_order(&maker(), &ioc).unwrap();
        // Only the 1.1 level is inside the limit.
        assert_eq!(venue.balance(&maker(), "CKB"), dec!(150));
        assert_eq!(venue.balance(&maker(), "BTC"), dec!(-45));
        assert!(venue.active_orders(&maker()).is_empty());
    }

    #[test]
    fn test_ioc_below_market_does_not_fill() {
        let (mut venue, _rx) = paper();
        let ioc = OrderCandidate::taker(
            TradingPair::new("CKB", "BTC"),
            OrderSide::Buy,
            Size::new(dec!(1)),
            Price::new(dec!(1.0)),
        );
        venue.submit_order(&maker(), &ioc).unwrap();
        assert_eq!(venue.balance(&maker(), "CKB"), dec!(100));
    }

    #[test]
    fn test_rejects_negative_amount() {
        let (mut venue, _rx) = paper();
        let bad = candidate(OrderSide::Buy, dec!(-1), dec!(1));
        assert!(matches!(
            venue.submit_order(&maker(), &bad),
            Err(StrategyError::Connector(_))
        ));
    }
}
