//! Engine glue: ties pricing, quoting and hedging to a [`Connector`].
//!
//! The host calls [`XemmEngine::on_tick`] periodically and
//! [`XemmEngine::on_fill`] for every fill notification, both from the same
//! task. The engine holds no locks and performs no I/O of its own.

use std::collections::HashSet;

use xemm_core::{ClientOrderId, FillEvent, OrderBook, OrderSide, Size, TradingPair};
use tracing::{debug, info, warn};

use crate::config::StrategyConfig;
use crate::connector::Connector;
use crate::error::{StrategyError, StrategyResult};
use crate::hedge::{HedgeExecutor, HedgePlan};
use crate::pricer::{compute_synthetic_quote, ProfitFactors, SyntheticQuote};
use crate::quote_manager::{CancelReason, MakerAction, QuoteManager};
use crate::report::StatusReport;

/// What one tick did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub quote: Option<SyntheticQuote>,
    /// Maker orders submitted, with the side they quote.
    pub placed: Vec<(OrderSide, ClientOrderId)>,
    pub cancelled: Vec<(ClientOrderId, CancelReason)>,
    /// Placements submitted with a zero budget-adjusted amount.
    pub zero_amount: usize,
    pub submit_failures: usize,
    pub cancel_failures: usize,
}

/// Result of handling a fill notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FillOutcome {
    /// Not one of our maker orders; nothing happened.
    Ignored,
    /// Maker side reset and hedge legs sent.
    Hedged {
        plan: HedgePlan,
        /// Ids of legs the gateway accepted.
        submitted: Vec<ClientOrderId>,
        submit_failures: usize,
    },
}

/// Triangular XEMM engine over a single connector.
pub struct XemmEngine<C: Connector> {
    config: StrategyConfig,
    connector: C,
    quote_manager: QuoteManager,
    hedger: HedgeExecutor,
    factors: ProfitFactors,
    last_quote: Option<SyntheticQuote>,
}

impl<C: Connector> XemmEngine<C> {
    /// Validate `config` and build an engine with both maker sides empty.
    pub fn new(config: StrategyConfig, connector: C) -> StrategyResult<Self> {
        config.validate()?;
        info!(
            maker = %format!("{}:{}", config.maker_exchange, config.maker_pair),
            leg1 = %config.taker_pair1,
            leg2 = %config.taker_pair2,
            taker = %config.taker_exchange,
            order_amount = %config.order_amount,
            min_profitability = %config.min_profitability,
            "XEMM engine initialized"
        );
        Ok(Self {
            factors: ProfitFactors::from_min_profitability(config.min_profitability),
            quote_manager: QuoteManager::new(config.clone()),
            hedger: HedgeExecutor::new(&config),
            config,
            connector,
            last_quote: None,
        })
    }

    /// Reprice, place missing maker orders and cancel stale ones.
    ///
    /// Fails without touching any order when a taker book is missing or
    /// malformed; the host logs and retries on the next tick.
    pub fn on_tick(&mut self, now_ms: u64) -> StrategyResult<TickReport> {
        let (leg1, leg2) = match self.taker_books() {
            Ok(books) => books,
            Err(e) => {
                warn!(error = %e, "Skipping tick, taker books unusable");
                return Err(e);
            }
        };
        let quote = compute_synthetic_quote(
            Size::new(self.config.order_amount),
            &leg1,
            &leg2,
            self.factors,
        )?;
        debug!(
            bid = ?quote.bid_price.map(|p| p.to_string()),
            ask = ?quote.ask_price.map(|p| p.to_string()),
            bid_depth_complete = quote.bid_depth_complete,
            ask_depth_complete = quote.ask_depth_complete,
            "Synthetic quote"
        );
        self.last_quote = Some(quote);

        let active = self.connector.active_orders(&self.config.maker_exchange);
        let connector = &self.connector;
        let maker_exchange = &self.config.maker_exchange;
        let actions = self.quote_manager.on_tick(&quote, &active, now_ms, |candidate| {
            connector.adjust_candidate(maker_exchange, candidate, false)
        });

        let mut report = TickReport {
            quote: Some(quote),
            ..Default::default()
        };
        for action in actions {
            self.execute(action, &mut report);
        }
        Ok(report)
    }

    /// Hedge a maker fill and free its side for re-quoting.
    ///
    /// Fills for orders that are neither open on the maker venue nor tracked
    /// here are ignored. Only the side tracking the filled id is reset, and
    /// the reset happens before the hedge is planned, so a planning error
    /// still leaves it ready to re-quote. Untracked venue orders are hedged
    /// without touching either side.
    pub fn on_fill(&mut self, event: &FillEvent) -> StrategyResult<FillOutcome> {
        let tracked = self.quote_manager.tracks(&event.order_id);
        if tracked.is_none() && !self.is_open_maker_order(&event.order_id) {
            debug!(
                order_id = %event.order_id,
                pair = %event.pair,
                "Fill for unknown order, ignoring"
            );
            return Ok(FillOutcome::Ignored);
        }

        info!(
            order_id = %event.order_id,
            side = %event.side,
            amount = %event.filled_amount,
            price = %event.filled_price,
            "Maker order filled"
        );
        match tracked {
            Some(side) => {
                self.quote_manager.record_fill(side);
            }
            None => debug!(
                order_id = %event.order_id,
                "Filled order is not tracked, maker sides unchanged"
            ),
        }

        let (leg1_book, leg2_book) = self.taker_books()?;
        let plan = self.hedger.plan(event, &leg1_book, &leg2_book)?;

        let mut submitted = Vec::with_capacity(2);
        let mut submit_failures = 0;
        for leg in plan.legs() {
            let candidate =
                self.connector
                    .adjust_candidate(&leg.exchange, leg.to_candidate(), false);
            if candidate.amount.is_zero() {
                warn!(pair = %leg.pair, side = %leg.side, "Hedge leg has zero amount");
            }
            match self.connector.submit_order(&leg.exchange, &candidate) {
                Ok(id) => {
                    info!(
                        pair = %leg.pair,
                        side = %leg.side,
                        amount = %candidate.amount,
                        limit = %candidate.price,
                        order_id = %id,
                        "Hedge order sent"
                    );
                    submitted.push(id);
                }
                Err(e) => {
                    warn!(pair = %leg.pair, side = %leg.side, error = %e, "Hedge order rejected");
                    submit_failures += 1;
                }
            }
        }

        Ok(FillOutcome::Hedged {
            plan,
            submitted,
            submit_failures,
        })
    }

    /// Current status tables.
    pub fn status(&self, now_ms: u64) -> StatusReport {
        let maker_book = self.connector.order_book(&self.config.maker_pair);
        let active = self.connector.active_orders(&self.config.maker_exchange);
        StatusReport::build(
            &self.config,
            maker_book.as_ref(),
            self.last_quote.as_ref(),
            &active,
            now_ms,
        )
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    pub fn connector_mut(&mut self) -> &mut C {
        &mut self.connector
    }

    pub fn quote_manager(&self) -> &QuoteManager {
        &self.quote_manager
    }

    /// Synthetic quote from the last successful tick.
    pub fn last_quote(&self) -> Option<&SyntheticQuote> {
        self.last_quote.as_ref()
    }

    // === Private helpers ===

    fn taker_books(&self) -> StrategyResult<(OrderBook, OrderBook)> {
        let leg1 = self.book(&self.config.taker_pair1)?;
        let leg2 = self.book(&self.config.taker_pair2)?;
        Ok((leg1, leg2))
    }

    fn book(&self, pair: &TradingPair) -> StrategyResult<OrderBook> {
        let book = self
            .connector
            .order_book(pair)
            .ok_or_else(|| StrategyError::BookUnavailable(pair.clone()))?;
        book.validate()
            .map_err(|e| StrategyError::InvalidBook(format!("{pair}: {e}")))?;
        Ok(book)
    }

    fn is_open_maker_order(&self, order_id: &ClientOrderId) -> bool {
        let open: HashSet<ClientOrderId> = self
            .connector
            .active_orders(&self.config.maker_exchange)
            .into_iter()
            .filter(|o| o.pair == self.config.maker_pair)
            .map(|o| o.order_id)
            .collect();
        open.contains(order_id)
    }

    fn execute(&mut self, action: MakerAction, report: &mut TickReport) {
        let exchange = &self.config.maker_exchange;
        match action {
            MakerAction::Place(candidate) => {
                if candidate.amount.is_zero() {
                    report.zero_amount += 1;
                }
                match self.connector.submit_order(exchange, &candidate) {
                    Ok(id) => {
                        self.quote_manager.confirm_order_id(candidate.side, id.clone());
                        report.placed.push((candidate.side, id));
                    }
                    Err(e) => {
                        // Side stays Placed and is aged out like any other order.
                        warn!(
                            side = %candidate.side,
                            cloid = %candidate.cloid,
                            error = %e,
                            "Maker order rejected"
                        );
                        report.submit_failures += 1;
                    }
                }
            }
            MakerAction::Cancel {
                pair,
                order_id,
                reason,
                ..
            } => match self.connector.cancel_order(exchange, &pair, &order_id) {
                Ok(()) => report.cancelled.push((order_id, reason)),
                Err(e) => {
                    warn!(order_id = %order_id, error = %e, "Maker cancel failed");
                    report.cancel_failures += 1;
                }
            },
        }
    }
}
