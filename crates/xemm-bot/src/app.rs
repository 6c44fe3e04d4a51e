//! Main application orchestrator.

use std::time::Duration;

use rust_decimal::prelude::ToPrimitive;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use xemm_core::{FillEvent, OrderSide};
use xemm_strategy::{FillOutcome, OrderGateway, TickReport, XemmEngine};
use xemm_telemetry::Metrics;

use crate::config::AppConfig;
use crate::error::AppResult;
use crate::paper::PaperExchange;

/// Main application.
pub struct Application {
    config: AppConfig,
    engine: XemmEngine<PaperExchange>,
    fill_rx: mpsc::Receiver<FillEvent>,
    fills_hedged: u64,
}

impl Application {
    /// Build the paper venue and the engine from configuration.
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let (fill_tx, fill_rx) = mpsc::channel(config.fill_channel_capacity);
        let venue = PaperExchange::new(&config.paper, fill_tx);
        let engine = XemmEngine::new(config.strategy.clone(), venue)?;
        Ok(Self {
            config,
            engine,
            fill_rx,
            fills_hedged: 0,
        })
    }

    pub fn engine(&self) -> &XemmEngine<PaperExchange> {
        &self.engine
    }

    /// Run until Ctrl-C.
    ///
    /// Ticks, fill notifications and status output all run on this task, so
    /// the engine never sees two events at once.
    pub async fn run(mut self) -> AppResult<()> {
        info!(
            tick_interval_ms = self.config.tick_interval_ms,
            "Entering main event loop"
        );
        let mut tick_interval =
            tokio::time::interval(Duration::from_millis(self.config.tick_interval_ms));
        tick_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let status_secs = self.config.status_interval_secs;
        let mut status_interval = tokio::time::interval(Duration::from_secs(status_secs.max(1)));

        loop {
            tokio::select! {
                _ = tick_interval.tick() => {
                    self.step(now_ms());
                }

                Some(event) = self.fill_rx.recv() => {
                    self.handle_fill(&event);
                }

                _ = status_interval.tick(), if status_secs > 0 => {
                    info!("Status:{}", self.engine.status(now_ms()));
                }

                _ = tokio::signal::ctrl_c() => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        self.shutdown();
        info!(fills_hedged = self.fills_hedged, "Shutting down");
        match Metrics::render() {
            Ok(text) => debug!(metrics = %text, "Final metrics"),
            Err(e) => warn!(error = %e, "Failed to render metrics"),
        }
        Ok(())
    }

    /// One tick: hedge fills still queued, run the strategy, then let the
    /// paper venue match resting orders (fills arrive on the channel).
    ///
    /// Queued fills go first so a tick never ages out an order that has
    /// already filled.
    pub fn step(&mut self, now_ms: u64) -> Option<TickReport> {
        self.drain_fills();
        self.engine.connector_mut().advance_to(now_ms);
        let report = match self.engine.on_tick(now_ms) {
            Ok(report) => {
                record_tick(&report);
                Some(report)
            }
            Err(e) => {
                Metrics::tick_error();
                error!(error = %e, "Tick failed");
                None
            }
        };
        Metrics::maker_orders_open(self.engine.quote_manager().placed_count());
        self.engine.connector_mut().match_resting(now_ms);
        report
    }

    /// Process one fill notification; returns whether a hedge was sent.
    pub fn handle_fill(&mut self, event: &FillEvent) -> bool {
        match self.engine.on_fill(event) {
            Ok(FillOutcome::Ignored) => {
                Metrics::unmatched_fill();
                false
            }
            Ok(FillOutcome::Hedged {
                plan,
                submitted,
                submit_failures,
            }) => {
                Metrics::maker_fill(&event.side.to_string());
                if !plan.depth_complete {
                    Metrics::hedge_incomplete_depth();
                }
                for leg in plan.legs() {
                    Metrics::hedge_order(&leg.pair.to_string(), &leg.side.to_string());
                }
                for _ in 0..submit_failures {
                    Metrics::order_rejected("hedge_submit");
                }
                info!(
                    order_id = %event.order_id,
                    legs_sent = submitted.len(),
                    submit_failures,
                    "Maker fill hedged"
                );
                self.fills_hedged += 1;
                true
            }
            Err(e) => {
                error!(order_id = %event.order_id, error = %e, "Hedge failed");
                false
            }
        }
    }

    /// Drain fills already queued by the venue.
    pub fn drain_fills(&mut self) -> usize {
        let mut hedged = 0;
        while let Ok(event) = self.fill_rx.try_recv() {
            if self.handle_fill(&event) {
                hedged += 1;
            }
        }
        hedged
    }

    fn shutdown(&mut self) {
        let exchange = self.config.strategy.maker_exchange.clone();
        let venue = self.engine.connector_mut();
        for order in venue.active_orders(&exchange) {
            if let Err(e) = venue.cancel_order(&exchange, &order.pair, &order.order_id) {
                warn!(order_id = %order.order_id, error = %e, "Cancel on shutdown failed");
            }
        }
    }
}

fn record_tick(report: &TickReport) {
    if let Some(quote) = &report.quote {
        for (label, side) in [("bid", OrderSide::Buy), ("ask", OrderSide::Sell)] {
            if let Some(price) = quote.price(side).and_then(|p| p.inner().to_f64()) {
                Metrics::synthetic_price(label, price);
            }
        }
    }
    for (side, _) in &report.placed {
        Metrics::maker_placed(&side.to_string());
    }
    for (_, reason) in &report.cancelled {
        Metrics::maker_cancelled(reason.as_str());
    }
    for _ in 0..report.zero_amount {
        Metrics::maker_zero_amount();
    }
    for _ in 0..report.submit_failures {
        Metrics::order_rejected("maker_submit");
    }
    for _ in 0..report.cancel_failures {
        Metrics::order_rejected("maker_cancel");
    }
}

fn now_ms() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0)
}
