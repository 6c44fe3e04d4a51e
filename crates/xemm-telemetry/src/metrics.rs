//! Prometheus metrics for the XEMM bot.
//!
//! Covers maker quoting, hedging and tick health.
//!
//! # Panics
//!
//! Metric registration uses `unwrap()`. A failure there means a duplicate
//! metric name, which is a startup bug; it can only happen during static
//! initialization.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_gauge_vec, register_int_counter, register_int_gauge,
    CounterVec, Encoder, GaugeVec, IntCounter, IntGauge, TextEncoder,
};

use crate::error::{TelemetryError, TelemetryResult};

/// Maker orders submitted.
/// Labels: side (buy/sell)
pub static MAKER_ORDERS_PLACED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "xemm_maker_orders_placed_total",
        "Total maker orders submitted",
        &["side"]
    )
    .unwrap()
});

/// Maker orders cancelled.
/// Labels: reason (max_age/spread/orphan)
pub static MAKER_ORDERS_CANCELLED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "xemm_maker_orders_cancelled_total",
        "Total maker orders cancelled",
        &["reason"]
    )
    .unwrap()
});

/// Maker orders submitted with a zero budget-adjusted amount.
pub static MAKER_ZERO_AMOUNT_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "xemm_maker_zero_amount_total",
        "Maker orders submitted with zero amount after budget adjustment"
    )
    .unwrap()
});

/// Maker fills seen.
/// Labels: side
pub static MAKER_FILLS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "xemm_maker_fills_total",
        "Total maker fills hedged",
        &["side"]
    )
    .unwrap()
});

/// Hedge orders sent to the taker venue.
/// Labels: pair, side
pub static HEDGE_ORDERS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "xemm_hedge_orders_total",
        "Total hedge orders submitted",
        &["pair", "side"]
    )
    .unwrap()
});

/// Hedges sized on an incomplete taker book.
pub static HEDGE_INCOMPLETE_DEPTH_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "xemm_hedge_incomplete_depth_total",
        "Hedges where taker depth did not cover the fill"
    )
    .unwrap()
});

/// Fill notifications for orders that are not ours.
pub static UNMATCHED_FILLS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "xemm_unmatched_fills_total",
        "Fill events ignored because the order is not a tracked maker order"
    )
    .unwrap()
});

/// Order submissions or cancels the gateway rejected.
/// Labels: kind (maker_submit/maker_cancel/hedge_submit)
pub static ORDER_REJECTS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "xemm_order_rejects_total",
        "Order operations rejected by the gateway",
        &["kind"]
    )
    .unwrap()
});

/// Current synthetic maker price.
/// Labels: side (bid/ask)
pub static SYNTHETIC_PRICE: Lazy<GaugeVec> = Lazy::new(|| {
    register_gauge_vec!(
        "xemm_synthetic_price",
        "Synthetic maker price derived from the taker legs",
        &["side"]
    )
    .unwrap()
});

/// Ticks that failed (missing or malformed books).
pub static TICK_ERRORS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("xemm_tick_errors_total", "Ticks skipped due to errors").unwrap()
});

/// Maker sides currently holding an order (0-2).
pub static MAKER_ORDERS_OPEN: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!(
        "xemm_maker_orders_open",
        "Maker sides currently holding an order"
    )
    .unwrap()
});

/// Metrics facade.
pub struct Metrics;

impl Metrics {
    pub fn maker_placed(side: &str) {
        MAKER_ORDERS_PLACED_TOTAL.with_label_values(&[side]).inc();
    }

    pub fn maker_cancelled(reason: &str) {
        MAKER_ORDERS_CANCELLED_TOTAL
            .with_label_values(&[reason])
            .inc();
    }

    pub fn maker_zero_amount() {
        MAKER_ZERO_AMOUNT_TOTAL.inc();
    }

    pub fn maker_fill(side: &str) {
        MAKER_FILLS_TOTAL.with_label_values(&[side]).inc();
    }

    pub fn maker_orders_open(count: usize) {
        MAKER_ORDERS_OPEN.set(i64::try_from(count).unwrap_or(i64::MAX));
    }

    pub fn hedge_order(pair: &str, side: &str) {
        HEDGE_ORDERS_TOTAL.with_label_values(&[pair, side]).inc();
    }

    pub fn hedge_incomplete_depth() {
        HEDGE_INCOMPLETE_DEPTH_TOTAL.inc();
    }

    pub fn unmatched_fill() {
        UNMATCHED_FILLS_TOTAL.inc();
    }

    pub fn order_rejected(kind: &str) {
        ORDER_REJECTS_TOTAL.with_label_values(&[kind]).inc();
    }

    pub fn synthetic_price(side: &str, price: f64) {
        SYNTHETIC_PRICE.with_label_values(&[side]).set(price);
    }

    pub fn tick_error() {
        TICK_ERRORS_TOTAL.inc();
    }

    /// Render every registered metric in the Prometheus text format.
    pub fn render() -> TelemetryResult<String> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&prometheus::gather(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| TelemetryError::Metrics(e.to_string()))
    }
}
