//! Strategy configuration.
//!
//! Built once at startup and never mutated afterwards; the engine only holds
//! a shared reference to it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use xemm_core::{ExchangeId, TradingPair, BPS_DIVISOR};

use crate::error::{StrategyError, StrategyResult};

/// Triangular XEMM configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Venue where maker quotes rest.
    #[serde(default = "default_maker_exchange")]
    pub maker_exchange: ExchangeId,

    /// Pair quoted on the maker venue (`A-B`).
    #[serde(default = "default_maker_pair")]
    pub maker_pair: TradingPair,

    /// Venue where fills are hedged.
    #[serde(default = "default_taker_exchange")]
    pub taker_exchange: ExchangeId,

    /// First hedge leg (`A-Q`).
    #[serde(default = "default_taker_pair1")]
    pub taker_pair1: TradingPair,

    /// Second hedge leg (`B-Q`).
    #[serde(default = "default_taker_pair2")]
    pub taker_pair2: TradingPair,

    /// Size of each maker order, also the reference amount for synthetic pricing.
    #[serde(default = "default_order_amount")]
    pub order_amount: Decimal,

    /// Target maker spread to the taker price in basis points (shown in reports).
    #[serde(default = "default_spread_bps")]
    pub spread_bps: Decimal,

    /// Spread floor in basis points; only acted on when `spread_cancel_enabled`.
    #[serde(default)]
    pub min_spread_bps: Decimal,

    /// Buffer applied to hedge limit prices, in basis points.
    #[serde(default = "default_slippage_buffer_bps")]
    pub slippage_buffer_bps: Decimal,

    /// Maker orders older than this are cancelled and re-quoted.
    #[serde(default = "default_max_order_age_secs")]
    pub max_order_age_secs: u64,

    /// Minimum arbitrage margin as a fraction (0.001 = 0.1%).
    #[serde(default = "default_min_profitability")]
    pub min_profitability: Decimal,

    // --- Opt-in extensions (all off by default) ---
    /// Cancel a maker order once it sits inside `min_spread_bps` of the
    /// current synthetic price.
    #[serde(default)]
    pub spread_cancel_enabled: bool,

    /// Do not submit maker orders whose budget-adjusted amount is zero.
    #[serde(default)]
    pub skip_zero_amount_orders: bool,

    /// Do not quote a side whose synthetic price came from an incomplete walk.
    #[serde(default)]
    pub require_full_depth: bool,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            maker_exchange: default_maker_exchange(),
            maker_pair: default_maker_pair(),
            taker_exchange: default_taker_exchange(),
            taker_pair1: default_taker_pair1(),
            taker_pair2: default_taker_pair2(),
            order_amount: default_order_amount(),
            spread_bps: default_spread_bps(),
            min_spread_bps: Decimal::ZERO,
            slippage_buffer_bps: default_slippage_buffer_bps(),
            max_order_age_secs: default_max_order_age_secs(),
            min_profitability: default_min_profitability(),
            spread_cancel_enabled: false,
            skip_zero_amount_orders: false,
            require_full_depth: false,
        }
    }
}

impl StrategyConfig {
    /// Check invariants the pricing and hedging math relies on.
    pub fn validate(&self) -> StrategyResult<()> {
        if self.order_amount <= Decimal::ZERO {
            return Err(StrategyError::InvalidConfig(format!(
                "order_amount must be positive, got {}",
                self.order_amount
            )));
        }
        if self.min_profitability < Decimal::ZERO || self.min_profitability >= Decimal::ONE {
            return Err(StrategyError::InvalidConfig(format!(
                "min_profitability must be in [0, 1), got {}",
                self.min_profitability
            )));
        }
        if self.slippage_buffer_bps < Decimal::ZERO || self.slippage_buffer_bps >= BPS_DIVISOR {
            return Err(StrategyError::InvalidConfig(format!(
                "slippage_buffer_bps must be in [0, 10000), got {}",
                self.slippage_buffer_bps
            )));
        }
        if self.min_spread_bps < Decimal::ZERO || self.spread_bps < Decimal::ZERO {
            return Err(StrategyError::InvalidConfig(
                "spread_bps and min_spread_bps must be non-negative".to_string(),
            ));
        }
        if self.max_order_age_secs == 0 {
            return Err(StrategyError::InvalidConfig(
                "max_order_age_secs must be positive".to_string(),
            ));
        }
        if self.taker_pair1 == self.taker_pair2 {
            return Err(StrategyError::InvalidConfig(format!(
                "taker pairs must differ, both are {}",
                self.taker_pair1
            )));
        }
        if self.taker_pair1.quote() != self.taker_pair2.quote() {
            return Err(StrategyError::InvalidConfig(format!(
                "taker pairs must share a quote asset: {} vs {}",
                self.taker_pair1, self.taker_pair2
            )));
        }
        Ok(())
    }

    /// Slippage buffer as a fraction (100 bps = 0.01).
    pub fn slippage_fraction(&self) -> Decimal {
        self.slippage_buffer_bps / BPS_DIVISOR
    }

    /// Maximum maker order age in milliseconds.
    pub fn max_order_age_ms(&self) -> u64 {
        self.max_order_age_secs.saturating_mul(1000)
    }
}

fn default_maker_exchange() -> ExchangeId {
    ExchangeId::new("kucoin_paper_trade")
}
fn default_maker_pair() -> TradingPair {
    TradingPair::new("CKB", "BTC")
}
fn default_taker_exchange() -> ExchangeId {
    ExchangeId::new("binance_paper_trade")
}
fn default_taker_pair1() -> TradingPair {
    TradingPair::new("CKB", "USDT")
}
fn default_taker_pair2() -> TradingPair {
    TradingPair::new("BTC", "USDT")
}
fn default_order_amount() -> Decimal {
    Decimal::new(1, 4) // 0.0001
}
fn default_spread_bps() -> Decimal {
    Decimal::new(10, 0) // 10 bps
}
fn default_slippage_buffer_bps() -> Decimal {
    Decimal::new(100, 0) // 100 bps
}
fn default_max_order_age_secs() -> u64 {
    120
}
fn default_min_profitability() -> Decimal {
    Decimal::new(1, 3) // 0.001 = 0.1%
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_config() {
        let config = StrategyConfig::default();
        assert_eq!(config.maker_pair.to_string(), "CKB-BTC");
        assert_eq!(config.taker_pair1.to_string(), "CKB-USDT");
        assert_eq!(config.taker_pair2.to_string(), "BTC-USDT");
        assert_eq!(config.order_amount, dec!(0.0001));
        assert_eq!(config.spread_bps, dec!(10));
        assert_eq!(config.min_spread_bps, dec!(0));
        assert_eq!(config.slippage_buffer_bps, dec!(100));
        assert_eq!(config.max_order_age_secs, 120);
        assert_eq!(config.min_profitability, dec!(0.001));
        assert!(!config.spread_cancel_enabled);
        assert!(!config.skip_zero_amount_orders);
        assert!(!config.require_full_depth);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serde_defaults() {
        let toml_str = r#"
maker_pair = "QUICK-BTC"
taker_pair1 = "QUICK-USDT"
order_amount = "5"
"#;
        let config: StrategyConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.maker_pair, TradingPair::new("QUICK", "BTC"));
        assert_eq!(config.order_amount, dec!(5));
        assert_eq!(config.taker_pair2, TradingPair::new("BTC", "USDT"));
        assert_eq!(config.max_order_age_secs, 120);
    }

    #[test]
    fn test_slippage_fraction_and_age() {
        let config = StrategyConfig::default();
        assert_eq!(config.slippage_fraction(), dec!(0.01));
        assert_eq!(config.max_order_age_ms(), 120_000);
    }

    #[test]
    fn test_validate_rejects_bad_profitability() {
        let config = StrategyConfig {
            min_profitability: dec!(1),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(StrategyError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_rejects_zero_amount() {
        let config = StrategyConfig {
            order_amount: Decimal::ZERO,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_same_taker_pairs() {
        let config = StrategyConfig {
            taker_pair2: TradingPair::new("CKB", "USDT"),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_mismatched_quote() {
        let config = StrategyConfig {
            taker_pair2: TradingPair::new("BTC", "USDC"),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
