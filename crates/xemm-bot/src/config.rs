//! Application configuration.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use xemm_core::OrderBook;
use xemm_strategy::StrategyConfig;

use crate::error::{AppError, AppResult};

/// Paper venue setup: static books and starting balances.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaperConfig {
    /// Depth snapshots served for every pair the strategy touches,
    /// including the maker pair (used to trigger maker fills).
    #[serde(default)]
    pub books: Vec<OrderBook>,

    /// Starting balances: exchange -> asset -> amount.
    #[serde(default)]
    pub balances: HashMap<String, HashMap<String, Decimal>>,
}

/// Root configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub strategy: StrategyConfig,

    /// Interval between strategy ticks in milliseconds.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Interval between status table logs in seconds (0 disables).
    #[serde(default = "default_status_interval_secs")]
    pub status_interval_secs: u64,

    /// Capacity of the fill notification channel.
    #[serde(default = "default_fill_channel_capacity")]
    pub fill_channel_capacity: usize,

    #[serde(default)]
    pub paper: PaperConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyConfig::default(),
            tick_interval_ms: default_tick_interval_ms(),
            status_interval_secs: default_status_interval_secs(),
            fill_channel_capacity: default_fill_channel_capacity(),
            paper: PaperConfig::default(),
        }
    }
}

fn default_tick_interval_ms() -> u64 {
    1_000
}
fn default_status_interval_secs() -> u64 {
    60
}
fn default_fill_channel_capacity() -> usize {
    1_024
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml(content: &str) -> AppResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> AppResult<()> {
        self.strategy
            .validate()
            .map_err(|e| AppError::Config(e.to_string()))?;
        if self.tick_interval_ms == 0 {
            return Err(AppError::Config(
                "tick_interval_ms must be positive".to_string(),
            ));
        }
        if self.fill_channel_capacity == 0 {
            return Err(AppError::Config(
                "fill_channel_capacity must be positive".to_string(),
            ));
        }
        for book in &self.paper.books {
            book.validate()
                .map_err(|e| AppError::Config(format!("paper book {}: {e}", book.pair)))?;
        }
        Ok(())
    }
}
