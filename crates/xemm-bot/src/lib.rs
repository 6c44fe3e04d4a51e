//! Triangular XEMM bot.
//!
//! Wires the strategy engine to a venue and drives it:
//! - TOML configuration (strategy, run loop, paper venue)
//! - In-memory paper venue implementing the connector traits
//! - `tokio` run loop serializing ticks, fills and shutdown

pub mod app;
pub mod config;
pub mod error;
pub mod paper;

pub use app::Application;
pub use config::{AppConfig, PaperConfig};
pub use error::{AppError, AppResult};
pub use paper::PaperExchange;
