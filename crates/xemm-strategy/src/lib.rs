//! Triangular cross-exchange market making strategy.
//!
//! Quotes a maker pair `A-B` on one venue and hedges fills through two taker
//! pairs `A-Q` and `B-Q` on another:
//! - Depth walks over taker books (base amount / VWAP for a quote volume)
//! - Synthetic cross pricing of the maker bid/ask
//! - Maker order lifecycle (place / age out / reset on fill)
//! - Hedge sizing with a slippage buffer
//!
//! # Architecture
//!
//! ```text
//! tick ──► XemmEngine.on_tick()
//!            ├─ compute_synthetic_quote ─► depth::walk / depth::quote_volume_for_base_amount
//!            └─ QuoteManager ─► MakerAction (place / cancel) ─► OrderGateway
//!
//! fill ──► XemmEngine.on_fill()
//!            ├─ HedgeExecutor ─► depth::walk ─► HedgePlan (leg1, leg2) ─► OrderGateway
//!            └─ QuoteManager.record_fill() (side back to NoOrder)
//! ```

pub mod config;
pub mod connector;
pub mod depth;
pub mod engine;
pub mod error;
pub mod hedge;
pub mod pricer;
pub mod quote_manager;
pub mod report;

pub use config::StrategyConfig;
pub use connector::{BudgetChecker, Connector, MarketDataSource, OrderGateway};
pub use depth::{price_for_volume, quote_volume_for_base_amount, walk, QuoteVolumeResult, VolumeWalkResult};
pub use engine::{FillOutcome, TickReport, XemmEngine};
pub use error::{StrategyError, StrategyResult};
pub use hedge::{HedgeExecutor, HedgeInstruction, HedgePlan};
pub use pricer::{compute_synthetic_quote, ProfitFactors, SyntheticQuote};
pub use quote_manager::{CancelReason, MakerAction, MakerOrderState, QuoteManager};
pub use report::{ActiveOrderRow, ExchangeRow, StatusReport};
