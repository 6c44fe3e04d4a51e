//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Strategy error: {0}")]
    Strategy(#[from] xemm_strategy::StrategyError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] xemm_telemetry::TelemetryError),
}

pub type AppResult<T> = Result<T, AppError>;
