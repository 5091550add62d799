//! Backtesting engine: the per-bar loop and the components it drives.
//!
//! For each date on the aligned timeline the engine:
//!
//! 1. Asks the [`RiskManager`] for stop-loss / take-profit exits
//! 2. Asks the strategy for trade intents
//! 3. Executes both through the [`ExecutionEngine`]
//! 4. Records a [`PortfolioSnapshot`](crate::domain::PortfolioSnapshot)

pub mod accounting;
pub mod config;
pub mod execution;
pub mod loop_runner;
pub mod result;
pub mod risk;
pub mod state;

pub use accounting::PortfolioAccountant;
pub use config::{ConfigError, EngineConfig};
pub use execution::{CostModel, ExecutionEngine, ExecutionOutcome, OrderCosts, OrderRequest};
pub use loop_runner::Backtester;
pub use result::BacktestResult;
pub use risk::RiskManager;
pub use state::EngineState;
