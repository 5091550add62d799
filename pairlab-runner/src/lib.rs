//! PairLab Runner: backtest orchestration on top of `pairlab-core`.
//!
//! - Run configs from TOML with validation and content-hash run IDs
//! - Data loading with cache/download/synthetic fallback
//! - Single-run reports with performance metrics
//! - Parallel strategy comparison and parameter sweeps
//! - JSON, CSV and Markdown artifact export

pub mod config;
pub mod data_loader;
pub mod export;
pub mod metrics;
pub mod runner;
pub mod sweep;

pub use config::{BacktestSection, ConfigError, CostsSection, RiskSection, RunConfig};
pub use data_loader::{load_series, LoadError, LoadOptions, LoadedData};
pub use export::{generate_comparison, generate_report, load_artifacts, save_artifacts};
pub use metrics::PerformanceMetrics;
pub use runner::{run_backtest_from_data, run_single_backtest, RunError, RunReport, SCHEMA_VERSION};
pub use sweep::{compare_strategies, run_sweep, ParamGrid, SweepError, SweepResults};
