//! Backtest runner: wires run configs, data loading, the engine and metrics.
//!
//! Two entry points:
//! - `run_single_backtest()`: loads data (cache, download, synthetic), then runs. Used by the CLI.
//! - `run_backtest_from_data()`: takes pre-loaded data. Used by compare and sweep.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use pairlab_core::data::{DataProvider, DataSource, ParquetCache};
use pairlab_core::engine::{BacktestResult, Backtester};
use pairlab_core::error::EngineError;

use crate::config::{ConfigError, RunConfig};
use crate::data_loader::{load_series, LoadError, LoadOptions, LoadedData};
use crate::metrics::PerformanceMetrics;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Current schema version for persisted reports.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete, persistable record of one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub run_id: String,
    pub config: RunConfig,
    pub metrics: PerformanceMetrics,
    pub result: BacktestResult,
    pub dataset_hash: String,
    pub has_synthetic: bool,
    pub sources: BTreeMap<String, DataSource>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl RunReport {
    pub fn strategy_name(&self) -> &str {
        self.config.strategy.name()
    }
}

pub fn run_single_backtest(
    config: &RunConfig,
    cache: &ParquetCache,
    provider: Option<&dyn DataProvider>,
    opts: &LoadOptions,
) -> Result<RunReport, RunError> {
    config.validate()?;
    let loaded = load_series(&config.backtest.symbols, cache, provider, opts)?;
    run_backtest_from_data(config, &loaded)
}

/// Run with pre-loaded data; no I/O.
pub fn run_backtest_from_data(config: &RunConfig, data: &LoadedData) -> Result<RunReport, RunError> {
    let backtester = Backtester::new(config.engine_config())?;
    let series: Vec<_> = data
        .series
        .iter()
        .map(|s| s.slice_dates(config.backtest.start_date, config.backtest.end_date))
        .collect();

    let result = backtester.run_on_series(&series, &config.strategy)?;
    let metrics = PerformanceMetrics::compute(&result);

    Ok(RunReport {
        schema_version: SCHEMA_VERSION,
        run_id: config.run_id()?,
        config: config.clone(),
        metrics,
        result,
        dataset_hash: data.dataset_hash.clone(),
        has_synthetic: data.has_synthetic,
        sources: data.sources.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_loader::generate_synthetic_bars;
    use chrono::NaiveDate;
    use pairlab_core::domain::PriceSeries;

    fn synthetic_data(symbols: &[&str], start: NaiveDate, end: NaiveDate) -> LoadedData {
        let series: Vec<PriceSeries> = symbols
            .iter()
            .map(|s| PriceSeries::new(*s, generate_synthetic_bars(s, start, end)))
            .collect();
        LoadedData {
            dataset_hash: crate::data_loader::dataset_hash(&series),
            sources: symbols.iter().map(|s| (s.to_string(), DataSource::Synthetic)).collect(),
            series,
            has_synthetic: true,
        }
    }

    #[test]
    fn report_carries_config_and_metrics() {
        let (start, end) = (
            NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(),
        );
        let config = RunConfig::for_strategy(
            "trend_following",
            vec!["1579.T".into(), "1360.T".into()],
            start,
            end,
            1_000_000.0,
        )
        .unwrap();
        let data = synthetic_data(&["1579.T", "1360.T"], start, end);

        let report = run_backtest_from_data(&config, &data).unwrap();

        assert_eq!(report.schema_version, SCHEMA_VERSION);
        assert_eq!(report.strategy_name(), "trend_following");
        assert_eq!(report.result.bar_count, data.series[0].len());
        assert_eq!(report.metrics.trade_count, report.result.total_trades);
        assert!(report.has_synthetic);
        assert_eq!(report.run_id, config.run_id().unwrap());
    }

    #[test]
    fn data_outside_config_range_is_ignored() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let config =
            RunConfig::for_strategy("momentum", vec!["1579.T".into()], start, end, 1e6).unwrap();
        let data = synthetic_data(&["1579.T"], NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(), end);

        let report = run_backtest_from_data(&config, &data).unwrap();

        assert!(report.result.portfolio_values.iter().all(|s| s.date >= start));
    }
}
