//! Strategy comparison and parameter sweeps, run in parallel with rayon.
//!
//! Every backtest gets its own engine state, so runs share nothing but the
//! pre-loaded price data.

use rayon::prelude::*;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{info, warn};

use pairlab_core::strategy::StrategyKind;

use crate::config::RunConfig;
use crate::data_loader::LoadedData;
use crate::runner::{run_backtest_from_data, RunError, RunReport};

#[derive(Debug, Error)]
pub enum SweepError {
    #[error("unknown strategy '{0}'")]
    UnknownStrategy(String),

    #[error("strategy '{strategy}' has no parameter '{param}'")]
    UnknownParam { strategy: String, param: String },

    #[error("invalid parameter combination: {0}")]
    InvalidParams(#[from] serde_json::Error),

    #[error(transparent)]
    Run(#[from] RunError),
}

/// Cartesian grid over one strategy's parameters.
///
/// Axis names are the strategy's serde field names; values are JSON scalars.
#[derive(Debug, Clone)]
pub struct ParamGrid {
    pub strategy: String,
    pub axes: BTreeMap<String, Vec<Value>>,
}

impl ParamGrid {
    pub fn new(strategy: impl Into<String>) -> Self {
        Self { strategy: strategy.into(), axes: BTreeMap::new() }
    }

    pub fn axis<V: Into<Value>>(mut self, name: &str, values: impl IntoIterator<Item = V>) -> Self {
        self.axes.insert(name.to_string(), values.into_iter().map(Into::into).collect());
        self
    }

    /// Window, correlation and z-score thresholds around the pairs defaults.
    pub fn pairs_default() -> Self {
        Self::new("pairs_trading")
            .axis("window", [10, 20, 30])
            .axis("correlation_threshold", [0.6, 0.7, 0.8])
            .axis("z_score_threshold", [1.5, 2.0, 2.5])
    }

    pub fn trend_following_default() -> Self {
        Self::new("trend_following")
            .axis("short_window", [5, 10, 20])
            .axis("long_window", [30, 50, 100])
    }

    pub fn size(&self) -> usize {
        self.axes.values().map(Vec::len).product()
    }

    /// Every strategy in the grid. Trend-following combinations with
    /// `short_window >= long_window` are skipped.
    pub fn generate(&self) -> Result<Vec<StrategyKind>, SweepError> {
        let base = StrategyKind::from_name(&self.strategy)
            .ok_or_else(|| SweepError::UnknownStrategy(self.strategy.clone()))?;
        let Value::Object(base) = serde_json::to_value(&base)? else {
            return Err(SweepError::UnknownStrategy(self.strategy.clone()));
        };
        if let Some(param) = self.axes.keys().find(|k| !base.contains_key(k.as_str())) {
            return Err(SweepError::UnknownParam {
                strategy: self.strategy.clone(),
                param: param.clone(),
            });
        }

        let mut combos: Vec<Map<String, Value>> = vec![base];
        for (name, values) in &self.axes {
            combos = combos
                .into_iter()
                .flat_map(|combo| {
                    values.iter().map(move |v| {
                        let mut next = combo.clone();
                        next.insert(name.clone(), v.clone());
                        next
                    })
                })
                .collect();
        }

        let mut strategies = Vec::with_capacity(combos.len());
        for combo in combos {
            let kind: StrategyKind = serde_json::from_value(Value::Object(combo))?;
            if let StrategyKind::TrendFollowing(t) = &kind {
                if t.short_window >= t.long_window {
                    continue;
                }
            }
            strategies.push(kind);
        }
        Ok(strategies)
    }
}

/// Reports from a sweep or comparison, best total return first.
#[derive(Debug, Default)]
pub struct SweepResults {
    reports: Vec<RunReport>,
    /// Strategies whose run failed, with the error message.
    pub failures: Vec<(String, String)>,
}

impl SweepResults {
    fn ranked(mut reports: Vec<RunReport>, failures: Vec<(String, String)>) -> Self {
        reports.sort_by(|a, b| b.result.total_return_pct.total_cmp(&a.result.total_return_pct));
        Self { reports, failures }
    }

    pub fn all(&self) -> &[RunReport] {
        &self.reports
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    pub fn best(&self) -> Option<&RunReport> {
        self.reports.first()
    }

    pub fn top_n(&self, n: usize) -> &[RunReport] {
        &self.reports[..n.min(self.reports.len())]
    }
}

fn run_all(base: &RunConfig, strategies: Vec<StrategyKind>, data: &LoadedData) -> SweepResults {
    let outcomes: Vec<(String, Result<RunReport, RunError>)> = strategies
        .into_par_iter()
        .map(|strategy| {
            let name = strategy.name().to_string();
            (name, run_backtest_from_data(&base.with_strategy(strategy), data))
        })
        .collect();

    let mut reports = Vec::with_capacity(outcomes.len());
    let mut failures = Vec::new();
    for (name, outcome) in outcomes {
        match outcome {
            Ok(report) => reports.push(report),
            Err(e) => {
                warn!(strategy = %name, error = %e, "run failed");
                failures.push((name, e.to_string()));
            }
        }
    }
    SweepResults::ranked(reports, failures)
}

/// Every built-in strategy with default parameters over the same data.
///
/// Risk limits follow `base`: an explicit `[risk]` applies to all, otherwise
/// each strategy's own default.
pub fn compare_strategies(base: &RunConfig, data: &LoadedData) -> SweepResults {
    info!(strategies = StrategyKind::NAMES.len(), "comparing strategies");
    run_all(base, StrategyKind::all_defaults(), data)
}

pub fn run_sweep(base: &RunConfig, grid: &ParamGrid, data: &LoadedData) -> Result<SweepResults, SweepError> {
    let strategies = grid.generate()?;
    info!(strategy = %grid.strategy, combinations = strategies.len(), "running sweep");
    Ok(run_all(base, strategies, data))
}
