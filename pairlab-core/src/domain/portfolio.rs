//! Per-bar portfolio snapshot.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mark-to-market state recorded after each bar's executions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    pub date: NaiveDate,
    pub cash: f64,
    pub positions: BTreeMap<String, u64>,
    pub value: f64,
    pub realized_pnl: f64,
    pub unrealized_pnl: f64,
    pub total_pnl: f64,
    pub peak_value: f64,
    pub drawdown_pct: f64,
}

impl PortfolioSnapshot {
    pub fn has_exposure(&self) -> bool {
        self.positions.values().any(|&q| q > 0)
    }
}
