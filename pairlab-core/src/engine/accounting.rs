//! Portfolio accounting: mark-to-market snapshots and drawdown tracking.

use super::state::EngineState;
use crate::domain::PortfolioSnapshot;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Running peak and worst drawdown across a run.
///
/// The peak starts at the first snapshot's value, so a run that only loses
/// from bar one still reports its drawdown relative to that bar.
#[derive(Debug, Clone, Default)]
pub struct PortfolioAccountant {
    peak: Option<f64>,
    max_drawdown_pct: f64,
}

impl PortfolioAccountant {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn peak(&self) -> Option<f64> {
        self.peak
    }

    pub fn max_drawdown_pct(&self) -> f64 {
        self.max_drawdown_pct
    }

    /// Value the portfolio at `prices` (indexed like the universe) and update
    /// the running peak.
    pub fn snapshot(&mut self, state: &EngineState, prices: &[f64], date: NaiveDate) -> PortfolioSnapshot {
        let mut positions = BTreeMap::new();
        let mut market_value = 0.0;
        let mut unrealized = 0.0;

        for (id, position) in state.positions.iter() {
            let price = prices.get(id.index()).copied().unwrap_or(0.0);
            market_value += position.market_value(price);
            unrealized += position.unrealized_pnl(price);
            positions.insert(state.universe.symbol(id).to_string(), position.quantity);
        }

        let value = state.cash + market_value;
        let peak = self.peak.map_or(value, |p| p.max(value));
        self.peak = Some(peak);

        let drawdown_pct = if peak > 0.0 { (peak - value) / peak * 100.0 } else { 0.0 };
        self.max_drawdown_pct = self.max_drawdown_pct.max(drawdown_pct);

        PortfolioSnapshot {
            date,
            cash: state.cash,
            positions,
            value,
            realized_pnl: state.realized_pnl,
            unrealized_pnl: unrealized,
            total_pnl: state.realized_pnl + unrealized,
            peak_value: peak,
            drawdown_pct,
        }
    }
}
