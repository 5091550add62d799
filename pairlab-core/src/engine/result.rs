//! Backtest result assembly.

use crate::domain::{PortfolioSnapshot, Rejection, TradeRecord};
use serde::{Deserialize, Serialize};

/// Everything a completed run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    pub strategy: String,
    pub symbols: Vec<String>,
    pub initial_capital: f64,
    pub final_value: f64,
    pub total_return_pct: f64,
    pub max_drawdown_pct: f64,
    pub total_trades: usize,
    pub realized_pnl: f64,
    pub unrealized_pnl: f64,
    pub total_pnl: f64,
    pub winning_trades: usize,
    pub losing_trades: usize,
    /// Winning sells over all sells, in percent. Zero when nothing was sold.
    pub win_rate_pct: f64,
    pub bar_count: usize,
    pub trade_history: Vec<TradeRecord>,
    pub portfolio_values: Vec<PortfolioSnapshot>,
    pub rejections: Vec<Rejection>,
}

impl BacktestResult {
    /// Assemble from the run's logs. With no snapshots the portfolio is still
    /// worth its initial capital.
    pub fn from_run(
        strategy: &str,
        symbols: Vec<String>,
        initial_capital: f64,
        max_drawdown_pct: f64,
        trade_history: Vec<TradeRecord>,
        portfolio_values: Vec<PortfolioSnapshot>,
        rejections: Vec<Rejection>,
    ) -> Self {
        let (final_value, realized_pnl, unrealized_pnl) = portfolio_values
            .last()
            .map_or((initial_capital, 0.0, 0.0), |s| (s.value, s.realized_pnl, s.unrealized_pnl));

        let winning_trades = trade_history.iter().filter(|t| t.is_winner()).count();
        let losing_trades = trade_history.iter().filter(|t| t.is_loser()).count();
        let closed = trade_history.iter().filter(|t| t.realized_pnl.is_some()).count();
        let win_rate_pct =
            if closed > 0 { winning_trades as f64 / closed as f64 * 100.0 } else { 0.0 };

        Self {
            strategy: strategy.to_string(),
            symbols,
            initial_capital,
            final_value,
            total_return_pct: (final_value - initial_capital) / initial_capital * 100.0,
            max_drawdown_pct,
            total_trades: trade_history.len(),
            realized_pnl,
            unrealized_pnl,
            total_pnl: realized_pnl + unrealized_pnl,
            winning_trades,
            losing_trades,
            win_rate_pct,
            bar_count: portfolio_values.len(),
            trade_history,
            portfolio_values,
            rejections,
        }
    }

    /// A run over an empty aligned universe.
    pub fn empty(strategy: &str, symbols: Vec<String>, initial_capital: f64) -> Self {
        Self::from_run(strategy, symbols, initial_capital, 0.0, Vec::new(), Vec::new(), Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.portfolio_values.is_empty()
    }

    pub fn total_fees(&self) -> f64 {
        self.trade_history.iter().map(|t| t.fee).sum()
    }

    pub fn total_slippage(&self) -> f64 {
        self.trade_history.iter().map(|t| t.slippage_cost).sum()
    }
}
