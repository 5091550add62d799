//! Performance metrics computed from a finished backtest.
//!
//! Equity-curve metrics take the per-bar portfolio values; trade metrics take
//! the realized P&L of closing (sell) trades. Every function is pure and
//! returns 0.0 where the statistic is undefined.

use pairlab_core::domain::{PortfolioSnapshot, TradeRecord};
use pairlab_core::engine::BacktestResult;
use pairlab_core::indicators::{mean, sample_std};
use serde::{Deserialize, Serialize};

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Cap for profit factor when there are no losing trades.
const PROFIT_FACTOR_CAP: f64 = 100.0;

/// Aggregate statistics for one run.
///
/// Returns and drawdown are percentages; ratios are annualized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub total_return_pct: f64,
    pub cagr_pct: f64,
    pub sharpe: f64,
    pub sortino: f64,
    pub calmar: f64,
    pub max_drawdown_pct: f64,
    pub trade_count: usize,
    pub closed_trades: usize,
    pub win_rate_pct: f64,
    pub profit_factor: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub best_trade: f64,
    pub worst_trade: f64,
    pub fees_paid: f64,
    pub slippage_paid: f64,
    /// Share of bars with an open position, in percent.
    pub exposure_pct: f64,
}

impl PerformanceMetrics {
    pub fn compute(result: &BacktestResult) -> Self {
        let equity = equity_curve(&result.portfolio_values);
        let pnls = closed_pnls(&result.trade_history);
        let wins: Vec<f64> = pnls.iter().copied().filter(|p| *p > 0.0).collect();
        let losses: Vec<f64> = pnls.iter().copied().filter(|p| *p < 0.0).collect();

        Self {
            total_return_pct: result.total_return_pct,
            cagr_pct: cagr(&equity) * 100.0,
            sharpe: sharpe_ratio(&equity),
            sortino: sortino_ratio(&equity),
            calmar: calmar_ratio(&equity),
            max_drawdown_pct: max_drawdown(&equity) * 100.0,
            trade_count: result.total_trades,
            closed_trades: pnls.len(),
            win_rate_pct: result.win_rate_pct,
            profit_factor: profit_factor(&pnls),
            avg_win: or_zero(mean(&wins)),
            avg_loss: or_zero(mean(&losses)),
            best_trade: pnls.iter().copied().fold(0.0, f64::max),
            worst_trade: pnls.iter().copied().fold(0.0, f64::min),
            fees_paid: result.total_fees(),
            slippage_paid: result.total_slippage(),
            exposure_pct: exposure(&result.portfolio_values) * 100.0,
        }
    }
}

// ─── Equity curve ───────────────────────────────────────────────────

pub fn equity_curve(snapshots: &[PortfolioSnapshot]) -> Vec<f64> {
    snapshots.iter().map(|s| s.value).collect()
}

/// Bar-over-bar simple returns.
pub fn daily_returns(equity: &[f64]) -> Vec<f64> {
    equity
        .windows(2)
        .map(|w| if w[0] > 0.0 { w[1] / w[0] - 1.0 } else { 0.0 })
        .collect()
}

/// Compound annual growth rate as a fraction, assuming 252 bars a year.
pub fn cagr(equity: &[f64]) -> f64 {
    let (Some(&first), Some(&last)) = (equity.first(), equity.last()) else {
        return 0.0;
    };
    if equity.len() < 2 || first <= 0.0 || last <= 0.0 {
        return 0.0;
    }
    let years = equity.len() as f64 / TRADING_DAYS_PER_YEAR;
    (last / first).powf(1.0 / years) - 1.0
}

pub fn sharpe_ratio(equity: &[f64]) -> f64 {
    let returns = daily_returns(equity);
    if returns.len() < 2 {
        return 0.0;
    }
    let sd = or_zero(sample_std(&returns));
    if sd < 1e-15 {
        return 0.0;
    }
    mean(&returns) / sd * TRADING_DAYS_PER_YEAR.sqrt()
}

/// Like Sharpe, but only downside deviation in the denominator.
pub fn sortino_ratio(equity: &[f64]) -> f64 {
    let returns = daily_returns(equity);
    if returns.len() < 2 {
        return 0.0;
    }
    let downside: f64 = returns.iter().filter(|r| **r < 0.0).map(|r| r * r).sum();
    if downside <= 0.0 {
        return 0.0;
    }
    let dd = (downside / returns.len() as f64).sqrt();
    mean(&returns) / dd * TRADING_DAYS_PER_YEAR.sqrt()
}

/// Worst peak-to-trough decline as a positive fraction.
pub fn max_drawdown(equity: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0_f64;
    for &v in equity {
        peak = peak.max(v);
        if peak > 0.0 {
            worst = worst.max((peak - v) / peak);
        }
    }
    worst
}

/// CAGR over max drawdown; 0 unless both are positive.
pub fn calmar_ratio(equity: &[f64]) -> f64 {
    let (growth, dd) = (cagr(equity), max_drawdown(equity));
    if growth <= 0.0 || dd <= 0.0 {
        return 0.0;
    }
    growth / dd
}

pub fn exposure(snapshots: &[PortfolioSnapshot]) -> f64 {
    if snapshots.is_empty() {
        return 0.0;
    }
    snapshots.iter().filter(|s| s.has_exposure()).count() as f64 / snapshots.len() as f64
}

// ─── Trades ─────────────────────────────────────────────────────────

/// Realized P&L of every closing trade, in order.
pub fn closed_pnls(trades: &[TradeRecord]) -> Vec<f64> {
    trades.iter().filter_map(|t| t.realized_pnl).collect()
}

/// Gross profit over gross loss, capped at 100.
pub fn profit_factor(pnls: &[f64]) -> f64 {
    let profit: f64 = pnls.iter().filter(|p| **p > 0.0).sum();
    let loss: f64 = pnls.iter().filter(|p| **p < 0.0).map(|p| p.abs()).sum();
    if loss < 1e-10 {
        return if profit > 0.0 { PROFIT_FACTOR_CAP } else { 0.0 };
    }
    (profit / loss).min(PROFIT_FACTOR_CAP)
}

// ─── Helpers ────────────────────────────────────────────────────────

/// Statistics over empty inputs come back NaN from the core helpers.
fn or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
