//! Technical indicators.
//!
//! Indicators are pure functions: bar history in, numeric series out, same
//! length as the input. Undefined warm-up values are `f64::NAN`. They are
//! computed once per instrument before the bar loop by [`compute_indicators`]
//! and read by index during the loop.
//!
//! # Look-ahead contamination guard
//! No indicator value at bar t may depend on price data from bar t+1 or later.
//! The only exception is the backward fill applied to warm-up positions by
//! [`fill`], which strategies never read because of their minimum-history guards.

pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod fill;
pub mod frame;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod stats;
pub mod volume;

pub use atr::{true_range, Atr};
pub use bollinger::{rolling_std, Bollinger, BollingerBands};
pub use ema::{ema_values, Ema};
pub use fill::fill_warmup;
pub use frame::{compute_indicators, IndicatorConfig, IndicatorFrame};
pub use macd::{Macd, MacdLines};
pub use rsi::Rsi;
pub use sma::{rolling_mean, sma_last, Sma};
pub use stats::{correlation, mean, percentile_rank, sample_std};
pub use volume::VolumeRatio;

use crate::domain::PriceBar;

/// Single-output indicator over a bar series.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "sma_20", "rsi_14").
    fn name(&self) -> &str;

    /// Number of leading bars that are always `NaN`.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire bar series.
    fn compute(&self, bars: &[PriceBar]) -> Vec<f64>;
}

/// Create synthetic bars from close prices for testing.
///
/// open = prev_close (or close for first bar), high = max(open,close) + 1.0,
/// low = min(open,close) - 1.0, volume = 1000.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<PriceBar> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            PriceBar {
                date: base_date + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000,
            }
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
