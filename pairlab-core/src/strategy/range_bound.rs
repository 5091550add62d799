//! Range-bound percentile reversion.
//!
//! Only trades while the lookback window is a range: its relative span
//! `(max - min) / mean` must not exceed `range_threshold`. Inside a range the
//! close's percentile rank within the window decides: below the oversold
//! percentile buys, above the overbought percentile sells. Orders are sized
//! as `position_size` of the run's initial capital.
//!
//! Meant to run with stop-loss and take-profit disabled.

use super::intent::{shares_for_notional, TradeIntent};
use super::{MarketView, SignalGenerator};
use crate::indicators::{mean, percentile_rank};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangeBound {
    pub lookback_period: usize,
    pub range_threshold: f64,
    pub oversold_percentile: f64,
    pub overbought_percentile: f64,
    pub position_size: f64,
}

impl Default for RangeBound {
    fn default() -> Self {
        Self {
            lookback_period: 60,
            range_threshold: 0.15,
            oversold_percentile: 20.0,
            overbought_percentile: 80.0,
            position_size: 0.20,
        }
    }
}

impl SignalGenerator for RangeBound {
    fn name(&self) -> &str {
        "range_bound"
    }

    fn generate(&self, view: &MarketView<'_>) -> Vec<TradeIntent> {
        let lookback = self.lookback_period.max(2);
        let notional = view.initial_capital * self.position_size;
        let mut intents = Vec::new();

        for h in &view.instruments {
            let n = h.len();
            if n < lookback {
                continue;
            }
            let closes = h.closes();
            let window = &closes[n - lookback..];
            let price = closes[n - 1];

            let (lo, hi) = window.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &c| {
                (lo.min(c), hi.max(c))
            });
            let avg = mean(window);
            if avg.is_nan() || avg <= 0.0 || (hi - lo) / avg > self.range_threshold {
                continue;
            }

            let rank = percentile_rank(window, price);
            let qty = shares_for_notional(notional, price);
            if qty == 0 {
                continue;
            }

            if rank < self.oversold_percentile {
                intents.push(TradeIntent::buy(
                    h.symbol(),
                    qty,
                    format!("Range low (percentile {rank:.0})"),
                ));
            } else if rank > self.overbought_percentile {
                intents.push(TradeIntent::sell(
                    h.symbol(),
                    qty,
                    format!("Range high (percentile {rank:.0})"),
                ));
            }
        }

        intents
    }
}
