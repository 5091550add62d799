//! Moving-average crossover trend following.
//!
//! A golden cross (short SMA moves from at-or-below to above the long SMA)
//! buys; a death cross sells. Both averages are taken over closes and must be
//! defined on the previous bar as well as the current one.

use super::intent::{shares_for_notional, TradeIntent};
use super::{MarketView, SignalGenerator};
use crate::indicators::sma_last;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendFollowing {
    pub short_window: usize,
    pub long_window: usize,
    pub notional: f64,
}

impl Default for TrendFollowing {
    fn default() -> Self {
        Self { short_window: 10, long_window: 30, notional: 200_000.0 }
    }
}

impl SignalGenerator for TrendFollowing {
    fn name(&self) -> &str {
        "trend_following"
    }

    fn generate(&self, view: &MarketView<'_>) -> Vec<TradeIntent> {
        let (short, long) = (self.short_window.max(1), self.long_window.max(1));
        let mut intents = Vec::new();

        for h in &view.instruments {
            let n = h.len();
            if n < short.max(long) + 1 {
                continue;
            }
            let closes = h.closes();
            let prev = &closes[..n - 1];
            let (Some(cur_s), Some(cur_l), Some(prev_s), Some(prev_l)) = (
                sma_last(&closes, short),
                sma_last(&closes, long),
                sma_last(prev, short),
                sma_last(prev, long),
            ) else {
                continue;
            };

            let price = closes[n - 1];
            let qty = shares_for_notional(self.notional, price);
            if qty == 0 {
                continue;
            }

            if cur_s > cur_l && prev_s <= prev_l {
                intents.push(TradeIntent::buy(
                    h.symbol(),
                    qty,
                    format!("Golden cross ({short}MA > {long}MA)"),
                ));
            } else if cur_s < cur_l && prev_s >= prev_l {
                intents.push(TradeIntent::sell(
                    h.symbol(),
                    qty,
                    format!("Death cross ({short}MA < {long}MA)"),
                ));
            }
        }

        intents
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Side;
    use crate::strategy::test_support::{frame_from_closes, view};

    #[test]
    fn golden_cross_on_breakout_bar() {
        let mut closes = vec![100.0; 30];
        closes.push(130.0);
        let frames = [frame_from_closes("A", &closes)];

        let intents = TrendFollowing::default().generate(&view(&frames));

        assert_eq!(intents.len(), 1);
        assert_eq!(intents[0].side, Side::Buy);
        assert_eq!(intents[0].quantity, 1538);
        assert_eq!(intents[0].reason, "Golden cross (10MA > 30MA)");
    }

    #[test]
    fn death_cross_on_breakdown_bar() {
        let mut closes = vec![100.0; 30];
        closes.push(70.0);
        let frames = [frame_from_closes("A", &closes)];
        let intents = TrendFollowing::default().generate(&view(&frames));
        assert_eq!(intents.len(), 1);
        assert_eq!(intents[0].side, Side::Sell);
    }

    #[test]
    fn no_signal_without_crossing() {
        let mut closes = vec![100.0; 30];
        closes.extend([130.0, 131.0]);
        let frames = [frame_from_closes("A", &closes)];
        // crossed on the previous bar, still above now
        assert!(TrendFollowing::default().generate(&view(&frames)).is_empty());
    }

    #[test]
    fn needs_long_window_plus_one_bar() {
        let frames = [frame_from_closes("A", &[100.0; 30])];
        assert!(TrendFollowing::default().generate(&view(&frames)).is_empty());
    }
}
