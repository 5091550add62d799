//! ATR volatility breakout.
//!
//! Bands sit at the short SMA ± `breakout_multiplier` × ATR, where ATR is the
//! simple mean of the last `atr_period` true ranges. A close above the upper
//! band buys; below the lower band sells.

use super::intent::{shares_for_notional, TradeIntent};
use super::{MarketView, SignalGenerator};
use crate::indicators::{mean, true_range};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolatilityBreakout {
    pub atr_period: usize,
    pub breakout_multiplier: f64,
    pub notional: f64,
}

impl Default for VolatilityBreakout {
    fn default() -> Self {
        Self { atr_period: 14, breakout_multiplier: 2.0, notional: 150_000.0 }
    }
}

impl SignalGenerator for VolatilityBreakout {
    fn name(&self) -> &str {
        "volatility_breakout"
    }

    fn generate(&self, view: &MarketView<'_>) -> Vec<TradeIntent> {
        let period = self.atr_period.max(1);
        let mut intents = Vec::new();

        for h in &view.instruments {
            let n = h.len();
            if n < period + 1 {
                continue;
            }
            let bars = &h.bars()[n - period - 1..];
            let tr = true_range(bars);
            let atr = mean(&tr[1..]);

            let (Some(price), Some(middle)) = (h.last_close(), h.last(|f| &f.sma_short)) else {
                continue;
            };
            let upper = middle + self.breakout_multiplier * atr;
            let lower = middle - self.breakout_multiplier * atr;
            let qty = shares_for_notional(self.notional, price);
            if qty == 0 {
                continue;
            }

            if price > upper {
                intents.push(TradeIntent::buy(
                    h.symbol(),
                    qty,
                    format!("Upside breakout (Price: {price:.0} > {upper:.0})"),
                ));
            } else if price < lower {
                intents.push(TradeIntent::sell(
                    h.symbol(),
                    qty,
                    format!("Downside breakout (Price: {price:.0} < {lower:.0})"),
                ));
            }
        }

        intents
    }
}
