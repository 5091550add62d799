//! Oscillator/band mean reversion.
//!
//! Per instrument: buy when RSI is below the oversold level, sell when above
//! the overbought level; independently, buy when the close is under the lower
//! Bollinger band and sell when it is over the upper band.

use super::intent::{shares_for_notional, TradeIntent};
use super::{MarketView, SignalGenerator};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeanReversion {
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
    /// Band width in standard deviations around the middle band.
    pub bb_std_multiplier: f64,
    pub notional: f64,
    pub min_history: usize,
}

impl Default for MeanReversion {
    fn default() -> Self {
        Self {
            rsi_oversold: 30.0,
            rsi_overbought: 70.0,
            bb_std_multiplier: 2.0,
            notional: 100_000.0,
            min_history: 50,
        }
    }
}

impl SignalGenerator for MeanReversion {
    fn name(&self) -> &str {
        "mean_reversion"
    }

    fn generate(&self, view: &MarketView<'_>) -> Vec<TradeIntent> {
        let mut intents = Vec::new();

        for h in &view.instruments {
            if h.len() < self.min_history.max(1) {
                continue;
            }
            let (Some(price), Some(rsi), Some(middle), Some(std)) = (
                h.last_close(),
                h.last(|f| &f.rsi),
                h.last(|f| &f.bb_middle),
                h.last(|f| &f.bb_std),
            ) else {
                continue;
            };
            let qty = shares_for_notional(self.notional, price);
            if qty == 0 {
                continue;
            }
            let symbol = h.symbol();

            if rsi < self.rsi_oversold {
                intents.push(TradeIntent::buy(symbol, qty, format!("RSI oversold ({rsi:.1})")));
            } else if rsi > self.rsi_overbought {
                intents.push(TradeIntent::sell(symbol, qty, format!("RSI overbought ({rsi:.1})")));
            }

            let lower = middle - self.bb_std_multiplier * std;
            let upper = middle + self.bb_std_multiplier * std;
            if price < lower {
                intents.push(TradeIntent::buy(
                    symbol,
                    qty,
                    format!("Price below BB lower ({price:.0} < {lower:.0})"),
                ));
            } else if price > upper {
                intents.push(TradeIntent::sell(
                    symbol,
                    qty,
                    format!("Price above BB upper ({price:.0} > {upper:.0})"),
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
    fn insufficient_history_is_silent() {
        let frames = [frame_from_closes("A", &[100.0; 49])];
        assert!(MeanReversion::default().generate(&view(&frames)).is_empty());
    }

    #[test]
    fn steady_decline_is_oversold_and_below_band() {
        let mut closes = vec![1000.0; 50];
        closes.extend((1..=20).map(|i| 1000.0 - 5.0 * i as f64));
        closes.push(700.0);
        let frames = [frame_from_closes("1579.T", &closes)];

        let intents = MeanReversion::default().generate(&view(&frames));

        assert_eq!(intents.len(), 2);
        assert!(intents.iter().all(|i| i.side == Side::Buy));
        assert!(intents[0].reason.starts_with("RSI oversold"));
        assert!(intents[1].reason.starts_with("Price below BB lower"));
        assert_eq!(intents[0].quantity, 142);
    }

    #[test]
    fn steady_rise_sells() {
        let mut closes = vec![1000.0; 50];
        closes.extend((1..=20).map(|i| 1000.0 + 5.0 * i as f64));
        closes.push(1300.0);
        let frames = [frame_from_closes("1360.T", &closes)];

        let intents = MeanReversion::default().generate(&view(&frames));
        assert!(!intents.is_empty());
        assert!(intents.iter().all(|i| i.side == Side::Sell));
    }

    #[test]
    fn flat_market_is_quiet() {
        let frames = [frame_from_closes("A", &[500.0; 80])];
        assert!(MeanReversion::default().generate(&view(&frames)).is_empty());
    }
}
