//! MACD and volume momentum.
//!
//! MACD above its signal line and above `+macd_threshold` buys; below the
//! signal and below `-macd_threshold` sells. Independently, a volume ratio
//! above `volume_threshold` buys when the close is above the short SMA and
//! sells when below.

use super::intent::{shares_for_notional, TradeIntent};
use super::{MarketView, SignalGenerator};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Momentum {
    pub macd_threshold: f64,
    pub volume_threshold: f64,
    pub macd_notional: f64,
    pub volume_notional: f64,
    pub min_history: usize,
}

impl Default for Momentum {
    fn default() -> Self {
        Self {
            macd_threshold: 0.0,
            volume_threshold: 1.5,
            macd_notional: 150_000.0,
            volume_notional: 100_000.0,
            min_history: 50,
        }
    }
}

impl SignalGenerator for Momentum {
    fn name(&self) -> &str {
        "momentum"
    }

    fn generate(&self, view: &MarketView<'_>) -> Vec<TradeIntent> {
        let mut intents = Vec::new();

        for h in &view.instruments {
            if h.len() < self.min_history.max(1) {
                continue;
            }
            let (Some(price), Some(macd), Some(signal), Some(volume_ratio), Some(sma)) = (
                h.last_close(),
                h.last(|f| &f.macd),
                h.last(|f| &f.macd_signal),
                h.last(|f| &f.volume_ratio),
                h.last(|f| &f.sma_short),
            ) else {
                continue;
            };
            let symbol = h.symbol();

            let qty = shares_for_notional(self.macd_notional, price);
            if qty > 0 {
                if macd > signal && macd > self.macd_threshold {
                    intents.push(TradeIntent::buy(
                        symbol,
                        qty,
                        format!("MACD bullish ({macd:.3} > {signal:.3})"),
                    ));
                } else if macd < signal && macd < -self.macd_threshold {
                    intents.push(TradeIntent::sell(
                        symbol,
                        qty,
                        format!("MACD bearish ({macd:.3} < {signal:.3})"),
                    ));
                }
            }

            let qty = shares_for_notional(self.volume_notional, price);
            if qty > 0 && volume_ratio > self.volume_threshold {
                if price > sma {
                    intents.push(TradeIntent::buy(
                        symbol,
                        qty,
                        format!("High volume breakout (ratio {volume_ratio:.2})"),
                    ));
                } else if price < sma {
                    intents.push(TradeIntent::sell(
                        symbol,
                        qty,
                        format!("High volume breakdown (ratio {volume_ratio:.2})"),
                    ));
                }
            }
        }

        intents
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PriceSeries, Side};
    use crate::indicators::{compute_indicators, make_bars, IndicatorConfig};
    use crate::strategy::test_support::{frame_from_closes, view};

    #[test]
    fn accelerating_uptrend_is_macd_bullish() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64).powf(1.5)).collect();
        let frames = [frame_from_closes("A", &closes)];

        let intents = Momentum::default().generate(&view(&frames));

        assert_eq!(intents.len(), 1);
        assert_eq!(intents[0].side, Side::Buy);
        assert!(intents[0].reason.starts_with("MACD bullish"));
    }

    #[test]
    fn volume_spike_above_sma_buys() {
        let closes: Vec<f64> = (0..60).map(|i| if i < 59 { 100.0 } else { 110.0 }).collect();
        let mut bars = make_bars(&closes);
        bars[59].volume = 5_000;
        let frame = compute_indicators(&PriceSeries::new("A", bars), &IndicatorConfig::default());
        let frames = [frame];

        let strategy = Momentum { macd_threshold: 1e9, ..Momentum::default() };
        let intents = strategy.generate(&view(&frames));

        assert_eq!(intents.len(), 1);
        assert_eq!(intents[0].side, Side::Buy);
        assert_eq!(intents[0].quantity, 909);
        assert!(intents[0].reason.contains("volume"));
    }

    #[test]
    fn short_history_is_silent() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let frames = [frame_from_closes("A", &closes)];
        assert!(Momentum::default().generate(&view(&frames)).is_empty());
    }
}
