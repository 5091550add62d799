//! Relative-value pairs trading over exactly two instruments.
//!
//! Over the last `window` dates both instruments traded, compute the
//! correlation of closes and the z-score of the latest close ratio
//! (first / second) against the window's ratios. When |correlation| exceeds
//! the threshold and the z-score is beyond ±threshold, sell the relatively
//! expensive leg and buy the cheap one.

use super::intent::{shares_for_notional, TradeIntent};
use super::{InstrumentHistory, MarketView, SignalGenerator};
use crate::indicators::{correlation, mean, sample_std};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PairsTrading {
    pub window: usize,
    pub correlation_threshold: f64,
    pub z_score_threshold: f64,
    pub notional: f64,
    pub min_history: usize,
}

impl Default for PairsTrading {
    fn default() -> Self {
        Self {
            window: 20,
            correlation_threshold: 0.7,
            z_score_threshold: 2.0,
            notional: 100_000.0,
            min_history: 50,
        }
    }
}

/// Closes of both instruments on their last `window` shared dates, oldest first.
fn shared_tail(a: &InstrumentHistory<'_>, b: &InstrumentHistory<'_>, window: usize) -> Option<(Vec<f64>, Vec<f64>)> {
    let (bars_a, bars_b) = (a.bars(), b.bars());
    let (mut i, mut j) = (bars_a.len(), bars_b.len());
    let mut xs = Vec::with_capacity(window);
    let mut ys = Vec::with_capacity(window);

    while i > 0 && j > 0 && xs.len() < window {
        let (da, db) = (bars_a[i - 1].date, bars_b[j - 1].date);
        if da == db {
            xs.push(bars_a[i - 1].close);
            ys.push(bars_b[j - 1].close);
            i -= 1;
            j -= 1;
        } else if da > db {
            i -= 1;
        } else {
            j -= 1;
        }
    }

    if xs.len() < window {
        return None;
    }
    xs.reverse();
    ys.reverse();
    Some((xs, ys))
}

impl PairsTrading {
    /// `(correlation, z_score)` for the current bar, if defined.
    pub fn statistics(&self, first: &InstrumentHistory<'_>, second: &InstrumentHistory<'_>) -> Option<(f64, f64)> {
        let (xs, ys) = shared_tail(first, second, self.window.max(2))?;
        let corr = correlation(&xs, &ys);
        let ratios: Vec<f64> = xs.iter().zip(&ys).map(|(x, y)| x / y).collect();
        let std = sample_std(&ratios);
        let latest = *ratios.last()?;
        let z = (latest - mean(&ratios)) / std;
        (corr.is_finite() && z.is_finite()).then_some((corr, z))
    }
}

impl SignalGenerator for PairsTrading {
    fn name(&self) -> &str {
        "pairs_trading"
    }

    fn generate(&self, view: &MarketView<'_>) -> Vec<TradeIntent> {
        let [first, second] = view.instruments.as_slice() else {
            return Vec::new();
        };
        if first.len() < self.min_history || second.len() < self.min_history {
            return Vec::new();
        }
        let Some((corr, z)) = self.statistics(first, second) else {
            return Vec::new();
        };
        if corr.abs() <= self.correlation_threshold {
            return Vec::new();
        }
        let (Some(p1), Some(p2)) = (first.last_close(), second.last_close()) else {
            return Vec::new();
        };
        let q1 = shares_for_notional(self.notional, p1);
        let q2 = shares_for_notional(self.notional, p2);
        let (s1, s2) = (first.symbol(), second.symbol());

        let mut intents = Vec::with_capacity(2);
        if z > self.z_score_threshold {
            if q1 > 0 {
                intents.push(TradeIntent::sell(s1, q1, format!("Pairs trading: {s1} overvalued (z-score: {z:.2})")));
            }
            if q2 > 0 {
                intents.push(TradeIntent::buy(s2, q2, format!("Pairs trading: {s2} undervalued (z-score: {z:.2})")));
            }
        } else if z < -self.z_score_threshold {
            if q1 > 0 {
                intents.push(TradeIntent::buy(s1, q1, format!("Pairs trading: {s1} undervalued (z-score: {z:.2})")));
            }
            if q2 > 0 {
                intents.push(TradeIntent::sell(s2, q2, format!("Pairs trading: {s2} overvalued (z-score: {z:.2})")));
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

    /// Two inversely moving legs; the last bar pushes the ratio far above its mean.
    fn divergent_pair() -> (Vec<f64>, Vec<f64>) {
        let n = 60;
        let a: Vec<f64> = (0..n).map(|i| 1000.0 + 10.0 * ((i % 7) as f64)).collect();
        let b: Vec<f64> = (0..n).map(|i| 2000.0 - 10.0 * ((i % 7) as f64)).collect();
        let mut a = a;
        let mut b = b;
        a[n - 1] = 1100.0;
        b[n - 1] = 1900.0;
        (a, b)
    }

    #[test]
    fn divergence_sells_expensive_buys_cheap() {
        let (a, b) = divergent_pair();
        let frames = [frame_from_closes("1579.T", &a), frame_from_closes("1360.T", &b)];
        let v = view(&frames);

        let (corr, z) = PairsTrading::default().statistics(&v.instruments[0], &v.instruments[1]).unwrap();
        assert!(corr < -0.7, "corr={corr}");
        assert!(z > 2.0, "z={z}");

        let intents = PairsTrading::default().generate(&v);
        assert_eq!(intents.len(), 2);
        assert_eq!((intents[0].symbol.as_str(), intents[0].side), ("1579.T", Side::Sell));
        assert_eq!((intents[1].symbol.as_str(), intents[1].side), ("1360.T", Side::Buy));
        assert_eq!(intents[0].quantity, 90);
        assert_eq!(intents[1].quantity, 52);
    }

    #[test]
    fn reversed_divergence_flips_legs() {
        let (a, b) = divergent_pair();
        let frames = [frame_from_closes("1360.T", &b), frame_from_closes("1579.T", &a)];
        let intents = PairsTrading::default().generate(&view(&frames));
        assert_eq!(intents.len(), 2);
        assert_eq!((intents[0].symbol.as_str(), intents[0].side), ("1360.T", Side::Buy));
        assert_eq!((intents[1].symbol.as_str(), intents[1].side), ("1579.T", Side::Sell));
    }

    #[test]
    fn requires_two_instruments_and_history() {
        let (a, b) = divergent_pair();
        let one = [frame_from_closes("A", &a)];
        assert!(PairsTrading::default().generate(&view(&one)).is_empty());

        let short = [frame_from_closes("A", &a[..40]), frame_from_closes("B", &b[..40])];
        assert!(PairsTrading::default().generate(&view(&short)).is_empty());
    }

    #[test]
    fn uncorrelated_pair_is_quiet() {
        let a: Vec<f64> = (0..60).map(|i| 1000.0 + (i as f64 * 1.3).sin() * 10.0).collect();
        let b = vec![2000.0; 60];
        let frames = [frame_from_closes("A", &a), frame_from_closes("B", &b)];
        assert!(PairsTrading::default().generate(&view(&frames)).is_empty());
    }
}
