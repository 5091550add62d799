//! Union of several strategies with per-(symbol, side) de-duplication.
//!
//! When more than one sub-strategy asks for the same side on the same
//! symbol, the intent with the largest quantity wins. Equal quantities keep
//! the first one seen. Output order follows the first appearance of each
//! (symbol, side) pair.

use super::intent::TradeIntent;
use super::{
    MarketView, MeanReversion, Momentum, PairsTrading, SignalGenerator, StrategyKind, TrendFollowing,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Combined {
    pub strategies: Vec<StrategyKind>,
}

impl Default for Combined {
    fn default() -> Self {
        Self {
            strategies: vec![
                StrategyKind::MeanReversion(MeanReversion::default()),
                StrategyKind::Momentum(Momentum::default()),
                StrategyKind::PairsTrading(PairsTrading::default()),
                StrategyKind::TrendFollowing(TrendFollowing::default()),
            ],
        }
    }
}

/// Keep the highest-quantity intent per (symbol, side).
pub fn dedup_by_symbol_side(intents: impl IntoIterator<Item = TradeIntent>) -> Vec<TradeIntent> {
    let mut best: Vec<TradeIntent> = Vec::new();
    for intent in intents {
        let key = (intent.symbol.as_str(), intent.side);
        match best.iter_mut().find(|b| (b.symbol.as_str(), b.side) == key) {
            Some(existing) if intent.quantity > existing.quantity => *existing = intent,
            Some(_) => {}
            None => best.push(intent),
        }
    }
    best
}

impl SignalGenerator for Combined {
    fn name(&self) -> &str {
        "combined"
    }

    fn generate(&self, view: &MarketView<'_>) -> Vec<TradeIntent> {
        dedup_by_symbol_side(self.strategies.iter().flat_map(|s| s.generate(view)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Side;

    #[test]
    fn keeps_highest_quantity() {
        let out = dedup_by_symbol_side(vec![
            TradeIntent::buy("1579.T", 50, "a"),
            TradeIntent::buy("1579.T", 80, "b"),
        ]);
        assert_eq!(out, vec![TradeIntent::buy("1579.T", 80, "b")]);
    }

    #[test]
    fn ties_keep_first_seen() {
        let out = dedup_by_symbol_side(vec![
            TradeIntent::sell("A", 10, "first"),
            TradeIntent::sell("A", 10, "second"),
        ]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].reason, "first");
    }

    #[test]
    fn sides_and_symbols_are_separate_groups() {
        let raw = vec![
            TradeIntent::buy("A", 1, ""),
            TradeIntent::sell("A", 2, ""),
            TradeIntent::buy("B", 3, ""),
            TradeIntent::buy("A", 4, ""),
        ];
        let out = dedup_by_symbol_side(raw);
        assert_eq!(out.len(), 3);
        assert_eq!((out[0].symbol.as_str(), out[0].side, out[0].quantity), ("A", Side::Buy, 4));
        assert_eq!((out[1].symbol.as_str(), out[1].side), ("A", Side::Sell));
        assert_eq!(out[2].symbol, "B");
    }
}
