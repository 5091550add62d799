//! Strategies: stateless signal generators over indicator histories.
//!
//! A strategy sees a [`MarketView`] for one bar date: each instrument's own
//! history up to and including that date, with every indicator column. It
//! returns zero or more [`TradeIntent`]s. Strategies never see the portfolio
//! and keep no memory between calls.
//!
//! The built-in family is the closed [`StrategyKind`] enum. Callers can plug in
//! their own logic through the [`SignalGenerator`] trait or [`FnStrategy`].

pub mod combined;
pub mod intent;
pub mod mean_reversion;
pub mod momentum;
pub mod pairs;
pub mod range_bound;
pub mod trend_following;
pub mod volatility_breakout;

pub use combined::Combined;
pub use intent::{shares_for_notional, TradeIntent};
pub use mean_reversion::MeanReversion;
pub use momentum::Momentum;
pub use pairs::PairsTrading;
pub use range_bound::RangeBound;
pub use trend_following::TrendFollowing;
pub use volatility_breakout::VolatilityBreakout;

use crate::domain::PriceBar;
use crate::indicators::IndicatorFrame;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One instrument's history as visible on a given bar date.
#[derive(Debug, Clone, Copy)]
pub struct InstrumentHistory<'a> {
    frame: &'a IndicatorFrame,
    len: usize,
}

impl<'a> InstrumentHistory<'a> {
    /// History of `frame` truncated to its first `len` bars.
    pub fn new(frame: &'a IndicatorFrame, len: usize) -> Self {
        Self { frame, len: len.min(frame.len()) }
    }

    pub fn symbol(&self) -> &'a str {
        &self.frame.symbol
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn bars(&self) -> &'a [PriceBar] {
        &self.frame.bars[..self.len]
    }

    /// Latest visible bar.
    pub fn last_bar(&self) -> Option<&'a PriceBar> {
        self.bars().last()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.last_bar().map(|b| b.close)
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars().iter().map(|b| b.close).collect()
    }

    /// Visible prefix of an indicator column of the underlying frame.
    pub fn column(&self, select: impl Fn(&'a IndicatorFrame) -> &'a Vec<f64>) -> &'a [f64] {
        &select(self.frame)[..self.len]
    }

    /// Latest visible value of an indicator column.
    pub fn last(&self, select: impl Fn(&'a IndicatorFrame) -> &'a Vec<f64>) -> Option<f64> {
        self.column(select).last().copied()
    }
}

/// Everything a strategy may look at for one bar.
#[derive(Debug, Clone)]
pub struct MarketView<'a> {
    pub date: NaiveDate,
    pub instruments: Vec<InstrumentHistory<'a>>,
    pub initial_capital: f64,
}

impl<'a> MarketView<'a> {
    pub fn history(&self, symbol: &str) -> Option<&InstrumentHistory<'a>> {
        self.instruments.iter().find(|h| h.symbol() == symbol)
    }

    /// Current reference price per instrument, in universe order.
    pub fn current_prices(&self) -> Vec<(&'a str, f64)> {
        self.instruments.iter().filter_map(|h| Some((h.symbol(), h.last_close()?))).collect()
    }
}

/// Produces trade intents from market history.
pub trait SignalGenerator: Send + Sync {
    fn name(&self) -> &str;

    fn generate(&self, view: &MarketView<'_>) -> Vec<TradeIntent>;
}

/// Adapter turning a closure into a [`SignalGenerator`].
pub struct FnStrategy<F> {
    name: String,
    f: F,
}

impl<F> FnStrategy<F>
where
    F: Fn(&MarketView<'_>) -> Vec<TradeIntent> + Send + Sync,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self { name: name.into(), f }
    }
}

impl<F> SignalGenerator for FnStrategy<F>
where
    F: Fn(&MarketView<'_>) -> Vec<TradeIntent> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn generate(&self, view: &MarketView<'_>) -> Vec<TradeIntent> {
        (self.f)(view)
    }
}

/// Risk limits a strategy wants when the run does not set them explicitly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskOverride {
    pub stop_loss: f64,
    pub take_profit: f64,
}

/// The built-in strategies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StrategyKind {
    MeanReversion(MeanReversion),
    Momentum(Momentum),
    PairsTrading(PairsTrading),
    TrendFollowing(TrendFollowing),
    VolatilityBreakout(VolatilityBreakout),
    RangeBound(RangeBound),
    Combined(Combined),
}

impl StrategyKind {
    pub const NAMES: [&'static str; 7] = [
        "mean_reversion",
        "momentum",
        "pairs_trading",
        "trend_following",
        "volatility_breakout",
        "range_bound",
        "combined",
    ];

    /// Default-parameter strategy by registry name.
    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name {
            "mean_reversion" => Self::MeanReversion(MeanReversion::default()),
            "momentum" => Self::Momentum(Momentum::default()),
            "pairs_trading" | "pairs" => Self::PairsTrading(PairsTrading::default()),
            "trend_following" => Self::TrendFollowing(TrendFollowing::default()),
            "volatility_breakout" => Self::VolatilityBreakout(VolatilityBreakout::default()),
            "range_bound" => Self::RangeBound(RangeBound::default()),
            "combined" => Self::Combined(Combined::default()),
            _ => return None,
        };
        Some(kind)
    }

    /// Every strategy with default parameters, in registry order.
    pub fn all_defaults() -> Vec<Self> {
        Self::NAMES.iter().filter_map(|n| Self::from_name(n)).collect()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::MeanReversion(_) => "mean_reversion",
            Self::Momentum(_) => "momentum",
            Self::PairsTrading(_) => "pairs_trading",
            Self::TrendFollowing(_) => "trend_following",
            Self::VolatilityBreakout(_) => "volatility_breakout",
            Self::RangeBound(_) => "range_bound",
            Self::Combined(_) => "combined",
        }
    }

    /// Range-bound trading runs with stop-loss and take-profit disabled.
    pub fn default_risk(&self) -> Option<RiskOverride> {
        match self {
            Self::RangeBound(_) => Some(RiskOverride { stop_loss: 0.0, take_profit: 0.0 }),
            _ => None,
        }
    }
}

impl SignalGenerator for StrategyKind {
    fn name(&self) -> &str {
        StrategyKind::name(self)
    }

    fn generate(&self, view: &MarketView<'_>) -> Vec<TradeIntent> {
        match self {
            Self::MeanReversion(s) => s.generate(view),
            Self::Momentum(s) => s.generate(view),
            Self::PairsTrading(s) => s.generate(view),
            Self::TrendFollowing(s) => s.generate(view),
            Self::VolatilityBreakout(s) => s.generate(view),
            Self::RangeBound(s) => s.generate(view),
            Self::Combined(s) => s.generate(view),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::domain::PriceSeries;
    use crate::indicators::{compute_indicators, IndicatorConfig};

    pub fn frame_from_closes(symbol: &str, closes: &[f64]) -> IndicatorFrame {
        let bars = crate::indicators::make_bars(closes);
        compute_indicators(&PriceSeries::new(symbol, bars), &IndicatorConfig::default())
    }

    pub fn view<'a>(frames: &'a [IndicatorFrame]) -> MarketView<'a> {
        let instruments: Vec<InstrumentHistory<'a>> =
            frames.iter().map(|f| InstrumentHistory::new(f, f.len())).collect();
        let date = instruments
            .iter()
            .filter_map(|h| h.last_bar().map(|b| b.date))
            .max()
            .unwrap_or_default();
        MarketView { date, instruments, initial_capital: 1_000_000.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn registry_names_roundtrip() {
        for name in StrategyKind::NAMES {
            let kind = StrategyKind::from_name(name).unwrap();
            assert_eq!(kind.name(), name);
        }
        assert!(StrategyKind::from_name("martingale").is_none());
        assert_eq!(StrategyKind::all_defaults().len(), 7);
    }

    #[test]
    fn only_range_bound_disables_risk() {
        for kind in StrategyKind::all_defaults() {
            let expect = kind.name() == "range_bound";
            assert_eq!(kind.default_risk().is_some(), expect, "{}", kind.name());
        }
    }

    #[test]
    fn deserializes_tagged_with_defaults() {
        let kind: StrategyKind =
            serde_json::from_str(r#"{"type":"pairs_trading","z_score_threshold":1.5}"#).unwrap();
        match kind {
            StrategyKind::PairsTrading(p) => {
                assert_eq!(p.z_score_threshold, 1.5);
                assert_eq!(p.correlation_threshold, 0.7);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn history_truncates_columns() {
        let frame = frame_from_closes("A", &[1.0, 2.0, 3.0, 4.0]);
        let h = InstrumentHistory::new(&frame, 2);
        assert_eq!(h.len(), 2);
        assert_eq!(h.last_close(), Some(2.0));
        assert_eq!(h.column(|f| &f.rsi).len(), 2);
        assert_eq!(InstrumentHistory::new(&frame, 10).len(), 4);
    }

    #[test]
    fn fn_strategy_adapter() {
        let frames = [frame_from_closes("A", &[10.0, 11.0])];
        let s = FnStrategy::new("always_buy", |v: &MarketView<'_>| {
            v.instruments.iter().map(|h| TradeIntent::buy(h.symbol(), 1, "test")).collect()
        });
        assert_eq!(s.name(), "always_buy");
        assert_eq!(s.generate(&view(&frames)).len(), 1);
    }
}
