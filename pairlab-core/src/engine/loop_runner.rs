//! Bar-by-bar backtest loop.
//!
//! Each aligned date runs the same four steps:
//! 1. Risk exits: stop-loss / take-profit sells for open positions
//! 2. Strategy: intents from the market view, validated
//! 3. Execution: fills or silent rejections against cash and positions
//! 4. Accounting: mark-to-market snapshot

use super::accounting::PortfolioAccountant;
use super::config::EngineConfig;
use super::execution::{CostModel, ExecutionEngine, OrderRequest};
use super::result::BacktestResult;
use super::risk::RiskManager;
use super::state::EngineState;
use crate::data::{align_intersection, DataProvider};
use crate::domain::{PriceSeries, Universe};
use crate::error::EngineError;
use crate::indicators::{compute_indicators, IndicatorFrame};
use crate::strategy::{InstrumentHistory, MarketView, SignalGenerator, TradeIntent};
use chrono::NaiveDate;
use tracing::{debug, info, warn};

/// Runs backtests under one immutable configuration.
///
/// Every run builds its own [`EngineState`], so a `Backtester` can be shared
/// across threads and reused; identical inputs give identical results.
#[derive(Debug, Clone)]
pub struct Backtester {
    config: EngineConfig,
    risk: RiskManager,
    execution: ExecutionEngine,
}

impl Backtester {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            risk: RiskManager::new(config.stop_loss, config.take_profit),
            execution: ExecutionEngine::new(CostModel::new(config.slippage, config.transaction_cost)),
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Fetch every symbol once, then run.
    ///
    /// A symbol the provider has no data for becomes an empty series, which
    /// empties the aligned timeline. Any other provider failure aborts.
    pub fn run_backtest<S: AsRef<str>>(
        &self,
        provider: &dyn DataProvider,
        strategy: &dyn SignalGenerator,
        symbols: &[S],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BacktestResult, EngineError> {
        let universe = Universe::new(symbols)?;
        let mut series = Vec::with_capacity(universe.len());

        for symbol in universe.symbols() {
            match provider.fetch(symbol, start, end) {
                Ok(fetched) => {
                    if fetched.bars.is_empty() {
                        warn!(symbol = %symbol, provider = provider.name(), "no bars in range");
                    }
                    series.push(PriceSeries::new(symbol.clone(), fetched.bars));
                }
                Err(e) if e.is_missing_data() => {
                    warn!(symbol = %symbol, error = %e, "instrument unavailable, treating as empty");
                    series.push(PriceSeries::empty(symbol.clone()));
                }
                Err(source) => return Err(EngineError::Data { symbol: symbol.clone(), source }),
            }
        }

        self.run_on_series(&series, strategy)
    }

    /// Run over already-loaded series, one per instrument.
    pub fn run_on_series(
        &self,
        series: &[PriceSeries],
        strategy: &dyn SignalGenerator,
    ) -> Result<BacktestResult, EngineError> {
        let symbols: Vec<&str> = series.iter().map(|s| s.symbol.as_str()).collect();
        let universe = Universe::new(&symbols)?;
        let capital = self.config.initial_capital;

        info!(
            strategy = strategy.name(),
            symbols = ?universe.symbols(),
            initial_capital = capital,
            "starting backtest"
        );

        let frames: Vec<IndicatorFrame> =
            series.iter().map(|s| compute_indicators(s, &self.config.indicators)).collect();
        let timeline = align_intersection(series);

        if timeline.is_empty() {
            warn!(strategy = strategy.name(), "aligned timeline is empty, nothing to simulate");
            return Ok(BacktestResult::empty(strategy.name(), universe.symbols().to_vec(), capital));
        }

        let mut state = EngineState::new(universe, capital);
        let mut accountant = PortfolioAccountant::new();
        let mut snapshots = Vec::with_capacity(timeline.len());
        let mut prices = vec![0.0; frames.len()];

        for (t, &date) in timeline.dates.iter().enumerate() {
            for (i, frame) in frames.iter().enumerate() {
                prices[i] = frame.close(timeline.bar_index[i][t]);
            }

            let exits = self.risk.evaluate(&state.universe, &state.positions, &prices);
            for intent in &exits {
                let order = resolve(&state.universe, intent, &prices, date, "risk")?;
                self.execution.execute(&mut state, order);
            }

            let view = MarketView {
                date,
                instruments: frames
                    .iter()
                    .enumerate()
                    .map(|(i, f)| InstrumentHistory::new(f, timeline.bar_index[i][t] + 1))
                    .collect(),
                initial_capital: capital,
            };
            let intents = strategy.generate(&view);
            if !intents.is_empty() {
                debug!(%date, count = intents.len(), "strategy intents");
            }
            for intent in &intents {
                let order = resolve(&state.universe, intent, &prices, date, strategy.name())?;
                self.execution.execute(&mut state, order);
            }

            snapshots.push(accountant.snapshot(&state, &prices, date));
        }

        let result = BacktestResult::from_run(
            strategy.name(),
            state.universe.symbols().to_vec(),
            capital,
            accountant.max_drawdown_pct(),
            state.trades,
            snapshots,
            state.rejections,
        );

        info!(
            strategy = strategy.name(),
            bars = result.bar_count,
            trades = result.total_trades,
            rejected = result.rejections.len(),
            final_value = result.final_value,
            total_return_pct = result.total_return_pct,
            "backtest complete"
        );

        Ok(result)
    }
}

/// Check an intent against the universe and turn it into an order.
fn resolve<'a>(
    universe: &Universe,
    intent: &'a TradeIntent,
    prices: &[f64],
    date: NaiveDate,
    strategy: &str,
) -> Result<OrderRequest<'a>, EngineError> {
    let malformed = |detail: String| EngineError::MalformedIntent {
        strategy: strategy.to_string(),
        date,
        detail,
    };

    if intent.symbol.trim().is_empty() {
        return Err(malformed("empty symbol".into()));
    }
    let instrument = universe
        .id_of(&intent.symbol)
        .ok_or_else(|| malformed(format!("unknown symbol '{}'", intent.symbol)))?;
    if intent.quantity <= 0 {
        return Err(malformed(format!(
            "non-positive quantity {} for {} {}",
            intent.quantity, intent.side, intent.symbol
        )));
    }

    Ok(OrderRequest {
        instrument,
        side: intent.side,
        quantity: intent.quantity as u64,
        reference_price: prices[instrument.index()],
        date,
        reason: &intent.reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_bars;
    use crate::strategy::FnStrategy;

    fn series(symbol: &str, closes: &[f64]) -> PriceSeries {
        PriceSeries::new(symbol, make_bars(closes))
    }

    #[test]
    fn rejects_invalid_config() {
        assert!(matches!(
            Backtester::new(EngineConfig::with_capital(-1.0)),
            Err(EngineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn buy_then_hold_is_marked_to_market() {
        let bt = Backtester::new(EngineConfig::frictionless(1_000.0)).unwrap();
        let strategy = FnStrategy::new("first_bar_buy", |v: &MarketView<'_>| {
            let h = &v.instruments[0];
            if h.len() == 1 {
                vec![TradeIntent::buy(h.symbol(), 10, "entry")]
            } else {
                vec![]
            }
        });

        let r = bt.run_on_series(&[series("A", &[10.0, 12.0, 15.0])], &strategy).unwrap();

        assert_eq!(r.total_trades, 1);
        assert_eq!(r.bar_count, 3);
        assert_eq!(r.final_value, 900.0 + 150.0);
        assert_eq!(r.portfolio_values[0].value, 1_000.0);
        assert_eq!(r.unrealized_pnl, 50.0);
    }

    #[test]
    fn view_never_exceeds_current_bar() {
        let bt = Backtester::new(EngineConfig::frictionless(1_000.0)).unwrap();
        let strategy = FnStrategy::new("recorder", |v: &MarketView<'_>| {
            for h in &v.instruments {
                assert_eq!(h.last_bar().map(|b| b.date), Some(v.date));
            }
            vec![]
        });
        bt.run_on_series(&[series("A", &[1.0, 2.0, 3.0, 4.0])], &strategy).unwrap();
    }

    #[test]
    fn zero_quantity_intent_fails_the_run() {
        let bt = Backtester::new(EngineConfig::default()).unwrap();
        let strategy =
            FnStrategy::new("broken", |_: &MarketView<'_>| vec![TradeIntent::buy("A", 0, "bad")]);
        let err = bt.run_on_series(&[series("A", &[1.0, 2.0])], &strategy).unwrap_err();
        assert!(matches!(err, EngineError::MalformedIntent { .. }));
    }

    #[test]
    fn unknown_symbol_fails_the_run() {
        let bt = Backtester::new(EngineConfig::default()).unwrap();
        let strategy = FnStrategy::new("broken", |_: &MarketView<'_>| {
            vec![TradeIntent::sell("ZZZ", 1, "bad")]
        });
        let err = bt.run_on_series(&[series("A", &[1.0, 2.0])], &strategy).unwrap_err();
        assert!(err.to_string().contains("unknown symbol"));
    }
}
