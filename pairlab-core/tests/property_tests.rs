//! Property tests for engine invariants.
//!
//! Uses proptest to verify, over random price paths and random order flow:
//! 1. Capital conservation: initial capital + signed cash flows == final cash
//! 2. No overspend: cash never goes negative
//! 3. No oversell: sell fills never exceed the position held
//! 4. Peak monotonicity: the running peak never decreases and bounds value
//! 5. Realized P&L identity: per-trade realized P&L sums to the result total

use chrono::NaiveDate;
use pairlab_core::domain::{PriceBar, PriceSeries, Side};
use pairlab_core::engine::{BacktestResult, Backtester, EngineConfig};
use pairlab_core::strategy::{FnStrategy, MarketView, TradeIntent};
use proptest::prelude::*;
use std::collections::HashMap;

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_path(len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-0.04..0.04_f64, len).prop_map(|steps| {
        let mut price = 1_000.0;
        steps
            .into_iter()
            .map(|s| {
                price *= 1.0 + s;
                (price * 100.0).round() / 100.0
            })
            .collect()
    })
}

/// Per-bar order instruction: (side flag, quantity).
fn arb_orders(len: usize) -> impl Strategy<Value = Vec<(bool, i64)>> {
    prop::collection::vec((any::<bool>(), 1..400_i64), len)
}

fn arb_config() -> impl Strategy<Value = EngineConfig> {
    (0.0..0.01_f64, 0.0..0.005_f64, 0.0..0.2_f64, 0.0..0.3_f64).prop_map(
        |(transaction_cost, slippage, stop_loss, take_profit)| EngineConfig {
            initial_capital: 200_000.0,
            transaction_cost,
            slippage,
            stop_loss,
            take_profit,
            ..EngineConfig::default()
        },
    )
}

fn series(symbol: &str, closes: &[f64]) -> PriceSeries {
    let start = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &c)| PriceBar {
            date: start + chrono::Duration::days(i as i64),
            open: c,
            high: c,
            low: c,
            close: c,
            volume: 1_000,
        })
        .collect();
    PriceSeries::new(symbol, bars)
}

fn run(config: EngineConfig, a: &[f64], b: &[f64], orders: Vec<(bool, i64)>) -> BacktestResult {
    let strategy = FnStrategy::new("scripted", move |v: &MarketView<'_>| {
        let t = v.instruments[0].len() - 1;
        let (buy, qty) = orders[t];
        let target = &v.instruments[t % 2];
        if buy {
            vec![TradeIntent::buy(target.symbol(), qty, "scripted")]
        } else {
            vec![TradeIntent::sell(target.symbol(), qty, "scripted")]
        }
    });
    Backtester::new(config)
        .unwrap()
        .run_on_series(&[series("1579.T", a), series("1360.T", b)], &strategy)
        .unwrap()
}

const BARS: usize = 40;

proptest! {
    #[test]
    fn capital_is_conserved(
        config in arb_config(),
        a in arb_path(BARS),
        b in arb_path(BARS),
        orders in arb_orders(BARS),
    ) {
        let r = run(config, &a, &b, orders);
        let flows: f64 = r.trade_history.iter().map(|t| match t.side {
            Side::Buy => -t.net_amount,
            Side::Sell => t.net_amount,
        }).sum();
        let cash = r.portfolio_values.last().unwrap().cash;
        prop_assert!((r.initial_capital + flows - cash).abs() < 1e-6);
    }

    #[test]
    fn never_overspends_or_oversells(
        config in arb_config(),
        a in arb_path(BARS),
        b in arb_path(BARS),
        orders in arb_orders(BARS),
    ) {
        let r = run(config, &a, &b, orders);
        for snap in &r.portfolio_values {
            prop_assert!(snap.cash >= -1e-9);
        }

        let mut held: HashMap<&str, u64> = HashMap::new();
        for t in &r.trade_history {
            let h = held.entry(t.symbol.as_str()).or_default();
            match t.side {
                Side::Buy => *h += t.quantity,
                Side::Sell => {
                    prop_assert!(t.quantity <= *h);
                    *h -= t.quantity;
                }
            }
        }
        let last = r.portfolio_values.last().unwrap();
        for (symbol, qty) in held {
            prop_assert_eq!(last.positions[symbol], qty);
        }
    }

    #[test]
    fn peak_is_monotonic(
        config in arb_config(),
        a in arb_path(BARS),
        b in arb_path(BARS),
        orders in arb_orders(BARS),
    ) {
        let r = run(config, &a, &b, orders);
        let mut prev = f64::NEG_INFINITY;
        for snap in &r.portfolio_values {
            prop_assert!(snap.peak_value >= prev);
            prop_assert!(snap.peak_value >= snap.value);
            prop_assert!(snap.drawdown_pct >= 0.0);
            prev = snap.peak_value;
        }
    }

    #[test]
    fn realized_pnl_identity(
        config in arb_config(),
        a in arb_path(BARS),
        b in arb_path(BARS),
        orders in arb_orders(BARS),
    ) {
        let r = run(config, &a, &b, orders);
        let realized: f64 = r.trade_history.iter().filter_map(|t| t.realized_pnl).sum();
        prop_assert!((realized - r.realized_pnl).abs() < 1e-6);
        prop_assert!(r.trade_history.iter().all(|t| (t.side == Side::Sell) == t.realized_pnl.is_some()));
    }
}
