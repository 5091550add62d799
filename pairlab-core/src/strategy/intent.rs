//! Trade intent: what a strategy or the risk manager asks the engine to do.

use crate::domain::Side;
use serde::{Deserialize, Serialize};

/// A requested order.
///
/// `quantity` is signed so that malformed output (zero or negative) can be
/// represented and rejected by the engine instead of wrapping silently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeIntent {
    pub symbol: String,
    pub side: Side,
    pub quantity: i64,
    pub reason: String,
}

impl TradeIntent {
    pub fn buy(symbol: impl Into<String>, quantity: i64, reason: impl Into<String>) -> Self {
        Self { symbol: symbol.into(), side: Side::Buy, quantity, reason: reason.into() }
    }

    pub fn sell(symbol: impl Into<String>, quantity: i64, reason: impl Into<String>) -> Self {
        Self { symbol: symbol.into(), side: Side::Sell, quantity, reason: reason.into() }
    }
}

/// Whole shares purchasable for `notional` at `price`; 0 for non-positive prices.
pub fn shares_for_notional(notional: f64, price: f64) -> i64 {
    if price.is_nan() || price <= 0.0 || !notional.is_finite() || notional <= 0.0 {
        return 0;
    }
    (notional / price).floor() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shares_floor() {
        assert_eq!(shares_for_notional(100_000.0, 3_000.0), 33);
        assert_eq!(shares_for_notional(100.0, 300.0), 0);
        assert_eq!(shares_for_notional(100.0, 0.0), 0);
        assert_eq!(shares_for_notional(100.0, f64::NAN), 0);
    }

    #[test]
    fn constructors_set_side() {
        assert_eq!(TradeIntent::buy("A", 1, "x").side, Side::Buy);
        assert_eq!(TradeIntent::sell("A", 1, "x").side, Side::Sell);
    }
}
