//! Stop-loss and take-profit exits.
//!
//! Each long position is compared against its entry price once per bar, before
//! the strategy runs. Crossing either threshold liquidates the whole position.

use crate::domain::{PositionBook, Universe};
use crate::strategy::TradeIntent;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskManager {
    /// Fractional loss that triggers an exit; 0 disables.
    pub stop_loss: f64,
    /// Fractional gain that triggers an exit; 0 disables.
    pub take_profit: f64,
}

impl RiskManager {
    pub fn new(stop_loss: f64, take_profit: f64) -> Self {
        Self { stop_loss, take_profit }
    }

    pub fn disabled() -> Self {
        Self::new(0.0, 0.0)
    }

    /// Full-liquidation sells for positions past a threshold.
    ///
    /// `prices` holds the current reference price per instrument, indexed like
    /// `universe`. Stop-loss wins when both thresholds would fire.
    pub fn evaluate(
        &self,
        universe: &Universe,
        positions: &PositionBook,
        prices: &[f64],
    ) -> Vec<TradeIntent> {
        let mut exits = Vec::new();

        for (id, position) in positions.iter() {
            let Some(&price) = prices.get(id.index()) else {
                continue;
            };
            let Some(ret) = position.return_since_entry(price) else {
                continue;
            };

            let reason = if self.stop_loss > 0.0 && ret <= -self.stop_loss {
                format!("stop-loss ({:.2}%)", ret * 100.0)
            } else if self.take_profit > 0.0 && ret >= self.take_profit {
                format!("take-profit ({:.2}%)", ret * 100.0)
            } else {
                continue;
            };

            let symbol = universe.symbol(id);
            debug!(symbol, quantity = position.quantity, %reason, "risk exit");
            exits.push(TradeIntent::sell(symbol, position.quantity as i64, reason));
        }

        exits
    }
}
