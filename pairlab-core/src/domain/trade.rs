//! Executed trade records and the rejection log.

use super::order::Side;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One accepted, executed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub date: NaiveDate,
    pub symbol: String,
    pub side: Side,
    pub quantity: u64,
    /// Execution price after slippage.
    pub price: f64,
    /// `quantity * price`.
    pub gross_amount: f64,
    pub fee: f64,
    /// `quantity * reference_price * slippage`.
    pub slippage_cost: f64,
    /// Cash moved: `gross + fee` for buys, `gross - fee` for sells.
    pub net_amount: f64,
    /// Set on sells only.
    pub realized_pnl: Option<f64>,
    pub reason: String,
}

impl TradeRecord {
    pub fn is_winner(&self) -> bool {
        self.realized_pnl.is_some_and(|p| p > 0.0)
    }

    pub fn is_loser(&self) -> bool {
        self.realized_pnl.is_some_and(|p| p < 0.0)
    }
}

/// Why an order was not executed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RejectReason {
    InsufficientCash { required: f64, available: f64 },
    InsufficientPosition { requested: u64, held: u64 },
}

/// An order the execution engine declined. No state changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rejection {
    pub date: NaiveDate,
    pub symbol: String,
    pub side: Side,
    pub quantity: u64,
    pub reason: RejectReason,
}
