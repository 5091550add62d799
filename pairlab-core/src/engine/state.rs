//! Mutable per-run engine state.

use crate::domain::{InstrumentId, PositionBook, Rejection, TradeRecord, Universe};

/// Cash, positions and logs for one backtest run.
///
/// Created fresh for every run; nothing carries over between runs.
#[derive(Debug, Clone)]
pub struct EngineState {
    pub universe: Universe,
    pub cash: f64,
    pub positions: PositionBook,
    pub realized_pnl: f64,
    pub trades: Vec<TradeRecord>,
    pub rejections: Vec<Rejection>,
}

impl EngineState {
    pub fn new(universe: Universe, initial_capital: f64) -> Self {
        let positions = PositionBook::new(universe.len());
        Self {
            universe,
            cash: initial_capital,
            positions,
            realized_pnl: 0.0,
            trades: Vec::new(),
            rejections: Vec::new(),
        }
    }

    pub fn quantity(&self, id: InstrumentId) -> u64 {
        self.positions.get(id).quantity
    }
}
