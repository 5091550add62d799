//! Execution engine: turns an order into cash and position changes.
//!
//! Infeasible orders (a buy costing more than the cash on hand, a sell larger
//! than the position) are rejected without touching state. Rejections are
//! appended to the state's rejection log and reported at debug level; they
//! never surface as errors.

pub mod cost_model;

pub use cost_model::{CostModel, OrderCosts};

use super::state::EngineState;
use crate::domain::{InstrumentId, RejectReason, Rejection, Side, TradeRecord};
use chrono::NaiveDate;
use tracing::debug;

/// What happened to an order.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionOutcome {
    /// Executed; the record was appended to `state.trades`.
    Filled,
    Rejected(RejectReason),
}

impl ExecutionOutcome {
    pub fn is_filled(&self) -> bool {
        matches!(self, ExecutionOutcome::Filled)
    }
}

/// One prospective order.
#[derive(Debug, Clone, Copy)]
pub struct OrderRequest<'a> {
    pub instrument: InstrumentId,
    pub side: Side,
    pub quantity: u64,
    pub reference_price: f64,
    pub date: NaiveDate,
    pub reason: &'a str,
}

#[derive(Debug, Clone, Copy)]
pub struct ExecutionEngine {
    cost_model: CostModel,
}

impl ExecutionEngine {
    pub fn new(cost_model: CostModel) -> Self {
        Self { cost_model }
    }

    pub fn cost_model(&self) -> &CostModel {
        &self.cost_model
    }

    pub fn execute(&self, state: &mut EngineState, order: OrderRequest<'_>) -> ExecutionOutcome {
        let costs = self.cost_model.costs(order.reference_price, order.side, order.quantity);
        let held = state.quantity(order.instrument);

        let (cash_delta, realized) = match order.side {
            Side::Buy => {
                let required = costs.buy_total();
                if required > state.cash {
                    return reject(
                        state,
                        &order,
                        RejectReason::InsufficientCash { required, available: state.cash },
                    );
                }
                (-required, None)
            }
            Side::Sell => {
                if order.quantity > held {
                    return reject(
                        state,
                        &order,
                        RejectReason::InsufficientPosition { requested: order.quantity, held },
                    );
                }
                let entry = state.positions.get(order.instrument).entry_price.unwrap_or(costs.price);
                let net = costs.sell_net();
                (net, Some(net - entry * order.quantity as f64))
            }
        };

        state.cash += cash_delta;
        let position = state.positions.get_mut(order.instrument);
        match order.side {
            Side::Buy => position.add(order.quantity, costs.price),
            Side::Sell => position.remove(order.quantity),
        }
        if let Some(pnl) = realized {
            state.realized_pnl += pnl;
        }

        state.trades.push(TradeRecord {
            date: order.date,
            symbol: state.universe.symbol(order.instrument).to_string(),
            side: order.side,
            quantity: order.quantity,
            price: costs.price,
            gross_amount: costs.gross,
            fee: costs.fee,
            slippage_cost: costs.slippage_cost,
            net_amount: cash_delta.abs(),
            realized_pnl: realized,
            reason: order.reason.to_string(),
        });
        ExecutionOutcome::Filled
    }
}

fn reject(state: &mut EngineState, order: &OrderRequest<'_>, reason: RejectReason) -> ExecutionOutcome {
    let symbol = state.universe.symbol(order.instrument).to_string();
    debug!(
        date = %order.date,
        symbol = %symbol,
        side = %order.side,
        quantity = order.quantity,
        ?reason,
        "order rejected"
    );
    state.rejections.push(Rejection {
        date: order.date,
        symbol,
        side: order.side,
        quantity: order.quantity,
        reason: reason.clone(),
    });
    ExecutionOutcome::Rejected(reason)
}
