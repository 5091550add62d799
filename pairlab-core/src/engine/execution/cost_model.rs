//! Cost model: slippage and transaction fees.
//!
//! Slippage is directional: buyers pay `ref × (1 + s)`, sellers receive
//! `ref × (1 − s)`. The fee is a fraction of the gross (post-slippage) amount
//! on both sides.

use crate::domain::Side;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostModel {
    pub slippage: f64,
    pub transaction_cost: f64,
}

/// Price and cash amounts for one prospective order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderCosts {
    pub price: f64,
    pub gross: f64,
    pub fee: f64,
    pub slippage_cost: f64,
}

impl OrderCosts {
    /// Cash leaving the account on a buy.
    pub fn buy_total(&self) -> f64 {
        self.gross + self.fee
    }

    /// Cash entering the account on a sell.
    pub fn sell_net(&self) -> f64 {
        self.gross - self.fee
    }
}

impl CostModel {
    pub fn new(slippage: f64, transaction_cost: f64) -> Self {
        Self { slippage, transaction_cost }
    }

    pub fn frictionless() -> Self {
        Self::new(0.0, 0.0)
    }

    pub fn execution_price(&self, reference_price: f64, side: Side) -> f64 {
        reference_price * (1.0 + side.sign() * self.slippage)
    }

    pub fn costs(&self, reference_price: f64, side: Side, quantity: u64) -> OrderCosts {
        let qty = quantity as f64;
        let price = self.execution_price(reference_price, side);
        let gross = qty * price;
        OrderCosts {
            price,
            gross,
            fee: gross * self.transaction_cost,
            slippage_cost: qty * reference_price * self.slippage,
        }
    }
}
