//! Engine configuration.

use crate::indicators::IndicatorConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("initial_capital must be positive and finite, got {0}")]
    InitialCapital(f64),

    #[error("{field} must be a finite fraction >= 0, got {value}")]
    NegativeFraction { field: &'static str, value: f64 },
}

/// Constructor-level settings of a backtest.
///
/// Fractions are plain ratios (`0.002` is 0.2%). A stop-loss or take-profit of
/// `0` disables that check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub initial_capital: f64,
    pub transaction_cost: f64,
    pub slippage: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub indicators: IndicatorConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            initial_capital: 1_000_000.0,
            transaction_cost: 0.002,
            slippage: 0.001,
            stop_loss: 0.05,
            take_profit: 0.15,
            indicators: IndicatorConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn with_capital(initial_capital: f64) -> Self {
        Self { initial_capital, ..Self::default() }
    }

    /// No fees, no slippage, no risk exits.
    pub fn frictionless(initial_capital: f64) -> Self {
        Self {
            initial_capital,
            transaction_cost: 0.0,
            slippage: 0.0,
            stop_loss: 0.0,
            take_profit: 0.0,
            indicators: IndicatorConfig::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.initial_capital.is_finite() && self.initial_capital > 0.0) {
            return Err(ConfigError::InitialCapital(self.initial_capital));
        }
        for (field, value) in [
            ("transaction_cost", self.transaction_cost),
            ("slippage", self.slippage),
            ("stop_loss", self.stop_loss),
            ("take_profit", self.take_profit),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::NegativeFraction { field, value });
            }
        }
        Ok(())
    }
}
