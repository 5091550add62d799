//! Run configuration loaded from TOML.
//!
//! ```toml
//! [backtest]
//! symbols = ["1579.T", "1360.T"]
//! start_date = "2023-01-01"
//! end_date = "2025-08-05"
//! initial_capital = 1000000.0
//!
//! [costs]
//! transaction_cost = 0.002
//! slippage = 0.001
//!
//! [risk]
//! stop_loss = 0.05
//! take_profit = 0.15
//!
//! [strategy]
//! type = "pairs_trading"
//! z_score_threshold = 2.0
//! ```
//!
//! `[costs]` and `[risk]` are optional. Without `[risk]` the strategy's own
//! default limits apply, falling back to the engine defaults.

use chrono::NaiveDate;
use pairlab_core::domain::{Universe, UniverseError};
use pairlab_core::engine::EngineConfig;
use pairlab_core::indicators::IndicatorConfig;
use pairlab_core::strategy::StrategyKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid symbols: {0}")]
    Universe(#[from] UniverseError),

    #[error("start_date {start} is after end_date {end}")]
    DateRange { start: NaiveDate, end: NaiveDate },

    #[error("invalid engine settings: {0}")]
    Engine(#[from] pairlab_core::engine::ConfigError),

    #[error("unknown strategy '{0}'")]
    UnknownStrategy(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub backtest: BacktestSection,
    #[serde(default)]
    pub costs: CostsSection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk: Option<RiskSection>,
    #[serde(default)]
    pub indicators: IndicatorConfig,
    pub strategy: StrategyKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestSection {
    pub symbols: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default = "default_capital")]
    pub initial_capital: f64,
}

fn default_capital() -> f64 {
    EngineConfig::default().initial_capital
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostsSection {
    pub transaction_cost: f64,
    pub slippage: f64,
}

impl Default for CostsSection {
    fn default() -> Self {
        let engine = EngineConfig::default();
        Self { transaction_cost: engine.transaction_cost, slippage: engine.slippage }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskSection {
    pub stop_loss: f64,
    pub take_profit: f64,
}

impl Default for RiskSection {
    fn default() -> Self {
        let engine = EngineConfig::default();
        Self { stop_loss: engine.stop_loss, take_profit: engine.take_profit }
    }
}

impl RunConfig {
    /// Config for a default-parameter strategy by name.
    pub fn for_strategy(
        name: &str,
        symbols: Vec<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        initial_capital: f64,
    ) -> Result<Self, ConfigError> {
        let strategy =
            StrategyKind::from_name(name).ok_or_else(|| ConfigError::UnknownStrategy(name.into()))?;
        let config = Self {
            backtest: BacktestSection { symbols, start_date, end_date, initial_capital },
            costs: CostsSection::default(),
            risk: None,
            indicators: IndicatorConfig::default(),
            strategy,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::from_toml(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.universe()?;
        let (start, end) = (self.backtest.start_date, self.backtest.end_date);
        if start > end {
            return Err(ConfigError::DateRange { start, end });
        }
        self.engine_config().validate()?;
        Ok(())
    }

    pub fn universe(&self) -> Result<Universe, UniverseError> {
        Universe::new(&self.backtest.symbols)
    }

    /// Engine settings; risk limits come from `[risk]`, else the strategy,
    /// else the engine defaults.
    pub fn engine_config(&self) -> EngineConfig {
        let defaults = EngineConfig::default();
        let (stop_loss, take_profit) = match (self.risk, self.strategy.default_risk()) {
            (Some(r), _) => (r.stop_loss, r.take_profit),
            (None, Some(r)) => (r.stop_loss, r.take_profit),
            (None, None) => (defaults.stop_loss, defaults.take_profit),
        };
        EngineConfig {
            initial_capital: self.backtest.initial_capital,
            transaction_cost: self.costs.transaction_cost,
            slippage: self.costs.slippage,
            stop_loss,
            take_profit,
            indicators: self.indicators,
        }
    }

    /// Same config with a different strategy.
    pub fn with_strategy(&self, strategy: StrategyKind) -> Self {
        Self { strategy, ..self.clone() }
    }

    /// Deterministic content hash identifying this configuration.
    pub fn run_id(&self) -> Result<String, serde_json::Error> {
        let json = serde_json::to_vec(self)?;
        Ok(blake3::hash(&json).to_hex().to_string())
    }
}
