//! PairLab Core: indicators, strategies, and the backtesting engine for a
//! one- or two-instrument ETF universe.
//!
//! This crate contains:
//! - Domain types (bars, positions, trades, snapshots, the instrument universe)
//! - Indicator calculation with warm-up filling
//! - The built-in strategy family behind the `SignalGenerator` trait
//! - Risk exits, order execution with slippage and fees, portfolio accounting
//! - The `Backtester` bar loop
//! - Data providers (Yahoo Finance, in-memory) and the Parquet cache

pub mod data;
pub mod domain;
pub mod engine;
pub mod error;
pub mod indicators;
pub mod strategy;

pub use engine::{BacktestResult, Backtester, EngineConfig};
pub use error::EngineError;
pub use strategy::{SignalGenerator, StrategyKind, TradeIntent};
