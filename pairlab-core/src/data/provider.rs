//! Data provider trait and structured error types.
//!
//! The DataProvider trait abstracts over price sources (Yahoo Finance, the
//! Parquet cache, in-memory fixtures) so the orchestrator can be driven by any
//! of them.

use crate::domain::{PriceBar, PriceSeries};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Structured error types for data operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("cache error: {0}")]
    CacheError(String),

    #[error("parquet I/O error: {0}")]
    ParquetError(String),

    #[error("no cached data for symbol '{symbol}'")]
    NoCachedData { symbol: String },

    #[error("data error: {0}")]
    Other(String),
}

impl DataError {
    /// True when the error means "this instrument has no data", as opposed to
    /// an infrastructure failure.
    pub fn is_missing_data(&self) -> bool {
        matches!(self, DataError::SymbolNotFound { .. } | DataError::NoCachedData { .. })
    }
}

/// Result of a successful data fetch for a single symbol.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub symbol: String,
    pub bars: Vec<PriceBar>,
    pub source: DataSource,
}

impl FetchResult {
    pub fn into_series(self) -> PriceSeries {
        PriceSeries::new(self.symbol, self.bars)
    }
}

/// Where the data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    YahooFinance,
    Cache,
    Memory,
    Synthetic,
}

/// Source of daily OHLCV history.
pub trait DataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Provenance tag recorded for data this provider returns.
    fn source(&self) -> DataSource;

    /// Fetch daily bars for a symbol over `[start, end]` inclusive.
    ///
    /// An empty `bars` vector is a valid answer meaning "no data in range".
    fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate)
        -> Result<FetchResult, DataError>;

    /// Check if the provider is currently usable.
    fn is_available(&self) -> bool {
        true
    }
}

/// Provider serving pre-loaded series, used for fixtures and pre-fetched data.
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    series: HashMap<String, Vec<PriceBar>>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_series(mut self, series: PriceSeries) -> Self {
        self.insert(series);
        self
    }

    pub fn insert(&mut self, series: PriceSeries) {
        self.series.insert(series.symbol, series.bars);
    }
}

impl DataProvider for MemoryProvider {
    fn name(&self) -> &str {
        "memory"
    }

    fn source(&self) -> DataSource {
        DataSource::Memory
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        let bars = self
            .series
            .get(symbol)
            .ok_or_else(|| DataError::SymbolNotFound { symbol: symbol.to_string() })?;
        Ok(FetchResult {
            symbol: symbol.to_string(),
            bars: bars.iter().filter(|b| b.date >= start && b.date <= end).copied().collect(),
            source: self.source(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(day: u32, close: f64) -> PriceBar {
        PriceBar {
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume: 10,
        }
    }

    #[test]
    fn memory_provider_filters_range() {
        let provider = MemoryProvider::new()
            .with_series(PriceSeries::new("A", (1..=10).map(|d| bar(d, d as f64)).collect()));
        let start = NaiveDate::from_ymd_opt(2024, 3, 3).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let got = provider.fetch("A", start, end).unwrap();
        assert_eq!(got.bars.len(), 3);
        assert_eq!(got.source, DataSource::Memory);
    }

    #[test]
    fn memory_provider_unknown_symbol() {
        let provider = MemoryProvider::new();
        let d = NaiveDate::from_ymd_opt(2024, 3, 3).unwrap();
        let err = provider.fetch("NOPE", d, d).unwrap_err();
        assert!(err.is_missing_data());
    }
}
