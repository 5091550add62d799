//! Price loading for the runner.
//!
//! Given a list of symbols, returns one series per symbol using this
//! fallback policy:
//! 1. If the cache fully covers the range → use it
//! 2. Else if a provider is available → download, cache, use
//! 3. Else if the cache has a partial range → use it, with a warning
//! 4. Else if `synthetic` → generate a deterministic random walk (tagged)
//! 5. Else if the provider reported the symbol as missing → empty series
//! 6. Otherwise → fail with a clear error
//!
//! Synthetic data is a developer-only debug mode; reports built on it carry
//! `has_synthetic = true`.

use chrono::{Datelike, NaiveDate};
use pairlab_core::data::{CoverageResult, DataError, DataProvider, DataSource, ParquetCache};
use pairlab_core::domain::{PriceBar, PriceSeries};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error(
        "no cached data for '{symbol}' and no network access (use --synthetic for synthetic data)"
    )]
    NoCachedDataOffline { symbol: String },

    #[error("no cached data for '{symbol}' and download failed: {reason}")]
    DownloadFailed { symbol: String, reason: String },

    #[error("data error: {0}")]
    Data(#[from] DataError),
}

#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Never make network requests.
    pub offline: bool,
    /// Generate synthetic bars when real data is unavailable.
    pub synthetic: bool,
    /// Re-download even if cached.
    pub force: bool,
}

impl LoadOptions {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end, offline: false, synthetic: false, force: false }
    }
}

/// Loaded series plus provenance.
#[derive(Debug, Clone)]
pub struct LoadedData {
    /// One series per requested symbol, in request order.
    pub series: Vec<PriceSeries>,
    pub sources: BTreeMap<String, DataSource>,
    /// blake3 over every bar of every series, in request order.
    pub dataset_hash: String,
    pub has_synthetic: bool,
}

pub fn load_series<S: AsRef<str>>(
    symbols: &[S],
    cache: &ParquetCache,
    provider: Option<&dyn DataProvider>,
    opts: &LoadOptions,
) -> Result<LoadedData, LoadError> {
    let mut series = Vec::with_capacity(symbols.len());
    let mut sources = BTreeMap::new();
    let mut has_synthetic = false;

    for symbol in symbols {
        let symbol = symbol.as_ref();
        let (bars, source) = load_one(symbol, cache, provider, opts)?;
        has_synthetic |= source == DataSource::Synthetic;
        info!(symbol, bars = bars.len(), ?source, "loaded");
        sources.insert(symbol.to_string(), source);
        series.push(PriceSeries::new(symbol, bars));
    }

    let dataset_hash = dataset_hash(&series);
    Ok(LoadedData { series, sources, dataset_hash, has_synthetic })
}

fn load_one(
    symbol: &str,
    cache: &ParquetCache,
    provider: Option<&dyn DataProvider>,
    opts: &LoadOptions,
) -> Result<(Vec<PriceBar>, DataSource), LoadError> {
    let in_range = |bars: Vec<PriceBar>| -> Vec<PriceBar> {
        bars.into_iter().filter(|b| b.date >= opts.start && b.date <= opts.end).collect()
    };
    let coverage = cache.covers_range(symbol, opts.start, opts.end);

    if !opts.force && coverage == CoverageResult::FullyCovered {
        if let Ok(bars) = cache.load(symbol) {
            return Ok((in_range(bars), DataSource::Cache));
        }
    }

    let mut failure = None;
    let mut missing_from = None;
    if !opts.offline {
        if let Some(prov) = provider.filter(|p| p.is_available()) {
            match prov.fetch(symbol, opts.start, opts.end) {
                Ok(fetched) => {
                    if !fetched.bars.is_empty() {
                        cache.write(symbol, &fetched.bars, fetched.source)?;
                    }
                    return Ok((in_range(fetched.bars), fetched.source));
                }
                Err(e) if e.is_missing_data() => {
                    warn!(symbol, provider = prov.name(), error = %e, "instrument unavailable");
                    missing_from = Some(prov.source());
                }
                Err(e) => {
                    warn!(symbol, provider = prov.name(), error = %e, "download failed");
                    failure = Some(e.to_string());
                }
            }
        }
    }

    if !opts.force && matches!(coverage, CoverageResult::PartiallyCovered { .. }) {
        if let Ok(bars) = cache.load(symbol) {
            warn!(symbol, "using partially cached range");
            return Ok((in_range(bars), DataSource::Cache));
        }
    }

    if opts.synthetic {
        warn!(symbol, "generating synthetic data, results will be tagged as synthetic");
        return Ok((generate_synthetic_bars(symbol, opts.start, opts.end), DataSource::Synthetic));
    }

    if let Some(source) = missing_from {
        warn!(symbol, "treating unavailable instrument as empty");
        return Ok((Vec::new(), source));
    }

    if opts.offline {
        return Err(LoadError::NoCachedDataOffline { symbol: symbol.to_string() });
    }
    Err(LoadError::DownloadFailed {
        symbol: symbol.to_string(),
        reason: failure.unwrap_or_else(|| "no data provider available".into()),
    })
}

/// Deterministic hash over symbols and bar values.
pub fn dataset_hash(series: &[PriceSeries]) -> String {
    let mut hasher = blake3::Hasher::new();
    for s in series {
        hasher.update(s.symbol.as_bytes());
        for bar in &s.bars {
            hasher.update(bar.date.to_string().as_bytes());
            for v in [bar.open, bar.high, bar.low, bar.close] {
                hasher.update(&v.to_le_bytes());
            }
            hasher.update(&bar.volume.to_le_bytes());
        }
    }
    hasher.finalize().to_hex().to_string()
}

/// Weekday random walk seeded from the symbol, so reruns are reproducible.
pub fn generate_synthetic_bars(symbol: &str, start: NaiveDate, end: NaiveDate) -> Vec<PriceBar> {
    let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let mut bars = Vec::new();
    let mut price = 1_000.0_f64;
    let mut current = start;

    while current <= end {
        if matches!(current.weekday(), chrono::Weekday::Sat | chrono::Weekday::Sun) {
            current += chrono::Duration::days(1);
            continue;
        }

        let daily_return: f64 = rng.gen_range(-0.02..0.02);
        let open = price;
        let close = price * (1.0 + daily_return);
        bars.push(PriceBar {
            date: current,
            open,
            high: open.max(close) * (1.0 + rng.gen_range(0.0..0.01)),
            low: open.min(close) * (1.0 - rng.gen_range(0.0..0.01)),
            close,
            volume: rng.gen_range(100_000..2_000_000u64),
        });

        price = close;
        current += chrono::Duration::days(1);
    }

    bars
}
