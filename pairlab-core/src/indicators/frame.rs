//! Indicator frame: a price series augmented with every derived column the
//! strategies read.

use super::bollinger::Bollinger;
use super::fill::fill_warmup;
use super::macd::Macd;
use super::rsi::Rsi;
use super::sma::rolling_mean;
use super::volume::VolumeRatio;
use crate::domain::{PriceBar, PriceSeries};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Lookback parameters for [`compute_indicators`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub sma_short: usize,
    pub sma_long: usize,
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub macd_signal: usize,
    pub rsi_period: usize,
    pub bb_period: usize,
    pub bb_std: f64,
    pub volume_period: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            sma_short: 20,
            sma_long: 50,
            ema_fast: 12,
            ema_slow: 26,
            macd_signal: 9,
            rsi_period: 14,
            bb_period: 20,
            bb_std: 2.0,
            volume_period: 20,
        }
    }
}

/// Bars plus derived columns, all the same length, no NaN after construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorFrame {
    pub symbol: String,
    pub bars: Vec<PriceBar>,
    pub sma_short: Vec<f64>,
    pub sma_long: Vec<f64>,
    pub ema_fast: Vec<f64>,
    pub ema_slow: Vec<f64>,
    pub macd: Vec<f64>,
    pub macd_signal: Vec<f64>,
    pub macd_histogram: Vec<f64>,
    pub rsi: Vec<f64>,
    pub bb_middle: Vec<f64>,
    pub bb_std: Vec<f64>,
    pub bb_upper: Vec<f64>,
    pub bb_lower: Vec<f64>,
    pub volume_sma: Vec<f64>,
    pub volume_ratio: Vec<f64>,
}

impl IndicatorFrame {
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn close(&self, i: usize) -> f64 {
        self.bars[i].close
    }

    pub fn date(&self, i: usize) -> NaiveDate {
        self.bars[i].date
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }
}

/// Compute every indicator column for one instrument.
///
/// Each column is computed from bars up to its own index, then warm-up gaps
/// are forward/backward filled. A column with no defined value at all falls
/// back to a neutral value: the close for price-like columns, 50 for RSI,
/// 0 for MACD columns and band width, 1 for the volume ratio.
pub fn compute_indicators(series: &PriceSeries, config: &IndicatorConfig) -> IndicatorFrame {
    let bars = series.bars.clone();
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let volumes: Vec<f64> = bars.iter().map(|b| b.volume as f64).collect();

    let mut sma_short = rolling_mean(&closes, config.sma_short);
    let mut sma_long = rolling_mean(&closes, config.sma_long);

    let macd = Macd { fast: config.ema_fast, slow: config.ema_slow, signal: config.macd_signal }
        .compute(&closes);
    let (mut ema_fast, mut ema_slow) = (macd.ema_fast, macd.ema_slow);
    let (mut macd_line, mut macd_signal, mut macd_histogram) =
        (macd.macd, macd.signal, macd.histogram);

    let mut rsi = Rsi::new(config.rsi_period.max(1)).compute_closes(&closes);

    let bands = Bollinger { period: config.bb_period, multiplier: config.bb_std }.compute(&closes);
    let (mut bb_middle, mut bb_std, mut bb_upper, mut bb_lower) =
        (bands.middle, bands.std, bands.upper, bands.lower);

    let (mut volume_sma, mut volume_ratio) =
        VolumeRatio { period: config.volume_period }.compute(&volumes);

    let close_at = |i: usize| closes[i];
    for col in [
        &mut sma_short,
        &mut sma_long,
        &mut ema_fast,
        &mut ema_slow,
        &mut bb_middle,
        &mut bb_upper,
        &mut bb_lower,
    ] {
        fill_warmup(col, close_at);
    }
    for col in [&mut macd_line, &mut macd_signal, &mut macd_histogram, &mut bb_std] {
        fill_warmup(col, |_| 0.0);
    }
    fill_warmup(&mut rsi, |_| 50.0);
    fill_warmup(&mut volume_sma, |i| volumes[i]);
    fill_warmup(&mut volume_ratio, |_| 1.0);

    IndicatorFrame {
        symbol: series.symbol.clone(),
        bars,
        sma_short,
        sma_long,
        ema_fast,
        ema_slow,
        macd: macd_line,
        macd_signal,
        macd_histogram,
        rsi,
        bb_middle,
        bb_std,
        bb_upper,
        bb_lower,
        volume_sma,
        volume_ratio,
    }
}
