//! Bollinger Bands: moving average +/- a multiple of the rolling standard deviation.
//!
//! Uses the sample standard deviation (divide by N-1).
//! Lookback: period - 1.

use super::sma::rolling_mean;
use super::stats::sample_std;

/// Rolling sample standard deviation. NaN for windows shorter than 2 or containing NaN.
pub fn rolling_std(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if period < 2 || n < period {
        return result;
    }
    for i in (period - 1)..n {
        let window = &values[i + 1 - period..=i];
        if window.iter().any(|v| v.is_nan()) {
            continue;
        }
        result[i] = sample_std(window);
    }
    result
}

#[derive(Debug, Clone, Copy)]
pub struct Bollinger {
    pub period: usize,
    pub multiplier: f64,
}

#[derive(Debug, Clone)]
pub struct BollingerBands {
    pub middle: Vec<f64>,
    pub std: Vec<f64>,
    pub upper: Vec<f64>,
    pub lower: Vec<f64>,
}

impl Default for Bollinger {
    fn default() -> Self {
        Self { period: 20, multiplier: 2.0 }
    }
}

impl Bollinger {
    pub fn compute(&self, closes: &[f64]) -> BollingerBands {
        let middle = rolling_mean(closes, self.period);
        let std = rolling_std(closes, self.period);
        let upper = middle.iter().zip(&std).map(|(m, s)| m + self.multiplier * s).collect();
        let lower = middle.iter().zip(&std).map(|(m, s)| m - self.multiplier * s).collect();
        BollingerBands { middle, std, upper, lower }
    }
}
