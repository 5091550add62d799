//! Exponential Moving Average (EMA), bias-corrected.
//!
//! With alpha = 2/(period+1) and decay = 1 - alpha:
//!   num[t] = x[t] + decay * num[t-1]
//!   den[t] = 1    + decay * den[t-1]
//!   EMA[t] = num[t] / den[t]
//!
//! Every weight is normalised by the weights seen so far, so the EMA is defined
//! from the first valid value with no warm-up. Lookback: 0.

use super::Indicator;
use crate::domain::PriceBar;

/// EMA of an arbitrary series.
///
/// Leading NaN values stay NaN and the average starts at the first valid
/// value. A NaN after that still decays the weights and repeats the previous
/// average.
pub fn ema_values(values: &[f64], period: usize) -> Vec<f64> {
    let mut result = vec![f64::NAN; values.len()];
    if period == 0 {
        return result;
    }
    let Some(start) = values.iter().position(|v| !v.is_nan()) else {
        return result;
    };

    let decay = 1.0 - 2.0 / (period as f64 + 1.0);
    let (mut num, mut den) = (0.0, 0.0);
    for (i, &x) in values.iter().enumerate().skip(start) {
        num *= decay;
        den *= decay;
        if !x.is_nan() {
            num += x;
            den += 1.0;
        }
        result[i] = num / den;
    }
    result
}

#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    name: String,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "EMA period must be >= 1");
        Self { period, name: format!("ema_{period}") }
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<f64> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        ema_values(&closes, self.period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn ema_period_1_equals_close() {
        let bars = make_bars(&[100.0, 200.0, 300.0]);
        let result = Ema::new(1).compute(&bars);
        assert_approx(result[0], 100.0, DEFAULT_EPSILON);
        assert_approx(result[1], 200.0, DEFAULT_EPSILON);
        assert_approx(result[2], 300.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_3_known_values() {
        // decay = 0.5
        // t1: (11 + 5) / 1.5 = 10.6667
        // t2: (12 + 8) / 1.75 = 11.4286
        let bars = make_bars(&[10.0, 11.0, 12.0]);
        let result = Ema::new(3).compute(&bars);
        assert_approx(result[0], 10.0, DEFAULT_EPSILON);
        assert_approx(result[1], 16.0 / 1.5, DEFAULT_EPSILON);
        assert_approx(result[2], 20.0 / 1.75, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_12_matches_reference_on_ramp() {
        // closes 100..159, reference values from an adjusted exponential mean
        let closes: Vec<f64> = (100..160).map(f64::from).collect();
        let result = ema_values(&closes, 12);
        assert_approx(result[0], 100.0, DEFAULT_EPSILON);
        assert_approx(result[11], 107.3681, 1e-4);
        assert_approx(result[30], 124.6757, 1e-4);
    }

    #[test]
    fn ema_is_causal() {
        let closes: Vec<f64> = (0..40).map(|i| 50.0 + (i as f64 * 0.7).cos() * 4.0).collect();
        let full = ema_values(&closes, 12);
        let prefix = ema_values(&closes[..15], 12);
        for i in 0..15 {
            assert_approx(full[i], prefix[i], DEFAULT_EPSILON);
        }
    }

    #[test]
    fn ema_skips_leading_nan() {
        let values = [f64::NAN, f64::NAN, 10.0, 11.0];
        let result = ema_values(&values, 3);
        assert!(result[1].is_nan());
        assert_approx(result[2], 10.0, DEFAULT_EPSILON);
        assert_approx(result[3], 16.0 / 1.5, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_nan_gap_repeats_previous_and_decays() {
        let values = [10.0, f64::NAN, 12.0];
        let result = ema_values(&values, 3);
        assert_approx(result[1], 10.0, DEFAULT_EPSILON);
        // num = 12 + 0.25 * 10, den = 1 + 0.25
        assert_approx(result[2], 14.5 / 1.25, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_all_nan_input() {
        assert!(ema_values(&[f64::NAN; 4], 2).iter().all(|v| v.is_nan()));
    }
}
