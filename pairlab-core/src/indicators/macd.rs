//! MACD: fast EMA minus slow EMA, its signal EMA and the histogram.
//!
//! All three EMAs are defined from bar 0, so MACD needs no warm-up.

use super::ema::ema_values;

#[derive(Debug, Clone, Copy)]
pub struct Macd {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
}

impl Default for Macd {
    fn default() -> Self {
        Self { fast: 12, slow: 26, signal: 9 }
    }
}

#[derive(Debug, Clone)]
pub struct MacdLines {
    pub ema_fast: Vec<f64>,
    pub ema_slow: Vec<f64>,
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

impl Macd {
    pub fn compute(&self, closes: &[f64]) -> MacdLines {
        let ema_fast = ema_values(closes, self.fast);
        let ema_slow = ema_values(closes, self.slow);
        let macd: Vec<f64> = ema_fast.iter().zip(&ema_slow).map(|(f, s)| f - s).collect();
        let signal = ema_values(&macd, self.signal);
        let histogram = macd.iter().zip(&signal).map(|(m, s)| m - s).collect();
        MacdLines { ema_fast, ema_slow, macd, signal, histogram }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn defined_from_first_bar() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + (i as f64 * 0.3).sin() * 5.0).collect();
        let lines = Macd { fast: 3, slow: 6, signal: 4 }.compute(&closes);
        // both EMAs start at the first close
        assert_approx(lines.macd[0], 0.0, DEFAULT_EPSILON);
        assert_approx(lines.signal[0], 0.0, DEFAULT_EPSILON);
        for i in 0..40 {
            assert!(lines.signal[i].is_finite());
            assert_approx(lines.macd[i], lines.ema_fast[i] - lines.ema_slow[i], DEFAULT_EPSILON);
            assert_approx(lines.histogram[i], lines.macd[i] - lines.signal[i], DEFAULT_EPSILON);
        }
    }

    #[test]
    fn signal_is_ema_of_macd_line() {
        let closes: Vec<f64> = (100..160).map(f64::from).collect();
        let lines = Macd::default().compute(&closes);
        let expected = ema_values(&lines.macd, 9);
        for i in 0..closes.len() {
            assert_approx(lines.signal[i], expected[i], DEFAULT_EPSILON);
        }
        // a rising ramp keeps the fast EMA above the slow one after bar 0
        assert!(lines.macd[1..].iter().all(|&m| m > 0.0));
    }

    #[test]
    fn flat_prices_give_zero_macd() {
        let lines = Macd::default().compute(&[50.0; 60]);
        assert_approx(lines.macd[59], 0.0, DEFAULT_EPSILON);
        assert_approx(lines.signal[59], 0.0, DEFAULT_EPSILON);
    }
}
