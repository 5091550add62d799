//! Volume ratio: volume divided by its rolling mean.

use super::sma::rolling_mean;

#[derive(Debug, Clone, Copy)]
pub struct VolumeRatio {
    pub period: usize,
}

impl Default for VolumeRatio {
    fn default() -> Self {
        Self { period: 20 }
    }
}

impl VolumeRatio {
    /// Returns `(volume_sma, volume_ratio)`. A zero average volume gives NaN.
    pub fn compute(&self, volumes: &[f64]) -> (Vec<f64>, Vec<f64>) {
        let sma = rolling_mean(volumes, self.period);
        let ratio = volumes
            .iter()
            .zip(&sma)
            .map(|(&v, &avg)| if avg > 0.0 { v / avg } else { f64::NAN })
            .collect();
        (sma, ratio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn ratio_of_spike() {
        let (sma, ratio) = VolumeRatio { period: 3 }.compute(&[100.0, 100.0, 400.0]);
        assert_approx(sma[2], 200.0, DEFAULT_EPSILON);
        assert_approx(ratio[2], 2.0, DEFAULT_EPSILON);
        assert!(ratio[1].is_nan());
    }

    #[test]
    fn zero_volume_is_undefined() {
        let (_, ratio) = VolumeRatio { period: 2 }.compute(&[0.0, 0.0, 0.0]);
        assert!(ratio.iter().all(|v| v.is_nan()));
    }
}
