//! Small statistics helpers used by strategies.

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (N-1). NaN for fewer than two values.
pub fn sample_std(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (n - 1) as f64;
    var.sqrt()
}

/// Pearson correlation. NaN when lengths differ, n < 2, or either side is constant.
pub fn correlation(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() || a.len() < 2 {
        return f64::NAN;
    }
    let ma = mean(a);
    let mb = mean(b);
    let mut cov = 0.0;
    let mut va = 0.0;
    let mut vb = 0.0;
    for (x, y) in a.iter().zip(b) {
        cov += (x - ma) * (y - mb);
        va += (x - ma).powi(2);
        vb += (y - mb).powi(2);
    }
    if va == 0.0 || vb == 0.0 {
        return f64::NAN;
    }
    cov / (va.sqrt() * vb.sqrt())
}

/// Percentile rank of `current` within `window`, in `[0, 100]`:
/// `100 * #(values strictly below current) / (n - 1)`.
pub fn percentile_rank(window: &[f64], current: f64) -> f64 {
    if window.len() < 2 {
        return 50.0;
    }
    let below = window.iter().filter(|&&v| v < current).count();
    (100.0 * below as f64 / (window.len() - 1) as f64).min(100.0)
}
