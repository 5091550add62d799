//! Warm-up fill for indicator columns.

/// Forward-fill, then backward-fill, then replace anything still undefined
/// (an all-NaN column) with `neutral(i)`.
pub fn fill_warmup(values: &mut [f64], neutral: impl Fn(usize) -> f64) {
    let mut last = f64::NAN;
    for v in values.iter_mut() {
        if v.is_nan() {
            *v = last;
        } else {
            last = *v;
        }
    }

    if let Some(first) = values.iter().position(|v| !v.is_nan()) {
        let seed = values[first];
        for v in &mut values[..first] {
            *v = seed;
        }
    } else {
        for (i, v) in values.iter_mut().enumerate() {
            *v = neutral(i);
        }
    }
}
