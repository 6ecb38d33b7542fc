//! Quartile-based outlier counting

/// Multiplier applied to the interquartile range to place the fences
pub const IQR_FENCE_MULTIPLIER: f64 = 1.5;

/// Count values strictly outside `[Q1 - 1.5 * IQR, Q3 + 1.5 * IQR]`.
///
/// NaN values are ignored. Returns 0 for empty input.
pub fn count_outliers_iqr(values: &[f64]) -> usize {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return 0;
    }
    sorted.sort_by(|a, b| a.total_cmp(b));

    let q1 = quantile_sorted(&sorted, 0.25);
    let q3 = quantile_sorted(&sorted, 0.75);
    let iqr = q3 - q1;
    let lower = q1 - IQR_FENCE_MULTIPLIER * iqr;
    let upper = q3 + IQR_FENCE_MULTIPLIER * iqr;

    sorted.iter().filter(|&&v| v < lower || v > upper).count()
}

/// Quantile of pre-sorted, non-empty data, interpolating linearly between
/// the two nearest order statistics.
pub fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    let h = (sorted.len() - 1) as f64 * p.clamp(0.0, 1.0);
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(sorted.len() - 1);
    sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
}
