//! Sampling with replacement for bagging.

use rand::Rng;

use crate::dataset::Record;
use crate::error::ForestError;

/// Number of rows a bootstrap sample draws: `round(ratio * n_rows)`.
#[must_use]
pub fn draw_count(n_rows: usize, ratio: f64) -> usize {
    (n_rows as f64 * ratio).round() as usize
}

/// Reject ratios outside `(0, 1]`.
fn check_ratio(ratio: f64) -> Result<(), ForestError> {
    if !ratio.is_finite() || ratio <= 0.0 || ratio > 1.0 {
        return Err(ForestError::InvalidSampleRatio { ratio });
    }
    Ok(())
}

/// Check that `ratio` is usable and draws at least one row from `n_rows`.
pub(crate) fn validate_ratio(n_rows: usize, ratio: f64) -> Result<usize, ForestError> {
    check_ratio(ratio)?;
    let count = draw_count(n_rows, ratio);
    if count == 0 {
        return Err(ForestError::EmptyBootstrapSample { ratio, n_rows });
    }
    Ok(count)
}

/// Draw `round(ratio * rows.len())` rows uniformly at random with replacement.
///
/// The returned rows borrow from the same records as `rows`; duplicates are
/// expected. The sample is never larger than `rows`.
///
/// # Errors
///
/// Returns [`ForestError::InvalidSampleRatio`] unless `ratio` is in `(0, 1]`.
pub fn subsample<'a>(
    rows: &[&'a Record],
    ratio: f64,
    rng: &mut impl Rng,
) -> Result<Vec<&'a Record>, ForestError> {
    check_ratio(ratio)?;
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let count = draw_count(rows.len(), ratio);
    Ok((0..count)
        .map(|_| rows[rng.gen_range(0..rows.len())])
        .collect())
}
