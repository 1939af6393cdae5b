//! Inflation deflation of nominal values for reporting
//!
//! Real values are for display only. Nominal values are what compounds and
//! what rolls over between phases.

use crate::error::ProjectionError;

/// Deflate one nominal value by `cumulative_years` of inflation.
/// The rate is assumed finite; `apply_inflation` checks it.
pub fn deflate(nominal: f64, inflation_rate_percent: f64, cumulative_years: u32) -> f64 {
    if inflation_rate_percent <= 0.0 {
        return nominal;
    }
    nominal / (1.0 + inflation_rate_percent / 100.0).powf(f64::from(cumulative_years))
}

/// Deflate a series of nominal values.
///
/// `cumulative_years[i]` counts years since the start of the whole plan, not
/// since the start of the phase the value belongs to. A non-positive rate
/// returns the input unchanged; a non-finite one is an error.
pub fn apply_inflation(
    nominal: &[f64],
    inflation_rate_percent: f64,
    cumulative_years: &[u32],
) -> Result<Vec<f64>, ProjectionError> {
    ProjectionError::check_inflation(inflation_rate_percent)?;
    if nominal.len() != cumulative_years.len() {
        return Err(ProjectionError::SeriesLengthMismatch {
            values: nominal.len(),
            years: cumulative_years.len(),
        });
    }
    Ok(nominal
        .iter()
        .zip(cumulative_years)
        .map(|(&value, &years)| deflate(value, inflation_rate_percent, years))
        .collect())
}
