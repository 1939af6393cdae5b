//! Error types for plan validation and projection

use thiserror::Error;

/// Validation failures raised before any projection loop runs
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectionError {
    /// Annual rate is negative or not a finite number
    #[error("invalid annual rate {rate}%: returns must be finite and non-negative")]
    InvalidRate { rate: f64 },

    /// Combined opening lumpsum (rollover + additional) is negative
    #[error("invalid lumpsum: rollover {rollover:.2} + additional {additional:.2} is negative")]
    InvalidLumpsum { rollover: f64, additional: f64 },

    /// Phase must last between one and `MAX_DURATION_YEARS` years
    #[error(
        "invalid duration: {years} years (phase must last 1 to {max} years)",
        max = crate::plan::MAX_DURATION_YEARS
    )]
    InvalidDuration { years: u32 },

    /// Inflation rate is not a finite number
    #[error("invalid inflation rate {rate}%: must be a finite number")]
    InvalidInflation { rate: f64 },

    /// A contribution, withdrawal or lumpsum stream has an out-of-range field
    #[error("invalid stream '{id}': {reason}")]
    InvalidStream { id: String, reason: String },

    /// Nominal values and cumulative years differ in length
    #[error("series length mismatch: {values} values but {years} cumulative years")]
    SeriesLengthMismatch { values: usize, years: usize },
}

impl ProjectionError {
    /// Reject a non-finite inflation rate. Zero or negative rates are valid
    /// and mean "report real values equal to nominal".
    pub(crate) fn check_inflation(rate: f64) -> Result<(), Self> {
        if rate.is_finite() {
            Ok(())
        } else {
            Err(ProjectionError::InvalidInflation { rate })
        }
    }

    pub(crate) fn stream(id: &str, reason: impl Into<String>) -> Self {
        ProjectionError::InvalidStream {
            id: id.to_string(),
            reason: reason.into(),
        }
    }
}
