//! Annual rate to monthly growth factor conversion
//!
//! Two compounding conventions are supported:
//! - Nominal monthly: the annual rate is split evenly, `1 + r/12`
//! - Effective monthly: the monthly factor compounds to exactly the annual rate,
//!   `(1 + r)^(1/12)`
//!
//! Neither is assumed. Every `RateSpec` names its convention explicitly.

use serde::{Deserialize, Serialize};

use crate::error::ProjectionError;

/// How an annual percentage rate is turned into a monthly growth factor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompoundingConvention {
    /// `g = 1 + annual/1200`
    NominalMonthly,
    /// `g = (1 + annual/100)^(1/12)`
    EffectiveMonthly,
}

impl CompoundingConvention {
    /// Both conventions, for side-by-side comparisons
    pub const ALL: [CompoundingConvention; 2] = [
        CompoundingConvention::NominalMonthly,
        CompoundingConvention::EffectiveMonthly,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CompoundingConvention::NominalMonthly => "nominal-monthly",
            CompoundingConvention::EffectiveMonthly => "effective-monthly",
        }
    }
}

/// Annual rate in percent together with its compounding convention
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateSpec {
    /// Annual rate in percent (12.0 = 12%)
    pub annual_rate_percent: f64,

    /// Conversion to a monthly factor
    pub convention: CompoundingConvention,
}

impl RateSpec {
    pub fn new(annual_rate_percent: f64, convention: CompoundingConvention) -> Self {
        Self {
            annual_rate_percent,
            convention,
        }
    }

    pub fn nominal_monthly(annual_rate_percent: f64) -> Self {
        Self::new(annual_rate_percent, CompoundingConvention::NominalMonthly)
    }

    pub fn effective_monthly(annual_rate_percent: f64) -> Self {
        Self::new(annual_rate_percent, CompoundingConvention::EffectiveMonthly)
    }

    /// Same rate under a different convention
    pub fn with_convention(self, convention: CompoundingConvention) -> Self {
        Self { convention, ..self }
    }

    /// Reject negative or non-finite rates
    pub fn validate(&self) -> Result<(), ProjectionError> {
        if !self.annual_rate_percent.is_finite() || self.annual_rate_percent < 0.0 {
            return Err(ProjectionError::InvalidRate {
                rate: self.annual_rate_percent,
            });
        }
        Ok(())
    }

    /// Monthly growth factor `g` (always >= 1 for a valid rate)
    pub fn monthly_growth_factor(&self) -> Result<f64, ProjectionError> {
        self.validate()?;
        Ok(monthly_growth_factor(
            self.annual_rate_percent,
            self.convention,
        ))
    }

    /// Growth factor over `months` periods, `g^months`
    pub fn growth_over_months(&self, months: u32) -> Result<f64, ProjectionError> {
        Ok(self.monthly_growth_factor()?.powf(f64::from(months)))
    }
}

/// Raw conversion without validation. Callers validate the rate first.
pub fn monthly_growth_factor(annual_rate_percent: f64, convention: CompoundingConvention) -> f64 {
    match convention {
        CompoundingConvention::NominalMonthly => 1.0 + annual_rate_percent / 1200.0,
        CompoundingConvention::EffectiveMonthly => {
            (1.0 + annual_rate_percent / 100.0).powf(1.0 / 12.0)
        }
    }
}
