//! Phase inputs: contribution, withdrawal and lumpsum streams

use serde::{Deserialize, Serialize};

use crate::error::ProjectionError;
use crate::rates::{CompoundingConvention, RateSpec};

/// Longest phase accepted. Keeps month counts and compounding exponents well
/// inside `i32`.
pub const MAX_DURATION_YEARS: u32 = 100;

fn default_applies_from_period() -> u32 {
    1
}

/// A monthly contribution stream (SIP) with optional annual step-up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionStream {
    pub id: String,

    /// Contribution per month before any step-up
    pub periodic_amount: f64,

    /// Stream's own expected return. Only used for the stand-alone value
    /// column; the pooled balance grows at the phase rate.
    pub rate: RateSpec,

    /// Percent increase applied after every 12th month
    #[serde(default)]
    pub step_up_percent: f64,

    /// First month (1-indexed, phase-local) the stream contributes
    #[serde(default = "default_applies_from_period")]
    pub applies_from_period: u32,
}

impl ContributionStream {
    pub fn new(id: impl Into<String>, periodic_amount: f64, rate: RateSpec) -> Self {
        Self {
            id: id.into(),
            periodic_amount,
            rate,
            step_up_percent: 0.0,
            applies_from_period: 1,
        }
    }

    pub fn with_step_up(mut self, step_up_percent: f64) -> Self {
        self.step_up_percent = step_up_percent;
        self
    }

    pub fn starting_at(mut self, period: u32) -> Self {
        self.applies_from_period = period;
        self
    }

    fn validate(&self, total_periods: u32) -> Result<(), ProjectionError> {
        if !self.periodic_amount.is_finite() || self.periodic_amount < 0.0 {
            return Err(ProjectionError::stream(&self.id, "periodic amount must be non-negative"));
        }
        if !self.step_up_percent.is_finite() || self.step_up_percent < 0.0 {
            return Err(ProjectionError::stream(&self.id, "step-up must be non-negative"));
        }
        if self.applies_from_period < 1 || self.applies_from_period > total_periods {
            return Err(ProjectionError::stream(
                &self.id,
                format!(
                    "first contribution month {} outside 1..={}",
                    self.applies_from_period, total_periods
                ),
            ));
        }
        self.rate.validate()
    }
}

/// A monthly withdrawal stream (SWP) drawn from the pooled balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithdrawalStream {
    pub id: String,

    /// Amount withdrawn per month once started
    pub periodic_amount: f64,

    /// First phase year (1-indexed) with withdrawals
    pub start_year: u32,

    /// Legacy per-stream rate. Accepted and validated, never applied:
    /// withdrawals always come out of the pooled balance at the phase rate.
    #[serde(default)]
    pub own_rate: Option<RateSpec>,
}

impl WithdrawalStream {
    pub fn new(id: impl Into<String>, periodic_amount: f64, start_year: u32) -> Self {
        Self {
            id: id.into(),
            periodic_amount,
            start_year,
            own_rate: None,
        }
    }

    pub fn with_own_rate(mut self, rate: RateSpec) -> Self {
        self.own_rate = Some(rate);
        self
    }

    fn validate(&self, duration_years: u32) -> Result<(), ProjectionError> {
        if !self.periodic_amount.is_finite() || self.periodic_amount < 0.0 {
            return Err(ProjectionError::stream(&self.id, "periodic amount must be non-negative"));
        }
        if self.start_year < 1 || self.start_year > duration_years {
            return Err(ProjectionError::stream(
                &self.id,
                format!("start year {} outside 1..={}", self.start_year, duration_years),
            ));
        }
        if let Some(rate) = &self.own_rate {
            rate.validate()?;
        }
        Ok(())
    }
}

/// Opening lumpsum of a phase: rolled-over balance plus fresh money
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LumpsumComponent {
    /// Nominal final balance of the previous phase
    pub rollover_amount: f64,

    /// Fresh money at phase start. Negative values withdraw from the rollover.
    pub additional_amount: f64,

    /// Rate used for the stand-alone lumpsum value column
    pub rate: RateSpec,
}

impl LumpsumComponent {
    pub fn new(rollover_amount: f64, additional_amount: f64, rate: RateSpec) -> Self {
        Self {
            rollover_amount,
            additional_amount,
            rate,
        }
    }

    /// Rollover plus additional amount
    pub fn combined(&self) -> f64 {
        self.rollover_amount + self.additional_amount
    }

    fn validate(&self) -> Result<(), ProjectionError> {
        let invalid = ProjectionError::InvalidLumpsum {
            rollover: self.rollover_amount,
            additional: self.additional_amount,
        };
        if !self.combined().is_finite() || self.rollover_amount < 0.0 || self.combined() < 0.0 {
            return Err(invalid);
        }
        self.rate.validate()
    }
}

/// A separate one-time investment made at phase start
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LumpsumInvestment {
    pub id: String,
    pub amount: f64,
    pub rate: RateSpec,
}

impl LumpsumInvestment {
    pub fn new(id: impl Into<String>, amount: f64, rate: RateSpec) -> Self {
        Self {
            id: id.into(),
            amount,
            rate,
        }
    }

    fn validate(&self) -> Result<(), ProjectionError> {
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(ProjectionError::stream(&self.id, "lumpsum amount must be non-negative"));
        }
        self.rate.validate()
    }
}

/// Everything needed to project one phase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseConfig {
    /// Phase length in whole years
    pub duration_years: u32,

    /// Single blended growth rate of the pooled balance
    pub rate: RateSpec,

    pub lumpsum: LumpsumComponent,

    #[serde(default)]
    pub contributions: Vec<ContributionStream>,

    #[serde(default)]
    pub withdrawals: Vec<WithdrawalStream>,

    #[serde(default)]
    pub other_lumpsums: Vec<LumpsumInvestment>,

    /// Inflation rate (percent) for this phase's real values. `None` falls
    /// back to the projector's configured rate.
    #[serde(default)]
    pub inflation_rate_percent: Option<f64>,
}

impl PhaseConfig {
    /// Phase with no streams; the lumpsum grows at the phase rate
    pub fn new(duration_years: u32, rate: RateSpec) -> Self {
        Self {
            duration_years,
            rate,
            lumpsum: LumpsumComponent::new(0.0, 0.0, rate),
            contributions: Vec::new(),
            withdrawals: Vec::new(),
            other_lumpsums: Vec::new(),
            inflation_rate_percent: None,
        }
    }

    /// Use this inflation rate instead of the plan-wide one
    pub fn with_inflation(mut self, inflation_rate_percent: f64) -> Self {
        self.inflation_rate_percent = Some(inflation_rate_percent);
        self
    }

    /// The phase's own inflation rate, or `default` when it has none
    pub fn inflation_rate_or(&self, default: f64) -> f64 {
        self.inflation_rate_percent.unwrap_or(default)
    }

    pub fn with_additional_lumpsum(mut self, amount: f64) -> Self {
        self.lumpsum.additional_amount = amount;
        self
    }

    pub fn with_contribution(mut self, stream: ContributionStream) -> Self {
        self.contributions.push(stream);
        self
    }

    pub fn with_withdrawal(mut self, stream: WithdrawalStream) -> Self {
        self.withdrawals.push(stream);
        self
    }

    pub fn with_other_lumpsum(mut self, lumpsum: LumpsumInvestment) -> Self {
        self.other_lumpsums.push(lumpsum);
        self
    }

    /// Copy of this phase whose lumpsum carries the given rollover
    pub fn with_rollover(&self, rollover_amount: f64) -> Self {
        let mut config = self.clone();
        config.lumpsum.rollover_amount = rollover_amount;
        config
    }

    /// Copy of this phase with every rate switched to one convention
    pub fn with_convention(&self, convention: CompoundingConvention) -> Self {
        let mut config = self.clone();
        config.rate = config.rate.with_convention(convention);
        config.lumpsum.rate = config.lumpsum.rate.with_convention(convention);
        for stream in &mut config.contributions {
            stream.rate = stream.rate.with_convention(convention);
        }
        for stream in &mut config.withdrawals {
            stream.own_rate = stream.own_rate.map(|r| r.with_convention(convention));
        }
        for lumpsum in &mut config.other_lumpsums {
            lumpsum.rate = lumpsum.rate.with_convention(convention);
        }
        config
    }

    pub fn total_periods(&self) -> u32 {
        self.duration_years.saturating_mul(12)
    }

    /// Opening pooled balance: combined lumpsum plus all other lumpsums
    pub fn opening_balance(&self) -> f64 {
        self.lumpsum.combined() + self.other_lumpsums.iter().map(|l| l.amount).sum::<f64>()
    }

    /// Validate every input. Nothing is projected unless this passes.
    pub fn validate(&self) -> Result<(), ProjectionError> {
        self.validate_streams()?;
        self.lumpsum.validate()
    }

    /// Withdrawal streams carrying a rate other than the phase rate. The
    /// pooled balance ignores these rates.
    pub fn withdrawals_with_ignored_rate(&self) -> impl Iterator<Item = &WithdrawalStream> + '_ {
        self.withdrawals
            .iter()
            .filter(move |s| s.own_rate.is_some_and(|own| own != self.rate))
    }

    pub(crate) fn validate_duration(&self) -> Result<(), ProjectionError> {
        if self.duration_years < 1 || self.duration_years > MAX_DURATION_YEARS {
            return Err(ProjectionError::InvalidDuration {
                years: self.duration_years,
            });
        }
        Ok(())
    }

    /// Validation that does not depend on the rollover amount
    pub(crate) fn validate_streams(&self) -> Result<(), ProjectionError> {
        self.validate_duration()?;
        self.rate.validate()?;
        if let Some(rate) = self.inflation_rate_percent {
            ProjectionError::check_inflation(rate)?;
        }

        let total_periods = self.total_periods();
        for stream in &self.contributions {
            stream.validate(total_periods)?;
        }
        for stream in &self.withdrawals {
            stream.validate(self.duration_years)?;
        }
        for lumpsum in &self.other_lumpsums {
            lumpsum.validate()?;
        }
        Ok(())
    }
}
