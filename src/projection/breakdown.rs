//! Stand-alone per-stream values for display columns
//!
//! Each contribution stream and each lumpsum is compounded on its own, at its
//! own rate, as if it were the only money in the phase. The results are a
//! display approximation only. The pooled ledger balance is authoritative and
//! none of these values feed back into it.

use crate::error::ProjectionError;
use crate::plan::PhaseConfig;
use super::schedule::ContributionSchedule;

/// Identifier used for the rollover + additional lumpsum column
pub const COMBINED_LUMPSUM_ID: &str = "Rollover + Additional";

/// Year-end stand-alone values, indexed `[stream][year - 1]`
#[derive(Debug, Clone, PartialEq)]
pub struct StandaloneBreakdown {
    pub contributions: Vec<Vec<f64>>,

    /// Combined lumpsum first, then other lumpsums in input order
    pub lumpsums: Vec<Vec<f64>>,
}

impl StandaloneBreakdown {
    /// Compute every stand-alone column for a validated phase
    pub fn compute(config: &PhaseConfig) -> Result<Self, ProjectionError> {
        config.validate_duration()?;
        let years = config.duration_years;

        let mut contributions = Vec::with_capacity(config.contributions.len());
        for stream in &config.contributions {
            let growth = stream.rate.monthly_growth_factor()?;
            let mut schedule = ContributionSchedule::from_stream(stream);
            let mut value = 0.0;
            let mut yearly = Vec::with_capacity(years as usize);
            for month in 1..=config.total_periods() {
                value = (value + schedule.contribute(month)) * growth;
                if month % 12 == 0 {
                    schedule.step_up();
                    yearly.push(value);
                }
            }
            contributions.push(yearly);
        }

        let mut lumpsums = Vec::with_capacity(config.other_lumpsums.len() + 1);
        let combined_growth = config.lumpsum.rate.monthly_growth_factor()?;
        lumpsums.push(lumpsum_path(config.lumpsum.combined(), combined_growth, years));
        for lumpsum in &config.other_lumpsums {
            let growth = lumpsum.rate.monthly_growth_factor()?;
            lumpsums.push(lumpsum_path(lumpsum.amount, growth, years));
        }

        Ok(Self {
            contributions,
            lumpsums,
        })
    }
}

fn lumpsum_path(principal: f64, monthly_growth: f64, years: u32) -> Vec<f64> {
    (1..=years)
        .map(|year| principal * monthly_growth.powf(f64::from(year * 12)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{ContributionStream, LumpsumInvestment};
    use crate::rates::RateSpec;
    use approx::assert_relative_eq;

    #[test]
    fn test_streams_use_own_rates() {
        let config = PhaseConfig::new(2, RateSpec::effective_monthly(10.0))
            .with_additional_lumpsum(1_000.0)
            .with_other_lumpsum(LumpsumInvestment::new("Lumpsum 1", 500.0, RateSpec::effective_monthly(20.0)))
            .with_contribution(ContributionStream::new("SIP 1", 100.0, RateSpec::effective_monthly(0.0)));

        let breakdown = StandaloneBreakdown::compute(&config).unwrap();

        // Zero-rate SIP is just the sum of contributions
        assert_relative_eq!(breakdown.contributions[0][1], 2_400.0, epsilon = 1e-9);
        // Combined lumpsum follows the lumpsum rate (phase rate here)
        assert_relative_eq!(breakdown.lumpsums[0][1], 1_000.0 * 1.1 * 1.1, max_relative = 1e-12);
        assert_relative_eq!(breakdown.lumpsums[1][0], 600.0, max_relative = 1e-12);
    }

    #[test]
    fn test_oversized_duration_rejected() {
        let config = PhaseConfig::new(u32::MAX, RateSpec::nominal_monthly(8.0)).with_additional_lumpsum(1.0);
        assert_eq!(
            StandaloneBreakdown::compute(&config).unwrap_err(),
            ProjectionError::InvalidDuration { years: u32::MAX }
        );
    }

    #[test]
    fn test_one_value_per_year() {
        let config = PhaseConfig::new(7, RateSpec::nominal_monthly(8.0))
            .with_contribution(ContributionStream::new("SIP 1", 100.0, RateSpec::nominal_monthly(8.0)));
        let breakdown = StandaloneBreakdown::compute(&config).unwrap();
        assert_eq!(breakdown.contributions[0].len(), 7);
        assert_eq!(breakdown.lumpsums.len(), 1);
        assert_eq!(breakdown.lumpsums[0], vec![0.0; 7]);
    }
}
