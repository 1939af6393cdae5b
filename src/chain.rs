//! Multi-phase plans: rollover of nominal balances between phases
//!
//! Phases run strictly in order. Each phase starts from the previous phase's
//! nominal final balance and from the plan's elapsed years, so that real
//! values in later phases are deflated over the whole plan timeline.
//!
//! # Example
//! ```ignore
//! let mut chain = PhaseChain::new(ProjectionConfig::with_inflation(6.0));
//! chain.push_phase(&accumulation)?;
//! chain.push_phase(&retirement)?;
//! let summary = chain.state().summary();
//! ```

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::ProjectionError;
use crate::plan::PhaseConfig;
use crate::projection::{PhaseResult, PortfolioProjector, ProjectionConfig};
use crate::rates::CompoundingConvention;

/// Running state of a multi-phase plan
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanState {
    /// Completed phases in order
    pub results: Vec<PhaseResult>,

    /// Nominal final balance of the last completed phase
    pub rollover_nominal: f64,

    /// Sum of durations of completed phases
    pub cumulative_years: u32,
}

impl PlanState {
    pub fn summary(&self) -> PlanSummary {
        let final_nominal = self.results.last().map(|r| r.nominal_final).unwrap_or(0.0);
        let final_real = self.results.last().map(|r| r.real_final).unwrap_or(0.0);
        let total_withdrawn: f64 = self.results.iter().map(|r| r.total_withdrawn).sum();
        let fresh_invested: f64 = self.results.iter().map(PhaseResult::fresh_invested).sum();

        PlanSummary {
            phases: self.results.len(),
            total_years: self.cumulative_years,
            final_nominal,
            final_real,
            total_withdrawn,
            fresh_invested,
            net_benefit: final_nominal + total_withdrawn - fresh_invested,
        }
    }
}

/// Whole-plan figures across all phases
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub phases: usize,
    pub total_years: u32,
    pub final_nominal: f64,
    pub final_real: f64,
    pub total_withdrawn: f64,

    /// Money put in across all phases, not counting rollovers
    pub fresh_invested: f64,

    pub net_benefit: f64,
}

/// Sequential phase runner
#[derive(Debug, Clone)]
pub struct PhaseChain {
    projector: PortfolioProjector,
    state: PlanState,
}

impl PhaseChain {
    pub fn new(config: ProjectionConfig) -> Self {
        Self {
            projector: PortfolioProjector::new(config),
            state: PlanState::default(),
        }
    }

    /// Run the next phase on top of everything so far.
    ///
    /// The phase's own rollover amount is replaced by the running nominal
    /// rollover. On error the chain state is left untouched.
    pub fn push_phase(&mut self, phase: &PhaseConfig) -> Result<&PhaseResult, ProjectionError> {
        let phase = phase.with_rollover(self.state.rollover_nominal);
        let result = self
            .projector
            .project_phase(&phase, self.state.cumulative_years)?;

        self.state.rollover_nominal = result.nominal_final;
        self.state.cumulative_years += result.duration_years;
        info!(
            "phase {} complete: rolling over {:.2} after {} cumulative years",
            self.state.results.len() + 1,
            self.state.rollover_nominal,
            self.state.cumulative_years
        );
        self.state.results.push(result);

        let last = self.state.results.len() - 1;
        Ok(&self.state.results[last])
    }

    pub fn state(&self) -> &PlanState {
        &self.state
    }

    pub fn into_state(self) -> PlanState {
        self.state
    }
}

/// Run all phases in order with nominal rollover between them.
///
/// Stream-level checks for every phase, and the plan-wide inflation rate, are
/// checked before the first phase is projected, so bad input fails without any
/// projection work.
pub fn chain_phases(
    phases: &[PhaseConfig],
    inflation_rate_percent: f64,
) -> Result<Vec<PhaseResult>, ProjectionError> {
    Ok(run_plan(phases, ProjectionConfig::with_inflation(inflation_rate_percent))?.results)
}

/// Like `chain_phases` but returns the full plan state
pub fn run_plan(phases: &[PhaseConfig], config: ProjectionConfig) -> Result<PlanState, ProjectionError> {
    ProjectionError::check_inflation(config.inflation_rate_percent)?;
    for phase in phases {
        phase.validate_streams()?;
    }

    let mut chain = PhaseChain::new(config);
    for phase in phases {
        chain.push_phase(phase)?;
    }
    Ok(chain.into_state())
}

/// The same plan under each compounding convention
#[derive(Debug, Clone, PartialEq)]
pub struct ConventionComparison {
    pub runs: Vec<(CompoundingConvention, PlanState)>,
}

/// Run a plan once per compounding convention, rewriting every rate
pub fn compare_conventions(
    phases: &[PhaseConfig],
    config: ProjectionConfig,
) -> Result<ConventionComparison, ProjectionError> {
    let runs = CompoundingConvention::ALL
        .iter()
        .map(|&convention| {
            let converted: Vec<PhaseConfig> =
                phases.iter().map(|p| p.with_convention(convention)).collect();
            run_plan(&converted, config.clone()).map(|state| (convention, state))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ConventionComparison { runs })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{ContributionStream, WithdrawalStream};
    use crate::projection::inflation::deflate;
    use crate::rates::RateSpec;
    use approx::assert_relative_eq;

    fn lumpsum_phase(years: u32, additional: f64) -> PhaseConfig {
        PhaseConfig::new(years, RateSpec::effective_monthly(12.0)).with_additional_lumpsum(additional)
    }

    #[test]
    fn test_two_phase_cumulative_inflation_regression() {
        let phases = [lumpsum_phase(10, 1_000_000.0), lumpsum_phase(10, 0.0)];
        let results = chain_phases(&phases, 6.0).unwrap();

        assert_relative_eq!(results[0].nominal_final, 3_105_848.21, max_relative = 1e-8);
        assert_relative_eq!(results[0].real_final, 1_734_289.42, max_relative = 1e-6);
        assert_relative_eq!(results[1].nominal_final, 9_646_293.09, max_relative = 1e-8);
        assert_relative_eq!(results[1].real_final, 3_007_759.78, max_relative = 1e-6);

        // Deflating phase 2 by its own 10 years is the rejected result
        let phase_local = deflate(results[1].nominal_final, 6.0, 10);
        assert!((results[1].real_final - phase_local).abs() > 1_000_000.0);
        assert_eq!(results[1].rows[0].cumulative_year, 11);
        assert_eq!(results[1].rows[9].cumulative_year, 20);
    }

    #[test]
    fn test_phase_inflation_over_cumulative_years() {
        let phases = [lumpsum_phase(10, 1_000_000.0), lumpsum_phase(10, 0.0).with_inflation(4.0)];
        let results = chain_phases(&phases, 6.0).unwrap();

        assert_eq!(results[0].inflation_rate_percent, 6.0);
        assert_relative_eq!(results[0].real_final, 1_734_289.42, max_relative = 1e-6);

        // Phase 2 deflates at its own 4%, still over cumulative years 11..=20
        assert_eq!(results[1].inflation_rate_percent, 4.0);
        assert_relative_eq!(results[1].real_final, 4_402_442.25, max_relative = 1e-6);
        for row in &results[1].rows {
            assert_eq!(row.cumulative_year, 10 + row.year);
            assert_relative_eq!(row.real_value, deflate(row.nominal_value, 4.0, 10 + row.year), max_relative = 1e-12);
        }
        assert!((results[1].real_final - deflate(results[1].nominal_final, 4.0, 10)).abs() > 1_000_000.0);
    }

    #[test]
    fn test_non_finite_inflation_rejected() {
        for rate in [f64::NAN, f64::INFINITY] {
            let err = chain_phases(&[lumpsum_phase(2, 1_000.0)], rate).unwrap_err();
            assert!(matches!(err, ProjectionError::InvalidInflation { .. }));
        }

        // A bad late phase rate fails before anything is projected
        let phases = [lumpsum_phase(2, 1_000.0), lumpsum_phase(2, 0.0).with_inflation(f64::NAN)];
        assert!(matches!(
            run_plan(&phases, ProjectionConfig::with_inflation(6.0)),
            Err(ProjectionError::InvalidInflation { .. })
        ));
    }

    #[test]
    fn test_rollover_equals_previous_nominal_final() {
        let phases = [
            PhaseConfig::new(5, RateSpec::nominal_monthly(12.0)).with_contribution(
                ContributionStream::new("SIP 1", 10_000.0, RateSpec::nominal_monthly(15.0)).with_step_up(10.0),
            ),
            PhaseConfig::new(3, RateSpec::nominal_monthly(8.0)).with_additional_lumpsum(250_000.0),
            PhaseConfig::new(15, RateSpec::nominal_monthly(7.0))
                .with_withdrawal(WithdrawalStream::new("SWP 1", 20_000.0, 1)),
        ];
        let state = run_plan(&phases, ProjectionConfig::with_inflation(6.0)).unwrap();

        assert_eq!(state.results.len(), 3);
        assert_eq!(state.results[0].rollover_amount, 0.0);
        for pair in state.results.windows(2) {
            assert_eq!(pair[1].rollover_amount, pair[0].nominal_final);
            assert_eq!(pair[1].start_cumulative_year, pair[0].end_cumulative_year());
        }
        assert_eq!(state.cumulative_years, 23);
        assert_eq!(state.rollover_nominal, state.results[2].nominal_final);
    }

    #[test]
    fn test_chain_matches_manual_projection() {
        let phases = [lumpsum_phase(4, 10_000.0), lumpsum_phase(6, 500.0)];
        let mut chain = PhaseChain::new(ProjectionConfig::with_inflation(3.0));
        let first = chain.push_phase(&phases[0]).unwrap().clone();
        let second = chain.push_phase(&phases[1]).unwrap().clone();

        let manual = crate::projection::project_phase(&phases[1].with_rollover(first.nominal_final), 4, 3.0)
            .unwrap();
        assert_eq!(second, manual);
    }

    #[test]
    fn test_failed_phase_leaves_state_untouched() {
        let mut chain = PhaseChain::new(ProjectionConfig::default());
        chain.push_phase(&lumpsum_phase(2, 1_000.0)).unwrap();
        let before = chain.state().clone();

        // Withdrawing more than the rollover at phase start is invalid
        let err = chain.push_phase(&lumpsum_phase(2, -1_000_000.0)).unwrap_err();
        assert!(matches!(err, ProjectionError::InvalidLumpsum { .. }));
        assert_eq!(chain.state(), &before);
    }

    #[test]
    fn test_negative_additional_drawn_from_rollover() {
        let phases = [lumpsum_phase(1, 1_000.0), lumpsum_phase(1, -500.0)];
        let results = chain_phases(&phases, 0.0).unwrap();
        assert_relative_eq!(results[1].opening_balance, 1_120.0 - 500.0, max_relative = 1e-12);
    }

    #[test]
    fn test_invalid_late_phase_fails_up_front() {
        let phases = [lumpsum_phase(2, 1_000.0), PhaseConfig::new(0, RateSpec::nominal_monthly(5.0))];
        assert_eq!(
            chain_phases(&phases, 0.0).unwrap_err(),
            ProjectionError::InvalidDuration { years: 0 }
        );
    }

    #[test]
    fn test_plan_summary() {
        let phases = [
            lumpsum_phase(2, 1_000.0),
            lumpsum_phase(3, 500.0).with_withdrawal(WithdrawalStream::new("SWP 1", 10.0, 1)),
        ];
        let state = run_plan(&phases, ProjectionConfig::with_inflation(4.0)).unwrap();
        let summary = state.summary();
        assert_eq!(summary.phases, 2);
        assert_eq!(summary.total_years, 5);
        assert_relative_eq!(summary.fresh_invested, 1_500.0, epsilon = 1e-9);
        assert_relative_eq!(summary.total_withdrawn, 360.0, epsilon = 1e-9);
        assert_relative_eq!(summary.final_real, deflate(summary.final_nominal, 4.0, 5), max_relative = 1e-12);
    }

    #[test]
    fn test_compare_conventions() {
        let phases = [PhaseConfig::new(10, RateSpec::nominal_monthly(12.0)).with_additional_lumpsum(1_000.0)];
        let comparison = compare_conventions(&phases, ProjectionConfig::default()).unwrap();
        assert_eq!(comparison.runs.len(), 2);

        let (nominal_convention, nominal) = &comparison.runs[0];
        let (effective_convention, effective) = &comparison.runs[1];
        assert_eq!(*nominal_convention, CompoundingConvention::NominalMonthly);
        assert_eq!(*effective_convention, CompoundingConvention::EffectiveMonthly);
        assert_relative_eq!(effective.rollover_nominal, 1_000.0 * 1.12_f64.powi(10), max_relative = 1e-10);
        assert!(nominal.rollover_nominal > effective.rollover_nominal);
    }
}
