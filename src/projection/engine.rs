//! Phase projector: one pooled ledger run per phase

use log::{debug, info, warn};

use crate::error::ProjectionError;
use crate::plan::PhaseConfig;
use super::breakdown::{StandaloneBreakdown, COMBINED_LUMPSUM_ID};
use super::inflation::apply_inflation;
use super::ledger::{PhaseResult, StreamSnapshot, WithdrawalSnapshot, YearRow};
use super::state::{LedgerAccumulator, LedgerSnapshot};

/// Configuration for a projection run
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionConfig {
    /// Annual inflation rate (percent) used for real values when a phase has
    /// no rate of its own. Zero or below reports real values equal to nominal.
    pub inflation_rate_percent: f64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            inflation_rate_percent: 0.0,
        }
    }
}

impl ProjectionConfig {
    pub fn with_inflation(inflation_rate_percent: f64) -> Self {
        Self {
            inflation_rate_percent,
        }
    }
}

/// Projects single phases. Holds no state between calls.
#[derive(Debug, Clone, Default)]
pub struct PortfolioProjector {
    config: ProjectionConfig,
}

impl PortfolioProjector {
    pub fn new(config: ProjectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Project one phase.
    ///
    /// `phase_start_cumulative_year` is the number of plan years elapsed before
    /// this phase; it only affects the real-value columns. Those use the
    /// phase's own inflation rate if it has one.
    pub fn project_phase(
        &self,
        phase: &PhaseConfig,
        phase_start_cumulative_year: u32,
    ) -> Result<PhaseResult, ProjectionError> {
        phase.validate()?;
        let inflation_rate_percent = phase.inflation_rate_or(self.config.inflation_rate_percent);
        ProjectionError::check_inflation(inflation_rate_percent)?;

        for stream in phase.withdrawals_with_ignored_rate() {
            warn!(
                "withdrawal stream '{}' has its own rate {}%; withdrawals draw from the pooled balance at {}%",
                stream.id,
                stream.own_rate.map_or(0.0, |r| r.annual_rate_percent),
                phase.rate.annual_rate_percent
            );
        }

        let growth = phase.rate.monthly_growth_factor()?;
        let opening_balance = phase.opening_balance();
        debug!(
            "projecting {} years from cumulative year {}: opening {:.2}, g = {:.10} ({})",
            phase.duration_years,
            phase_start_cumulative_year,
            opening_balance,
            growth,
            phase.rate.convention.label()
        );

        let mut ledger =
            LedgerAccumulator::new(opening_balance, growth, &phase.contributions, &phase.withdrawals);
        let snapshots = ledger.run_years(phase.duration_years);
        let breakdown = StandaloneBreakdown::compute(phase)?;

        let nominal: Vec<f64> = snapshots.iter().map(|s| s.balance).collect();
        let cumulative_years: Vec<u32> = snapshots
            .iter()
            .map(|s| phase_start_cumulative_year + s.year)
            .collect();
        let real = apply_inflation(&nominal, inflation_rate_percent, &cumulative_years)?;

        let rows: Vec<YearRow> = snapshots
            .iter()
            .zip(real)
            .map(|(snapshot, real_value)| {
                build_row(phase, snapshot, &breakdown, opening_balance, phase_start_cumulative_year, real_value)
            })
            .collect();

        let last = rows.last().ok_or(ProjectionError::InvalidDuration {
            years: phase.duration_years,
        })?;
        let total_invested = last.total_invested;
        let total_withdrawn = last.total_withdrawn;
        let nominal_final = last.nominal_value;
        let real_final = last.real_value;

        info!(
            "phase over cumulative years {}..{}: invested {:.2}, withdrawn {:.2}, final {:.2} (real {:.2} at {}% inflation)",
            phase_start_cumulative_year,
            phase_start_cumulative_year + phase.duration_years,
            total_invested,
            total_withdrawn,
            nominal_final,
            real_final,
            inflation_rate_percent
        );

        Ok(PhaseResult {
            rows,
            duration_years: phase.duration_years,
            start_cumulative_year: phase_start_cumulative_year,
            rollover_amount: phase.lumpsum.rollover_amount,
            opening_balance,
            total_invested,
            total_withdrawn,
            nominal_final,
            real_final,
            inflation_rate_percent,
            net_benefit: nominal_final + total_withdrawn - total_invested,
        })
    }
}

fn build_row(
    phase: &PhaseConfig,
    snapshot: &LedgerSnapshot,
    breakdown: &StandaloneBreakdown,
    opening_balance: f64,
    phase_start_cumulative_year: u32,
    real_value: f64,
) -> YearRow {
    let year_idx = (snapshot.year - 1) as usize;

    let contributions = phase
        .contributions
        .iter()
        .zip(&snapshot.contributions_invested)
        .zip(&breakdown.contributions)
        .map(|((stream, &invested), values)| StreamSnapshot {
            id: stream.id.clone(),
            invested_to_date: invested,
            standalone_value: values[year_idx],
        })
        .collect();

    let lumpsum_ids = std::iter::once((COMBINED_LUMPSUM_ID.to_string(), phase.lumpsum.combined()))
        .chain(phase.other_lumpsums.iter().map(|l| (l.id.clone(), l.amount)));
    let lumpsums = lumpsum_ids
        .zip(&breakdown.lumpsums)
        .map(|((id, amount), values)| StreamSnapshot {
            id,
            invested_to_date: amount,
            standalone_value: values[year_idx],
        })
        .collect();

    let withdrawals = phase
        .withdrawals
        .iter()
        .zip(&snapshot.withdrawals_paid)
        .map(|(stream, &paid)| WithdrawalSnapshot {
            id: stream.id.clone(),
            withdrawn_to_date: paid,
        })
        .collect();

    YearRow {
        year: snapshot.year,
        cumulative_year: phase_start_cumulative_year + snapshot.year,
        contributions,
        lumpsums,
        withdrawals,
        total_invested: opening_balance + snapshot.contributed_total,
        total_withdrawn: snapshot.withdrawn_total,
        nominal_value: snapshot.balance,
        real_value,
    }
}

/// Project a single phase with a one-off projector
pub fn project_phase(
    phase: &PhaseConfig,
    phase_start_cumulative_year: u32,
    inflation_rate_percent: f64,
) -> Result<PhaseResult, ProjectionError> {
    PortfolioProjector::new(ProjectionConfig::with_inflation(inflation_rate_percent))
        .project_phase(phase, phase_start_cumulative_year)
}
