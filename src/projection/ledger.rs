//! Ledger output structures for phase projections

use std::io::Write;

use serde::{Deserialize, Serialize};

/// Per-stream year-end figures for a contribution or lumpsum stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamSnapshot {
    pub id: String,

    /// Money put in by this stream so far
    pub invested_to_date: f64,

    /// Informational: what the stream alone would be worth at its own rate.
    /// Not drawn from the pooled balance and never summed back into it.
    pub standalone_value: f64,
}

/// Per-stream year-end figures for a withdrawal stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithdrawalSnapshot {
    pub id: String,
    pub withdrawn_to_date: f64,
}

/// A single year-end row of a phase ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearRow {
    /// Phase-local year (1-indexed)
    pub year: u32,

    /// Years since the start of the whole plan
    pub cumulative_year: u32,

    pub contributions: Vec<StreamSnapshot>,
    pub lumpsums: Vec<StreamSnapshot>,
    pub withdrawals: Vec<WithdrawalSnapshot>,

    /// Opening lumpsums plus contributions to date
    pub total_invested: f64,
    pub total_withdrawn: f64,

    /// Pooled balance at year end
    pub nominal_value: f64,

    /// Nominal value deflated by `cumulative_year` years of inflation
    pub real_value: f64,
}

impl YearRow {
    /// Nominal value plus withdrawals minus everything invested
    pub fn net_returns(&self) -> f64 {
        self.nominal_value + self.total_withdrawn - self.total_invested
    }

    pub fn contributions_invested(&self) -> f64 {
        self.contributions.iter().map(|s| s.invested_to_date).sum()
    }

    /// Informational sum of stand-alone contribution values
    pub fn contributions_standalone_value(&self) -> f64 {
        self.contributions.iter().map(|s| s.standalone_value).sum()
    }

    /// Informational sum of stand-alone lumpsum values
    pub fn lumpsums_standalone_value(&self) -> f64 {
        self.lumpsums.iter().map(|s| s.standalone_value).sum()
    }
}

/// Complete result of projecting one phase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseResult {
    /// Year-end rows, one per phase year
    pub rows: Vec<YearRow>,

    pub duration_years: u32,

    /// Years elapsed in the plan before this phase began
    pub start_cumulative_year: u32,

    /// Balance carried in from the previous phase
    pub rollover_amount: f64,

    /// Pooled balance before the first month
    pub opening_balance: f64,

    pub total_invested: f64,
    pub total_withdrawn: f64,
    pub nominal_final: f64,
    pub real_final: f64,

    /// Inflation rate (percent) the real values were deflated at
    pub inflation_rate_percent: f64,

    /// `nominal_final + total_withdrawn - total_invested`
    pub net_benefit: f64,
}

impl PhaseResult {
    /// Cumulative year at the end of the phase
    pub fn end_cumulative_year(&self) -> u32 {
        self.start_cumulative_year + self.duration_years
    }

    /// Money invested during the phase, excluding the rollover
    pub fn fresh_invested(&self) -> f64 {
        self.total_invested - self.rollover_amount
    }
}

/// Flattened CSV row for ledger export
#[derive(Debug, Serialize)]
struct LedgerCsvRow {
    phase: usize,
    year: u32,
    cumulative_year: u32,
    total_invested: f64,
    total_withdrawn: f64,
    nominal_value: f64,
    real_value: f64,
    net_returns: f64,
    sip_invested: f64,
    sip_standalone_value: f64,
    lumpsum_standalone_value: f64,
}

/// Write every phase's year rows as one CSV table
pub fn write_ledger_csv<W: Write>(writer: W, phases: &[PhaseResult]) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for (i, phase) in phases.iter().enumerate() {
        for row in &phase.rows {
            csv_writer.serialize(LedgerCsvRow {
                phase: i + 1,
                year: row.year,
                cumulative_year: row.cumulative_year,
                total_invested: row.total_invested,
                total_withdrawn: row.total_withdrawn,
                nominal_value: row.nominal_value,
                real_value: row.real_value,
                net_returns: row.net_returns(),
                sip_invested: row.contributions_invested(),
                sip_standalone_value: row.contributions_standalone_value(),
                lumpsum_standalone_value: row.lumpsums_standalone_value(),
            })?;
        }
    }
    csv_writer.flush()?;
    Ok(())
}
