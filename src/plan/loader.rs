//! Load multi-phase plans from JSON plan files
//!
//! Plan files hold rates as plain percentages. The compounding convention is
//! given once for the whole plan (or supplied by the caller) and applied to
//! every rate when the file is turned into `PhaseConfig` values.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use log::debug;
use serde::Deserialize;
use thiserror::Error;

use super::{ContributionStream, LumpsumInvestment, PhaseConfig, WithdrawalStream};
use crate::error::ProjectionError;
use crate::rates::{CompoundingConvention, RateSpec};

/// Errors raised while reading a plan file
#[derive(Debug, Error)]
pub enum PlanLoadError {
    #[error("failed to read plan file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed plan file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("plan file has no phases")]
    NoPhases,

    #[error("no compounding convention in plan file or on the command line")]
    MissingConvention,

    #[error("phase {phase}: {source}")]
    InvalidPhase {
        phase: usize,
        #[source]
        source: ProjectionError,
    },
}

/// A parsed plan: phases plus plan-level settings
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub convention: CompoundingConvention,
    pub inflation_rate_percent: f64,
    pub phases: Vec<PhaseConfig>,
}

/// Raw plan file matching the JSON layout
#[derive(Debug, Deserialize)]
struct RawPlan {
    #[serde(default)]
    convention: Option<CompoundingConvention>,
    #[serde(default)]
    inflation_rate_percent: f64,
    phases: Vec<RawPhase>,
}

#[derive(Debug, Deserialize)]
struct RawPhase {
    duration_years: u32,
    annual_rate_percent: f64,
    #[serde(default)]
    additional_lumpsum: f64,
    /// Defaults to the phase rate
    #[serde(default)]
    lumpsum_rate_percent: Option<f64>,
    #[serde(default)]
    sips: Vec<RawSip>,
    #[serde(default)]
    lumpsums: Vec<RawLumpsum>,
    #[serde(default)]
    swps: Vec<RawSwp>,
    /// Defaults to the plan's inflation rate
    #[serde(default)]
    inflation_rate_percent: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawSip {
    amount: f64,
    rate_percent: f64,
    #[serde(default)]
    step_up_percent: f64,
    #[serde(default = "default_start")]
    start_month: u32,
}

#[derive(Debug, Deserialize)]
struct RawLumpsum {
    amount: f64,
    rate_percent: f64,
}

#[derive(Debug, Deserialize)]
struct RawSwp {
    amount: f64,
    #[serde(default = "default_start")]
    start_year: u32,
    #[serde(default)]
    rate_percent: Option<f64>,
}

fn default_start() -> u32 {
    1
}

impl RawPhase {
    fn to_phase(self, convention: CompoundingConvention) -> PhaseConfig {
        let rate = RateSpec::new(self.annual_rate_percent, convention);
        let lumpsum_rate = self
            .lumpsum_rate_percent
            .map(|r| RateSpec::new(r, convention))
            .unwrap_or(rate);

        let mut phase = PhaseConfig::new(self.duration_years, rate)
            .with_additional_lumpsum(self.additional_lumpsum);
        phase.lumpsum.rate = lumpsum_rate;
        phase.inflation_rate_percent = self.inflation_rate_percent;

        for (i, sip) in self.sips.into_iter().enumerate() {
            phase = phase.with_contribution(
                ContributionStream::new(
                    format!("SIP {}", i + 1),
                    sip.amount,
                    RateSpec::new(sip.rate_percent, convention),
                )
                .with_step_up(sip.step_up_percent)
                .starting_at(sip.start_month),
            );
        }
        for (i, lumpsum) in self.lumpsums.into_iter().enumerate() {
            phase = phase.with_other_lumpsum(LumpsumInvestment::new(
                format!("Lumpsum {}", i + 1),
                lumpsum.amount,
                RateSpec::new(lumpsum.rate_percent, convention),
            ));
        }
        for (i, swp) in self.swps.into_iter().enumerate() {
            let mut stream = WithdrawalStream::new(format!("SWP {}", i + 1), swp.amount, swp.start_year);
            if let Some(r) = swp.rate_percent {
                stream = stream.with_own_rate(RateSpec::new(r, convention));
            }
            phase = phase.with_withdrawal(stream);
        }
        phase
    }
}

/// Parse a plan from any reader.
///
/// `convention_override` wins over the file's own `convention` field; one of
/// the two must be present.
pub fn load_plan_from_reader<R: Read>(
    reader: R,
    convention_override: Option<CompoundingConvention>,
) -> Result<Plan, PlanLoadError> {
    let raw: RawPlan = serde_json::from_reader(reader)?;
    if raw.phases.is_empty() {
        return Err(PlanLoadError::NoPhases);
    }
    let convention = convention_override
        .or(raw.convention)
        .ok_or(PlanLoadError::MissingConvention)?;

    let phases: Vec<PhaseConfig> = raw
        .phases
        .into_iter()
        .map(|p| p.to_phase(convention))
        .collect();

    // Rollover is only known once earlier phases run, so only stream-level
    // checks happen here.
    for (i, phase) in phases.iter().enumerate() {
        phase
            .validate_streams()
            .map_err(|source| PlanLoadError::InvalidPhase { phase: i + 1, source })?;
    }

    debug!(
        "loaded plan: {} phases, convention {}, inflation {}%",
        phases.len(),
        convention.label(),
        raw.inflation_rate_percent
    );

    Ok(Plan {
        convention,
        inflation_rate_percent: raw.inflation_rate_percent,
        phases,
    })
}

/// Load a plan from a JSON file
pub fn load_plan(
    path: &Path,
    convention_override: Option<CompoundingConvention>,
) -> Result<Plan, PlanLoadError> {
    let file = File::open(path)?;
    load_plan_from_reader(BufReader::new(file), convention_override)
}
