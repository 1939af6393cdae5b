//! Portfolio Projection - multi-phase SIP, lumpsum and SWP projection engine
//!
//! This library provides:
//! - Monthly compounding under an explicit convention (nominal or effective monthly)
//! - Pooled phase ledgers combining contribution streams, lumpsums and withdrawals
//! - Annual contribution step-ups
//! - Multi-phase plans with nominal rollover between phases
//! - Inflation-adjusted (real) reporting over the whole plan timeline

pub mod error;
pub mod rates;
pub mod plan;
pub mod projection;
pub mod chain;

// Re-export commonly used types
pub use error::ProjectionError;
pub use rates::{CompoundingConvention, RateSpec};
pub use plan::{ContributionStream, LumpsumComponent, LumpsumInvestment, PhaseConfig, WithdrawalStream};
pub use projection::{apply_inflation, project_phase, PhaseResult, PortfolioProjector, ProjectionConfig, YearRow};
pub use chain::{chain_phases, run_plan, PhaseChain, PlanState, PlanSummary};
