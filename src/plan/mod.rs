//! Plan inputs and plan file loading

mod data;
pub mod loader;

pub use data::{
    ContributionStream, LumpsumComponent, LumpsumInvestment, PhaseConfig, WithdrawalStream,
    MAX_DURATION_YEARS,
};
pub use loader::{load_plan, load_plan_from_reader, Plan, PlanLoadError};
