//! Projection engine for single phases
//!
//! A phase is projected month by month on one pooled balance. The ledger is
//! authoritative; per-stream stand-alone values are computed alongside it for
//! display only.

mod state;
mod schedule;
mod engine;
mod ledger;
mod breakdown;
pub mod inflation;

pub use state::{LedgerAccumulator, LedgerSnapshot};
pub use schedule::ContributionSchedule;
pub use engine::{project_phase, PortfolioProjector, ProjectionConfig};
pub use ledger::{write_ledger_csv, PhaseResult, StreamSnapshot, WithdrawalSnapshot, YearRow};
pub use breakdown::{StandaloneBreakdown, COMBINED_LUMPSUM_ID};
pub use inflation::{apply_inflation, deflate};
