//! Run one plan file under both compounding conventions
//!
//! Usage: cargo run --bin compare_conventions -- <plan.json> [inflation%]

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use portfolio_projection::chain::compare_conventions;
use portfolio_projection::plan::load_plan;
use portfolio_projection::{CompoundingConvention, ProjectionConfig};

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next().map(PathBuf::from) else {
        bail!("usage: compare_conventions <plan.json> [inflation%]");
    };

    // Convention is rewritten per run; the file's own value is irrelevant
    let plan = load_plan(&path, Some(CompoundingConvention::NominalMonthly))
        .with_context(|| format!("loading plan {}", path.display()))?;
    let inflation = match args.next() {
        Some(raw) => raw.parse::<f64>().with_context(|| format!("invalid inflation rate '{raw}'"))?,
        None => plan.inflation_rate_percent,
    };

    let comparison = compare_conventions(&plan.phases, ProjectionConfig::with_inflation(inflation))?;

    println!("{:<18} {:>6} {:>18} {:>18} {:>16}",
        "Convention", "Phase", "Nominal Final", "Real Final", "Withdrawn");
    println!("{}", "-".repeat(80));
    for (convention, state) in &comparison.runs {
        for (i, phase) in state.results.iter().enumerate() {
            println!("{:<18} {:>6} {:>18.2} {:>18.2} {:>16.2}",
                convention.label(),
                i + 1,
                phase.nominal_final,
                phase.real_final,
                phase.total_withdrawn,
            );
        }
    }

    if let [(_, nominal), (_, effective)] = comparison.runs.as_slice() {
        let gap = nominal.rollover_nominal - effective.rollover_nominal;
        println!("\nFinal balance gap (nominal - effective): {:.2}", gap);
    }

    Ok(())
}
