//! Portfolio Projection CLI
//!
//! Runs a multi-phase plan file and prints the year-by-year ledger

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use portfolio_projection::chain::run_plan;
use portfolio_projection::plan::load_plan;
use portfolio_projection::projection::write_ledger_csv;
use portfolio_projection::{CompoundingConvention, ProjectionConfig};

/// Compounding convention as given on the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ConventionArg {
    NominalMonthly,
    EffectiveMonthly,
}

impl From<ConventionArg> for CompoundingConvention {
    fn from(arg: ConventionArg) -> Self {
        match arg {
            ConventionArg::NominalMonthly => CompoundingConvention::NominalMonthly,
            ConventionArg::EffectiveMonthly => CompoundingConvention::EffectiveMonthly,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "portfolio_projection", version, about = "Project a multi-phase SIP/lumpsum/SWP plan")]
struct Args {
    /// JSON plan file
    #[arg(short, long)]
    plan: PathBuf,

    /// Override the plan file's compounding convention
    #[arg(short, long, value_enum)]
    convention: Option<ConventionArg>,

    /// Override the plan file's annual inflation rate (percent). Phases with
    /// their own rate keep it.
    #[arg(short, long)]
    inflation: Option<f64>,

    /// Write the full ledger to this CSV file
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let plan = load_plan(&args.plan, args.convention.map(Into::into))
        .with_context(|| format!("loading plan {}", args.plan.display()))?;
    let inflation = args.inflation.unwrap_or(plan.inflation_rate_percent);

    println!("Portfolio Projection v{}", env!("CARGO_PKG_VERSION"));
    println!("==========================\n");
    println!("Plan: {} phases, {} compounding, {:.2}% inflation\n",
        plan.phases.len(), plan.convention.label(), inflation);

    let state = run_plan(&plan.phases, ProjectionConfig::with_inflation(inflation))
        .context("projecting plan")?;

    for (i, phase) in state.results.iter().enumerate() {
        println!("Phase {} (years {}-{}), rollover in: {:.2}, inflation {:.2}%",
            i + 1,
            phase.start_cumulative_year + 1,
            phase.end_cumulative_year(),
            phase.rollover_amount,
            phase.inflation_rate_percent,
        );
        println!("{:>4} {:>5} {:>16} {:>16} {:>16} {:>16}",
            "Year", "Cum", "Invested", "Withdrawn", "Nominal", "Real");
        println!("{}", "-".repeat(78));
        for row in &phase.rows {
            println!("{:>4} {:>5} {:>16.2} {:>16.2} {:>16.2} {:>16.2}",
                row.year,
                row.cumulative_year,
                row.total_invested,
                row.total_withdrawn,
                row.nominal_value,
                row.real_value,
            );
        }
        println!("  Net benefit: {:.2}\n", phase.net_benefit);
    }

    let summary = state.summary();
    println!("Summary:");
    println!("  Phases: {}", summary.phases);
    println!("  Total Years: {}", summary.total_years);
    println!("  Fresh Money Invested: {:.2}", summary.fresh_invested);
    println!("  Total Withdrawn: {:.2}", summary.total_withdrawn);
    println!("  Final Value (nominal): {:.2}", summary.final_nominal);
    println!("  Final Value (real): {:.2}", summary.final_real);
    println!("  Net Benefit: {:.2}", summary.net_benefit);

    if let Some(path) = &args.output {
        let file = File::create(path)
            .with_context(|| format!("creating {}", path.display()))?;
        write_ledger_csv(BufWriter::new(file), &state.results)
            .with_context(|| format!("writing ledger to {}", path.display()))?;
        println!("\nFull ledger written to: {}", path.display());
    }

    Ok(())
}
