//! Compare command implementation
//!
//! Runs every method of a category on one problem and prints the ranked
//! report.

use clap::Subcommand;
use numeric_core::compare::ComparisonReport;
use tracing::info;

use super::interpolate::InterpolationArgs;
use super::linear::LinearArgs;
use super::root::RootArgs;
use super::{engine, within_deadline};
use crate::config::CliConfig;
use crate::output::render_report;
use crate::Result;

/// Problem category to compare
#[derive(Debug, Clone, Subcommand)]
pub enum CompareTarget {
    /// All six root finders
    Root(RootArgs),
    /// Jacobi, Gauss-Seidel and SOR
    Linear(LinearArgs),
    /// All five interpolators
    Interpolation(InterpolationArgs),
}

/// Build the report without printing it
pub fn report(config: &CliConfig, target: &CompareTarget) -> Result<ComparisonReport> {
    let convergence = config.convergence()?;
    let engine = engine(config);

    match target {
        CompareTarget::Root(args) => {
            let inputs = args.inputs()?;
            let function = args.function.clone();
            within_deadline(config, move || engine.compare_root(&function, &inputs, &convergence))
        }
        CompareTarget::Linear(args) => {
            let inputs = args.inputs()?;
            within_deadline(config, move || {
                engine.compare_linear_system(
                    inputs.matrix,
                    inputs.vector,
                    inputs.relaxation,
                    inputs.initial_guess,
                    &convergence,
                )
            })
        }
        CompareTarget::Interpolation(args) => {
            let points = args.points()?;
            let options = args.options(config)?;
            within_deadline(config, move || engine.compare_interpolation(points, &options))
        }
    }
}

/// Run the compare command
pub fn run(config: &CliConfig, target: &CompareTarget) -> Result<()> {
    let report = report(config, target)?;
    info!(
        category = %report.category,
        succeeded = report.success_count,
        failed = report.failure_count,
        "comparison complete"
    );
    println!("{}", render_report(&report, config.format)?);
    Ok(())
}
