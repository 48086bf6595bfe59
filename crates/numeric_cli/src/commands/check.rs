//! Check command implementation
//!
//! Prints the effective configuration and the registered methods, then runs
//! one known problem per category.

use numeric_core::api::RootInputs;
use numeric_core::math::interpolation::{InterpolationOptions, INTERPOLATORS};
use numeric_core::math::linear::LINEAR_SOLVERS;
use numeric_core::math::roots::ROOT_FINDERS;
use numeric_core::types::MethodResult;
use tracing::info;

use super::engine;
use crate::config::CliConfig;
use crate::{CliError, Result};

fn names<'a>(methods: impl Iterator<Item = &'a str>) -> String {
    methods.collect::<Vec<_>>().join(", ")
}

fn verify(label: &str, result: MethodResult) -> Result<()> {
    match result.failure {
        None => {
            println!("  ✓ {}", label);
            Ok(())
        }
        Some(failure) => {
            println!("  ✗ {}", label);
            Err(CliError::MethodFailed {
                method: result.method,
                reason: failure.reason,
            })
        }
    }
}

/// Run the check command
pub fn run(config: &CliConfig) -> Result<()> {
    info!("Checking configuration...");
    let convergence = config.convergence()?;

    println!("Configuration:");
    println!("  tolerance:       {:e}", convergence.tolerance);
    println!("  max_iterations:  {}", convergence.max_iterations);
    println!("  error_kind:      {}", convergence.error_kind);
    println!("  max_dimension:   {}", config.max_dimension);
    println!("  max_points:      {}", config.max_points);
    println!("  comparison mode: {:?}", config.mode());
    match config.timeout_ms {
        Some(ms) => println!("  timeout:         {} ms", ms),
        None => println!("  timeout:         none"),
    }

    println!("Methods:");
    println!("  root:          {}", names(ROOT_FINDERS.iter().map(|m| m.name())));
    println!("  linear:        {}", names(LINEAR_SOLVERS.iter().map(|m| m.name())));
    println!("  interpolation: {}", names(INTERPOLATORS.iter().map(|m| m.name())));

    println!("Self test:");
    let engine = engine(config);
    verify(
        "bisection on x^2 - 2",
        engine.solve_root("bisection", "x^2 - 2", &RootInputs::bracket(0.0, 2.0), &convergence),
    )?;
    verify(
        "jacobi on a diagonally dominant 3x3 system",
        engine.solve_linear_system(
            "jacobi",
            vec![vec![10.0, 1.0, 1.0], vec![2.0, 10.0, 1.0], vec![2.0, 2.0, 10.0]],
            vec![12.0, 13.0, 14.0],
            None,
            None,
            &convergence,
        ),
    )?;
    verify(
        "cubic spline through three nodes",
        engine.interpolate(
            "cubic_spline",
            vec![(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)],
            &InterpolationOptions::default().with_limits(config.limits()),
        ),
    )?;

    info!("Check complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_passes_with_defaults() {
        assert!(run(&CliConfig::default()).is_ok());
    }
}
