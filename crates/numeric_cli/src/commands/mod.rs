//! CLI command implementations
//!
//! Each submodule implements a specific CLI command.

pub mod check;
pub mod compare;
pub mod interpolate;
pub mod linear;
pub mod root;

use numeric_core::api::{run_with_deadline, NumericEngine};
use numeric_core::expr::ShuntingCompiler;
use numeric_core::types::MethodResult;
use tracing::info;

use crate::config::CliConfig;
use crate::output::render_result;
use crate::{CliError, Result};

/// Engine configured with the CLI limits and comparison mode
pub(crate) fn engine(config: &CliConfig) -> NumericEngine<ShuntingCompiler> {
    NumericEngine::new(ShuntingCompiler::new())
        .with_limits(config.limits())
        .with_mode(config.mode())
}

/// Run `job`, bounded by the configured timeout when one is set
pub(crate) fn within_deadline<T, F>(config: &CliConfig, job: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    match config.timeout() {
        Some(deadline) => Ok(run_with_deadline(deadline, job)?),
        None => Ok(job()),
    }
}

/// Print a single-method result; a failed method becomes the exit error
pub(crate) fn emit_result(config: &CliConfig, result: &MethodResult) -> Result<()> {
    println!("{}", render_result(result, config.format)?);
    match &result.failure {
        None => {
            info!(method = %result.method, iterations = result.iterations, "method converged");
            Ok(())
        }
        Some(failure) => Err(CliError::MethodFailed {
            method: result.method.clone(),
            reason: failure.reason.clone(),
        }),
    }
}
