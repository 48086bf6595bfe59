//! Secant method.

use super::{RootFinder, RootRun, Step};
use crate::math::error_metrics::scalar_errors;
use crate::types::{NumericError, ScalarRootProblem};

/// `x_{n+1} = x_n - f(x_n)(x_n - x_{n-1}) / (f(x_n) - f(x_{n-1}))`.
///
/// Starts from `(x0, x1)`, or the bracket endpoints. A vanishing
/// denominator `f(x_n) - f(x_{n-1})` fails with `DivisionByZero`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Secant;

impl RootFinder for Secant {
    fn name(&self) -> &'static str {
        "secant"
    }

    fn iterate(&self, problem: &ScalarRootProblem, run: &mut RootRun<'_>) -> Result<f64, NumericError> {
        let f = problem.f();
        let (mut x0, mut x1) = problem.start().secant_pair().ok_or_else(|| {
            NumericError::InvalidInput(
                "secant needs two starting points x0 and x1, or a bracket (e.g. x0 = 1, x1 = 2)"
                    .to_string(),
            )
        })?;
        let mut f0 = f.eval(x0);
        let mut f1 = f.eval(x1);
        if f0 == 0.0 {
            return Ok(x0);
        }
        if f1 == 0.0 {
            return Ok(x1);
        }

        loop {
            let denominator = f1 - f0;
            if denominator == 0.0 {
                return Err(NumericError::division_by_zero(
                    "f(x_n) - f(x_{n-1})",
                    denominator,
                    x1,
                ));
            }
            let x2 = x1 - f1 * (x1 - x0) / denominator;
            let errors = scalar_errors(x1, x2);
            x0 = x1;
            f0 = f1;
            x1 = x2;
            f1 = f.eval(x1);
            if run.record(x1, f1, errors)? == Step::Converged {
                return Ok(x1);
            }
        }
    }
}
