//! Newton variants for roots of multiplicity greater than one.

use super::{first_derivative, require_guess, second_derivative, RootFinder, RootRun, Step};
use crate::expr::Callable;
use crate::math::error_metrics::scalar_errors;
use crate::types::{NumericError, ScalarRootProblem};
use std::sync::Arc;

/// `|f(x)|` below this (with a small `f'`) suggests a multiple root.
pub const MULTIPLE_ROOT_RESIDUAL_LIMIT: f64 = 1e-10;

/// `|f'(x)|` below this (with a small `f`) suggests a multiple root.
pub const MULTIPLE_ROOT_DERIVATIVE_LIMIT: f64 = 1e-6;

// Near a multiple root f suffers cancellation long before it reaches an exact
// zero, so residuals this small also count as a hit.
const RESIDUAL_FLOOR: f64 = 1e-15;

enum Update {
    Known(f64),
    Curvature(Arc<dyn Callable>),
}

/// Modified Newton iteration that keeps quadratic convergence at multiple
/// roots.
///
/// With a declared multiplicity `m`: `x - m·f/f'`. Otherwise:
/// `x - f·f' / ((f')² - f·f'')`. The result reports
/// `multiple_root_suspected` when `|f| < 1e-10` and `|f'| < 1e-6` at the
/// final iterate.
#[derive(Debug, Clone, Copy, Default)]
pub struct MultipleRoots;

impl MultipleRoots {
    fn steps(&self, problem: &ScalarRootProblem, run: &mut RootRun<'_>) -> Result<f64, NumericError> {
        let f = problem.f();
        let df = first_derivative(problem);
        run.derive("f'(x)", &df);
        let update = match problem.multiplicity() {
            Some(m) => Update::Known(f64::from(m)),
            None => {
                let d2f = second_derivative(problem);
                run.derive("f''(x)", &d2f);
                Update::Curvature(d2f)
            }
        };

        let mut x = require_guess(problem, self.name())?;
        let mut fx = f.eval(x);
        if fx == 0.0 {
            return Ok(x);
        }
        loop {
            let dfx = df.eval(x);
            let next = match &update {
                Update::Known(m) => {
                    run.guard_divisor("f'(x)", dfx, x)?;
                    x - m * fx / dfx
                }
                Update::Curvature(d2f) => {
                    let denominator = dfx * dfx - fx * d2f.eval(x);
                    run.guard_divisor("(f'(x))^2 - f(x)*f''(x)", denominator, x)?;
                    x - fx * dfx / denominator
                }
            };
            let errors = scalar_errors(x, next);
            x = next;
            fx = f.eval(x);
            if run.record_with_floor(x, fx, errors, RESIDUAL_FLOOR)? == Step::Converged {
                return Ok(x);
            }
        }
    }
}

impl RootFinder for MultipleRoots {
    fn name(&self) -> &'static str {
        "multiple_roots"
    }

    fn iterate(&self, problem: &ScalarRootProblem, run: &mut RootRun<'_>) -> Result<f64, NumericError> {
        let outcome = self.steps(problem, run);
        let at = match &outcome {
            Ok(root) => Some(*root),
            Err(_) => run.last(),
        };
        if let Some(x) = at {
            let df = first_derivative(problem);
            let suspected = problem.f().eval(x).abs() < MULTIPLE_ROOT_RESIDUAL_LIMIT
                && df.eval(x).abs() < MULTIPLE_ROOT_DERIVATIVE_LIMIT;
            run.flag_multiple_root(suspected);
        }
        outcome
    }
}
