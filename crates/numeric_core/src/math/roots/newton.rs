//! Newton-Raphson method.

use super::{first_derivative, require_guess, RootFinder, RootRun, Step};
use crate::math::error_metrics::scalar_errors;
use crate::types::{NumericError, ScalarRootProblem};

/// Newton-Raphson root finder.
///
/// Uses `x_{n+1} = x_n - f(x_n) / f'(x_n)` with `f'` taken from the problem,
/// derived symbolically, or approximated by central differences.
///
/// # Convergence
///
/// Quadratic near a simple root. Fails with `DivisionByZero` when
/// `|f'(x_n)|` drops below the configured floor and with `Diverged` when the
/// iterate leaves the finite range.
#[derive(Debug, Clone, Copy, Default)]
pub struct Newton;

impl RootFinder for Newton {
    fn name(&self) -> &'static str {
        "newton"
    }

    fn iterate(&self, problem: &ScalarRootProblem, run: &mut RootRun<'_>) -> Result<f64, NumericError> {
        let f = problem.f();
        let df = first_derivative(problem);
        run.derive("f'(x)", &df);

        let mut x = require_guess(problem, self.name())?;
        let mut fx = f.eval(x);
        if fx == 0.0 {
            return Ok(x);
        }
        loop {
            let dfx = df.eval(x);
            run.guard_divisor("f'(x)", dfx, x)?;
            let next = x - fx / dfx;
            let errors = scalar_errors(x, next);
            x = next;
            fx = f.eval(x);
            if run.record(x, fx, errors)? == Step::Converged {
                return Ok(x);
            }
        }
    }
}
