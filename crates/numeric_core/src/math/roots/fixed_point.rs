//! Fixed-point iteration.

use super::{require_guess, RootFinder, RootRun, Step};
use crate::expr::Callable;
use crate::math::error_metrics::scalar_errors;
use crate::types::{NumericError, ScalarRootProblem};
use std::fmt;
use std::sync::Arc;

/// Divisor of the default iteration function `g(x) = x - f(x)/3`.
pub const DEFAULT_RELAXATION_DIVISOR: f64 = 3.0;

/// Iterates `x_{n+1} = g(x_n)`.
///
/// Uses the problem's `g` when supplied, otherwise `g(x) = x - f(x)/3`.
/// Starts from `x0`, or the bracket midpoint.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedPoint;

impl RootFinder for FixedPoint {
    fn name(&self) -> &'static str {
        "fixed_point"
    }

    fn iterate(&self, problem: &ScalarRootProblem, run: &mut RootRun<'_>) -> Result<f64, NumericError> {
        let f = problem.f();
        let g: Arc<dyn Callable> = match problem.g() {
            Some(g) => g.clone(),
            None => Arc::new(Relaxed { f: f.clone() }),
        };
        run.derive("g(x)", &g);

        let mut x = require_guess(problem, self.name())?;
        if f.eval(x) == 0.0 {
            return Ok(x);
        }
        loop {
            let next = g.eval(x);
            let errors = scalar_errors(x, next);
            let f_next = f.eval(next);
            x = next;
            if run.record(x, f_next, errors)? == Step::Converged {
                return Ok(x);
            }
        }
    }
}

/// `x - f(x)/3`.
#[derive(Debug)]
struct Relaxed {
    f: Arc<dyn Callable>,
}

impl Callable for Relaxed {
    fn arity(&self) -> usize {
        1
    }

    fn call(&self, args: &[f64]) -> f64 {
        let x = args.first().copied().unwrap_or(f64::NAN);
        x - self.f.call(args) / DEFAULT_RELAXATION_DIVISOR
    }

    fn derivative(&self, variable: usize, order: usize) -> Result<Arc<dyn Callable>, NumericError> {
        Ok(Arc::new(crate::expr::FiniteDifference::new(
            Arc::new(Relaxed { f: self.f.clone() }),
            variable,
            order,
        )))
    }
}

impl fmt::Display for Relaxed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x - ({})/3", self.f)
    }
}
