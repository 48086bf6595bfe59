//! False position (regula falsi).

use super::{check_bracket, require_bracket, RootFinder, RootRun, Step};
use crate::math::error_metrics::scalar_errors;
use crate::types::{ErrorMetrics, NumericError, ScalarRootProblem};

/// Replaces the bracket midpoint with the secant through both endpoints:
/// `x = a - f(a)(b - a) / (f(b) - f(a))`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FalsePosition;

impl RootFinder for FalsePosition {
    fn name(&self) -> &'static str {
        "false_position"
    }

    fn iterate(&self, problem: &ScalarRootProblem, run: &mut RootRun<'_>) -> Result<f64, NumericError> {
        let f = problem.f();
        let (mut a, mut b) = require_bracket(problem, self.name())?;
        let mut fa = f.eval(a);
        let mut fb = f.eval(b);
        if let Some(root) = check_bracket(a, b, fa, fb)? {
            return Ok(root);
        }

        // fa and fb have opposite signs, so fb - fa never vanishes here
        let mut x = a - fa * (b - a) / (fb - fa);
        let mut fx = f.eval(x);
        if run.record(x, fx, ErrorMetrics::none())? == Step::Converged {
            return Ok(x);
        }

        loop {
            if fa * fx < 0.0 {
                b = x;
                fb = fx;
            } else {
                a = x;
                fa = fx;
            }
            let denominator = fb - fa;
            run.guard_divisor("f(b) - f(a)", denominator, x)?;
            let previous = x;
            x = a - fa * (b - a) / denominator;
            fx = f.eval(x);
            if run.record(x, fx, scalar_errors(previous, x))? == Step::Converged {
                return Ok(x);
            }
        }
    }
}
