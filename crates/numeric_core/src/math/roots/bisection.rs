//! Bisection method.

use super::{check_bracket, require_bracket, RootFinder, RootRun, Step};
use crate::math::error_metrics::scalar_errors;
use crate::types::{ErrorMetrics, NumericError, ScalarRootProblem};

/// Halves a sign-change bracket until the midpoint settles.
///
/// The first midpoint is recorded without an error because there is no
/// previous midpoint to compare with. The bracket only ever shrinks.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bisection;

impl RootFinder for Bisection {
    fn name(&self) -> &'static str {
        "bisection"
    }

    fn iterate(&self, problem: &ScalarRootProblem, run: &mut RootRun<'_>) -> Result<f64, NumericError> {
        let f = problem.f();
        let (mut a, mut b) = require_bracket(problem, self.name())?;
        let mut fa = f.eval(a);
        let fb = f.eval(b);
        if let Some(root) = check_bracket(a, b, fa, fb)? {
            return Ok(root);
        }

        let mut mid = a + (b - a) / 2.0;
        let mut fm = f.eval(mid);
        if run.record(mid, fm, ErrorMetrics::none())? == Step::Converged {
            return Ok(mid);
        }

        loop {
            if fa * fm < 0.0 {
                b = mid;
            } else {
                a = mid;
                fa = fm;
            }
            let previous = mid;
            mid = a + (b - a) / 2.0;
            fm = f.eval(mid);
            if run.record(mid, fm, scalar_errors(previous, mid))? == Step::Converged {
                return Ok(mid);
            }
        }
    }
}
