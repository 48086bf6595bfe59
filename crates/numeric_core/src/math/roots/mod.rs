//! Root-finding engine for scalar equations `f(x) = 0`.
//!
//! This module provides:
//! - [`RootFinder`]: the per-method contract
//! - [`Bisection`], [`FalsePosition`]: bracketing methods
//! - [`FixedPoint`], [`Newton`], [`Secant`], [`MultipleRoots`]: open methods
//! - [`ROOT_FINDERS`]: the registered battery, in report order
//!
//! All methods share one stopping rule. A run succeeds when the selected error
//! (the step size, or `|f(x_n)|` under `ErrorKind::Residual`) drops below the
//! tolerance or an iterate hits `f(x) == 0` exactly, and fails
//! with `MaxIterationsExceeded` once the trace holds `max_iterations` records.
//! Every step appends a record, so failed runs keep their trace.
//!
//! # Example
//!
//! ```
//! use numeric_core::expr::{ExpressionCompiler, ShuntingCompiler};
//! use numeric_core::math::roots::{Newton, RootFinder};
//! use numeric_core::types::{ConvergenceConfig, RootStart, ScalarRootProblem};
//!
//! let f = ShuntingCompiler::new().compile("x^2 - 2").unwrap();
//! let problem = ScalarRootProblem::new(f, RootStart::guess(1.0)).unwrap();
//!
//! let result = Newton.solve(&problem, &ConvergenceConfig::default());
//! assert!(result.success);
//! assert!((result.scalar_solution().unwrap() - 2.0_f64.sqrt()).abs() < 1e-10);
//! ```

mod bisection;
mod false_position;
mod fixed_point;
mod multiple_roots;
mod newton;
mod secant;

pub use bisection::Bisection;
pub use false_position::FalsePosition;
pub use fixed_point::FixedPoint;
pub use multiple_roots::{MultipleRoots, MULTIPLE_ROOT_DERIVATIVE_LIMIT, MULTIPLE_ROOT_RESIDUAL_LIMIT};
pub use newton::Newton;
pub use secant::Secant;

use crate::expr::{derivative_or_numeric, Callable};
use crate::math::error_metrics;
use crate::types::result::DerivedExpression;
use crate::types::{
    ConvergenceConfig, ErrorMetrics, MethodResult, NumericError, ScalarRootProblem, Solution,
    State, Trace,
};
use std::sync::Arc;
use tracing::{debug, trace};

/// One root-finding method.
pub trait RootFinder: Send + Sync {
    /// Registered method name.
    fn name(&self) -> &'static str;

    /// Iterate until a terminal state; `Ok` carries the root.
    ///
    /// Implementations record each step through `run` and return early with
    /// `Ok(x)` when [`RootRun::record`] reports convergence.
    fn iterate(&self, problem: &ScalarRootProblem, run: &mut RootRun<'_>) -> Result<f64, NumericError>;

    /// Run the method and capture any failure into the result.
    fn solve(&self, problem: &ScalarRootProblem, config: &ConvergenceConfig) -> MethodResult {
        if let Err(err) = config.validate() {
            return MethodResult::rejected(self.name(), err);
        }
        let mut run = RootRun::new(config);
        let outcome = self.iterate(problem, &mut run);
        run.finish(self.name(), outcome)
    }
}

/// Registered root-finding battery, in registration order.
pub static ROOT_FINDERS: &[&dyn RootFinder] = &[
    &Bisection,
    &FalsePosition,
    &FixedPoint,
    &Newton,
    &Secant,
    &MultipleRoots,
];

/// Look up a registered method by name.
///
/// Case, spaces and hyphens are ignored, so `"False Position"` and
/// `"false-position"` both resolve.
pub fn find(name: &str) -> Option<&'static dyn RootFinder> {
    let key = normalize(name);
    let key = match key.as_str() {
        "regula_falsi" | "regla_falsa" => "false_position",
        "newton_raphson" => "newton",
        "multiple_root" | "raices_multiples" => "multiple_roots",
        "punto_fijo" => "fixed_point",
        "biseccion" => "bisection",
        other => other,
    };
    ROOT_FINDERS.iter().copied().find(|m| m.name() == key)
}

pub(crate) fn normalize(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .replace(['-', ' '], "_")
}

/// Mutable state of one run: the trace plus bookkeeping for the result.
#[derive(Debug)]
pub struct RootRun<'a> {
    config: &'a ConvergenceConfig,
    trace: Trace,
    last: Option<f64>,
    last_error: Option<f64>,
    derived: Vec<DerivedExpression>,
    multiple_root_suspected: Option<bool>,
}

/// What the driver should do after a recorded step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Tolerance met or exact root hit
    Converged,
    /// Keep iterating
    Continue,
}

impl<'a> RootRun<'a> {
    /// Empty run under `config`.
    pub fn new(config: &'a ConvergenceConfig) -> Self {
        Self {
            config,
            trace: Trace::new(),
            last: None,
            last_error: None,
            derived: Vec::new(),
            multiple_root_suspected: None,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &ConvergenceConfig {
        self.config
    }

    /// Number of recorded steps.
    pub fn iterations(&self) -> usize {
        self.trace.len()
    }

    /// Append a step and apply the stopping rule.
    ///
    /// # Errors
    ///
    /// `Diverged` when `x` is not finite or beyond the divergence bound, and
    /// `MaxIterationsExceeded` when this step used up the budget without
    /// converging. The step is recorded in both cases.
    pub fn record(&mut self, x: f64, fx: f64, errors: ErrorMetrics) -> Result<Step, NumericError> {
        self.record_with_floor(x, fx, errors, 0.0)
    }

    /// [`record`](Self::record), also converging when `|f(x)| <= residual_floor`.
    pub fn record_with_floor(
        &mut self,
        x: f64,
        fx: f64,
        errors: ErrorMetrics,
        residual_floor: f64,
    ) -> Result<Step, NumericError> {
        let errors = error_metrics::retain(errors, self.config);
        let index = self.trace.push(State::Scalar(x), Some(fx), errors);
        self.last = Some(x);
        if let Some(e) = error_metrics::stopping_error(&errors, Some(fx), self.config.error_kind) {
            self.last_error = Some(e);
        }
        trace!(iteration = index, x, fx, error = ?self.last_error, "root step");

        if !x.is_finite() || x.abs() > self.config.divergence_bound {
            return Err(NumericError::Diverged {
                iteration: index,
                magnitude: x.abs(),
            });
        }
        if fx.abs() <= residual_floor || error_metrics::meets_tolerance(&errors, Some(fx), self.config) {
            return Ok(Step::Converged);
        }
        if index >= self.config.max_iterations {
            return Err(NumericError::MaxIterationsExceeded {
                iterations: index,
                last_error: self.last_error,
            });
        }
        Ok(Step::Continue)
    }

    /// Most recent iterate.
    pub fn last(&self) -> Option<f64> {
        self.last
    }

    /// Check a divisor against the configured floor.
    pub fn guard_divisor(&self, quantity: &str, value: f64, x: f64) -> Result<(), NumericError> {
        if !(value.abs() >= self.config.derivative_floor) || value == 0.0 {
            return Err(NumericError::division_by_zero(quantity, value, x));
        }
        Ok(())
    }

    /// Remember a derived expression for the report.
    pub fn derive(&mut self, label: &str, f: &Arc<dyn Callable>) {
        self.derived.push(DerivedExpression {
            label: label.to_string(),
            text: f.to_string(),
        });
    }

    /// Set the multiple-root heuristic flag.
    pub fn flag_multiple_root(&mut self, suspected: bool) {
        self.multiple_root_suspected = Some(suspected);
    }

    fn finish(self, method: &str, outcome: Result<f64, NumericError>) -> MethodResult {
        let mut result = match outcome {
            Ok(root) => {
                // an exact root found before any step has zero error
                let final_error = self.last_error.unwrap_or(0.0);
                debug!(method, root, iterations = self.trace.len(), "root found");
                MethodResult::converged(method, Solution::Scalar(root), final_error, self.trace)
            }
            Err(err) => {
                debug!(method, iterations = self.trace.len(), error = %err, "root search failed");
                MethodResult::failed(
                    method,
                    err,
                    self.last.map(Solution::Scalar),
                    self.last_error,
                    self.trace,
                )
            }
        };
        result.derived_expressions = self.derived;
        result.multiple_root_suspected = self.multiple_root_suspected;
        result
    }
}

/// `f'` from the problem, or derived from `f`.
pub(crate) fn first_derivative(problem: &ScalarRootProblem) -> Arc<dyn Callable> {
    match problem.df() {
        Some(df) => df.clone(),
        None => derivative_or_numeric(problem.f(), 0, 1).0,
    }
}

/// `f''` from the problem, or derived from `f`.
pub(crate) fn second_derivative(problem: &ScalarRootProblem) -> Arc<dyn Callable> {
    match (problem.d2f(), problem.df()) {
        (Some(d2f), _) => d2f.clone(),
        (None, Some(df)) => derivative_or_numeric(df, 0, 1).0,
        (None, None) => derivative_or_numeric(problem.f(), 0, 2).0,
    }
}

pub(crate) fn require_bracket(problem: &ScalarRootProblem, method: &str) -> Result<(f64, f64), NumericError> {
    problem.bracket().ok_or_else(|| {
        NumericError::InvalidInput(format!(
            "{} needs a bracket [a, b] with f(a)*f(b) < 0 (e.g. a = 0, b = 2 for x^2 - 2)",
            method
        ))
    })
}

pub(crate) fn require_guess(problem: &ScalarRootProblem, method: &str) -> Result<f64, NumericError> {
    problem.start().initial_guess().ok_or_else(|| {
        NumericError::InvalidInput(format!(
            "{} needs an initial guess x0 or a bracket (e.g. x0 = 1)",
            method
        ))
    })
}

/// Validate a sign-change bracket.
///
/// Returns `Ok(Some(root))` when an endpoint is already an exact root.
pub(crate) fn check_bracket(
    a: f64,
    b: f64,
    fa: f64,
    fb: f64,
) -> Result<Option<f64>, NumericError> {
    if fa == 0.0 {
        return Ok(Some(a));
    }
    if fb == 0.0 {
        return Ok(Some(b));
    }
    if !(fa * fb < 0.0) {
        return Err(NumericError::InvalidBracket { a, b, fa, fb });
    }
    Ok(None)
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::expr::{ExpressionCompiler, ShuntingCompiler};
    use crate::types::{RootStart, ScalarRootProblem};

    pub fn problem(text: &str, start: RootStart) -> ScalarRootProblem {
        let f = ShuntingCompiler::new().compile(text).unwrap();
        ScalarRootProblem::new(f, start).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FailureKind;

    #[test]
    fn test_find_by_name_and_alias() {
        assert_eq!(find("bisection").map(|m| m.name()), Some("bisection"));
        assert_eq!(find("False Position").map(|m| m.name()), Some("false_position"));
        assert_eq!(find("regula-falsi").map(|m| m.name()), Some("false_position"));
        assert_eq!(find("newton_raphson").map(|m| m.name()), Some("newton"));
        assert!(find("golden_section").is_none());
    }

    #[test]
    fn test_battery_order() {
        let names: Vec<&str> = ROOT_FINDERS.iter().map(|m| m.name()).collect();
        assert_eq!(
            names,
            vec!["bisection", "false_position", "fixed_point", "newton", "secant", "multiple_roots"]
        );
    }

    #[test]
    fn test_record_stops_at_budget() {
        let config = ConvergenceConfig::new(1e-12, 2).unwrap();
        let mut run = RootRun::new(&config);
        assert_eq!(run.record(1.0, 0.5, ErrorMetrics::none()).unwrap(), Step::Continue);
        let err = run
            .record(2.0, 0.5, error_metrics::scalar_errors(1.0, 2.0))
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::MaxIterationsExceeded);
        assert_eq!(run.iterations(), 2);
    }

    #[test]
    fn test_record_exact_zero_converges() {
        let config = ConvergenceConfig::default();
        let mut run = RootRun::new(&config);
        assert_eq!(run.record(3.0, 0.0, ErrorMetrics::none()).unwrap(), Step::Converged);
    }

    #[test]
    fn test_record_divergence() {
        let config = ConvergenceConfig::default();
        let mut run = RootRun::new(&config);
        let err = run.record(f64::NAN, 1.0, ErrorMetrics::none()).unwrap_err();
        assert_eq!(err.kind(), FailureKind::Diverged);
        let err = run.record(1e13, 1.0, ErrorMetrics::none()).unwrap_err();
        assert_eq!(err.kind(), FailureKind::Diverged);
    }

    #[test]
    fn test_invalid_config_is_rejected_without_trace() {
        let problem = test_support::problem("x - 1", crate::types::RootStart::bracket(0.0, 2.0));
        let config = ConvergenceConfig {
            tolerance: 2.0,
            ..ConvergenceConfig::default()
        };
        let result = Bisection.solve(&problem, &config);
        assert!(!result.success);
        assert_eq!(result.failure_kind(), Some(FailureKind::InvalidConfig));
        assert!(result.trace.is_empty());
    }

    #[test]
    fn test_check_bracket() {
        assert_eq!(check_bracket(0.0, 1.0, -1.0, 1.0).unwrap(), None);
        assert_eq!(check_bracket(0.0, 1.0, 0.0, 1.0).unwrap(), Some(0.0));
        assert!(check_bracket(0.0, 1.0, 1.0, 2.0).is_err());
        assert!(check_bracket(0.0, 1.0, f64::NAN, 2.0).is_err());
    }
}
