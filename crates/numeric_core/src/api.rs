//! Call/response surface.
//!
//! Every operation takes plain inputs (function text, nested rows, point
//! lists) and returns a [`MethodResult`] or [`ComparisonReport`]. Unknown
//! method names, parse failures and rejected inputs come back as failed
//! results; nothing here panics on bad input and nothing is kept between
//! calls.
//!
//! The free functions use the built-in grammar ([`ShuntingCompiler`]) and
//! default [`EngineLimits`]. [`NumericEngine`] offers the same operations
//! over an injected [`ExpressionCompiler`].
//!
//! # Example
//!
//! ```
//! use numeric_core::api;
//! use numeric_core::types::ConvergenceConfig;
//!
//! let a = vec![vec![10.0, 1.0, 1.0], vec![2.0, 10.0, 1.0], vec![2.0, 2.0, 10.0]];
//! let config = ConvergenceConfig::new(1e-6, 100).unwrap();
//! let result = api::solve_linear_system("jacobi", a, vec![12.0, 13.0, 14.0], None, None, &config);
//!
//! assert!(result.success);
//! assert!(result.spectral_radius.unwrap() < 1.0);
//! ```

use crate::compare::{self, ComparisonMode, ComparisonReport, ReportEntry};
use crate::expr::{ExpressionCompiler, ShuntingCompiler};
use crate::math::interpolation::{self, InterpolationOptions, INTERPOLATORS};
use crate::math::linear::{self, LINEAR_SOLVERS};
use crate::math::roots::{self, ROOT_FINDERS};
use crate::types::{
    ConvergenceConfig, EngineLimits, InterpolationProblem, LinearSystemProblem, MethodResult,
    NumericError, Problem, RootStart, ScalarRootProblem,
};
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

/// Starting data and optional extras of a root search.
///
/// # Example
///
/// ```
/// use numeric_core::api::RootInputs;
///
/// let inputs = RootInputs::bracket(0.0, 2.0)
///     .with_iteration_function("(x + 2/x)/2")
///     .with_multiplicity(1);
/// assert_eq!(inputs.bracket, Some((0.0, 2.0)));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RootInputs {
    /// Sign-change interval `[a, b]`
    pub bracket: Option<(f64, f64)>,
    /// Initial guess
    pub x0: Option<f64>,
    /// Second initial guess (secant)
    pub x1: Option<f64>,
    /// Text of `f'`, replacing the symbolic derivative
    pub derivative: Option<String>,
    /// Text of `f''`
    pub second_derivative: Option<String>,
    /// Text of the fixed-point function `g`
    pub iteration_function: Option<String>,
    /// Known root multiplicity
    pub multiplicity: Option<u32>,
}

impl RootInputs {
    /// Inputs with a bracket only.
    pub fn bracket(a: f64, b: f64) -> Self {
        Self {
            bracket: Some((a, b)),
            ..Self::default()
        }
    }

    /// Inputs with one guess only.
    pub fn guess(x0: f64) -> Self {
        Self {
            x0: Some(x0),
            ..Self::default()
        }
    }

    /// Add a first guess.
    pub fn with_guess(mut self, x0: f64) -> Self {
        self.x0 = Some(x0);
        self
    }

    /// Add a second guess.
    pub fn with_second_guess(mut self, x1: f64) -> Self {
        self.x1 = Some(x1);
        self
    }

    /// Supply `f'` as text.
    pub fn with_derivative(mut self, text: impl Into<String>) -> Self {
        self.derivative = Some(text.into());
        self
    }

    /// Supply `f''` as text.
    pub fn with_second_derivative(mut self, text: impl Into<String>) -> Self {
        self.second_derivative = Some(text.into());
        self
    }

    /// Supply `g` as text.
    pub fn with_iteration_function(mut self, text: impl Into<String>) -> Self {
        self.iteration_function = Some(text.into());
        self
    }

    /// Declare the root multiplicity.
    pub fn with_multiplicity(mut self, m: u32) -> Self {
        self.multiplicity = Some(m);
        self
    }

    fn start(&self) -> RootStart {
        RootStart {
            bracket: self.bracket,
            x0: self.x0,
            x1: self.x1,
        }
    }
}

/// Stateless facade over an expression compiler.
#[derive(Debug, Clone, Default)]
pub struct NumericEngine<C = ShuntingCompiler> {
    compiler: C,
    limits: EngineLimits,
    mode: ComparisonMode,
}

impl<C: ExpressionCompiler> NumericEngine<C> {
    /// Engine over `compiler` with default limits and sequential comparisons.
    pub fn new(compiler: C) -> Self {
        Self {
            compiler,
            limits: EngineLimits::default(),
            mode: ComparisonMode::Sequential,
        }
    }

    /// Replace the size limits.
    pub fn with_limits(mut self, limits: EngineLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Replace the comparison mode.
    pub fn with_mode(mut self, mode: ComparisonMode) -> Self {
        self.mode = mode;
        self
    }

    /// Size limits in force.
    pub fn limits(&self) -> &EngineLimits {
        &self.limits
    }

    /// Compile the function text and starting data into a problem.
    pub fn root_problem(&self, function: &str, inputs: &RootInputs) -> Result<ScalarRootProblem, NumericError> {
        let mut problem = ScalarRootProblem::new(self.compiler.compile(function)?, inputs.start())?;
        if let Some(text) = &inputs.derivative {
            problem = problem.with_derivative(self.compiler.compile(text)?);
        }
        if let Some(text) = &inputs.second_derivative {
            problem = problem.with_second_derivative(self.compiler.compile(text)?);
        }
        if let Some(text) = &inputs.iteration_function {
            problem = problem.with_iteration_function(self.compiler.compile(text)?);
        }
        if let Some(m) = inputs.multiplicity {
            problem = problem.with_multiplicity(m)?;
        }
        Ok(problem)
    }

    /// Validate a linear system.
    pub fn linear_problem(
        &self,
        matrix: Vec<Vec<f64>>,
        vector: Vec<f64>,
        relaxation: Option<f64>,
        initial_guess: Option<Vec<f64>>,
    ) -> Result<LinearSystemProblem, NumericError> {
        let mut problem = LinearSystemProblem::new(matrix, vector, &self.limits)?;
        if let Some(x0) = initial_guess {
            problem = problem.with_initial_guess(x0)?;
        }
        if let Some(w) = relaxation {
            problem = problem.with_relaxation(w);
        }
        Ok(problem)
    }

    /// Run one root-finding method.
    pub fn solve_root(
        &self,
        method: &str,
        function: &str,
        inputs: &RootInputs,
        config: &ConvergenceConfig,
    ) -> MethodResult {
        let Some(finder) = roots::find(method) else {
            return unknown_method(method, ROOT_FINDERS.iter().map(|m| m.name()));
        };
        match self.root_problem(function, inputs) {
            Ok(problem) => finder.solve(&problem, config),
            Err(err) => rejected(finder.name(), err),
        }
    }

    /// Run one linear-system method.
    pub fn solve_linear_system(
        &self,
        method: &str,
        matrix: Vec<Vec<f64>>,
        vector: Vec<f64>,
        relaxation: Option<f64>,
        initial_guess: Option<Vec<f64>>,
        config: &ConvergenceConfig,
    ) -> MethodResult {
        let Some(solver) = linear::find(method) else {
            return unknown_method(method, LINEAR_SOLVERS.iter().map(|m| m.name()));
        };
        match self.linear_problem(matrix, vector, relaxation, initial_guess) {
            Ok(problem) => solver.solve(&problem, config),
            Err(err) => rejected(solver.name(), err),
        }
    }

    /// Run one interpolation method. Limits come from `options`.
    pub fn interpolate(&self, method: &str, points: Vec<(f64, f64)>, options: &InterpolationOptions) -> MethodResult {
        let Some(interpolator) = interpolation::find(method) else {
            return unknown_method(method, INTERPOLATORS.iter().map(|m| m.name()));
        };
        match InterpolationProblem::new(points, &options.limits) {
            Ok(problem) => interpolator.solve(&problem, options),
            Err(err) => rejected(interpolator.name(), err),
        }
    }

    /// Run the root-finding battery.
    pub fn compare_root(&self, function: &str, inputs: &RootInputs, config: &ConvergenceConfig) -> ComparisonReport {
        match self.root_problem(function, inputs) {
            Ok(problem) => compare::compare_roots(&problem, config, self.mode),
            Err(err) => rejected_report("root", ROOT_FINDERS.iter().map(|m| m.name()), err),
        }
    }

    /// Run the linear-system battery.
    pub fn compare_linear_system(
        &self,
        matrix: Vec<Vec<f64>>,
        vector: Vec<f64>,
        relaxation: Option<f64>,
        initial_guess: Option<Vec<f64>>,
        config: &ConvergenceConfig,
    ) -> ComparisonReport {
        match self.linear_problem(matrix, vector, relaxation, initial_guess) {
            Ok(problem) => compare::compare_linear(&problem, config, self.mode),
            Err(err) => rejected_report("linear", LINEAR_SOLVERS.iter().map(|m| m.name()), err),
        }
    }

    /// Run the interpolation battery.
    pub fn compare_interpolation(&self, points: Vec<(f64, f64)>, options: &InterpolationOptions) -> ComparisonReport {
        match InterpolationProblem::new(points, &options.limits) {
            Ok(problem) => compare::compare_interpolation(&problem, options, self.mode),
            Err(err) => rejected_report("interpolation", INTERPOLATORS.iter().map(|m| m.name()), err),
        }
    }

    /// Run the battery matching an already built problem.
    pub fn compare(&self, problem: &Problem, config: &ConvergenceConfig) -> ComparisonReport {
        compare::compare_problem(problem, config, self.mode)
    }
}

fn engine() -> NumericEngine<ShuntingCompiler> {
    NumericEngine::new(ShuntingCompiler::new())
}

fn rejected(method: &str, err: NumericError) -> MethodResult {
    debug!(method, error = %err, "input rejected");
    MethodResult::rejected(method, err)
}

fn unknown_method<'a>(method: &str, available: impl Iterator<Item = &'a str>) -> MethodResult {
    let available: Vec<&str> = available.collect();
    rejected(
        method,
        NumericError::InvalidInput(format!(
            "unknown method '{}' (available: {})",
            method,
            available.join(", ")
        )),
    )
}

fn rejected_report<'a>(
    category: &str,
    methods: impl Iterator<Item = &'a str>,
    err: NumericError,
) -> ComparisonReport {
    debug!(category, error = %err, "comparison input rejected");
    let entries = methods
        .map(|name| ReportEntry {
            name: name.to_string(),
            result: MethodResult::rejected(name, err.clone()),
            elapsed: Duration::ZERO,
        })
        .collect();
    ComparisonReport::from_entries(category, entries)
}

/// [`NumericEngine::solve_root`] with the built-in grammar.
pub fn solve_root(method: &str, function: &str, inputs: &RootInputs, config: &ConvergenceConfig) -> MethodResult {
    engine().solve_root(method, function, inputs, config)
}

/// [`NumericEngine::solve_linear_system`] with default limits.
pub fn solve_linear_system(
    method: &str,
    matrix: Vec<Vec<f64>>,
    vector: Vec<f64>,
    relaxation: Option<f64>,
    initial_guess: Option<Vec<f64>>,
    config: &ConvergenceConfig,
) -> MethodResult {
    engine().solve_linear_system(method, matrix, vector, relaxation, initial_guess, config)
}

/// [`NumericEngine::interpolate`].
pub fn interpolate(method: &str, points: Vec<(f64, f64)>, options: &InterpolationOptions) -> MethodResult {
    engine().interpolate(method, points, options)
}

/// [`NumericEngine::compare_root`] with the built-in grammar.
pub fn compare_root(function: &str, inputs: &RootInputs, config: &ConvergenceConfig) -> ComparisonReport {
    engine().compare_root(function, inputs, config)
}

/// [`NumericEngine::compare_linear_system`] with default limits.
pub fn compare_linear_system(
    matrix: Vec<Vec<f64>>,
    vector: Vec<f64>,
    relaxation: Option<f64>,
    initial_guess: Option<Vec<f64>>,
    config: &ConvergenceConfig,
) -> ComparisonReport {
    engine().compare_linear_system(matrix, vector, relaxation, initial_guess, config)
}

/// [`NumericEngine::compare_interpolation`].
pub fn compare_interpolation(points: Vec<(f64, f64)>, options: &InterpolationOptions) -> ComparisonReport {
    engine().compare_interpolation(points, options)
}

/// [`NumericEngine::compare`].
pub fn compare(problem: &Problem, config: &ConvergenceConfig) -> ComparisonReport {
    engine().compare(problem, config)
}

/// Run `job` on a worker thread and wait at most `deadline`.
///
/// On timeout the worker is detached and its eventual output dropped; the
/// engines are bounded by `max_iterations`, so it finishes on its own.
///
/// # Errors
///
/// `Timeout` when the deadline elapses, `InvalidInput` when the worker dies
/// without producing a value.
///
/// # Example
///
/// ```
/// use numeric_core::api::{self, run_with_deadline, RootInputs};
/// use numeric_core::types::ConvergenceConfig;
/// use std::time::Duration;
///
/// let result = run_with_deadline(Duration::from_secs(5), || {
///     api::solve_root("newton", "x^2 - 2", &RootInputs::guess(1.0), &ConvergenceConfig::default())
/// })
/// .unwrap();
/// assert!(result.success);
/// ```
pub fn run_with_deadline<T, F>(deadline: Duration, job: F) -> Result<T, NumericError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        // the receiver may already be gone after a timeout
        let _ = tx.send(job());
    });
    match rx.recv_timeout(deadline) {
        Ok(value) => Ok(value),
        Err(RecvTimeoutError::Timeout) => {
            warn!(millis = deadline.as_millis() as u64, "computation timed out");
            Err(NumericError::Timeout {
                millis: deadline.as_millis(),
            })
        }
        Err(RecvTimeoutError::Disconnected) => Err(NumericError::InvalidInput(
            "computation stopped before producing a result".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FailureKind;

    #[test]
    fn test_unknown_method_is_a_failed_result() {
        let result = solve_root("golden_section", "x", &RootInputs::bracket(-1.0, 1.0), &ConvergenceConfig::default());
        assert!(!result.success);
        assert_eq!(result.failure_kind(), Some(FailureKind::InvalidInput));
        assert!(result.failure.unwrap().reason.contains("bisection"));
    }

    #[test]
    fn test_parse_failure_is_a_failed_result() {
        let result = solve_root("newton", "x^^2", &RootInputs::guess(1.0), &ConvergenceConfig::default());
        assert_eq!(result.failure_kind(), Some(FailureKind::Parse));
        assert_eq!(result.method, "newton");
    }

    #[test]
    fn test_missing_start_is_rejected() {
        let result = solve_root("newton", "x - 1", &RootInputs::default(), &ConvergenceConfig::default());
        assert_eq!(result.failure_kind(), Some(FailureKind::InvalidInput));
    }

    #[test]
    fn test_explicit_iteration_function() {
        let inputs = RootInputs::guess(1.0).with_iteration_function("(x + 2/x)/2");
        let result = solve_root("fixed_point", "x^2 - 2", &inputs, &ConvergenceConfig::default());
        assert!(result.success);
        assert!((result.scalar_solution().unwrap() - 2.0_f64.sqrt()).abs() < 1e-7);
    }

    #[test]
    fn test_dimension_limit_comes_from_engine() {
        let a = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
        let engine = NumericEngine::new(ShuntingCompiler::new()).with_limits(EngineLimits {
            max_dimension: 1,
            max_points: 8,
        });
        let result = engine.solve_linear_system("jacobi", a, vec![1.0, 1.0], None, None, &ConvergenceConfig::default());
        assert_eq!(result.failure_kind(), Some(FailureKind::DimensionMismatch));
    }

    #[test]
    fn test_initial_guess_and_relaxation_are_applied() {
        let a = vec![vec![4.0, 1.0], vec![1.0, 3.0]];
        let result = solve_linear_system(
            "sor",
            a,
            vec![5.0, 4.0],
            Some(1.2),
            Some(vec![1.0, 1.0]),
            &ConvergenceConfig::default(),
        );
        // x0 already solves the system
        assert!(result.success);
        assert_eq!(result.iterations, 1);
    }

    #[test]
    fn test_rejected_report_lists_every_method() {
        let report = compare_root("sin(", &RootInputs::bracket(0.0, 1.0), &ConvergenceConfig::default());
        assert_eq!(report.entries.len(), 6);
        assert_eq!(report.failure_count, 6);
        assert_eq!(report.failures_by_kind.get(&FailureKind::Parse), Some(&6));
    }

    #[test]
    fn test_interpolation_point_limit() {
        let points: Vec<(f64, f64)> = (0..9).map(|i| (i as f64, i as f64)).collect();
        let result = interpolate("lagrange", points.clone(), &InterpolationOptions::default());
        assert_eq!(result.failure_kind(), Some(FailureKind::DimensionMismatch));

        let options = InterpolationOptions::default().with_limits(EngineLimits::unbounded());
        assert!(interpolate("lagrange", points, &options).success);
    }

    #[test]
    fn test_deadline_elapses() {
        let err = run_with_deadline(Duration::from_millis(10), || {
            thread::sleep(Duration::from_millis(500));
            1
        })
        .unwrap_err();
        assert_eq!(err, NumericError::Timeout { millis: 10 });
    }

    #[test]
    fn test_deadline_met() {
        assert_eq!(run_with_deadline(Duration::from_secs(1), || 7).unwrap(), 7);
    }
}
