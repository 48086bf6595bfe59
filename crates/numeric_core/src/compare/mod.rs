//! Comparison runs: one problem, a whole battery of methods.
//!
//! Each registered method runs once (never retried) and is timed. The report
//! is assembled after every method finished and keeps entries in registration
//! order, also when the battery runs in parallel.
//!
//! # Example
//!
//! ```
//! use numeric_core::compare::{compare_linear, ComparisonMode};
//! use numeric_core::types::{ConvergenceConfig, EngineLimits, LinearSystemProblem};
//!
//! let a = vec![vec![10.0, 1.0, 1.0], vec![2.0, 10.0, 1.0], vec![2.0, 2.0, 10.0]];
//! let problem = LinearSystemProblem::new(a, vec![12.0, 13.0, 14.0], &EngineLimits::default()).unwrap();
//!
//! let report = compare_linear(&problem, &ConvergenceConfig::default(), ComparisonMode::Parallel);
//! assert_eq!(report.entries.len(), 3);
//! assert_eq!(report.success_count, 3);
//! ```

use crate::math::interpolation::{InterpolationOptions, INTERPOLATORS};
use crate::math::linear::LINEAR_SOLVERS;
use crate::math::roots::ROOT_FINDERS;
use crate::types::{
    ConvergenceConfig, ErrorVariant, FailureKind, InterpolationProblem, LinearSystemProblem,
    MethodResult, Problem, ScalarRootProblem,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing::debug;

/// How a battery is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComparisonMode {
    /// One method after the other on the calling thread
    #[default]
    Sequential,
    /// Methods spread over the rayon pool
    Parallel,
}

/// One method's outcome within a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry {
    /// Method name
    pub name: String,
    /// Full result
    pub result: MethodResult,
    /// Wall-clock time of the run
    pub elapsed: Duration,
}

/// Ranked summary of a battery run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// Problem category (`root`, `linear`, `interpolation`)
    pub category: String,
    /// Entries in registration order
    pub entries: Vec<ReportEntry>,
    /// Successful method with the smallest final error
    pub best_by_error: Option<String>,
    /// Successful method with the fewest iterations; `None` when no
    /// successful method iterated (interpolation batteries)
    pub best_by_iteration_count: Option<String>,
    /// Successful method with the shortest wall-clock time
    pub fastest: Option<String>,
    /// Per error variant, the successful method with the smallest final value
    pub best_by_error_variant: BTreeMap<ErrorVariant, String>,
    /// Number of successful methods
    pub success_count: usize,
    /// Number of failed methods
    pub failure_count: usize,
    /// Failures grouped by kind
    pub failures_by_kind: BTreeMap<FailureKind, usize>,
}

impl ComparisonReport {
    /// Summarise finished entries. Ties go to the earlier entry.
    pub fn from_entries(category: impl Into<String>, entries: Vec<ReportEntry>) -> Self {
        let successes: Vec<&ReportEntry> = entries.iter().filter(|e| e.result.success).collect();

        let best_by_iteration_count = if successes.iter().any(|e| e.result.iterations > 0) {
            successes
                .iter()
                .min_by_key(|e| e.result.iterations)
                .map(|e| e.name.clone())
        } else {
            None
        };
        let fastest = successes.iter().min_by_key(|e| e.elapsed).map(|e| e.name.clone());
        let best_by_error = best_by(&successes, |r| r.final_error);

        let best_by_error_variant = ErrorVariant::ALL
            .iter()
            .filter_map(|&variant| {
                best_by(&successes, |r| r.final_error_variant(variant)).map(|name| (variant, name))
            })
            .collect();

        let mut failures_by_kind = BTreeMap::new();
        for kind in entries.iter().filter_map(|e| e.result.failure_kind()) {
            *failures_by_kind.entry(kind).or_insert(0) += 1;
        }

        let success_count = successes.len();
        let failure_count = entries.len() - success_count;
        Self {
            category: category.into(),
            entries,
            best_by_error,
            best_by_iteration_count,
            fastest,
            best_by_error_variant,
            success_count,
            failure_count,
            failures_by_kind,
        }
    }

    /// Entry by method name.
    pub fn entry(&self, name: &str) -> Option<&ReportEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Successful entries ordered by iterations, then final error.
    pub fn ranking(&self) -> Vec<&ReportEntry> {
        let mut ranked: Vec<&ReportEntry> = self.entries.iter().filter(|e| e.result.success).collect();
        ranked.sort_by(|a, b| {
            a.result.iterations.cmp(&b.result.iterations).then_with(|| {
                let ea = a.result.final_error.unwrap_or(f64::INFINITY);
                let eb = b.result.final_error.unwrap_or(f64::INFINITY);
                ea.total_cmp(&eb)
            })
        });
        ranked
    }
}

fn best_by<F>(successes: &[&ReportEntry], metric: F) -> Option<String>
where
    F: Fn(&MethodResult) -> Option<f64>,
{
    successes
        .iter()
        .filter_map(|e| metric(&e.result).filter(|v| !v.is_nan()).map(|v| (e, v)))
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(e, _)| e.name.clone())
}

/// Run every method and time it, keeping input order.
pub fn run_battery<T, F>(methods: &[T], mode: ComparisonMode, solve: F) -> Vec<ReportEntry>
where
    T: Sync,
    F: Fn(&T) -> MethodResult + Sync + Send,
{
    let timed = |method: &T| {
        let start = Instant::now();
        let result = solve(method);
        ReportEntry {
            name: result.method.clone(),
            elapsed: start.elapsed(),
            result,
        }
    };
    match mode {
        ComparisonMode::Sequential => methods.iter().map(timed).collect(),
        ComparisonMode::Parallel => methods.par_iter().map(timed).collect(),
    }
}

/// Run the root-finding battery.
pub fn compare_roots(
    problem: &ScalarRootProblem,
    config: &ConvergenceConfig,
    mode: ComparisonMode,
) -> ComparisonReport {
    let entries = run_battery(ROOT_FINDERS, mode, |m| m.solve(problem, config));
    finish("root", entries)
}

/// Run the linear-system battery.
pub fn compare_linear(
    problem: &LinearSystemProblem,
    config: &ConvergenceConfig,
    mode: ComparisonMode,
) -> ComparisonReport {
    let entries = run_battery(LINEAR_SOLVERS, mode, |m| m.solve(problem, config));
    finish("linear", entries)
}

/// Run the interpolation battery.
pub fn compare_interpolation(
    problem: &InterpolationProblem,
    options: &InterpolationOptions,
    mode: ComparisonMode,
) -> ComparisonReport {
    let entries = run_battery(INTERPOLATORS, mode, |m| m.solve(problem, options));
    finish("interpolation", entries)
}

/// Run the battery matching the problem's category.
///
/// Interpolation problems use default [`InterpolationOptions`].
pub fn compare_problem(problem: &Problem, config: &ConvergenceConfig, mode: ComparisonMode) -> ComparisonReport {
    match problem {
        Problem::ScalarRoot(p) => compare_roots(p, config, mode),
        Problem::LinearSystem(p) => compare_linear(p, config, mode),
        Problem::Interpolation(p) => compare_interpolation(p, &InterpolationOptions::default(), mode),
    }
}

fn finish(category: &str, entries: Vec<ReportEntry>) -> ComparisonReport {
    let report = ComparisonReport::from_entries(category, entries);
    debug!(
        category,
        successes = report.success_count,
        failures = report.failure_count,
        best = ?report.best_by_iteration_count,
        fastest = ?report.fastest,
        "comparison finished"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{ExpressionCompiler, ShuntingCompiler};
    use crate::types::{EngineLimits, NumericError, RootStart, Solution, State, Trace};

    fn converged(name: &str, iterations: usize, error: f64) -> MethodResult {
        let mut trace = Trace::new();
        for k in 0..iterations {
            let metrics = crate::types::ErrorMetrics {
                absolute: Some(error * (iterations - k) as f64),
                relative_current: Some(error),
                ..Default::default()
            };
            trace.push(State::Scalar(1.0), None, metrics);
        }
        MethodResult::converged(name, Solution::Scalar(1.0), error, trace)
    }

    fn entry(result: MethodResult) -> ReportEntry {
        timed_entry(result, 1)
    }

    fn timed_entry(result: MethodResult, micros: u64) -> ReportEntry {
        ReportEntry {
            name: result.method.clone(),
            result,
            elapsed: Duration::from_micros(micros),
        }
    }

    #[test]
    fn test_report_picks_best() {
        let report = ComparisonReport::from_entries(
            "root",
            vec![
                entry(converged("a", 10, 1e-9)),
                entry(converged("b", 4, 1e-7)),
                entry(MethodResult::rejected("c", NumericError::InvalidRelaxationFactor { w: 2.0 })),
            ],
        );
        assert_eq!(report.best_by_error.as_deref(), Some("a"));
        assert_eq!(report.best_by_iteration_count.as_deref(), Some("b"));
        assert_eq!(report.success_count, 2);
        assert_eq!(report.failure_count, 1);
        assert_eq!(report.failures_by_kind.get(&FailureKind::InvalidRelaxationFactor), Some(&1));
        assert_eq!(
            report.best_by_error_variant.get(&ErrorVariant::RelativeCurrent).map(String::as_str),
            Some("a")
        );
        assert!(!report.best_by_error_variant.contains_key(&ErrorVariant::ComponentwiseCurrent));
    }

    #[test]
    fn test_ties_go_to_registration_order() {
        let report = ComparisonReport::from_entries(
            "linear",
            vec![entry(converged("first", 5, 1e-8)), entry(converged("second", 5, 1e-8))],
        );
        assert_eq!(report.best_by_iteration_count.as_deref(), Some("first"));
        assert_eq!(report.best_by_error.as_deref(), Some("first"));
    }

    #[test]
    fn test_no_successes() {
        let report = ComparisonReport::from_entries(
            "root",
            vec![entry(MethodResult::rejected("x", NumericError::InvalidInput("bad".into())))],
        );
        assert!(report.best_by_error.is_none());
        assert!(report.best_by_iteration_count.is_none());
        assert!(report.fastest.is_none());
        assert!(report.best_by_error_variant.is_empty());
        assert!(report.ranking().is_empty());
    }

    #[test]
    fn test_fastest_ignores_failures() {
        let report = ComparisonReport::from_entries(
            "root",
            vec![
                timed_entry(converged("slow", 3, 1e-9), 50),
                timed_entry(MethodResult::rejected("instant", NumericError::InvalidInput("bad".into())), 0),
                timed_entry(converged("quick", 8, 1e-7), 20),
            ],
        );
        assert_eq!(report.fastest.as_deref(), Some("quick"));
        assert_eq!(report.best_by_iteration_count.as_deref(), Some("slow"));
    }

    #[test]
    fn test_non_iterating_battery_has_no_iteration_winner() {
        let report = ComparisonReport::from_entries(
            "interpolation",
            vec![
                timed_entry(converged("first", 0, 1e-12), 9),
                timed_entry(converged("second", 0, 1e-15), 4),
            ],
        );
        assert!(report.best_by_iteration_count.is_none());
        assert_eq!(report.fastest.as_deref(), Some("second"));
        assert_eq!(report.best_by_error.as_deref(), Some("second"));
    }

    #[test]
    fn test_ranking_orders_by_iterations_then_error() {
        let report = ComparisonReport::from_entries(
            "linear",
            vec![
                entry(converged("slow", 9, 1e-9)),
                entry(converged("fast_loose", 3, 1e-6)),
                entry(converged("fast_tight", 3, 1e-8)),
            ],
        );
        let names: Vec<&str> = report.ranking().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["fast_tight", "fast_loose", "slow"]);
    }

    #[test]
    fn test_root_battery_keeps_order_in_parallel() {
        let f = ShuntingCompiler::new().compile("x^2 - 2").unwrap();
        let problem = ScalarRootProblem::new(f, RootStart::bracket(0.0, 2.0)).unwrap();
        let config = ConvergenceConfig::new(1e-8, 100).unwrap();
        let sequential = compare_roots(&problem, &config, ComparisonMode::Sequential);
        let parallel = compare_roots(&problem, &config, ComparisonMode::Parallel);

        let names = |r: &ComparisonReport| r.entries.iter().map(|e| e.name.clone()).collect::<Vec<_>>();
        assert_eq!(names(&sequential), names(&parallel));
        assert_eq!(names(&sequential)[0], "bisection");
        assert_eq!(sequential.entries.len(), 6);
        assert_eq!(sequential.best_by_iteration_count, parallel.best_by_iteration_count);
    }

    #[test]
    fn test_failing_method_does_not_abort_battery() {
        let problem = LinearSystemProblem::new(
            vec![vec![10.0, 1.0], vec![1.0, 10.0]],
            vec![11.0, 11.0],
            &EngineLimits::default(),
        )
        .unwrap()
        .with_relaxation(2.5);
        let report = compare_linear(&problem, &ConvergenceConfig::default(), ComparisonMode::Sequential);
        assert_eq!(report.success_count, 2);
        assert_eq!(report.failure_count, 1);
        assert!(!report.entry("sor").unwrap().result.success);
    }

    #[test]
    fn test_compare_problem_dispatches_on_category() {
        let problem = Problem::Interpolation(
            InterpolationProblem::new(vec![(0.0, 1.0), (1.0, 2.0), (2.0, 5.0)], &EngineLimits::default())
                .unwrap(),
        );
        let report = compare_problem(&problem, &ConvergenceConfig::default(), ComparisonMode::Sequential);
        assert_eq!(report.category, "interpolation");
        assert_eq!(report.entries.len(), 5);
        assert_eq!(report.success_count, 5);
        assert!(report.best_by_iteration_count.is_none());
        assert!(report.fastest.is_some());
    }
}
