//! Stationary iterative solvers for `A·x = b`.
//!
//! Every method splits `A = D - L - U` (diagonal, negated strict lower,
//! negated strict upper) and iterates `x^(k+1) = M·x^(k) + c`. The spectral
//! radius of `M` is computed once up front and reported; it never stops the
//! iteration.
//!
//! # Example
//!
//! ```
//! use numeric_core::math::linear::{Jacobi, LinearSolver};
//! use numeric_core::types::{ConvergenceConfig, EngineLimits, LinearSystemProblem};
//!
//! let a = vec![vec![10.0, 1.0, 1.0], vec![2.0, 10.0, 1.0], vec![2.0, 2.0, 10.0]];
//! let problem = LinearSystemProblem::new(a, vec![12.0, 13.0, 14.0], &EngineLimits::default()).unwrap();
//!
//! let result = Jacobi.solve(&problem, &ConvergenceConfig::new(1e-6, 100).unwrap());
//! assert!(result.success);
//! assert!(result.converges_by_radius);
//! ```

mod gauss_seidel;
mod jacobi;
mod matrix;
mod sor;
mod spectral;

pub use gauss_seidel::GaussSeidel;
pub use jacobi::Jacobi;
pub use matrix::{Matrix, PIVOT_EPSILON};
pub use sor::{Sor, DEFAULT_RELAXATION};
pub use spectral::{eigenvalue_moduli, eigenvalues, hessenberg, householder_qr, spectral_radius};

use crate::math::error_metrics::{self, norm_inf};
use crate::types::{
    ConvergenceConfig, LinearSystemProblem, MethodResult, NumericError, Solution, State, Trace,
};
use tracing::{debug, trace, warn};

/// `A = D - L - U`.
#[derive(Debug, Clone, PartialEq)]
pub struct Splitting {
    /// Diagonal part
    pub d: Matrix,
    /// Negated strictly lower part
    pub l: Matrix,
    /// Negated strictly upper part
    pub u: Matrix,
}

impl Splitting {
    /// Split a square matrix.
    ///
    /// # Errors
    ///
    /// `SingularDiagonal` listing every 1-based position with a zero diagonal.
    pub fn of(a: &Matrix) -> Result<Self, NumericError> {
        let positions: Vec<usize> = a
            .diagonal()
            .iter()
            .enumerate()
            .filter(|(_, v)| **v == 0.0)
            .map(|(i, _)| i + 1)
            .collect();
        if !positions.is_empty() {
            return Err(NumericError::SingularDiagonal { positions });
        }

        let n = a.rows();
        let mut d = Matrix::zeros(n, n);
        let mut l = Matrix::zeros(n, n);
        let mut u = Matrix::zeros(n, n);
        for i in 0..n {
            for j in 0..n {
                match i.cmp(&j) {
                    std::cmp::Ordering::Equal => d[(i, j)] = a[(i, j)],
                    std::cmp::Ordering::Greater => l[(i, j)] = -a[(i, j)],
                    std::cmp::Ordering::Less => u[(i, j)] = -a[(i, j)],
                }
            }
        }
        Ok(Self { d, l, u })
    }
}

/// One stationary iterative method.
pub trait LinearSolver: Send + Sync {
    /// Registered method name.
    fn name(&self) -> &'static str;

    /// Iteration matrix `M` and vector `c`.
    fn iteration(&self, problem: &LinearSystemProblem) -> Result<(Matrix, Vec<f64>), NumericError>;

    /// Run the method and capture any failure into the result.
    fn solve(&self, problem: &LinearSystemProblem, config: &ConvergenceConfig) -> MethodResult {
        let dominant = is_diagonally_dominant(problem.a());
        let mut result = run(self, problem, config);
        result.diagonally_dominant = Some(dominant);
        result
    }
}

/// Registered linear-system battery, in registration order.
pub static LINEAR_SOLVERS: &[&dyn LinearSolver] = &[&Jacobi, &GaussSeidel, &Sor];

/// Look up a registered method by name.
pub fn find(name: &str) -> Option<&'static dyn LinearSolver> {
    let key = crate::math::roots::normalize(name);
    let key = match key.as_str() {
        "seidel" | "gaussseidel" => "gauss_seidel",
        "successive_over_relaxation" => "sor",
        other => other,
    };
    LINEAR_SOLVERS.iter().copied().find(|m| m.name() == key)
}

/// Strict row diagonal dominance: `|a_ii| > Σ_{j≠i} |a_ij|` for every row.
pub fn is_diagonally_dominant(a: &Matrix) -> bool {
    (0..a.rows()).all(|i| {
        let off: f64 = a
            .row(i)
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .map(|(_, v)| v.abs())
            .sum();
        a[(i, i)].abs() > off
    })
}

/// `‖b - A·x‖∞`.
pub fn residual_norm(a: &Matrix, b: &[f64], x: &[f64]) -> f64 {
    let ax = a.mul_vec(x);
    let r: Vec<f64> = b.iter().zip(&ax).map(|(bi, axi)| bi - axi).collect();
    norm_inf(&r)
}

fn run<S: LinearSolver + ?Sized>(
    solver: &S,
    problem: &LinearSystemProblem,
    config: &ConvergenceConfig,
) -> MethodResult {
    let method = solver.name();
    if let Err(err) = config.validate() {
        return MethodResult::rejected(method, err);
    }
    let (m, c) = match solver.iteration(problem) {
        Ok(parts) => parts,
        Err(err) => {
            debug!(method, error = %err, "linear solver rejected the system");
            return MethodResult::rejected(method, err);
        }
    };

    let radius = spectral_radius(&m);
    if radius >= 1.0 {
        warn!(method, radius, "spectral radius >= 1, iteration may not converge");
    }

    let mut trace_log = Trace::new();
    let mut x = problem.x0().to_vec();
    let mut last_error = None;
    let outcome: Result<(), NumericError> = loop {
        let mut next = m.mul_vec(&x);
        for (xi, ci) in next.iter_mut().zip(&c) {
            *xi += ci;
        }
        let errors = error_metrics::vector_errors(&x, &next);
        let residual = residual_norm(problem.a(), problem.b(), &next);
        let kept = error_metrics::retain(errors, config);
        last_error = error_metrics::stopping_error(&kept, Some(residual), config.error_kind).or(last_error);
        x = next;
        let index = trace_log.push(State::Vector(x.clone()), Some(residual), kept);
        trace!(method, iteration = index, error = ?last_error, residual, "linear step");

        let magnitude = norm_inf(&x);
        if x.iter().any(|v| !v.is_finite()) || magnitude > config.divergence_bound {
            break Err(NumericError::Diverged {
                iteration: index,
                magnitude,
            });
        }
        if residual == 0.0 || error_metrics::meets_tolerance(&kept, Some(residual), config) {
            break Ok(());
        }
        if index >= config.max_iterations {
            break Err(NumericError::MaxIterationsExceeded {
                iterations: index,
                last_error,
            });
        }
    };

    let result = match outcome {
        Ok(()) => {
            debug!(method, iterations = trace_log.len(), radius, "linear system solved");
            MethodResult::converged(
                method,
                Solution::Vector(x),
                last_error.unwrap_or(0.0),
                trace_log,
            )
        }
        Err(err) => {
            debug!(method, iterations = trace_log.len(), error = %err, "linear solver failed");
            MethodResult::failed(method, err, Some(Solution::Vector(x)), last_error, trace_log)
        }
    };
    result.with_spectral_radius(radius)
}


#[cfg(test)]
mod tests {
    use super::test_support::{sample, system};
    use super::*;
    use crate::types::FailureKind;
    use approx::assert_relative_eq;

    #[test]
    fn test_splitting_signs() {
        let s = Splitting::of(sample().a()).unwrap();
        assert_eq!(s.d[(1, 1)], 10.0);
        assert_eq!(s.l[(1, 0)], -2.0);
        assert_eq!(s.u[(0, 2)], -1.0);
        assert_eq!(s.l[(0, 1)], 0.0);
        // D - L - U == A
        let back = s.d.sub(&s.l).sub(&s.u);
        assert_eq!(&back, sample().a());
    }

    #[test]
    fn test_zero_diagonal_positions() {
        let p = system(vec![vec![0.0, 1.0], vec![1.0, 0.0]], vec![1.0, 1.0]);
        let err = Splitting::of(p.a()).unwrap_err();
        assert_eq!(err, NumericError::SingularDiagonal { positions: vec![1, 2] });
    }

    #[test]
    fn test_diagonal_dominance() {
        assert!(is_diagonally_dominant(sample().a()));
        let weak = system(vec![vec![1.0, 1.0], vec![1.0, 2.0]], vec![1.0, 1.0]);
        assert!(!is_diagonally_dominant(weak.a()));
    }

    #[test]
    fn test_residual_norm() {
        assert_eq!(residual_norm(sample().a(), sample().b(), &[1.0, 1.0, 1.0]), 0.0);
        assert_eq!(residual_norm(sample().a(), sample().b(), &[0.0, 0.0, 0.0]), 14.0);
    }

    #[test]
    fn test_find() {
        assert_eq!(find("Gauss-Seidel").map(|s| s.name()), Some("gauss_seidel"));
        assert_eq!(find("SOR").map(|s| s.name()), Some("sor"));
        assert!(find("conjugate_gradient").is_none());
    }

    #[test]
    fn test_singular_diagonal_is_captured() {
        let p = system(vec![vec![1.0, 2.0], vec![3.0, 0.0]], vec![1.0, 1.0]);
        for solver in LINEAR_SOLVERS.iter().filter(|s| s.name() != "sor") {
            let result = solver.solve(&p, &ConvergenceConfig::default());
            assert_eq!(result.failure_kind(), Some(FailureKind::SingularDiagonal));
            assert_eq!(result.diagonally_dominant, Some(false));
            assert!(result.spectral_radius.is_none());
        }
    }

    #[test]
    fn test_all_variants_retained_per_step() {
        let result = Jacobi.solve(&sample(), &ConvergenceConfig::new(1e-6, 100).unwrap());
        let first = &result.trace[0].errors;
        assert!(first.absolute.is_some());
        assert!(first.relative_current.is_some());
        assert!(first.relative_previous.is_some());
        assert!(first.componentwise_current.is_some());
        assert!(first.componentwise_previous.is_some());
        assert!(result.trace.iter().all(|r| r.residual.is_some()));
    }

    #[test]
    fn test_diagonally_dominant_errors_decrease() {
        let config = ConvergenceConfig::new(1e-10, 200).unwrap();
        for solver in LINEAR_SOLVERS {
            let result = solver.solve(&sample(), &config);
            assert!(result.success, "{} failed", solver.name());
            assert!(result.spectral_radius.unwrap() < 1.0);
            let errors: Vec<f64> = result
                .trace
                .iter()
                .filter_map(|r| r.errors.absolute)
                .collect();
            assert!(errors.last().unwrap() < errors.first().unwrap());
        }
    }

    #[test]
    fn test_jacobi_steps_contract() {
        // ||M||inf = 0.4 for this system, so every step shrinks
        let config = ConvergenceConfig::new(1e-8, 200).unwrap();
        let result = Jacobi.solve(&sample(), &config);
        let errors: Vec<f64> = result
            .trace
            .iter()
            .filter_map(|r| r.errors.absolute)
            .filter(|e| *e > 1e-13)
            .collect();
        for pair in errors.windows(2) {
            assert!(pair[1] < pair[0], "{:?}", errors);
        }
    }

    #[test]
    fn test_max_iterations_keeps_last_iterate() {
        let config = ConvergenceConfig::new(1e-12, 3).unwrap();
        let result = Jacobi.solve(&sample(), &config);
        assert!(!result.success);
        assert_eq!(result.failure_kind(), Some(FailureKind::MaxIterationsExceeded));
        assert_eq!(result.iterations, 3);
        assert!(result.vector_solution().is_some());
        assert!(result.spectral_radius.is_some());
    }

    #[test]
    fn test_divergent_system_still_iterates() {
        // rho(M) > 1 for Jacobi here, but the engine runs anyway
        let p = system(vec![vec![1.0, 3.0], vec![3.0, 1.0]], vec![4.0, 4.0]);
        let result = Jacobi.solve(&p, &ConvergenceConfig::new(1e-6, 20).unwrap());
        assert!(!result.success);
        assert!(!result.converges_by_radius);
        assert!(result.spectral_radius.unwrap() > 1.0);
        assert!(!result.trace.is_empty());
    }

    #[test]
    fn test_cyclic_jacobi_matrix_reports_divergence() {
        // M_J is a scaled cyclic permutation: all three eigenvalues have modulus 1.5
        let p = system(
            vec![vec![1.0, 0.0, -1.5], vec![-1.5, 1.0, 0.0], vec![0.0, -1.5, 1.0]],
            vec![1.0, 1.0, 1.0],
        );
        let result = Jacobi.solve(&p, &ConvergenceConfig::new(1e-6, 60).unwrap());
        assert!(!result.success);
        assert!(!result.converges_by_radius);
        assert_relative_eq!(result.spectral_radius.unwrap(), 1.5, epsilon = 1e-9);
    }
}
