//! Successive over-relaxation.

use super::{LinearSolver, Matrix, Splitting};
use crate::types::{LinearSystemProblem, NumericError};

/// Relaxation factor used when the problem does not set one.
pub const DEFAULT_RELAXATION: f64 = 1.5;

/// `x^(k+1) = (D - wL)⁻¹((1 - w)D + wU)·x^(k) + w(D - wL)⁻¹·b`.
///
/// The factor comes from [`LinearSystemProblem::relaxation`] and must lie in
/// the open interval (0, 2). `w = 1` reduces to Gauss-Seidel.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sor;

impl LinearSolver for Sor {
    fn name(&self) -> &'static str {
        "sor"
    }

    fn iteration(&self, problem: &LinearSystemProblem) -> Result<(Matrix, Vec<f64>), NumericError> {
        let w = problem.relaxation().unwrap_or(DEFAULT_RELAXATION);
        if !(w > 0.0 && w < 2.0) {
            return Err(NumericError::InvalidRelaxationFactor { w });
        }
        let Splitting { d, l, u } = Splitting::of(problem.a())?;
        let lower_inv = d.sub(&l.scale(w)).inverse()?;
        let m = lower_inv.mul(&d.scale(1.0 - w).add(&u.scale(w)));
        let c: Vec<f64> = lower_inv.mul_vec(problem.b()).into_iter().map(|v| w * v).collect();
        Ok((m, c))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{sample, system};
    use super::super::GaussSeidel;
    use super::*;
    use crate::types::{ConvergenceConfig, FailureKind};
    use approx::assert_relative_eq;

    #[test]
    fn test_sor_sample_system() {
        let config = ConvergenceConfig::new(1e-6, 100).unwrap();
        let result = Sor.solve(&sample().with_relaxation(1.1), &config);
        assert!(result.success);
        for xi in result.vector_solution().unwrap() {
            assert_relative_eq!(*xi, 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_sor_default_relaxation() {
        let result = Sor.solve(&sample(), &ConvergenceConfig::new(1e-6, 200).unwrap());
        assert!(result.success);
    }

    #[test]
    fn test_sor_rejects_w_outside_open_interval() {
        for w in [0.0, 2.0, -0.5, 2.5, f64::NAN] {
            let result = Sor.solve(&sample().with_relaxation(w), &ConvergenceConfig::default());
            assert!(!result.success);
            assert_eq!(result.failure_kind(), Some(FailureKind::InvalidRelaxationFactor));
            assert!(result.trace.is_empty());
            assert!(result.failure.as_ref().unwrap().reason.contains("0 < w < 2"));
        }
    }

    #[test]
    fn test_relaxation_checked_before_diagonal() {
        let p = system(vec![vec![0.0, 1.0], vec![1.0, 1.0]], vec![1.0, 1.0]).with_relaxation(2.0);
        let result = Sor.solve(&p, &ConvergenceConfig::default());
        assert_eq!(result.failure_kind(), Some(FailureKind::InvalidRelaxationFactor));
    }

    #[test]
    fn test_w_one_matches_gauss_seidel() {
        let p = sample().with_relaxation(1.0);
        let (m_sor, c_sor) = Sor.iteration(&p).unwrap();
        let (m_gs, c_gs) = GaussSeidel.iteration(&p).unwrap();
        for i in 0..3 {
            assert_relative_eq!(c_sor[i], c_gs[i], epsilon = 1e-14);
            for j in 0..3 {
                assert_relative_eq!(m_sor[(i, j)], m_gs[(i, j)], epsilon = 1e-14);
            }
        }
    }
}
