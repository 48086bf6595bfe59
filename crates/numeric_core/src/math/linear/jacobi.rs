//! Jacobi iteration.

use super::{LinearSolver, Matrix, Splitting};
use crate::types::{LinearSystemProblem, NumericError};

/// `x^(k+1) = D⁻¹(L + U)·x^(k) + D⁻¹·b`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Jacobi;

impl LinearSolver for Jacobi {
    fn name(&self) -> &'static str {
        "jacobi"
    }

    fn iteration(&self, problem: &LinearSystemProblem) -> Result<(Matrix, Vec<f64>), NumericError> {
        let Splitting { d, l, u } = Splitting::of(problem.a())?;
        // D is diagonal and checked non-zero, invert it entrywise
        let n = d.rows();
        let mut d_inv = Matrix::zeros(n, n);
        for i in 0..n {
            d_inv[(i, i)] = 1.0 / d[(i, i)];
        }
        let m = d_inv.mul(&l.add(&u));
        let c = d_inv.mul_vec(problem.b());
        Ok((m, c))
    }
}
