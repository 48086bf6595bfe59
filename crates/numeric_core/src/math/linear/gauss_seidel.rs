//! Gauss-Seidel iteration.

use super::{LinearSolver, Matrix, Splitting};
use crate::types::{LinearSystemProblem, NumericError};

/// `x^(k+1) = (D - L)⁻¹U·x^(k) + (D - L)⁻¹·b`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GaussSeidel;

impl LinearSolver for GaussSeidel {
    fn name(&self) -> &'static str {
        "gauss_seidel"
    }

    fn iteration(&self, problem: &LinearSystemProblem) -> Result<(Matrix, Vec<f64>), NumericError> {
        let Splitting { d, l, u } = Splitting::of(problem.a())?;
        let lower_inv = d.sub(&l).inverse()?;
        Ok((lower_inv.mul(&u), lower_inv.mul_vec(problem.b())))
    }
}
