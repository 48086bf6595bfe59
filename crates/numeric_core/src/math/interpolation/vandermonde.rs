//! Interpolation through the Vandermonde system.

use super::{Interpolant, Interpolator, Polynomial};
use crate::math::linear::Matrix;
use crate::types::{InterpolationProblem, NumericError};

/// Solves `V·c = y` with `V[i][j] = x_i^j` by Gaussian elimination with
/// partial pivoting. A repeated node makes `V` singular.
#[derive(Debug, Clone, Copy, Default)]
pub struct Vandermonde;

impl Vandermonde {
    /// The Vandermonde matrix of the nodes, ascending powers.
    pub fn matrix(xs: &[f64]) -> Matrix {
        let n = xs.len();
        let mut v = Matrix::zeros(n, n);
        for (i, &x) in xs.iter().enumerate() {
            let mut power = 1.0;
            for j in 0..n {
                v[(i, j)] = power;
                power *= x;
            }
        }
        v
    }
}

impl Interpolator for Vandermonde {
    fn name(&self) -> &'static str {
        "vandermonde"
    }

    fn fit(&self, problem: &InterpolationProblem) -> Result<Interpolant, NumericError> {
        if let Some(duplicate) = problem.first_duplicate() {
            return Err(NumericError::SingularVandermonde { duplicate });
        }
        let coefficients = Self::matrix(&problem.xs()).solve(&problem.ys())?;
        Ok(Interpolant::Power(Polynomial::new(coefficients)))
    }
}
