//! Newton divided differences.

use super::polynomial::{join_terms, shifted_variable, DISPLAY_CUTOFF};
use super::{Interpolant, Interpolator, Polynomial};
use crate::types::{InterpolationProblem, NumericError};
use std::fmt;

/// Newton form `a_0 + a_1(x - x_0) + a_2(x - x_0)(x - x_1) + ...`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewtonForm {
    nodes: Vec<f64>,
    /// `table[j][i]` is the j-th divided difference ending at node `i`
    table: Vec<Vec<f64>>,
}

impl NewtonForm {
    /// Build the divided-difference table.
    ///
    /// # Errors
    ///
    /// `DivisionByZero` when two nodes coincide.
    pub fn new(nodes: Vec<f64>, values: Vec<f64>) -> Result<Self, NumericError> {
        let n = nodes.len();
        let mut table = vec![values];
        for order in 1..n {
            let prev = &table[order - 1];
            let mut column = vec![0.0; n];
            for i in order..n {
                let span = nodes[i] - nodes[i - order];
                if span == 0.0 {
                    return Err(NumericError::division_by_zero(
                        format!("x_{} - x_{}", i, i - order),
                        span,
                        nodes[i],
                    ));
                }
                column[i] = (prev[i] - prev[i - 1]) / span;
            }
            table.push(column);
        }
        Ok(Self { nodes, table })
    }

    /// Newton coefficients `a_k = f[x_0, ..., x_k]`.
    pub fn coefficients(&self) -> Vec<f64> {
        (0..self.nodes.len()).map(|k| self.table[k][k]).collect()
    }

    /// Full table, one column per order.
    pub fn table(&self) -> &[Vec<f64>] {
        &self.table
    }

    /// Degree `n - 1`.
    pub fn degree(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    /// Nested evaluation.
    pub fn eval(&self, x: f64) -> f64 {
        let a = self.coefficients();
        let n = a.len();
        (0..n.saturating_sub(1))
            .rev()
            .fold(a[n - 1], |acc, k| acc * (x - self.nodes[k]) + a[k])
    }

    /// Expand into the power basis.
    pub fn to_power_basis(&self) -> Polynomial {
        let mut result = Polynomial::constant(0.0);
        let mut basis = Polynomial::constant(1.0);
        for (k, a) in self.coefficients().iter().enumerate() {
            result = result.add_scaled(&basis, *a);
            basis = basis.mul_linear(self.nodes[k]);
        }
        result
    }
}

impl fmt::Display for NewtonForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let a = self.coefficients();
        let mut terms = vec![format!("{:.6}", a[0])];
        for (k, coefficient) in a.iter().enumerate().skip(1) {
            if coefficient.abs() <= DISPLAY_CUTOFF {
                continue;
            }
            let product: String = self.nodes[..k].iter().map(|x| shifted_variable(*x)).collect();
            terms.push(format!("{:.6}{}", coefficient, product));
        }
        f.write_str(&join_terms(&terms))
    }
}

/// Newton divided-difference interpolation.
#[derive(Debug, Clone, Copy, Default)]
pub struct NewtonDividedDifferences;

impl Interpolator for NewtonDividedDifferences {
    fn name(&self) -> &'static str {
        "newton"
    }

    fn fit(&self, problem: &InterpolationProblem) -> Result<Interpolant, NumericError> {
        Ok(Interpolant::Newton(NewtonForm::new(problem.xs(), problem.ys())?))
    }
}
