//! Lagrange interpolation.

use super::{Interpolant, Interpolator, Polynomial};
use crate::types::{InterpolationProblem, NumericError};

/// `Σ y_i·L_i(x)` with `L_i(x) = Π_{j≠i} (x - x_j)/(x_i - x_j)`.
///
/// Evaluation works directly on the nodes; the power basis is only built
/// for reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct LagrangeForm {
    nodes: Vec<f64>,
    values: Vec<f64>,
    /// `Π_{j≠i} (x_i - x_j)`
    denominators: Vec<f64>,
}

impl LagrangeForm {
    /// Precompute the basis denominators.
    ///
    /// # Errors
    ///
    /// `DivisionByZero` when two nodes coincide.
    pub fn new(nodes: Vec<f64>, values: Vec<f64>) -> Result<Self, NumericError> {
        let mut denominators = Vec::with_capacity(nodes.len());
        for (i, xi) in nodes.iter().enumerate() {
            let den: f64 = nodes
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, xj)| xi - xj)
                .product();
            if den == 0.0 {
                return Err(NumericError::division_by_zero(
                    format!("denominator of L_{}", i),
                    den,
                    *xi,
                ));
            }
            denominators.push(den);
        }
        Ok(Self {
            nodes,
            values,
            denominators,
        })
    }

    /// Degree `n - 1`.
    pub fn degree(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    /// `Σ y_i·L_i(x)`.
    pub fn eval(&self, x: f64) -> f64 {
        (0..self.nodes.len())
            .map(|i| {
                let numerator: f64 = self
                    .nodes
                    .iter()
                    .enumerate()
                    .filter(|(j, _)| *j != i)
                    .map(|(_, xj)| x - xj)
                    .product();
                self.values[i] * numerator / self.denominators[i]
            })
            .sum()
    }

    /// Expand into the power basis.
    pub fn to_power_basis(&self) -> Polynomial {
        let mut result = Polynomial::new(vec![0.0; self.nodes.len()]);
        for i in 0..self.nodes.len() {
            let basis = self
                .nodes
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .fold(Polynomial::constant(1.0), |acc, (_, xj)| acc.mul_linear(*xj));
            result = result.add_scaled(&basis, self.values[i] / self.denominators[i]);
        }
        result
    }
}

/// Lagrange interpolation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lagrange;

impl Interpolator for Lagrange {
    fn name(&self) -> &'static str {
        "lagrange"
    }

    fn fit(&self, problem: &InterpolationProblem) -> Result<Interpolant, NumericError> {
        Ok(Interpolant::Lagrange(LagrangeForm::new(problem.xs(), problem.ys())?))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::nodes;
    use super::*;
    use crate::types::FailureKind;
    use approx::assert_relative_eq;

    #[test]
    fn test_lagrange_reproduces_nodes() {
        let form = LagrangeForm::new(vec![-1.0, 0.5, 2.0, 3.0], vec![2.0, -1.0, 0.0, 4.0]).unwrap();
        assert_relative_eq!(form.eval(-1.0), 2.0, epsilon = 1e-12);
        assert_relative_eq!(form.eval(0.5), -1.0, epsilon = 1e-12);
        assert_relative_eq!(form.eval(3.0), 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_power_basis_matches_lazy_evaluation() {
        let form = LagrangeForm::new(vec![0.0, 1.0, 3.0], vec![1.0, 2.0, 10.0]).unwrap();
        let p = form.to_power_basis();
        for x in [-2.0, 0.25, 2.0, 5.0] {
            assert_relative_eq!(p.eval(x), form.eval(x), epsilon = 1e-10);
        }
    }

    #[test]
    fn test_repeated_node_divides_by_zero() {
        let result = Lagrange.solve(&nodes(&[(2.0, 1.0), (2.0, 5.0), (3.0, 0.0)]), &Default::default());
        assert_eq!(result.failure_kind(), Some(FailureKind::DivisionByZero));
    }
}
