//! Piecewise-linear interpolation.

use super::piecewise::{PiecewisePolynomial, Segment};
use super::{Interpolant, Interpolator};
use crate::types::{InterpolationProblem, NumericError};

/// Straight line between consecutive sorted nodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearSpline;

/// Sort the nodes and reject repeated abscissae.
pub(super) fn sorted_knots(problem: &InterpolationProblem) -> Result<(Vec<f64>, Vec<f64>), NumericError> {
    if let Some(duplicate) = problem.first_duplicate() {
        return Err(NumericError::UnsortedNodes { duplicate });
    }
    Ok(problem.sorted_points().into_iter().unzip())
}

impl Interpolator for LinearSpline {
    fn name(&self) -> &'static str {
        "linear_spline"
    }

    fn fit(&self, problem: &InterpolationProblem) -> Result<Interpolant, NumericError> {
        let (xs, ys) = sorted_knots(problem)?;
        let segments = xs
            .windows(2)
            .zip(ys.windows(2))
            .map(|(x, y)| Segment {
                start: x[0],
                end: x[1],
                coefficients: vec![y[0], (y[1] - y[0]) / (x[1] - x[0])],
            })
            .collect();
        Ok(Interpolant::Piecewise(PiecewisePolynomial::new(segments)))
    }
}
