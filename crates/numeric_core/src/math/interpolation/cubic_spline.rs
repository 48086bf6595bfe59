//! Cubic spline interpolation.

use super::linear_spline::sorted_knots;
use super::piecewise::{PiecewisePolynomial, Segment};
use super::{Interpolant, InterpolationOptions, Interpolator, SplineBoundary};
use crate::types::{InterpolationProblem, NumericError};

/// Cubic spline with C² continuity.
///
/// Nodes are sorted by abscissa; a repeated abscissa fails with
/// `UnsortedNodes`. The second derivatives `M_i` at the knots solve a
/// tridiagonal system (Thomas algorithm), after which every piece is
/// `y_i + b_i·dx + (M_i/2)·dx² + ((M_{i+1} - M_i)/(6h_i))·dx³`.
///
/// [`Interpolator::fit`] builds the natural spline; the boundary in
/// [`InterpolationOptions`] selects clamped end slopes instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct CubicSpline;

impl CubicSpline {
    /// Fit with explicit end conditions.
    pub fn fit_boundary(
        &self,
        problem: &InterpolationProblem,
        boundary: SplineBoundary,
    ) -> Result<Interpolant, NumericError> {
        let (xs, ys) = sorted_knots(problem)?;
        let m = second_derivatives(&xs, &ys, boundary);

        let segments = (0..xs.len() - 1)
            .map(|i| {
                let h = xs[i + 1] - xs[i];
                let b = (ys[i + 1] - ys[i]) / h - h * (2.0 * m[i] + m[i + 1]) / 6.0;
                Segment {
                    start: xs[i],
                    end: xs[i + 1],
                    coefficients: vec![ys[i], b, m[i] / 2.0, (m[i + 1] - m[i]) / (6.0 * h)],
                }
            })
            .collect();
        Ok(Interpolant::Piecewise(PiecewisePolynomial::new(segments)))
    }
}

impl Interpolator for CubicSpline {
    fn name(&self) -> &'static str {
        "cubic_spline"
    }

    fn fit(&self, problem: &InterpolationProblem) -> Result<Interpolant, NumericError> {
        self.fit_boundary(problem, SplineBoundary::Natural)
    }

    fn fit_with(
        &self,
        problem: &InterpolationProblem,
        options: &InterpolationOptions,
    ) -> Result<Interpolant, NumericError> {
        self.fit_boundary(problem, options.boundary)
    }
}

/// Knot second derivatives for sorted, distinct `xs`.
fn second_derivatives(xs: &[f64], ys: &[f64], boundary: SplineBoundary) -> Vec<f64> {
    let n = xs.len();
    let h: Vec<f64> = xs.windows(2).map(|w| w[1] - w[0]).collect();
    let slope: Vec<f64> = (0..n - 1).map(|i| (ys[i + 1] - ys[i]) / h[i]).collect();

    // Row i: sub[i]·M_{i-1} + diag[i]·M_i + sup[i]·M_{i+1} = rhs[i]
    let mut sub = vec![0.0; n];
    let mut diag = vec![0.0; n];
    let mut sup = vec![0.0; n];
    let mut rhs = vec![0.0; n];

    for i in 1..n - 1 {
        sub[i] = h[i - 1];
        diag[i] = 2.0 * (h[i - 1] + h[i]);
        sup[i] = h[i];
        rhs[i] = 6.0 * (slope[i] - slope[i - 1]);
    }
    match boundary {
        SplineBoundary::Natural => {
            diag[0] = 1.0;
            diag[n - 1] = 1.0;
        }
        SplineBoundary::Clamped {
            start_slope,
            end_slope,
        } => {
            diag[0] = 2.0 * h[0];
            sup[0] = h[0];
            rhs[0] = 6.0 * (slope[0] - start_slope);
            sub[n - 1] = h[n - 2];
            diag[n - 1] = 2.0 * h[n - 2];
            rhs[n - 1] = 6.0 * (end_slope - slope[n - 2]);
        }
    }

    thomas(&sub, &diag, &sup, &rhs)
}

/// Tridiagonal solve. The spline systems are strictly diagonally dominant,
/// so no pivoting is needed.
fn thomas(sub: &[f64], diag: &[f64], sup: &[f64], rhs: &[f64]) -> Vec<f64> {
    let n = diag.len();
    let mut c_prime = vec![0.0; n];
    let mut d_prime = vec![0.0; n];

    c_prime[0] = sup[0] / diag[0];
    d_prime[0] = rhs[0] / diag[0];
    for i in 1..n {
        let denom = diag[i] - sub[i] * c_prime[i - 1];
        c_prime[i] = sup[i] / denom;
        d_prime[i] = (rhs[i] - sub[i] * d_prime[i - 1]) / denom;
    }

    let mut x = vec![0.0; n];
    x[n - 1] = d_prime[n - 1];
    for i in (0..n - 1).rev() {
        x[i] = d_prime[i] - c_prime[i] * x[i + 1];
    }
    x
}

#[cfg(test)]
mod tests {
    use super::super::test_support::nodes;
    use super::super::{Coefficients, DomainPolicy};
    use super::*;
    use approx::assert_relative_eq;

    // ========================================
    // Natural Spline Tests
    // ========================================

    #[test]
    fn test_passes_through_nodes() {
        let points = [(0.0, 1.0), (1.0, 2.0), (2.5, 0.5), (3.0, 4.0), (4.0, -1.0)];
        let fitted = CubicSpline.fit(&nodes(&points)).unwrap();
        for (x, y) in points {
            assert_relative_eq!(fitted.at(x, DomainPolicy::Strict).unwrap(), y, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_natural_ends_have_zero_curvature() {
        let fitted = CubicSpline
            .fit(&nodes(&[(0.0, 0.0), (1.0, 1.0), (2.0, 4.0), (3.0, 9.0)]))
            .unwrap();
        match fitted.coefficients() {
            Coefficients::Segments(s) => {
                let first = &s.segments()[0];
                assert_relative_eq!(first.coefficients[2], 0.0);
                // S'' at the right end: 2c + 6d·h of the last piece
                let last = s.segments().last().unwrap();
                let h = last.end - last.start;
                assert_relative_eq!(
                    2.0 * last.coefficients[2] + 6.0 * last.coefficients[3] * h,
                    0.0,
                    epsilon = 1e-12
                );
            }
            other => panic!("unexpected coefficients {:?}", other),
        }
    }

    #[test]
    fn test_first_derivative_is_continuous() {
        let fitted = CubicSpline
            .fit(&nodes(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0), (3.0, 1.0)]))
            .unwrap();
        if let Coefficients::Segments(s) = fitted.coefficients() {
            for pair in s.segments().windows(2) {
                let (l, r) = (&pair[0], &pair[1]);
                let h = l.end - l.start;
                let left = l.coefficients[1] + 2.0 * l.coefficients[2] * h + 3.0 * l.coefficients[3] * h * h;
                assert_relative_eq!(left, r.coefficients[1], epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_two_points_give_a_line() {
        let fitted = CubicSpline.fit(&nodes(&[(0.0, 1.0), (2.0, 5.0)])).unwrap();
        assert_relative_eq!(fitted.at(1.0, DomainPolicy::Strict).unwrap(), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_three_points() {
        let fitted = CubicSpline
            .fit(&nodes(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)]))
            .unwrap();
        // symmetric data, symmetric spline
        let a = fitted.at(0.5, DomainPolicy::Strict).unwrap();
        let b = fitted.at(1.5, DomainPolicy::Strict).unwrap();
        assert_relative_eq!(a, b, epsilon = 1e-12);
    }

    // ========================================
    // Clamped Spline Tests
    // ========================================

    #[test]
    fn test_clamped_reproduces_cubic() {
        // a clamped spline reproduces any cubic given its end slopes
        let f = |x: f64| x * x * x - 2.0 * x + 1.0;
        let df = |x: f64| 3.0 * x * x - 2.0;
        let points: Vec<(f64, f64)> = [0.0, 0.5, 1.5, 2.0].iter().map(|&x| (x, f(x))).collect();
        let fitted = CubicSpline
            .fit_boundary(
                &nodes(&points),
                SplineBoundary::Clamped {
                    start_slope: df(0.0),
                    end_slope: df(2.0),
                },
            )
            .unwrap();
        for x in [0.25, 1.0, 1.75] {
            assert_relative_eq!(fitted.at(x, DomainPolicy::Strict).unwrap(), f(x), epsilon = 1e-10);
        }
    }

    #[test]
    fn test_options_select_boundary() {
        let problem = nodes(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)]);
        let options = InterpolationOptions::default().with_boundary(SplineBoundary::Clamped {
            start_slope: 0.0,
            end_slope: 0.0,
        });
        let natural = CubicSpline.fit(&problem).unwrap();
        let clamped = CubicSpline.fit_with(&problem, &options).unwrap();
        assert_ne!(natural, clamped);
    }

    #[test]
    fn test_repeated_node() {
        let err = CubicSpline
            .fit(&nodes(&[(0.0, 0.0), (1.0, 2.0), (0.0, 3.0)]))
            .unwrap_err();
        assert_eq!(err, NumericError::UnsortedNodes { duplicate: 0.0 });
    }
}
