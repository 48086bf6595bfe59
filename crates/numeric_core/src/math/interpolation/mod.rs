//! Polynomial and spline interpolation.
//!
//! This module provides five interpolators behind the [`Interpolator`] trait:
//! - [`Vandermonde`]: power-basis coefficients from the Vandermonde system
//! - [`NewtonDividedDifferences`]: divided-difference table, nested evaluation
//! - [`Lagrange`]: lazy `Σ y_i·L_i(x)` evaluation
//! - [`LinearSpline`]: one line per segment
//! - [`CubicSpline`]: natural or clamped cubic spline
//!
//! Polynomial interpolants are defined for every real `x`. Splines are only
//! defined between the first and last knot; what happens outside is decided
//! by a [`DomainPolicy`].
//!
//! # Example
//!
//! ```
//! use numeric_core::math::interpolation::{DomainPolicy, Interpolator, Lagrange};
//! use numeric_core::types::{EngineLimits, InterpolationProblem};
//!
//! let problem = InterpolationProblem::new(
//!     vec![(0.0, 1.0), (1.0, 3.0), (2.0, 7.0)],
//!     &EngineLimits::default(),
//! ).unwrap();
//! let fitted = Lagrange.fit(&problem).unwrap();
//! assert!((fitted.at(3.0, DomainPolicy::Strict).unwrap() - 13.0).abs() < 1e-12);
//! ```

mod cubic_spline;
mod lagrange;
mod linear_spline;
mod newton;
mod piecewise;
mod polynomial;
mod vandermonde;

pub use cubic_spline::CubicSpline;
pub use lagrange::{Lagrange, LagrangeForm};
pub use linear_spline::LinearSpline;
pub use newton::{NewtonDividedDifferences, NewtonForm};
pub use piecewise::{PiecewisePolynomial, Segment};
pub use polynomial::Polynomial;
pub use vandermonde::Vandermonde;

use crate::types::{
    EngineLimits, InterpolationProblem, MethodResult, NumericError, Solution, Trace,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Behaviour of spline evaluation outside `[min x_i, max x_i]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainPolicy {
    /// Fail with `OutOfDomain`
    #[default]
    Strict,
    /// Evaluate at the nearest end knot
    Clamp,
    /// Extend the end segments
    Extrapolate,
}

impl FromStr for DomainPolicy {
    type Err = NumericError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(DomainPolicy::Strict),
            "clamp" => Ok(DomainPolicy::Clamp),
            "extrapolate" => Ok(DomainPolicy::Extrapolate),
            _ => Err(NumericError::config(
                "domain_policy",
                s,
                "one of: strict, clamp, extrapolate",
            )),
        }
    }
}

/// End conditions of the cubic spline.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplineBoundary {
    /// `S''` vanishes at both ends
    #[default]
    Natural,
    /// Prescribed end slopes
    Clamped {
        /// `S'(x_0)`
        start_slope: f64,
        /// `S'(x_n)`
        end_slope: f64,
    },
}

/// Options of an interpolation run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InterpolationOptions {
    /// Limits applied when the problem is built from raw points
    pub limits: EngineLimits,
    /// Points at which the fitted interpolant is evaluated
    pub evaluation_points: Vec<f64>,
    /// Spline behaviour outside the knots
    pub policy: DomainPolicy,
    /// Cubic spline end conditions
    pub boundary: SplineBoundary,
}

impl InterpolationOptions {
    /// Evaluate the interpolant at these points.
    pub fn with_evaluation_points(mut self, points: Vec<f64>) -> Self {
        self.evaluation_points = points;
        self
    }

    /// Set the domain policy.
    pub fn with_policy(mut self, policy: DomainPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the cubic spline boundary.
    pub fn with_boundary(mut self, boundary: SplineBoundary) -> Self {
        self.boundary = boundary;
        self
    }

    /// Set the engine limits.
    pub fn with_limits(mut self, limits: EngineLimits) -> Self {
        self.limits = limits;
        self
    }
}

/// Fitted interpolant, ready for evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum Interpolant {
    /// Power-basis polynomial
    Power(Polynomial),
    /// Newton form over the divided-difference table
    Newton(NewtonForm),
    /// Lagrange form
    Lagrange(LagrangeForm),
    /// Spline
    Piecewise(PiecewisePolynomial),
}

impl Interpolant {
    /// Evaluate at `x`. Only splines consult `policy`.
    pub fn at(&self, x: f64, policy: DomainPolicy) -> Result<f64, NumericError> {
        match self {
            Interpolant::Power(p) => Ok(p.eval(x)),
            Interpolant::Newton(n) => Ok(n.eval(x)),
            Interpolant::Lagrange(l) => Ok(l.eval(x)),
            Interpolant::Piecewise(s) => s.at(x, policy),
        }
    }

    /// Reported coefficients: power basis for polynomials, per segment for splines.
    pub fn coefficients(&self) -> Coefficients {
        match self {
            Interpolant::Power(p) => Coefficients::PowerBasis(p.clone()),
            Interpolant::Newton(n) => Coefficients::PowerBasis(n.to_power_basis()),
            Interpolant::Lagrange(l) => Coefficients::PowerBasis(l.to_power_basis()),
            Interpolant::Piecewise(s) => Coefficients::Segments(s.clone()),
        }
    }

    /// Human-readable form of the interpolant.
    pub fn symbolic_form(&self) -> String {
        match self {
            Interpolant::Power(p) => p.to_string(),
            Interpolant::Newton(n) => n.to_string(),
            Interpolant::Lagrange(l) => l.to_power_basis().to_string(),
            Interpolant::Piecewise(s) => s.render(),
        }
    }

    /// Polynomial degree, or the degree of each spline piece.
    pub fn degree(&self) -> usize {
        match self {
            Interpolant::Power(p) => p.degree(),
            Interpolant::Newton(n) => n.degree(),
            Interpolant::Lagrange(l) => l.degree(),
            Interpolant::Piecewise(s) => s
                .segments()
                .iter()
                .map(|seg| seg.coefficients.len().saturating_sub(1))
                .max()
                .unwrap_or(0),
        }
    }
}

/// Coefficients as reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Coefficients {
    /// Ascending power basis
    PowerBasis(Polynomial),
    /// Per-segment local coefficients
    Segments(PiecewisePolynomial),
}

/// `(x, p(x))` at a requested evaluation point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Query point
    pub x: f64,
    /// Interpolated value
    pub y: f64,
}

/// Reported interpolation outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interpolation {
    /// Method that produced it
    pub model: String,
    /// Polynomial degree (per piece for splines)
    pub degree: usize,
    /// Coefficients
    pub coefficients: Coefficients,
    /// Text form
    pub symbolic_form: String,
    /// `|y_i - p(x_i)|` per node, in input order
    pub node_residuals: Vec<f64>,
    /// Values at the requested points
    pub evaluations: Vec<Evaluation>,
}

impl Interpolation {
    /// Evaluate the reported coefficients at `x`.
    pub fn at(&self, x: f64, policy: DomainPolicy) -> Result<f64, NumericError> {
        match &self.coefficients {
            Coefficients::PowerBasis(p) => Ok(p.eval(x)),
            Coefficients::Segments(s) => s.at(x, policy),
        }
    }

    /// Largest node residual.
    pub fn max_residual(&self) -> f64 {
        self.node_residuals.iter().copied().fold(0.0, f64::max)
    }
}

impl fmt::Display for Interpolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.model, self.symbolic_form)
    }
}

/// One interpolation method.
pub trait Interpolator: Send + Sync {
    /// Registered method name.
    fn name(&self) -> &'static str;

    /// Fit the nodes.
    fn fit(&self, problem: &InterpolationProblem) -> Result<Interpolant, NumericError>;

    /// Fit honouring run options. Only the cubic spline reads them.
    fn fit_with(
        &self,
        problem: &InterpolationProblem,
        _options: &InterpolationOptions,
    ) -> Result<Interpolant, NumericError> {
        self.fit(problem)
    }

    /// Fit, check the nodes, evaluate the requested points and capture any
    /// failure into the result.
    fn solve(&self, problem: &InterpolationProblem, options: &InterpolationOptions) -> MethodResult {
        run(self, problem, options)
    }
}

/// Registered interpolation battery, in registration order.
pub static INTERPOLATORS: &[&dyn Interpolator] = &[
    &Vandermonde,
    &NewtonDividedDifferences,
    &Lagrange,
    &LinearSpline,
    &CubicSpline,
];

/// Look up a registered method by name.
pub fn find(name: &str) -> Option<&'static dyn Interpolator> {
    let key = crate::math::roots::normalize(name);
    let key = match key.as_str() {
        "newton_divided_differences" | "divided_differences" => "newton",
        "spline_linear" | "linear" => "linear_spline",
        "spline_cubic" | "cubic" | "spline" => "cubic_spline",
        other => other,
    };
    INTERPOLATORS.iter().copied().find(|m| m.name() == key)
}

fn run<I: Interpolator + ?Sized>(
    interpolator: &I,
    problem: &InterpolationProblem,
    options: &InterpolationOptions,
) -> MethodResult {
    let method = interpolator.name();
    let fitted = match interpolator.fit_with(problem, options) {
        Ok(fitted) => fitted,
        Err(err) => {
            debug!(method, error = %err, "interpolation rejected the nodes");
            return MethodResult::rejected(method, err);
        }
    };

    let node_residuals = match problem
        .points()
        .iter()
        .map(|&(x, y)| fitted.at(x, DomainPolicy::Extrapolate).map(|p| (y - p).abs()))
        .collect::<Result<Vec<f64>, NumericError>>()
    {
        Ok(residuals) => residuals,
        Err(err) => return MethodResult::rejected(method, err),
    };

    let mut interpolation = Interpolation {
        model: method.to_string(),
        degree: fitted.degree(),
        coefficients: fitted.coefficients(),
        symbolic_form: fitted.symbolic_form(),
        node_residuals,
        evaluations: Vec::with_capacity(options.evaluation_points.len()),
    };
    let max_residual = interpolation.max_residual();

    for &x in &options.evaluation_points {
        match fitted.at(x, options.policy) {
            Ok(y) => interpolation.evaluations.push(Evaluation { x, y }),
            Err(err) => {
                debug!(method, x, error = %err, "evaluation point rejected");
                return MethodResult::failed(
                    method,
                    err,
                    Some(Solution::Interpolant(interpolation)),
                    Some(max_residual),
                    Trace::new(),
                );
            }
        }
    }

    debug!(method, degree = interpolation.degree, max_residual, "interpolant fitted");
    MethodResult::converged(
        method,
        Solution::Interpolant(interpolation),
        max_residual,
        Trace::new(),
    )
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::types::{EngineLimits, InterpolationProblem};

    pub fn nodes(points: &[(f64, f64)]) -> InterpolationProblem {
        InterpolationProblem::new(points.to_vec(), &EngineLimits::default()).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::nodes;
    use super::*;
    use crate::types::FailureKind;
    use approx::assert_relative_eq;

    #[test]
    fn test_find_with_aliases() {
        assert_eq!(find("spline-cubic").map(|i| i.name()), Some("cubic_spline"));
        assert_eq!(find("Newton").map(|i| i.name()), Some("newton"));
        assert!(find("hermite").is_none());
    }

    #[test]
    fn test_battery_fits_parabola() {
        let problem = nodes(&[(0.0, 0.0), (1.0, 1.0), (2.0, 4.0), (3.0, 9.0)]);
        for method in INTERPOLATORS {
            let result = method.solve(&problem, &InterpolationOptions::default());
            assert!(result.success, "{} failed", method.name());
            assert_eq!(result.iterations, 0);
            assert!(result.final_error.unwrap() < 1e-9, "{}", method.name());
            let fitted = result.interpolation().unwrap();
            assert_eq!(fitted.model, method.name());
            assert_eq!(fitted.node_residuals.len(), 4);
        }
    }

    #[test]
    fn test_evaluations_are_recorded() {
        let problem = nodes(&[(0.0, 1.0), (1.0, 3.0), (2.0, 7.0)]);
        let options = InterpolationOptions::default().with_evaluation_points(vec![0.5, 1.5]);
        let result = Vandermonde.solve(&problem, &options);
        let fitted = result.interpolation().unwrap();
        assert_eq!(fitted.evaluations.len(), 2);
        // x^2 + x + 1
        assert_relative_eq!(fitted.evaluations[0].y, 1.75, epsilon = 1e-12);
        assert_relative_eq!(fitted.at(1.5, DomainPolicy::Strict).unwrap(), 4.75, epsilon = 1e-12);
    }

    #[test]
    fn test_polynomial_ignores_domain_policy() {
        let problem = nodes(&[(0.0, 1.0), (1.0, 3.0)]);
        let options = InterpolationOptions::default().with_evaluation_points(vec![10.0]);
        let result = Lagrange.solve(&problem, &options);
        assert!(result.success);
    }

    #[test]
    fn test_spline_out_of_domain_fails_with_interpolant() {
        let problem = nodes(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)]);
        let options = InterpolationOptions::default().with_evaluation_points(vec![0.5, 3.0]);
        let result = LinearSpline.solve(&problem, &options);
        assert!(!result.success);
        assert_eq!(result.failure_kind(), Some(FailureKind::OutOfDomain));
        assert_eq!(result.interpolation().unwrap().evaluations.len(), 1);

        let clamped = LinearSpline.solve(&problem, &options.clone().with_policy(DomainPolicy::Clamp));
        assert!(clamped.success);
        assert_relative_eq!(clamped.interpolation().unwrap().evaluations[1].y, 0.0);
    }

    #[test]
    fn test_domain_policy_parse() {
        assert_eq!("Clamp".parse::<DomainPolicy>().unwrap(), DomainPolicy::Clamp);
        assert!("wrap".parse::<DomainPolicy>().is_err());
    }
}
