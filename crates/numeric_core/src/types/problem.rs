//! Immutable, validated problem definitions.
//!
//! Shapes are checked once at construction so the engines can assume
//! consistent dimensions. Method-specific requirements (a bracket for
//! bisection, `0 < w < 2` for SOR, distinct nodes for Vandermonde) are left to
//! the methods, which report them with their own failure kind.

use super::{EngineLimits, NumericError};
use crate::expr::Callable;
use crate::math::linear::Matrix;
use std::sync::Arc;

/// Starting information for a scalar root search.
///
/// At least a bracket or an initial guess is required.
///
/// # Examples
/// ```
/// use numeric_core::types::RootStart;
///
/// let start = RootStart::bracket(0.0, 2.0);
/// assert_eq!(start.initial_guess(), Some(1.0));
///
/// let start = RootStart::guesses(1.0, 1.5);
/// assert_eq!(start.secant_pair(), Some((1.0, 1.5)));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RootStart {
    /// Sign-change interval `[a, b]`
    pub bracket: Option<(f64, f64)>,
    /// Initial guess
    pub x0: Option<f64>,
    /// Second initial guess (secant)
    pub x1: Option<f64>,
}

impl RootStart {
    /// Start from a bracket only.
    pub fn bracket(a: f64, b: f64) -> Self {
        Self {
            bracket: Some((a, b)),
            ..Self::default()
        }
    }

    /// Start from one guess.
    pub fn guess(x0: f64) -> Self {
        Self {
            x0: Some(x0),
            ..Self::default()
        }
    }

    /// Start from two guesses.
    pub fn guesses(x0: f64, x1: f64) -> Self {
        Self {
            x0: Some(x0),
            x1: Some(x1),
            ..Self::default()
        }
    }

    /// Add an explicit initial guess.
    pub fn with_guess(mut self, x0: f64) -> Self {
        self.x0 = Some(x0);
        self
    }

    /// `x0`, or the bracket midpoint.
    pub fn initial_guess(&self) -> Option<f64> {
        self.x0
            .or_else(|| self.bracket.map(|(a, b)| a + (b - a) / 2.0))
    }

    /// `(x0, x1)`, or the bracket endpoints.
    pub fn secant_pair(&self) -> Option<(f64, f64)> {
        match (self.x0, self.x1, self.bracket) {
            (Some(x0), Some(x1), _) => Some((x0, x1)),
            (_, _, Some((a, b))) => Some((a, b)),
            _ => None,
        }
    }

    fn validate(&self) -> Result<(), NumericError> {
        if self.bracket.is_none() && self.x0.is_none() {
            return Err(NumericError::InvalidInput(
                "a bracket [a, b] or an initial guess x0 is required (e.g. a = 0, b = 2 or x0 = 1)"
                    .to_string(),
            ));
        }
        if let Some((a, b)) = self.bracket {
            if !a.is_finite() || !b.is_finite() {
                return Err(NumericError::InvalidInput(format!(
                    "bracket endpoints must be finite, got [{}, {}]",
                    a, b
                )));
            }
            if a == b {
                return Err(NumericError::InvalidInput(format!(
                    "bracket endpoints must differ, got [{}, {}] (e.g. [0, 2])",
                    a, b
                )));
            }
        }
        for (name, value) in [("x0", self.x0), ("x1", self.x1)] {
            if let Some(v) = value {
                if !v.is_finite() {
                    return Err(NumericError::InvalidInput(format!(
                        "{} must be finite, got {}",
                        name, v
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Scalar equation `f(x) = 0` with optional derivatives and starting data.
#[derive(Debug, Clone)]
pub struct ScalarRootProblem {
    f: Arc<dyn Callable>,
    df: Option<Arc<dyn Callable>>,
    d2f: Option<Arc<dyn Callable>>,
    g: Option<Arc<dyn Callable>>,
    start: RootStart,
    multiplicity: Option<u32>,
}

impl ScalarRootProblem {
    /// Create a problem. Brackets are stored with `a < b`.
    pub fn new(f: Arc<dyn Callable>, start: RootStart) -> Result<Self, NumericError> {
        start.validate()?;
        let mut start = start;
        if let Some((a, b)) = start.bracket {
            if a > b {
                start.bracket = Some((b, a));
            }
        }
        Ok(Self {
            f,
            df: None,
            d2f: None,
            g: None,
            start,
            multiplicity: None,
        })
    }

    /// Supply `f'` explicitly.
    pub fn with_derivative(mut self, df: Arc<dyn Callable>) -> Self {
        self.df = Some(df);
        self
    }

    /// Supply `f''` explicitly.
    pub fn with_second_derivative(mut self, d2f: Arc<dyn Callable>) -> Self {
        self.d2f = Some(d2f);
        self
    }

    /// Supply the fixed-point iteration function `g`.
    pub fn with_iteration_function(mut self, g: Arc<dyn Callable>) -> Self {
        self.g = Some(g);
        self
    }

    /// Declare the multiplicity of the sought root.
    pub fn with_multiplicity(mut self, m: u32) -> Result<Self, NumericError> {
        if m == 0 {
            return Err(NumericError::InvalidInput(
                "multiplicity must be a positive integer, got 0 (e.g. m = 2)".to_string(),
            ));
        }
        self.multiplicity = Some(m);
        Ok(self)
    }

    /// The function.
    pub fn f(&self) -> &Arc<dyn Callable> {
        &self.f
    }

    /// Explicit `f'`, if supplied.
    pub fn df(&self) -> Option<&Arc<dyn Callable>> {
        self.df.as_ref()
    }

    /// Explicit `f''`, if supplied.
    pub fn d2f(&self) -> Option<&Arc<dyn Callable>> {
        self.d2f.as_ref()
    }

    /// Explicit `g`, if supplied.
    pub fn g(&self) -> Option<&Arc<dyn Callable>> {
        self.g.as_ref()
    }

    /// Starting data.
    pub fn start(&self) -> &RootStart {
        &self.start
    }

    /// Bracket with `a < b`.
    pub fn bracket(&self) -> Option<(f64, f64)> {
        self.start.bracket
    }

    /// Declared multiplicity.
    pub fn multiplicity(&self) -> Option<u32> {
        self.multiplicity
    }
}

/// `A·x = b` with starting vector and optional SOR factor.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearSystemProblem {
    a: Matrix,
    b: Vec<f64>,
    x0: Vec<f64>,
    w: Option<f64>,
}

impl LinearSystemProblem {
    /// Create a problem with `x0 = 0`.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` for ragged or non-square `A`, a `b` of the wrong
    /// length, or `n` outside `2..=limits.max_dimension`; `InvalidInput` for
    /// non-finite entries.
    ///
    /// # Examples
    /// ```
    /// use numeric_core::types::{EngineLimits, LinearSystemProblem};
    ///
    /// let a = vec![vec![4.0, 1.0], vec![1.0, 3.0]];
    /// let problem = LinearSystemProblem::new(a, vec![1.0, 2.0], &EngineLimits::default()).unwrap();
    /// assert_eq!(problem.dimension(), 2);
    /// assert_eq!(problem.x0(), &[0.0, 0.0]);
    /// ```
    pub fn new(
        rows: Vec<Vec<f64>>,
        b: Vec<f64>,
        limits: &EngineLimits,
    ) -> Result<Self, NumericError> {
        let n = rows.len();
        if n < 2 || n > limits.max_dimension {
            return Err(NumericError::dimension(
                "matrix A",
                format!("between 2 and {} rows", limits.max_dimension),
                format!("{} rows", n),
            ));
        }
        for (i, row) in rows.iter().enumerate() {
            if row.len() != n {
                return Err(NumericError::dimension(
                    format!("row {} of matrix A", i + 1),
                    format!("{} columns (square {}x{})", n, n, n),
                    format!("{} columns", row.len()),
                ));
            }
        }
        if b.len() != n {
            return Err(NumericError::dimension(
                "vector b",
                format!("{} entries", n),
                format!("{} entries", b.len()),
            ));
        }
        check_finite("matrix A", rows.iter().flatten().copied())?;
        check_finite("vector b", b.iter().copied())?;

        Ok(Self {
            a: Matrix::from_rows(&rows)?,
            b,
            x0: vec![0.0; n],
            w: None,
        })
    }

    /// Replace the starting vector.
    pub fn with_initial_guess(mut self, x0: Vec<f64>) -> Result<Self, NumericError> {
        if x0.len() != self.dimension() {
            return Err(NumericError::dimension(
                "initial guess x0",
                format!("{} entries", self.dimension()),
                format!("{} entries", x0.len()),
            ));
        }
        check_finite("initial guess x0", x0.iter().copied())?;
        self.x0 = x0;
        Ok(self)
    }

    /// Set the relaxation factor. Its range is checked by SOR.
    pub fn with_relaxation(mut self, w: f64) -> Self {
        self.w = Some(w);
        self
    }

    /// System matrix.
    pub fn a(&self) -> &Matrix {
        &self.a
    }

    /// Right-hand side.
    pub fn b(&self) -> &[f64] {
        &self.b
    }

    /// Starting vector.
    pub fn x0(&self) -> &[f64] {
        &self.x0
    }

    /// Relaxation factor, if set.
    pub fn relaxation(&self) -> Option<f64> {
        self.w
    }

    /// `n`.
    pub fn dimension(&self) -> usize {
        self.b.len()
    }
}

/// Interpolation nodes `(x_i, y_i)` in the order given.
#[derive(Debug, Clone, PartialEq)]
pub struct InterpolationProblem {
    points: Vec<(f64, f64)>,
}

impl InterpolationProblem {
    /// Create a problem.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` for fewer than 2 or more than `limits.max_points`
    /// points, `InvalidInput` for non-finite coordinates.
    pub fn new(points: Vec<(f64, f64)>, limits: &EngineLimits) -> Result<Self, NumericError> {
        if points.len() < 2 || points.len() > limits.max_points {
            return Err(NumericError::dimension(
                "interpolation points",
                format!("between 2 and {} points", limits.max_points),
                format!("{} points", points.len()),
            ));
        }
        for (i, &(x, y)) in points.iter().enumerate() {
            if !x.is_finite() || !y.is_finite() {
                return Err(NumericError::InvalidInput(format!(
                    "point {} = ({}, {}) is not finite (e.g. 1.5,2.25)",
                    i + 1,
                    x,
                    y
                )));
            }
        }
        Ok(Self { points })
    }

    /// Nodes in input order.
    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    /// Abscissae in input order.
    pub fn xs(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.0).collect()
    }

    /// Ordinates in input order.
    pub fn ys(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.1).collect()
    }

    /// Nodes sorted by abscissa.
    pub fn sorted_points(&self) -> Vec<(f64, f64)> {
        let mut sorted = self.points.clone();
        sorted.sort_by(|p, q| p.0.total_cmp(&q.0));
        sorted
    }

    /// First abscissa that occurs more than once.
    pub fn first_duplicate(&self) -> Option<f64> {
        let sorted = self.sorted_points();
        sorted.windows(2).find(|w| w[0].0 == w[1].0).map(|w| w[0].0)
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false for a constructed problem.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// One problem instance of any category.
#[derive(Debug, Clone)]
pub enum Problem {
    /// `f(x) = 0`
    ScalarRoot(ScalarRootProblem),
    /// `A·x = b`
    LinearSystem(LinearSystemProblem),
    /// Polynomial or spline through nodes
    Interpolation(InterpolationProblem),
}

impl Problem {
    /// Category name.
    pub fn category(&self) -> &'static str {
        match self {
            Problem::ScalarRoot(_) => "root",
            Problem::LinearSystem(_) => "linear",
            Problem::Interpolation(_) => "interpolation",
        }
    }
}

fn check_finite(what: &str, values: impl Iterator<Item = f64>) -> Result<(), NumericError> {
    for (i, v) in values.enumerate() {
        if !v.is_finite() {
            return Err(NumericError::InvalidInput(format!(
                "{} contains a non-finite value {} at entry {}",
                what,
                v,
                i + 1
            )));
        }
    }
    Ok(())
}
