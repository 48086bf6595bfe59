//! Piecewise polynomials over sorted knots, shared by both splines.

use super::polynomial::{join_terms, shifted_variable, DISPLAY_CUTOFF};
use super::DomainPolicy;
use crate::types::NumericError;
use serde::{Deserialize, Serialize};

/// One spline piece on `[start, end]`.
///
/// Coefficients are ascending powers of `(x - start)`, so a cubic piece reads
/// `a + b·(x - start) + c·(x - start)² + d·(x - start)³`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Left knot
    pub start: f64,
    /// Right knot
    pub end: f64,
    /// Local ascending coefficients
    pub coefficients: Vec<f64>,
}

impl Segment {
    #[inline]
    fn eval(&self, x: f64) -> f64 {
        let dx = x - self.start;
        self.coefficients.iter().rev().fold(0.0, |acc, c| acc * dx + c)
    }

    fn render(&self) -> String {
        let base = shifted_variable(self.start);
        let terms: Vec<String> = self
            .coefficients
            .iter()
            .enumerate()
            .filter(|(_, c)| c.abs() > DISPLAY_CUTOFF)
            .map(|(power, c)| match power {
                0 => format!("{:.6}", c),
                1 => format!("{:.6}{}", c, base),
                _ => format!("{:.6}{}^{}", c, base, power),
            })
            .collect();
        format!("[{}, {}]: {}", self.start, self.end, join_terms(&terms))
    }
}

/// Contiguous segments with strictly increasing knots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PiecewisePolynomial {
    segments: Vec<Segment>,
}

impl PiecewisePolynomial {
    /// Assemble from segments ordered by `start`. At least one segment.
    pub(crate) fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    /// The pieces, left to right.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// `[first knot, last knot]`.
    pub fn domain(&self) -> (f64, f64) {
        let min = self.segments.first().map_or(f64::NAN, |s| s.start);
        let max = self.segments.last().map_or(f64::NAN, |s| s.end);
        (min, max)
    }

    /// Evaluate at `x`, applying `policy` outside the knots.
    ///
    /// # Errors
    ///
    /// `OutOfDomain` under [`DomainPolicy::Strict`] when `x` lies outside.
    pub fn at(&self, x: f64, policy: DomainPolicy) -> Result<f64, NumericError> {
        let (min, max) = self.domain();
        let x = if x < min || x > max {
            match policy {
                DomainPolicy::Strict => return Err(NumericError::OutOfDomain { x, min, max }),
                DomainPolicy::Clamp => x.clamp(min, max),
                DomainPolicy::Extrapolate => x,
            }
        } else {
            x
        };
        Ok(self.segments[self.find_segment(x)].eval(x))
    }

    /// Index `i` with `start_i <= x < start_{i+1}`, clamped to the end pieces.
    #[inline]
    fn find_segment(&self, x: f64) -> usize {
        let pos = self.segments.partition_point(|s| s.start <= x);
        pos.saturating_sub(1).min(self.segments.len() - 1)
    }

    /// One line per segment, joined with `; `.
    pub fn render(&self) -> String {
        self.segments
            .iter()
            .map(Segment::render)
            .collect::<Vec<_>>()
            .join("; ")
    }
}
