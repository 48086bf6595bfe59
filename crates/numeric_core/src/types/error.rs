//! Error types for numerical computations.
//!
//! This module provides:
//! - `NumericError`: every recoverable failure of the computation core
//! - `FailureKind`: the payload-free classification used by reports
//!
//! Messages always say which validation failed, show the offending value and,
//! where it helps, an example of valid input.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Recoverable failures of the numerical engines.
///
/// Engines return these internally; the public call surface captures them
/// into [`MethodResult::failure`](crate::types::MethodResult) so that a
/// failing method never aborts a comparison run.
///
/// # Examples
/// ```
/// use numeric_core::types::NumericError;
///
/// let err = NumericError::InvalidRelaxationFactor { w: 2.0 };
/// assert!(format!("{}", err).contains("w = 2"));
/// ```
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NumericError {
    /// Malformed expression text.
    #[error("Parse error at position {position}: {message} (e.g. \"x^2 - 2\" or \"exp(-x) - x\")")]
    Parse {
        /// Description of the problem
        message: String,
        /// Character offset where the problem was detected
        position: usize,
    },

    /// Expression contains a function without a symbolic derivative.
    #[error("No symbolic derivative for '{function}'; supported: polynomial terms, exp, log, sqrt, sin, cos, tan, abs")]
    UnsupportedDerivative {
        /// Name of the offending function
        function: String,
    },

    /// Bracket endpoints do not enclose a sign change.
    #[error("Invalid bracket [{a}, {b}]: f(a) = {fa} and f(b) = {fb} must have opposite signs (e.g. [0, 2] for x^2 - 2)")]
    InvalidBracket {
        /// Lower endpoint
        a: f64,
        /// Upper endpoint
        b: f64,
        /// Function value at `a`
        fa: f64,
        /// Function value at `b`
        fb: f64,
    },

    /// A divisor vanished (derivative, secant slope, duplicate node, ...).
    #[error("Division by zero: {quantity} is {value:e} at x = {x}")]
    DivisionByZero {
        /// What was about to be divided by
        quantity: String,
        /// Its (near-zero) value
        value: f64,
        /// Where it happened
        x: f64,
    },

    /// Iterates left the finite, bounded range.
    #[error("Diverged at iteration {iteration}: iterate magnitude {magnitude:e} exceeds the sane range")]
    Diverged {
        /// Iteration index where divergence was detected
        iteration: usize,
        /// Offending magnitude (may be NaN or infinite)
        magnitude: f64,
    },

    /// Iteration budget exhausted before the tolerance was met.
    #[error("Failed to converge after {iterations} iterations (last error {}); raise max_iterations or relax the tolerance", optional_value(.last_error))]
    MaxIterationsExceeded {
        /// Number of iterations attempted
        iterations: usize,
        /// Last computed error, if any
        last_error: Option<f64>,
    },

    /// SOR relaxation factor outside (0, 2).
    #[error("Invalid relaxation factor w = {w}: SOR requires 0 < w < 2 (e.g. w = 1.5)")]
    InvalidRelaxationFactor {
        /// The rejected factor
        w: f64,
    },

    /// Zero entries on the diagonal of the system matrix.
    #[error("Matrix has zeros on the diagonal at positions {positions:?}; iterative methods need a non-zero diagonal (reorder the equations)")]
    SingularDiagonal {
        /// 1-based diagonal positions holding zero
        positions: Vec<usize>,
    },

    /// Vandermonde system is singular because of a repeated node.
    #[error("Vandermonde matrix is singular: x = {duplicate} appears more than once; every x must be unique")]
    SingularVandermonde {
        /// The repeated abscissa
        duplicate: f64,
    },

    /// Spline nodes are not strictly increasing after sorting.
    #[error("Nodes are not strictly increasing after sorting: x = {duplicate} is repeated; every x must be unique")]
    UnsortedNodes {
        /// The repeated abscissa
        duplicate: f64,
    },

    /// Evaluation outside the interpolation domain.
    #[error("Query point {x} outside valid domain [{min}, {max}]")]
    OutOfDomain {
        /// The query point
        x: f64,
        /// Minimum valid value
        min: f64,
        /// Maximum valid value
        max: f64,
    },

    /// Matrix/vector shapes do not agree or exceed the limits.
    #[error("Dimension mismatch for {what}: expected {expected}, got {got} (e.g. A = 10,1,1;2,10,1;2,2,10 with b = 12,13,14)")]
    DimensionMismatch {
        /// Which object had the wrong shape
        what: String,
        /// Expected shape
        expected: String,
        /// Actual shape
        got: String,
    },

    /// Convergence configuration out of range.
    #[error("Invalid configuration: {field} = {value} ({hint})")]
    InvalidConfig {
        /// Field name
        field: String,
        /// Offending value as text
        value: String,
        /// Valid range or example
        hint: String,
    },

    /// Missing or malformed input other than shapes.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Caller-imposed wall-clock deadline elapsed; partial work was discarded.
    #[error("Timed out after {millis} ms; partial results were discarded")]
    Timeout {
        /// Deadline in milliseconds
        millis: u128,
    },
}

fn optional_value(value: &Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:e}", v))
}

impl NumericError {
    /// Create a parse error.
    pub fn parse(message: impl Into<String>, position: usize) -> Self {
        Self::Parse {
            message: message.into(),
            position,
        }
    }

    /// Create a division-by-zero error.
    pub fn division_by_zero(quantity: impl Into<String>, value: f64, x: f64) -> Self {
        Self::DivisionByZero {
            quantity: quantity.into(),
            value,
            x,
        }
    }

    /// Create a dimension-mismatch error.
    pub fn dimension(what: impl Into<String>, expected: impl fmt::Display, got: impl fmt::Display) -> Self {
        Self::DimensionMismatch {
            what: what.into(),
            expected: expected.to_string(),
            got: got.to_string(),
        }
    }

    /// Create an invalid-configuration error.
    pub fn config(field: impl Into<String>, value: impl fmt::Display, hint: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            value: value.to_string(),
            hint: hint.into(),
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> FailureKind {
        match self {
            NumericError::Parse { .. } => FailureKind::Parse,
            NumericError::UnsupportedDerivative { .. } => FailureKind::UnsupportedDerivative,
            NumericError::InvalidBracket { .. } => FailureKind::InvalidBracket,
            NumericError::DivisionByZero { .. } => FailureKind::DivisionByZero,
            NumericError::Diverged { .. } => FailureKind::Diverged,
            NumericError::MaxIterationsExceeded { .. } => FailureKind::MaxIterationsExceeded,
            NumericError::InvalidRelaxationFactor { .. } => FailureKind::InvalidRelaxationFactor,
            NumericError::SingularDiagonal { .. } => FailureKind::SingularDiagonal,
            NumericError::SingularVandermonde { .. } => FailureKind::SingularVandermonde,
            NumericError::UnsortedNodes { .. } => FailureKind::UnsortedNodes,
            NumericError::OutOfDomain { .. } => FailureKind::OutOfDomain,
            NumericError::DimensionMismatch { .. } => FailureKind::DimensionMismatch,
            NumericError::InvalidConfig { .. } => FailureKind::InvalidConfig,
            NumericError::InvalidInput(_) => FailureKind::InvalidInput,
            NumericError::Timeout { .. } => FailureKind::Timeout,
        }
    }
}

/// Payload-free failure classification.
///
/// Used as a map key when reports count failures by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Malformed expression
    Parse,
    /// Derivative outside the supported set
    UnsupportedDerivative,
    /// No sign change across the bracket
    InvalidBracket,
    /// Vanishing divisor
    DivisionByZero,
    /// Iterates left the sane range
    Diverged,
    /// Iteration budget exhausted
    MaxIterationsExceeded,
    /// SOR factor outside (0, 2)
    InvalidRelaxationFactor,
    /// Zero on the matrix diagonal
    SingularDiagonal,
    /// Repeated Vandermonde node
    SingularVandermonde,
    /// Repeated spline node
    UnsortedNodes,
    /// Query outside spline domain
    OutOfDomain,
    /// Shape mismatch
    DimensionMismatch,
    /// Configuration out of range
    InvalidConfig,
    /// Other invalid input
    InvalidInput,
    /// Deadline elapsed
    Timeout,
}

impl FailureKind {
    /// Stable snake_case name.
    pub fn name(&self) -> &'static str {
        match self {
            FailureKind::Parse => "parse",
            FailureKind::UnsupportedDerivative => "unsupported_derivative",
            FailureKind::InvalidBracket => "invalid_bracket",
            FailureKind::DivisionByZero => "division_by_zero",
            FailureKind::Diverged => "diverged",
            FailureKind::MaxIterationsExceeded => "max_iterations_exceeded",
            FailureKind::InvalidRelaxationFactor => "invalid_relaxation_factor",
            FailureKind::SingularDiagonal => "singular_diagonal",
            FailureKind::SingularVandermonde => "singular_vandermonde",
            FailureKind::UnsortedNodes => "unsorted_nodes",
            FailureKind::OutOfDomain => "out_of_domain",
            FailureKind::DimensionMismatch => "dimension_mismatch",
            FailureKind::InvalidConfig => "invalid_config",
            FailureKind::InvalidInput => "invalid_input",
            FailureKind::Timeout => "timeout",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_bracket_display_shows_values_and_example() {
        let err = NumericError::InvalidBracket {
            a: 0.0,
            b: 1.0,
            fa: -2.0,
            fb: -1.0,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("[0, 1]"));
        assert!(msg.contains("f(a) = -2"));
        assert!(msg.contains("e.g."));
    }

    #[test]
    fn test_singular_diagonal_display_lists_positions() {
        let err = NumericError::SingularDiagonal {
            positions: vec![1, 3],
        };
        assert!(format!("{}", err).contains("[1, 3]"));
    }

    #[test]
    fn test_max_iterations_display() {
        let err = NumericError::MaxIterationsExceeded {
            iterations: 100,
            last_error: Some(0.5),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("100 iterations"));
        assert!(msg.contains("last error 5e-1"));
        assert!(!msg.contains("Some("));

        let err = NumericError::MaxIterationsExceeded {
            iterations: 3,
            last_error: None,
        };
        assert!(format!("{}", err).contains("last error n/a"));
    }

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            NumericError::InvalidRelaxationFactor { w: 2.0 }.kind(),
            FailureKind::InvalidRelaxationFactor
        );
        assert_eq!(NumericError::parse("bad", 0).kind(), FailureKind::Parse);
        assert_eq!(
            NumericError::dimension("b", 3, 2).kind(),
            FailureKind::DimensionMismatch
        );
    }

    #[test]
    fn test_dimension_helper_formats_shapes() {
        let err = NumericError::dimension("matrix A", "3x3", "3x2");
        let msg = format!("{}", err);
        assert!(msg.contains("expected 3x3"));
        assert!(msg.contains("got 3x2"));
    }

    #[test]
    fn test_failure_kind_names_are_snake_case() {
        assert_eq!(FailureKind::SingularVandermonde.name(), "singular_vandermonde");
        assert_eq!(format!("{}", FailureKind::OutOfDomain), "out_of_domain");
    }

    #[test]
    fn test_error_clone_eq() {
        let err = NumericError::OutOfDomain {
            x: 5.0,
            min: 0.0,
            max: 3.0,
        };
        assert_eq!(err.clone(), err);
    }
}
