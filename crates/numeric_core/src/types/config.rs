//! Convergence configuration and engine limits.

use super::NumericError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Hard ceiling on `max_iterations`.
pub const MAX_ITERATIONS_CAP: usize = 10_000;

/// Which error formula drives the stopping rule.
///
/// `Absolute` is "correct decimal places" semantics (`|x_n - x_{n-1}|`),
/// `Relative` is "significant figures" semantics (`|x_n - x_{n-1}| / |x_n|`).
/// `Generic` is used when the caller states no preference and behaves like
/// `Absolute`. `Residual` stops on `|f(x_n)|` for scalar equations and on
/// `‖b - A·x_n‖∞` for linear systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// Absolute step size
    Absolute,
    /// Step size relative to the newest iterate
    Relative,
    /// No preference; absolute step size
    #[default]
    Generic,
    /// Size of the residual at the newest iterate
    Residual,
}

impl ErrorKind {
    /// Infer the error kind from how a tolerance was written.
    ///
    /// Tolerances written as `5e-k` ask for `k` significant figures
    /// (relative error); other scientific literals such as `0.5e-k` or `1e-k`
    /// ask for correct decimals (absolute error). Plain decimals carry no
    /// preference.
    ///
    /// # Example
    ///
    /// ```
    /// use numeric_core::types::ErrorKind;
    ///
    /// assert_eq!(ErrorKind::infer_from_tolerance("5e-6"), ErrorKind::Relative);
    /// assert_eq!(ErrorKind::infer_from_tolerance("0.5e-6"), ErrorKind::Absolute);
    /// assert_eq!(ErrorKind::infer_from_tolerance("0.001"), ErrorKind::Generic);
    /// ```
    pub fn infer_from_tolerance(literal: &str) -> Self {
        let literal = literal.trim().to_ascii_lowercase();
        if literal.starts_with("5e") {
            ErrorKind::Relative
        } else if literal.contains('e') {
            ErrorKind::Absolute
        } else {
            ErrorKind::Generic
        }
    }

    /// Stable lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::Absolute => "absolute",
            ErrorKind::Relative => "relative",
            ErrorKind::Generic => "generic",
            ErrorKind::Residual => "residual",
        }
    }
}

impl FromStr for ErrorKind {
    type Err = NumericError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "absolute" | "abs" | "decimals" => Ok(ErrorKind::Absolute),
            "relative" | "rel" | "significant" => Ok(ErrorKind::Relative),
            "generic" | "none" => Ok(ErrorKind::Generic),
            "residual" | "res" | "fx" => Ok(ErrorKind::Residual),
            _ => Err(NumericError::config(
                "error_kind",
                s,
                "one of: absolute, relative, generic, residual",
            )),
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Configuration shared by every iterative method.
///
/// # Example
///
/// ```
/// use numeric_core::types::{ConvergenceConfig, ErrorKind};
///
/// // Use default configuration
/// let config = ConvergenceConfig::default();
/// assert!(config.tolerance < 1e-6);
/// assert_eq!(config.error_kind, ErrorKind::Generic);
///
/// // Custom configuration, validated
/// let custom = ConvergenceConfig::new(1e-8, 200)
///     .unwrap()
///     .with_error_kind(ErrorKind::Relative);
/// assert_eq!(custom.max_iterations, 200);
///
/// assert!(ConvergenceConfig::new(1.5, 10).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceConfig {
    /// Stop when the selected error drops below this value. In (0, 1).
    pub tolerance: f64,

    /// Maximum number of iterations, in `1..=10000`.
    ///
    /// Reaching it without meeting the tolerance yields
    /// `NumericError::MaxIterationsExceeded`.
    pub max_iterations: usize,

    /// Error formula used by the stopping rule.
    pub error_kind: ErrorKind,

    /// `|f'(x)|` below this is treated as a division by zero.
    pub derivative_floor: f64,

    /// Iterates whose magnitude exceeds this are treated as divergent.
    pub divergence_bound: f64,

    /// Compute and retain every error variant per step, not only the selected one.
    pub full_diagnostics: bool,
}

impl Default for ConvergenceConfig {
    /// Default values:
    /// - `tolerance`: 1e-7
    /// - `max_iterations`: 100
    /// - `error_kind`: `Generic`
    fn default() -> Self {
        Self {
            tolerance: 1e-7,
            max_iterations: 100,
            error_kind: ErrorKind::Generic,
            derivative_floor: 1e-14,
            divergence_bound: 1e12,
            full_diagnostics: true,
        }
    }
}

impl ConvergenceConfig {
    /// Create a validated configuration.
    ///
    /// # Errors
    ///
    /// `NumericError::InvalidConfig` when `tolerance` is not in (0, 1) or
    /// `max_iterations` is not in `1..=10000`.
    pub fn new(tolerance: f64, max_iterations: usize) -> Result<Self, NumericError> {
        let config = Self {
            tolerance,
            max_iterations,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Set the error kind.
    pub fn with_error_kind(mut self, error_kind: ErrorKind) -> Self {
        self.error_kind = error_kind;
        self
    }

    /// Set whether every error variant is retained per step.
    pub fn with_full_diagnostics(mut self, full: bool) -> Self {
        self.full_diagnostics = full;
        self
    }

    /// Set the derivative floor used by Newton-type methods.
    pub fn with_derivative_floor(mut self, floor: f64) -> Self {
        self.derivative_floor = floor;
        self
    }

    /// Tight tolerance (1e-12) and more iterations (1000).
    pub fn high_precision() -> Self {
        Self {
            tolerance: 1e-12,
            max_iterations: 1000,
            ..Self::default()
        }
    }

    /// Relaxed tolerance (1e-4) and fewer iterations (50).
    pub fn fast() -> Self {
        Self {
            tolerance: 1e-4,
            max_iterations: 50,
            ..Self::default()
        }
    }

    /// Check every field against its valid range.
    pub fn validate(&self) -> Result<(), NumericError> {
        if !(self.tolerance > 0.0 && self.tolerance < 1.0) {
            return Err(NumericError::config(
                "tolerance",
                self.tolerance,
                "must satisfy 0 < tolerance < 1, e.g. 1e-6",
            ));
        }
        if self.max_iterations == 0 || self.max_iterations > MAX_ITERATIONS_CAP {
            return Err(NumericError::config(
                "max_iterations",
                self.max_iterations,
                "must be between 1 and 10000, e.g. 100",
            ));
        }
        if !(self.derivative_floor >= 0.0) {
            return Err(NumericError::config(
                "derivative_floor",
                self.derivative_floor,
                "must be non-negative, e.g. 1e-14",
            ));
        }
        if !(self.divergence_bound > 0.0) {
            return Err(NumericError::config(
                "divergence_bound",
                self.divergence_bound,
                "must be positive, e.g. 1e12",
            ));
        }
        Ok(())
    }
}

/// Size limits applied when problems are constructed.
///
/// The defaults mirror the course material (7x7 systems, 8 interpolation
/// nodes) but nothing in the engines depends on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineLimits {
    /// Largest accepted system dimension.
    pub max_dimension: usize,
    /// Largest accepted number of interpolation nodes.
    pub max_points: usize,
}

impl Default for EngineLimits {
    fn default() -> Self {
        Self {
            max_dimension: 7,
            max_points: 8,
        }
    }
}

impl EngineLimits {
    /// Limits that accept any size.
    pub fn unbounded() -> Self {
        Self {
            max_dimension: usize::MAX,
            max_points: usize::MAX,
        }
    }
}
