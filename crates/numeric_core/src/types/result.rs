//! Iteration traces and method results.

use super::{ErrorKind, FailureKind, NumericError};
use crate::math::interpolation::Interpolation;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The five error variants tracked per iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorVariant {
    /// `|Δ|` (infinity norm for vectors)
    Absolute,
    /// `|Δ| / |x_n|`
    RelativeCurrent,
    /// `|Δ| / |x_{n-1}|`
    RelativePrevious,
    /// `max_i |Δ_i| / |x_n,i|`
    ComponentwiseCurrent,
    /// `max_i |Δ_i| / |x_{n-1},i|`
    ComponentwisePrevious,
}

impl ErrorVariant {
    /// Every variant, in report order.
    pub const ALL: [ErrorVariant; 5] = [
        ErrorVariant::Absolute,
        ErrorVariant::RelativeCurrent,
        ErrorVariant::RelativePrevious,
        ErrorVariant::ComponentwiseCurrent,
        ErrorVariant::ComponentwisePrevious,
    ];

    /// Stable snake_case name.
    pub fn name(&self) -> &'static str {
        match self {
            ErrorVariant::Absolute => "absolute",
            ErrorVariant::RelativeCurrent => "relative_current",
            ErrorVariant::RelativePrevious => "relative_previous",
            ErrorVariant::ComponentwiseCurrent => "componentwise_current",
            ErrorVariant::ComponentwisePrevious => "componentwise_previous",
        }
    }
}

impl fmt::Display for ErrorVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error values of one iteration. `None` means not available or not computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorMetrics {
    /// `|Δ|`
    pub absolute: Option<f64>,
    /// `|Δ| / |x_n|`
    pub relative_current: Option<f64>,
    /// `|Δ| / |x_{n-1}|`
    pub relative_previous: Option<f64>,
    /// Componentwise maximum relative to `x_n` (vector iterations only)
    pub componentwise_current: Option<f64>,
    /// Componentwise maximum relative to `x_{n-1}` (vector iterations only)
    pub componentwise_previous: Option<f64>,
}

impl ErrorMetrics {
    /// Metrics of a step with no predecessor.
    pub fn none() -> Self {
        Self::default()
    }

    /// Value of one variant.
    pub fn get(&self, variant: ErrorVariant) -> Option<f64> {
        match variant {
            ErrorVariant::Absolute => self.absolute,
            ErrorVariant::RelativeCurrent => self.relative_current,
            ErrorVariant::RelativePrevious => self.relative_previous,
            ErrorVariant::ComponentwiseCurrent => self.componentwise_current,
            ErrorVariant::ComponentwisePrevious => self.componentwise_previous,
        }
    }

    /// Step error backing `kind`.
    ///
    /// `Residual` is backed by the absolute step here; the residual itself is
    /// not a step error and is supplied separately to the stopping rule.
    pub fn selected(&self, kind: ErrorKind) -> Option<f64> {
        self.get(Self::variant_for(kind))
    }

    /// Variant backing an error kind.
    pub fn variant_for(kind: ErrorKind) -> ErrorVariant {
        match kind {
            ErrorKind::Relative => ErrorVariant::RelativeCurrent,
            ErrorKind::Absolute | ErrorKind::Generic | ErrorKind::Residual => ErrorVariant::Absolute,
        }
    }

    /// Keep only the variant selected by `kind`.
    pub fn retain_selected(self, kind: ErrorKind) -> Self {
        let keep = Self::variant_for(kind);
        let pick = |variant: ErrorVariant| {
            if variant == keep {
                self.get(variant)
            } else {
                None
            }
        };
        Self {
            absolute: pick(ErrorVariant::Absolute),
            relative_current: pick(ErrorVariant::RelativeCurrent),
            relative_previous: pick(ErrorVariant::RelativePrevious),
            componentwise_current: pick(ErrorVariant::ComponentwiseCurrent),
            componentwise_previous: pick(ErrorVariant::ComponentwisePrevious),
        }
    }
}

/// Iterate held by a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum State {
    /// Scalar iterate (root finding)
    Scalar(f64),
    /// Vector iterate (linear systems)
    Vector(Vec<f64>),
}

/// One row of an iteration table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationRecord {
    /// 1-based, contiguous
    pub index: usize,
    /// Iterate after this step
    pub state: State,
    /// `f(x)` for scalar methods, `‖b - A·x‖∞` for linear systems
    pub residual: Option<f64>,
    /// Error values of this step
    pub errors: ErrorMetrics,
}

/// Append-only iteration table.
///
/// Indices are assigned on push, so they are contiguous from 1 by
/// construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trace {
    records: Vec<IterationRecord>,
}

impl Trace {
    /// Empty trace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record and return its index.
    pub fn push(&mut self, state: State, residual: Option<f64>, errors: ErrorMetrics) -> usize {
        let index = self.records.len() + 1;
        self.records.push(IterationRecord {
            index,
            state,
            residual,
            errors,
        });
        index
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Most recent record.
    pub fn last(&self) -> Option<&IterationRecord> {
        self.records.last()
    }

    /// Read-only view of the records.
    pub fn records(&self) -> &[IterationRecord] {
        &self.records
    }

    /// Freeze the trace.
    pub fn into_records(self) -> Vec<IterationRecord> {
        self.records
    }
}

/// Solution payload of a method result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Solution {
    /// Root of a scalar equation
    Scalar(f64),
    /// Solution vector of a linear system
    Vector(Vec<f64>),
    /// Fitted interpolant
    Interpolant(Interpolation),
}

impl From<State> for Solution {
    fn from(state: State) -> Self {
        match state {
            State::Scalar(x) => Solution::Scalar(x),
            State::Vector(v) => Solution::Vector(v),
        }
    }
}

/// Why a method failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Failure {
    /// Classification
    pub kind: FailureKind,
    /// Human-readable reason (offending value and example of valid input)
    pub reason: String,
    /// Structured error
    pub error: NumericError,
}

impl From<NumericError> for Failure {
    fn from(error: NumericError) -> Self {
        Self {
            kind: error.kind(),
            reason: error.to_string(),
            error,
        }
    }
}

/// A derived expression produced for a method (e.g. `f'(x)`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedExpression {
    /// Label such as `f'(x)`
    pub label: String,
    /// Expression text, or a description of the numerical fallback
    pub text: String,
}

/// Outcome of running one method on one problem.
///
/// `failure` is present iff `success` is false. A successful result always
/// carries `solution` and `final_error`. When `spectral_radius` is present,
/// `converges_by_radius == (spectral_radius < 1)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodResult {
    /// Method name
    pub method: String,
    /// Whether the method met its tolerance
    pub success: bool,
    /// Solution, or the last iterate of a failed run when one exists
    pub solution: Option<Solution>,
    /// Number of recorded iterations
    pub iterations: usize,
    /// Selected error of the last iteration
    pub final_error: Option<f64>,
    /// Iteration table
    pub trace: Vec<IterationRecord>,
    /// Failure details
    pub failure: Option<Failure>,
    /// Derivatives used by the method
    pub derived_expressions: Vec<DerivedExpression>,
    /// Spectral radius of the iteration matrix (linear systems)
    pub spectral_radius: Option<f64>,
    /// `spectral_radius < 1`
    pub converges_by_radius: bool,
    /// Multiple-root heuristic (multiple-root Newton only)
    pub multiple_root_suspected: Option<bool>,
    /// Strict row diagonal dominance (linear systems)
    pub diagonally_dominant: Option<bool>,
}

impl MethodResult {
    /// Successful result.
    pub fn converged(
        method: impl Into<String>,
        solution: Solution,
        final_error: f64,
        trace: Trace,
    ) -> Self {
        let trace = trace.into_records();
        Self {
            method: method.into(),
            success: true,
            solution: Some(solution),
            iterations: trace.len(),
            final_error: Some(final_error),
            trace,
            failure: None,
            derived_expressions: Vec::new(),
            spectral_radius: None,
            converges_by_radius: false,
            multiple_root_suspected: None,
            diagonally_dominant: None,
        }
    }

    /// Failed result keeping whatever trace was produced.
    pub fn failed(
        method: impl Into<String>,
        error: NumericError,
        last: Option<Solution>,
        final_error: Option<f64>,
        trace: Trace,
    ) -> Self {
        let trace = trace.into_records();
        Self {
            method: method.into(),
            success: false,
            solution: last,
            iterations: trace.len(),
            final_error,
            trace,
            failure: Some(Failure::from(error)),
            derived_expressions: Vec::new(),
            spectral_radius: None,
            converges_by_radius: false,
            multiple_root_suspected: None,
            diagonally_dominant: None,
        }
    }

    /// Failed result with no trace at all (validation failures).
    pub fn rejected(method: impl Into<String>, error: NumericError) -> Self {
        Self::failed(method, error, None, None, Trace::new())
    }

    /// Attach the spectral radius and the derived convergence flag.
    pub fn with_spectral_radius(mut self, radius: f64) -> Self {
        self.spectral_radius = Some(radius);
        self.converges_by_radius = radius < 1.0;
        self
    }

    /// Attach derived expressions.
    pub fn with_derived(mut self, derived: Vec<DerivedExpression>) -> Self {
        self.derived_expressions = derived;
        self
    }

    /// Scalar solution, if any.
    pub fn scalar_solution(&self) -> Option<f64> {
        match self.solution {
            Some(Solution::Scalar(x)) => Some(x),
            _ => None,
        }
    }

    /// Vector solution, if any.
    pub fn vector_solution(&self) -> Option<&[f64]> {
        match &self.solution {
            Some(Solution::Vector(v)) => Some(v),
            _ => None,
        }
    }

    /// Interpolant, if any.
    pub fn interpolation(&self) -> Option<&Interpolation> {
        match &self.solution {
            Some(Solution::Interpolant(i)) => Some(i),
            _ => None,
        }
    }

    /// Failure classification, if failed.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        self.failure.as_ref().map(|f| f.kind)
    }

    /// Last recorded value of an error variant.
    pub fn final_error_variant(&self, variant: ErrorVariant) -> Option<f64> {
        self.trace.last().and_then(|r| r.errors.get(variant))
    }
}
