//! Core data model shared by every engine.
//!
//! This module provides:
//! - `error`: the recoverable failure taxonomy (`NumericError`, `FailureKind`)
//! - `config`: `ConvergenceConfig`, `ErrorKind` and `EngineLimits`
//! - `problem`: immutable, validated problem definitions
//! - `result`: iteration traces and `MethodResult`
//!
//! # Re-exports
//!
//! The commonly used types are re-exported at this module level.

pub mod config;
pub mod error;
pub mod problem;
pub mod result;

pub use config::{ConvergenceConfig, EngineLimits, ErrorKind, MAX_ITERATIONS_CAP};
pub use error::{FailureKind, NumericError};
pub use problem::{
    InterpolationProblem, LinearSystemProblem, Problem, RootStart, ScalarRootProblem,
};
pub use result::{
    DerivedExpression, ErrorMetrics, ErrorVariant, Failure, IterationRecord, MethodResult, Solution,
    State, Trace,
};
