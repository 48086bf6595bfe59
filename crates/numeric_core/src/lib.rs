//! # numeric_core: Numerical Methods Computation Core
//!
//! A stateless computation library covering the three classic chapters of an
//! introductory numerical-analysis course:
//!
//! - Root finding (`math::roots`): bisection, false position, fixed point,
//!   Newton-Raphson, secant and multiple-root Newton variants
//! - Iterative linear solvers (`math::linear`): Jacobi, Gauss-Seidel and SOR
//!   with spectral-radius diagnostics
//! - Interpolation (`math::interpolation`): Vandermonde, Newton divided
//!   differences, Lagrange, linear and cubic splines
//!
//! Every iterative method records a per-step trace through the shared error
//! metrics (`math::error_metrics`) and returns a [`types::MethodResult`].
//! The comparison aggregator (`compare`) runs a whole battery of methods on one
//! problem and ranks them. Function text is turned into callables by the
//! expression evaluator (`expr`), which is injected through the
//! [`expr::ExpressionCompiler`] trait.
//!
//! ## Usage Examples
//!
//! ```rust
//! use numeric_core::api::{self, RootInputs};
//! use numeric_core::types::ConvergenceConfig;
//!
//! let config = ConvergenceConfig::new(1e-6, 50).unwrap();
//! let result = api::solve_root("bisection", "x^2 - 2", &RootInputs::bracket(0.0, 2.0), &config);
//!
//! assert!(result.success);
//! let root = result.scalar_solution().unwrap();
//! assert!((root - 2.0_f64.sqrt()).abs() < 1e-5);
//! ```
//!
//! ## Error Handling
//!
//! All recoverable conditions (parse errors, invalid brackets, singular
//! diagonals, ...) are [`types::NumericError`] values. The public call surface
//! captures them into `MethodResult::failure` rather than returning them, so a
//! single failing method never aborts a comparison run.

#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod api;
pub mod compare;
pub mod expr;
pub mod math;
pub mod types;
