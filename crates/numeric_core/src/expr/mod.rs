//! Expression evaluator: function text to callables with derivatives.
//!
//! This module provides:
//! - [`Callable`]: a real-valued function of one or more variables
//! - [`ExpressionCompiler`]: the injected text-to-callable capability
//! - [`ShuntingCompiler`]: the default compiler (shunting-yard to RPN to tree)
//! - [`FiniteDifference`]: numerical derivative used when no symbolic rule applies
//!
//! # Example
//!
//! ```
//! use numeric_core::expr::{Callable, ExpressionCompiler, ShuntingCompiler};
//!
//! let f = ShuntingCompiler::new().compile("x^3 - 2*x").unwrap();
//! assert_eq!(f.eval(2.0), 4.0);
//!
//! let df = f.derivative(0, 1).unwrap();
//! assert_eq!(df.to_string(), "3*x^2 - 2");
//! ```

mod ast;
mod derivative;
mod lexer;
mod numeric;
mod parser;

pub use ast::{BinOp, Constant, Expr, Function};
pub use numeric::{FiniteDifference, FIRST_ORDER_STEP, SECOND_ORDER_STEP};

use crate::types::NumericError;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Real-valued function of `arity()` variables.
pub trait Callable: fmt::Debug + fmt::Display + Send + Sync {
    /// Number of variables.
    fn arity(&self) -> usize;

    /// Evaluate at `args` (indexed like the compiled variable list).
    fn call(&self, args: &[f64]) -> f64;

    /// Evaluate a function of one variable.
    fn eval(&self, x: f64) -> f64 {
        self.call(&[x])
    }

    /// `order`-th derivative with respect to variable `variable`.
    ///
    /// # Errors
    ///
    /// `UnsupportedDerivative` when no exact derivative exists; callers fall
    /// back to [`FiniteDifference`] (see [`derivative_or_numeric`]).
    fn derivative(&self, variable: usize, order: usize) -> Result<Arc<dyn Callable>, NumericError>;
}

/// Turns function text into callables.
pub trait ExpressionCompiler: Send + Sync {
    /// Compile a function of `x`.
    fn compile(&self, text: &str) -> Result<Arc<dyn Callable>, NumericError> {
        self.compile_with_variables(text, &["x"])
    }

    /// Compile a function of the named variables, in order.
    fn compile_with_variables(
        &self,
        text: &str,
        variables: &[&str],
    ) -> Result<Arc<dyn Callable>, NumericError>;
}

/// Default compiler for the built-in grammar.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShuntingCompiler;

impl ShuntingCompiler {
    /// Create a compiler.
    pub fn new() -> Self {
        Self
    }
}

impl ExpressionCompiler for ShuntingCompiler {
    fn compile_with_variables(
        &self,
        text: &str,
        variables: &[&str],
    ) -> Result<Arc<dyn Callable>, NumericError> {
        let names: Arc<[String]> = variables.iter().map(|v| v.to_string()).collect();
        let expr = parser::parse(text, &names)?;
        Ok(Arc::new(CompiledExpression { expr, names }))
    }
}

/// Expression tree bound to its variable names.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledExpression {
    expr: Expr,
    names: Arc<[String]>,
}

impl CompiledExpression {
    /// Wrap a tree.
    pub fn new(expr: Expr, names: &[&str]) -> Self {
        Self {
            expr,
            names: names.iter().map(|v| v.to_string()).collect(),
        }
    }

    /// Underlying tree.
    pub fn expr(&self) -> &Expr {
        &self.expr
    }
}

impl Callable for CompiledExpression {
    fn arity(&self) -> usize {
        self.names.len()
    }

    fn call(&self, args: &[f64]) -> f64 {
        self.expr.eval(args)
    }

    fn derivative(&self, variable: usize, order: usize) -> Result<Arc<dyn Callable>, NumericError> {
        if variable >= self.names.len() {
            return Err(NumericError::InvalidInput(format!(
                "variable index {} out of range for a function of {} variable(s)",
                variable,
                self.names.len()
            )));
        }
        let expr = derivative::differentiate_n(&self.expr, variable, order)?;
        Ok(Arc::new(CompiledExpression {
            expr,
            names: self.names.clone(),
        }))
    }
}

impl fmt::Display for CompiledExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expr.render(&self.names))
    }
}

/// Closure-backed function of one variable with no symbolic form.
pub struct NativeFunction<F> {
    label: String,
    func: F,
}

impl<F> NativeFunction<F>
where
    F: Fn(f64) -> f64 + Send + Sync,
{
    /// Wrap a closure; `label` is used for display.
    pub fn new(label: impl Into<String>, func: F) -> Self {
        Self {
            label: label.into(),
            func,
        }
    }
}

impl<F> fmt::Debug for NativeFunction<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("label", &self.label)
            .finish()
    }
}

impl<F> fmt::Display for NativeFunction<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

impl<F> Callable for NativeFunction<F>
where
    F: Fn(f64) -> f64 + Send + Sync,
{
    fn arity(&self) -> usize {
        1
    }

    fn call(&self, args: &[f64]) -> f64 {
        args.first().map(|&x| (self.func)(x)).unwrap_or(f64::NAN)
    }

    fn derivative(&self, _variable: usize, _order: usize) -> Result<Arc<dyn Callable>, NumericError> {
        Err(NumericError::UnsupportedDerivative {
            function: self.label.clone(),
        })
    }
}

/// Exact derivative when available, otherwise a [`FiniteDifference`].
///
/// The flag is `true` for the exact derivative.
pub fn derivative_or_numeric(
    f: &Arc<dyn Callable>,
    variable: usize,
    order: usize,
) -> (Arc<dyn Callable>, bool) {
    match f.derivative(variable, order) {
        Ok(d) => (d, true),
        Err(err) => {
            debug!(function = %f, order, error = %err, "falling back to finite differences");
            (
                Arc::new(FiniteDifference::new(f.clone(), variable, order)),
                false,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_compile_and_eval() {
        let f = ShuntingCompiler::new().compile("exp(-x) - x").unwrap();
        assert_eq!(f.arity(), 1);
        assert_relative_eq!(f.eval(0.0), 1.0);
    }

    #[test]
    fn test_compile_error_is_parse() {
        let err = ShuntingCompiler::new().compile("x +* 2").unwrap_err();
        assert!(matches!(err, NumericError::Parse { .. }));
    }

    #[test]
    fn test_symbolic_derivative_renders() {
        let f = ShuntingCompiler::new().compile("x^3 - 2*x").unwrap();
        assert_eq!(f.derivative(0, 1).unwrap().to_string(), "3*x^2 - 2");
        assert_eq!(f.derivative(0, 2).unwrap().to_string(), "6*x");
    }

    #[test]
    fn test_partial_derivative() {
        let f = ShuntingCompiler::new()
            .compile_with_variables("x1*x2 + x2^2", &["x1", "x2"])
            .unwrap();
        let d = f.derivative(1, 1).unwrap();
        assert_relative_eq!(d.call(&[3.0, 2.0]), 7.0);
        assert!(f.derivative(2, 1).is_err());
    }

    #[test]
    fn test_fallback_to_finite_difference() {
        let f = ShuntingCompiler::new().compile("floor(x) + x^2").unwrap();
        let (df, exact) = derivative_or_numeric(&f, 0, 1);
        assert!(!exact);
        assert_relative_eq!(df.eval(1.5), 3.0, epsilon = 1e-6);
    }

    #[test]
    fn test_native_function_has_no_symbolic_derivative() {
        let f: Arc<dyn Callable> = Arc::new(NativeFunction::new("cube", |x: f64| x.powi(3)));
        assert!(f.derivative(0, 1).is_err());
        let (df, exact) = derivative_or_numeric(&f, 0, 1);
        assert!(!exact);
        assert_relative_eq!(df.eval(1.0), 3.0, epsilon = 1e-8);
    }
}
