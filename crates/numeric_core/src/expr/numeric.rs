//! Central finite-difference derivatives.

use super::Callable;
use crate::types::NumericError;
use std::fmt;
use std::sync::Arc;

/// Step for first derivatives.
pub const FIRST_ORDER_STEP: f64 = 1e-5;

/// Step for second derivatives.
pub const SECOND_ORDER_STEP: f64 = 1e-4;

/// Numerical derivative of another callable.
///
/// First order: `(f(x+h) - f(x-h)) / 2h` with `h = 1e-5`.
/// Second order: `(f(x+h) - 2f(x) + f(x-h)) / h²` with `h = 1e-4`.
/// Both have O(h²) truncation error. Higher orders nest these stencils.
///
/// # Examples
/// ```
/// use numeric_core::expr::{Callable, FiniteDifference, NativeFunction};
/// use std::sync::Arc;
///
/// let f = Arc::new(NativeFunction::new("cube", |x: f64| x * x * x));
/// let df = FiniteDifference::new(f, 0, 1);
/// assert!((df.eval(2.0) - 12.0).abs() < 1e-8);
/// ```
#[derive(Debug, Clone)]
pub struct FiniteDifference {
    base: Arc<dyn Callable>,
    variable: usize,
    order: usize,
}

impl FiniteDifference {
    /// Differentiate `base` with respect to `variable`, `order` times.
    pub fn new(base: Arc<dyn Callable>, variable: usize, order: usize) -> Self {
        Self {
            base,
            variable,
            order,
        }
    }

    /// Step used by this stencil.
    pub fn step(&self) -> f64 {
        if self.order >= 2 {
            SECOND_ORDER_STEP
        } else {
            FIRST_ORDER_STEP
        }
    }

    fn shifted(&self, args: &[f64], delta: f64) -> f64 {
        let mut moved = args.to_vec();
        if let Some(v) = moved.get_mut(self.variable) {
            *v += delta;
        }
        self.base.call(&moved)
    }

    fn first(&self, args: &[f64]) -> f64 {
        let h = FIRST_ORDER_STEP;
        (self.shifted(args, h) - self.shifted(args, -h)) / (2.0 * h)
    }

    fn second(&self, args: &[f64]) -> f64 {
        let h = SECOND_ORDER_STEP;
        (self.shifted(args, h) - 2.0 * self.base.call(args) + self.shifted(args, -h)) / (h * h)
    }
}

impl Callable for FiniteDifference {
    fn arity(&self) -> usize {
        self.base.arity()
    }

    fn call(&self, args: &[f64]) -> f64 {
        match self.order {
            0 => self.base.call(args),
            1 => self.first(args),
            2 => self.second(args),
            n => {
                // peel two orders at a time off the requested order
                let inner = FiniteDifference::new(self.base.clone(), self.variable, n - 2);
                FiniteDifference::new(Arc::new(inner), self.variable, 2).call(args)
            }
        }
    }

    fn derivative(&self, variable: usize, order: usize) -> Result<Arc<dyn Callable>, NumericError> {
        if variable == self.variable {
            return Ok(Arc::new(FiniteDifference::new(
                self.base.clone(),
                variable,
                self.order + order,
            )));
        }
        Ok(Arc::new(FiniteDifference::new(
            Arc::new(self.clone()),
            variable,
            order,
        )))
    }
}

impl fmt::Display for FiniteDifference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "central difference (order {}, h = {:e}, O(h^2)) of {}",
            self.order,
            self.step(),
            self.base
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::NativeFunction;
    use approx::assert_relative_eq;

    fn sine() -> Arc<dyn Callable> {
        Arc::new(NativeFunction::new("sin(x)", f64::sin))
    }

    #[test]
    fn test_first_order_accuracy() {
        let df = FiniteDifference::new(sine(), 0, 1);
        assert_relative_eq!(df.eval(0.5), 0.5_f64.cos(), epsilon = 1e-9);
    }

    #[test]
    fn test_second_order_accuracy() {
        let d2f = FiniteDifference::new(sine(), 0, 2);
        assert_relative_eq!(d2f.eval(0.5), -(0.5_f64.sin()), epsilon = 1e-6);
    }

    #[test]
    fn test_derivative_of_derivative_accumulates_order() {
        let df = FiniteDifference::new(sine(), 0, 1);
        let d2f = df.derivative(0, 1).unwrap();
        assert_relative_eq!(d2f.eval(1.0), -(1.0_f64.sin()), epsilon = 1e-6);
    }

    #[test]
    fn test_display_mentions_step() {
        let df = FiniteDifference::new(sine(), 0, 1);
        let text = df.to_string();
        assert!(text.contains("1e-5"));
        assert!(text.contains("sin(x)"));
    }
}
