//! Dense polynomials in the power basis.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coefficients with magnitude at or below this are left out of the text form.
pub const DISPLAY_CUTOFF: f64 = 1e-10;

/// `c_0 + c_1·x + ... + c_n·x^n`, coefficients stored ascending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polynomial {
    coefficients: Vec<f64>,
}

impl Polynomial {
    /// From ascending coefficients.
    pub fn new(coefficients: Vec<f64>) -> Self {
        Self { coefficients }
    }

    /// The constant `c`.
    pub fn constant(c: f64) -> Self {
        Self::new(vec![c])
    }

    /// Ascending coefficients.
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Nominal degree (number of coefficients minus one).
    pub fn degree(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }

    /// Horner evaluation.
    #[inline]
    pub fn eval(&self, x: f64) -> f64 {
        self.coefficients.iter().rev().fold(0.0, |acc, c| acc * x + c)
    }

    /// `self · (x - root)`.
    pub fn mul_linear(&self, root: f64) -> Polynomial {
        let mut out = vec![0.0; self.coefficients.len() + 1];
        for (k, c) in self.coefficients.iter().enumerate() {
            out[k + 1] += c;
            out[k] -= root * c;
        }
        Polynomial::new(out)
    }

    /// `self + s·other`, padding the shorter one with zeros.
    pub fn add_scaled(&self, other: &Polynomial, s: f64) -> Polynomial {
        let n = self.coefficients.len().max(other.coefficients.len());
        let coefficients = (0..n)
            .map(|k| {
                self.coefficients.get(k).copied().unwrap_or(0.0)
                    + s * other.coefficients.get(k).copied().unwrap_or(0.0)
            })
            .collect();
        Polynomial::new(coefficients)
    }
}

impl fmt::Display for Polynomial {
    /// Descending powers with six decimals, e.g. `1.000000x^2 - 2.000000`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let terms: Vec<String> = self
            .coefficients
            .iter()
            .enumerate()
            .rev()
            .filter(|(_, c)| c.abs() > DISPLAY_CUTOFF)
            .map(|(power, c)| match power {
                0 => format!("{:.6}", c),
                1 => format!("{:.6}x", c),
                _ => format!("{:.6}x^{}", c, power),
            })
            .collect();
        f.write_str(&join_terms(&terms))
    }
}

/// Join terms with ` + `, folding `+ -` into `- `.
pub(crate) fn join_terms(terms: &[String]) -> String {
    if terms.is_empty() {
        return "0".to_string();
    }
    terms.join(" + ").replace("+ -", "- ")
}

/// `x`, `(x - 1.500)` or `(x + 2.000)`.
pub(crate) fn shifted_variable(node: f64) -> String {
    if node.abs() < DISPLAY_CUTOFF {
        "x".to_string()
    } else if node > 0.0 {
        format!("(x - {:.3})", node)
    } else {
        format!("(x + {:.3})", node.abs())
    }
}
