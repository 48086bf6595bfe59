//! Error formulas shared by every iterative method.
//!
//! Relative variants fall back to the absolute difference when their
//! denominator is exactly zero, so a step that lands on `0` never produces a
//! NaN error.

use crate::types::{ConvergenceConfig, ErrorKind, ErrorMetrics};

/// `|Δ| / |d|`, or `|Δ|` when `d == 0`.
#[inline]
pub fn relative(delta: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        delta.abs()
    } else {
        delta.abs() / denominator.abs()
    }
}

/// Infinity norm `max_i |v_i|`.
#[inline]
pub fn norm_inf(v: &[f64]) -> f64 {
    v.iter().fold(0.0_f64, |acc, x| acc.max(x.abs()))
}

/// Error values of a scalar step from `previous` to `current`.
///
/// # Examples
/// ```
/// use numeric_core::math::error_metrics::scalar_errors;
///
/// let e = scalar_errors(1.0, 1.5);
/// assert_eq!(e.absolute, Some(0.5));
/// assert_eq!(e.relative_current, Some(0.5 / 1.5));
/// assert_eq!(e.relative_previous, Some(0.5));
/// assert_eq!(e.componentwise_current, None);
/// ```
pub fn scalar_errors(previous: f64, current: f64) -> ErrorMetrics {
    let delta = current - previous;
    ErrorMetrics {
        absolute: Some(delta.abs()),
        relative_current: Some(relative(delta, current)),
        relative_previous: Some(relative(delta, previous)),
        componentwise_current: None,
        componentwise_previous: None,
    }
}

/// Error values of a vector step, all in the infinity norm.
///
/// Mismatched lengths are compared over the shorter prefix.
pub fn vector_errors(previous: &[f64], current: &[f64]) -> ErrorMetrics {
    let delta: Vec<f64> = current
        .iter()
        .zip(previous.iter())
        .map(|(c, p)| c - p)
        .collect();
    let absolute = norm_inf(&delta);

    let componentwise = |reference: &[f64]| {
        delta
            .iter()
            .zip(reference.iter())
            .map(|(d, r)| relative(*d, *r))
            .fold(0.0_f64, f64::max)
    };

    ErrorMetrics {
        absolute: Some(absolute),
        relative_current: Some(relative(absolute, norm_inf(current))),
        relative_previous: Some(relative(absolute, norm_inf(previous))),
        componentwise_current: Some(componentwise(current)),
        componentwise_previous: Some(componentwise(previous)),
    }
}

/// Apply the configured retention policy.
pub fn retain(metrics: ErrorMetrics, config: &ConvergenceConfig) -> ErrorMetrics {
    if config.full_diagnostics {
        metrics
    } else {
        metrics.retain_selected(config.error_kind)
    }
}

/// Value the stopping rule compares with the tolerance.
///
/// `|residual|` under [`ErrorKind::Residual`], the selected step error
/// otherwise.
///
/// # Examples
/// ```
/// use numeric_core::math::error_metrics::{scalar_errors, stopping_error};
/// use numeric_core::types::ErrorKind;
///
/// let e = scalar_errors(1.0, 1.5);
/// assert_eq!(stopping_error(&e, Some(-0.25), ErrorKind::Residual), Some(0.25));
/// assert_eq!(stopping_error(&e, Some(-0.25), ErrorKind::Absolute), Some(0.5));
/// ```
pub fn stopping_error(metrics: &ErrorMetrics, residual: Option<f64>, kind: ErrorKind) -> Option<f64> {
    match kind {
        ErrorKind::Residual => residual.map(f64::abs),
        other => metrics.selected(other),
    }
}

/// Whether the stopping value is below the tolerance.
pub fn meets_tolerance(metrics: &ErrorMetrics, residual: Option<f64>, config: &ConvergenceConfig) -> bool {
    stopping_error(metrics, residual, config.error_kind)
        .map(|e| e < config.tolerance)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ErrorKind;
    use approx::assert_relative_eq;

    #[test]
    fn test_relative_falls_back_to_absolute_at_zero() {
        assert_eq!(relative(-0.25, 0.0), 0.25);
        assert_relative_eq!(relative(0.25, -0.5), 0.5);
    }

    #[test]
    fn test_scalar_errors_first_step_to_zero() {
        let e = scalar_errors(0.5, 0.0);
        assert_eq!(e.absolute, Some(0.5));
        assert_eq!(e.relative_current, Some(0.5));
        assert_eq!(e.relative_previous, Some(1.0));
    }

    #[test]
    fn test_vector_errors_all_variants() {
        let prev = [1.0, 2.0, 4.0];
        let curr = [1.5, 2.0, 3.0];
        let e = vector_errors(&prev, &curr);
        assert_relative_eq!(e.absolute.unwrap(), 1.0);
        assert_relative_eq!(e.relative_current.unwrap(), 1.0 / 3.0);
        assert_relative_eq!(e.relative_previous.unwrap(), 0.25);
        // max(0.5/1.5, 0, 1/3)
        assert_relative_eq!(e.componentwise_current.unwrap(), 1.0 / 3.0);
        // max(0.5/1, 0, 1/4)
        assert_relative_eq!(e.componentwise_previous.unwrap(), 0.5);
    }

    #[test]
    fn test_vector_errors_zero_component() {
        let e = vector_errors(&[0.0, 1.0], &[0.5, 1.0]);
        assert_relative_eq!(e.componentwise_previous.unwrap(), 0.5);
    }

    #[test]
    fn test_norm_inf() {
        assert_eq!(norm_inf(&[1.0, -3.0, 2.0]), 3.0);
        assert_eq!(norm_inf(&[]), 0.0);
    }

    #[test]
    fn test_meets_tolerance_uses_selected_kind() {
        let e = scalar_errors(100.0, 100.5);
        let abs = ConvergenceConfig::new(0.1, 10).unwrap();
        let rel = abs.with_error_kind(ErrorKind::Relative);
        assert!(!meets_tolerance(&e, None, &abs));
        assert!(meets_tolerance(&e, None, &rel));
        assert!(!meets_tolerance(&ErrorMetrics::none(), None, &abs));
    }

    #[test]
    fn test_residual_kind_ignores_step_size() {
        let config = ConvergenceConfig::new(1e-3, 10)
            .unwrap()
            .with_error_kind(ErrorKind::Residual);
        // tiny step, large residual
        let e = scalar_errors(1.0, 1.0 + 1e-9);
        assert!(!meets_tolerance(&e, Some(0.2), &config));
        // first step has no step error but a residual is still available
        assert!(meets_tolerance(&ErrorMetrics::none(), Some(-1e-4), &config));
        assert!(!meets_tolerance(&ErrorMetrics::none(), None, &config));
    }

    #[test]
    fn test_retain_respects_full_diagnostics() {
        let e = scalar_errors(1.0, 2.0);
        let config = ConvergenceConfig::default().with_full_diagnostics(false);
        let kept = retain(e, &config);
        assert!(kept.absolute.is_some());
        assert!(kept.relative_previous.is_none());
        assert_eq!(retain(e, &ConvergenceConfig::default()), e);
    }
}
