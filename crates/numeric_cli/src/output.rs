//! Rendering of results and comparison reports

use numeric_core::compare::ComparisonReport;
use numeric_core::types::{IterationRecord, MethodResult, Solution, State};
use serde::Deserialize;
use std::fmt::Write as _;
use std::str::FromStr;

use crate::{CliError, Result};

/// Output format of every command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl FromStr for OutputFormat {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            other => Err(CliError::InvalidArgument(format!(
                "Unknown format: {}. Supported: json, table",
                other
            ))),
        }
    }
}

fn value(v: Option<f64>) -> String {
    v.map_or_else(|| "-".to_string(), |v| format!("{:.6e}", v))
}

fn state(s: &State) -> String {
    match s {
        State::Scalar(x) => format!("{:.10}", x),
        State::Vector(v) => vector(v),
    }
}

fn vector(v: &[f64]) -> String {
    let entries: Vec<String> = v.iter().map(|x| format!("{:.6}", x)).collect();
    format!("[{}]", entries.join(", "))
}

fn trace_table(out: &mut String, trace: &[IterationRecord]) {
    let _ = writeln!(out, "┌──────┬──────────────────────────────┬──────────────┬──────────────┬──────────────┐");
    let _ = writeln!(out, "│ n    │ x_n                          │ residual     │ abs error    │ rel error    │");
    let _ = writeln!(out, "├──────┼──────────────────────────────┼──────────────┼──────────────┼──────────────┤");
    for record in trace {
        let _ = writeln!(
            out,
            "│ {:<4} │ {:<28} │ {:<12} │ {:<12} │ {:<12} │",
            record.index,
            state(&record.state),
            value(record.residual),
            value(record.errors.absolute),
            value(record.errors.relative_current),
        );
    }
    let _ = writeln!(out, "└──────┴──────────────────────────────┴──────────────┴──────────────┴──────────────┘");
}

fn result_table(result: &MethodResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Method:      {}", result.method);
    match &result.failure {
        None => {
            let _ = writeln!(out, "Status:      converged");
        }
        Some(failure) => {
            let _ = writeln!(out, "Status:      failed ({})", failure.kind);
            let _ = writeln!(out, "Reason:      {}", failure.reason);
        }
    }
    match &result.solution {
        Some(Solution::Scalar(x)) => {
            let _ = writeln!(out, "Solution:    {:.10}", x);
        }
        Some(Solution::Vector(v)) => {
            let _ = writeln!(out, "Solution:    {}", vector(v));
        }
        Some(Solution::Interpolant(fit)) => {
            let _ = writeln!(out, "Polynomial:  {}", fit.symbolic_form);
            let _ = writeln!(out, "Degree:      {}", fit.degree);
            for e in &fit.evaluations {
                let _ = writeln!(out, "P({}) = {:.10}", e.x, e.y);
            }
        }
        None => {}
    }
    let _ = writeln!(out, "Iterations:  {}", result.iterations);
    let _ = writeln!(out, "Final error: {}", value(result.final_error));
    if let Some(rho) = result.spectral_radius {
        let verdict = if result.converges_by_radius { "converges" } else { "does not converge" };
        let _ = writeln!(out, "Spectral radius: {:.6} ({})", rho, verdict);
    }
    if let Some(dominant) = result.diagonally_dominant {
        let _ = writeln!(out, "Diagonally dominant: {}", if dominant { "yes" } else { "no" });
    }
    if result.multiple_root_suspected == Some(true) {
        let _ = writeln!(out, "Multiple root suspected");
    }
    for derived in &result.derived_expressions {
        let _ = writeln!(out, "{} = {}", derived.label, derived.text);
    }
    if !result.trace.is_empty() {
        trace_table(&mut out, &result.trace);
    }
    out
}

fn report_table(report: &ComparisonReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Comparison ({})", report.category);
    let _ = writeln!(out, "┌────────────────────┬──────────────────────────┬────────────┬──────────────┬────────────┐");
    let _ = writeln!(out, "│ Method             │ Status                   │ Iterations │ Final error  │ Time (µs)  │");
    let _ = writeln!(out, "├────────────────────┼──────────────────────────┼────────────┼──────────────┼────────────┤");
    for entry in &report.entries {
        let status = match entry.result.failure_kind() {
            None => "ok".to_string(),
            Some(kind) => kind.to_string(),
        };
        let _ = writeln!(
            out,
            "│ {:<18} │ {:<24} │ {:<10} │ {:<12} │ {:<10} │",
            entry.name,
            status,
            entry.result.iterations,
            value(entry.result.final_error),
            entry.elapsed.as_micros(),
        );
    }
    let _ = writeln!(out, "└────────────────────┴──────────────────────────┴────────────┴──────────────┴────────────┘");
    let _ = writeln!(out, "Succeeded: {}  Failed: {}", report.success_count, report.failure_count);
    if let Some(best) = &report.best_by_error {
        let _ = writeln!(out, "Best by error: {}", best);
    }
    if let Some(best) = &report.best_by_iteration_count {
        let _ = writeln!(out, "Best by iterations: {}", best);
    }
    if let Some(fastest) = &report.fastest {
        let _ = writeln!(out, "Fastest: {}", fastest);
    }
    for (variant, name) in &report.best_by_error_variant {
        let _ = writeln!(out, "Best by {}: {}", variant, name);
    }
    for (kind, count) in &report.failures_by_kind {
        let _ = writeln!(out, "Failures ({}): {}", kind, count);
    }
    out
}

/// Render one method result
pub fn render_result(result: &MethodResult, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
        OutputFormat::Table => Ok(result_table(result)),
    }
}

/// Render a comparison report
pub fn render_report(report: &ComparisonReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Table => Ok(report_table(report)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use numeric_core::api::{self, RootInputs};
    use numeric_core::math::interpolation::InterpolationOptions;
    use numeric_core::types::ConvergenceConfig;

    fn sqrt_two(method: &str) -> MethodResult {
        let config = ConvergenceConfig::new(1e-6, 50).unwrap();
        api::solve_root(method, "x^2 - 2", &RootInputs::bracket(0.0, 2.0), &config)
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("TABLE".parse::<OutputFormat>().unwrap(), OutputFormat::Table);
        assert!("csv".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_result_table() {
        let text = render_result(&sqrt_two("bisection"), OutputFormat::Table).unwrap();
        assert!(text.contains("Method:      bisection"));
        assert!(text.contains("Status:      converged"));
        assert!(text.contains("1.4142"));
        assert!(text.contains("│ 1    │"));
    }

    #[test]
    fn test_failed_result_table() {
        let config = ConvergenceConfig::default();
        let result = api::solve_root("bisection", "x^2 + 1", &RootInputs::bracket(0.0, 2.0), &config);
        let text = render_result(&result, OutputFormat::Table).unwrap();
        assert!(text.contains("Status:      failed (invalid_bracket)"));
        assert!(text.contains("Reason:"));
    }

    #[test]
    fn test_result_json() {
        let text = render_result(&sqrt_two("newton"), OutputFormat::Json).unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["method"], "newton");
        assert_eq!(json["success"], true);
    }

    #[test]
    fn test_report_table() {
        let report = api::compare_interpolation(vec![(0.0, 1.0), (1.0, 3.0), (2.0, 7.0)], &InterpolationOptions::default());
        let text = render_report(&report, OutputFormat::Table).unwrap();
        assert!(text.contains("Comparison (interpolation)"));
        assert!(text.contains("cubic_spline"));
        assert!(text.contains("Succeeded: 5  Failed: 0"));
        assert!(!text.contains("Best by iterations"));
        assert!(text.contains("Fastest: "));
    }
}
