//! Text formats accepted on the command line
//!
//! - matrix: rows separated by `;`, entries by `,` (`10,1,1;2,10,1;2,2,10`)
//! - vector: entries separated by `,` (`12,13,14`)
//! - points: pairs separated by `;` (`0,1;1,2;2,5`)
//!
//! Shape checks (square matrix, matching lengths) are left to the engines.

use crate::{CliError, Result};

const MATRIX_EXAMPLE: &str = "10,1,1;2,10,1;2,2,10";
const VECTOR_EXAMPLE: &str = "12,13,14";
const POINTS_EXAMPLE: &str = "0,1;1,2;2,5";

fn format_error(field: &'static str, message: String, example: &'static str) -> CliError {
    CliError::InputFormat {
        field,
        message,
        example,
    }
}

fn parse_entries(text: &str, field: &'static str, example: &'static str) -> Result<Vec<f64>> {
    text.split(',')
        .map(|entry| {
            let entry = entry.trim();
            entry
                .parse::<f64>()
                .map_err(|_| format_error(field, format!("'{}' is not a number", entry), example))
        })
        .collect()
}

/// Parse a matrix such as `10,1,1;2,10,1;2,2,10`.
pub fn parse_matrix(text: &str) -> Result<Vec<Vec<f64>>> {
    if text.trim().is_empty() {
        return Err(format_error("matrix", "no rows given".to_string(), MATRIX_EXAMPLE));
    }
    text.trim()
        .trim_end_matches(';')
        .split(';')
        .map(|row| parse_entries(row, "matrix", MATRIX_EXAMPLE))
        .collect()
}

/// Parse a vector such as `12,13,14`.
pub fn parse_vector(text: &str) -> Result<Vec<f64>> {
    if text.trim().is_empty() {
        return Err(format_error("vector", "no entries given".to_string(), VECTOR_EXAMPLE));
    }
    parse_entries(text.trim(), "vector", VECTOR_EXAMPLE)
}

/// Parse interpolation nodes such as `0,1;1,2;2,5`.
pub fn parse_points(text: &str) -> Result<Vec<(f64, f64)>> {
    if text.trim().is_empty() {
        return Err(format_error("points", "no points given".to_string(), POINTS_EXAMPLE));
    }
    text.trim()
        .trim_end_matches(';')
        .split(';')
        .map(|pair| match parse_entries(pair, "points", POINTS_EXAMPLE)?.as_slice() {
            [x, y] => Ok((*x, *y)),
            other => Err(format_error(
                "points",
                format!("'{}' has {} values, expected x,y", pair.trim(), other.len()),
                POINTS_EXAMPLE,
            )),
        })
        .collect()
}

/// Parse a `lo,hi` pair (bracket or clamped end slopes).
pub fn parse_pair(text: &str, field: &'static str) -> Result<(f64, f64)> {
    match parse_entries(text.trim(), field, "0,2")?.as_slice() {
        [a, b] => Ok((*a, *b)),
        other => Err(format_error(field, format!("expected two values, got {}", other.len()), "0,2")),
    }
}
