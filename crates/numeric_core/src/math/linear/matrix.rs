//! Small dense row-major matrices.

use crate::types::NumericError;
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// Pivots smaller than this are treated as zero.
pub const PIVOT_EPSILON: f64 = 1e-12;

/// Dense `rows x cols` matrix stored row-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// All-zero matrix.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// `n x n` identity.
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m[(i, i)] = 1.0;
        }
        m
    }

    /// Build from rows of equal length.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, NumericError> {
        let cols = rows.first().map(Vec::len).unwrap_or(0);
        let mut data = Vec::with_capacity(rows.len() * cols);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(NumericError::dimension(
                    format!("row {}", i + 1),
                    format!("{} columns", cols),
                    format!("{} columns", row.len()),
                ));
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            data,
        })
    }

    /// Copy out as nested rows.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.data.chunks(self.cols.max(1)).map(<[f64]>::to_vec).collect()
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Whether `rows == cols`.
    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Row `i` as a slice.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// Main diagonal.
    pub fn diagonal(&self) -> Vec<f64> {
        (0..self.rows.min(self.cols)).map(|i| self[(i, i)]).collect()
    }

    /// `A·v`.
    pub fn mul_vec(&self, v: &[f64]) -> Vec<f64> {
        (0..self.rows)
            .map(|i| self.row(i).iter().zip(v).map(|(a, b)| a * b).sum())
            .collect()
    }

    /// `A·B`.
    pub fn mul(&self, other: &Matrix) -> Matrix {
        let mut out = Matrix::zeros(self.rows, other.cols);
        for i in 0..self.rows {
            for k in 0..self.cols {
                let a = self[(i, k)];
                if a == 0.0 {
                    continue;
                }
                for j in 0..other.cols {
                    out[(i, j)] += a * other[(k, j)];
                }
            }
        }
        out
    }

    /// `A + B`.
    pub fn add(&self, other: &Matrix) -> Matrix {
        self.zip_with(other, |a, b| a + b)
    }

    /// `A - B`.
    pub fn sub(&self, other: &Matrix) -> Matrix {
        self.zip_with(other, |a, b| a - b)
    }

    /// `s·A`.
    pub fn scale(&self, s: f64) -> Matrix {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|a| a * s).collect(),
        }
    }

    fn zip_with(&self, other: &Matrix, op: impl Fn(f64, f64) -> f64) -> Matrix {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(a, b)| op(*a, *b))
                .collect(),
        }
    }

    /// Transpose.
    pub fn transpose(&self) -> Matrix {
        let mut t = Matrix::zeros(self.cols, self.rows);
        for i in 0..self.rows {
            for j in 0..self.cols {
                t[(j, i)] = self[(i, j)];
            }
        }
        t
    }

    /// Infinity norm: largest absolute row sum.
    pub fn norm_inf(&self) -> f64 {
        (0..self.rows)
            .map(|i| self.row(i).iter().map(|a| a.abs()).sum::<f64>())
            .fold(0.0, f64::max)
    }

    /// Solve `A·x = b` by Gaussian elimination with partial pivoting.
    ///
    /// # Errors
    ///
    /// `DivisionByZero` naming the failing column when the best available
    /// pivot is below [`PIVOT_EPSILON`].
    pub fn solve(&self, b: &[f64]) -> Result<Vec<f64>, NumericError> {
        let n = self.rows;
        if !self.is_square() || b.len() != n {
            return Err(NumericError::dimension(
                "linear solve",
                format!("{}x{} matrix with {} right-hand side entries", n, n, n),
                format!("{}x{} with {}", self.rows, self.cols, b.len()),
            ));
        }
        let mut a = self.clone();
        let mut x = b.to_vec();

        for col in 0..n {
            let pivot_row = (col..n)
                .max_by(|&p, &q| a[(p, col)].abs().total_cmp(&a[(q, col)].abs()))
                .unwrap_or(col);
            let pivot = a[(pivot_row, col)];
            if pivot.abs() < PIVOT_EPSILON {
                return Err(NumericError::division_by_zero(
                    format!("pivot in column {}", col + 1),
                    pivot,
                    col as f64,
                ));
            }
            if pivot_row != col {
                a.swap_rows(pivot_row, col);
                x.swap(pivot_row, col);
            }
            for r in col + 1..n {
                let factor = a[(r, col)] / a[(col, col)];
                if factor == 0.0 {
                    continue;
                }
                for c in col..n {
                    let v = a[(col, c)];
                    a[(r, c)] -= factor * v;
                }
                x[r] -= factor * x[col];
            }
        }

        for i in (0..n).rev() {
            let tail: f64 = (i + 1..n).map(|j| a[(i, j)] * x[j]).sum();
            x[i] = (x[i] - tail) / a[(i, i)];
        }
        Ok(x)
    }

    /// Inverse by Gauss-Jordan elimination with partial pivoting.
    pub fn inverse(&self) -> Result<Matrix, NumericError> {
        let n = self.rows;
        let mut columns = Vec::with_capacity(n);
        let identity = Matrix::identity(n);
        for j in 0..n {
            let e: Vec<f64> = (0..n).map(|i| identity[(i, j)]).collect();
            columns.push(self.solve(&e)?);
        }
        let mut inv = Matrix::zeros(n, n);
        for (j, column) in columns.iter().enumerate() {
            for (i, v) in column.iter().enumerate() {
                inv[(i, j)] = *v;
            }
        }
        Ok(inv)
    }

    fn swap_rows(&mut self, i: usize, j: usize) {
        for c in 0..self.cols {
            self.data.swap(i * self.cols + c, j * self.cols + c);
        }
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (i, j): (usize, usize)) -> &f64 {
        &self.data[i * self.cols + j]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut f64 {
        &mut self.data[i * self.cols + j]
    }
}
