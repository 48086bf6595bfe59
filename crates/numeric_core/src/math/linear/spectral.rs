//! Spectral radius by shifted QR iteration.
//!
//! The matrix is first reduced to upper Hessenberg form with Householder
//! similarity transforms, then Francis double-shift QR sweeps deflate one
//! real eigenvalue or one conjugate pair at a time. Exceptional shifts break
//! the cycles that equal-modulus spectra (cyclic and permutation-like
//! iteration matrices) cause under plain shifts.
//!
//! Plain unshifted QR with a quasi-triangular read-out is kept as a fallback
//! for the rare case where the shifted sweeps run out of budget.

use super::Matrix;
use tracing::debug;

const MAX_SWEEPS: usize = 2000;
const CHECK_EVERY: usize = 10;
const SETTLE_TOLERANCE: f64 = 1e-12;

/// Shifted sweeps allowed per deflated eigenvalue before giving up.
const MAX_SHIFTS: usize = 60;

/// Householder QR decomposition `A = Q·R`.
pub fn householder_qr(a: &Matrix) -> (Matrix, Matrix) {
    let n = a.rows();
    let mut r = a.clone();
    let mut q = Matrix::identity(n);

    for k in 0..n.saturating_sub(1) {
        let Some(v) = reflector((k..n).map(|i| r[(i, k)]).collect()) else {
            continue;
        };

        // R <- (I - 2vv^T) R on rows k..n
        for j in 0..n {
            let dot: f64 = (k..n).map(|i| v[i - k] * r[(i, j)]).sum();
            for i in k..n {
                r[(i, j)] -= 2.0 * v[i - k] * dot;
            }
        }
        // Q <- Q (I - 2vv^T) on columns k..n
        for i in 0..n {
            let dot: f64 = (k..n).map(|j| q[(i, j)] * v[j - k]).sum();
            for j in k..n {
                q[(i, j)] -= 2.0 * dot * v[j - k];
            }
        }
    }
    (q, r)
}

/// Unit Householder vector mapping `x` onto a multiple of `e_1`.
fn reflector(mut v: Vec<f64>) -> Option<Vec<f64>> {
    let norm_x = v.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm_x == 0.0 {
        return None;
    }
    v[0] -= if v[0] >= 0.0 { -norm_x } else { norm_x };
    let norm_v = v.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm_v == 0.0 {
        return None;
    }
    for x in v.iter_mut() {
        *x /= norm_v;
    }
    Some(v)
}

/// Upper Hessenberg matrix similar to `a`.
pub fn hessenberg(a: &Matrix) -> Matrix {
    let n = a.rows();
    let mut h = a.clone();
    for k in 0..n.saturating_sub(2) {
        let Some(v) = reflector((k + 1..n).map(|i| h[(i, k)]).collect()) else {
            continue;
        };
        let off = k + 1;
        // H <- P H
        for j in 0..n {
            let dot: f64 = (off..n).map(|i| v[i - off] * h[(i, j)]).sum();
            for i in off..n {
                h[(i, j)] -= 2.0 * v[i - off] * dot;
            }
        }
        // H <- H P
        for i in 0..n {
            let dot: f64 = (off..n).map(|j| h[(i, j)] * v[j - off]).sum();
            for j in off..n {
                h[(i, j)] -= 2.0 * dot * v[j - off];
            }
        }
        for i in off + 1..n {
            h[(i, k)] = 0.0;
        }
    }
    h
}

fn sign(magnitude: f64, of: f64) -> f64 {
    if of >= 0.0 {
        magnitude.abs()
    } else {
        -magnitude.abs()
    }
}

/// Eigenvalues `(re, im)` of a square matrix, in deflation order.
///
/// Returns `None` when the shifted sweeps fail to deflate within budget.
pub fn eigenvalues(m: &Matrix) -> Option<Vec<(f64, f64)>> {
    let n = m.rows();
    let h = hessenberg(m);

    // 1-based working copy; row and column 0 are unused
    let mut a = vec![vec![0.0; n + 1]; n + 1];
    for i in 0..n {
        for j in 0..n {
            a[i + 1][j + 1] = h[(i, j)];
        }
    }
    let mut anorm = 0.0;
    for i in 1..=n {
        for j in i.saturating_sub(1).max(1)..=n {
            anorm += a[i][j].abs();
        }
    }

    let mut values = Vec::with_capacity(n);
    let mut nn = n;
    let mut t = 0.0;
    while nn >= 1 {
        let mut its = 0;
        loop {
            // smallest l whose subdiagonal entry is negligible
            let mut l = nn;
            while l >= 2 {
                let mut s = a[l - 1][l - 1].abs() + a[l][l].abs();
                if s == 0.0 {
                    s = anorm;
                }
                if a[l][l - 1].abs() + s == s {
                    a[l][l - 1] = 0.0;
                    break;
                }
                l -= 1;
            }

            let mut x = a[nn][nn];
            if l == nn {
                values.push((x + t, 0.0));
                nn -= 1;
                break;
            }
            let mut y = a[nn - 1][nn - 1];
            let mut w = a[nn][nn - 1] * a[nn - 1][nn];
            if l == nn - 1 {
                let p = 0.5 * (y - x);
                let q = p * p + w;
                let z = q.abs().sqrt();
                x += t;
                if q >= 0.0 {
                    let z = p + sign(z, p);
                    let first = x + z;
                    let second = if z != 0.0 { x - w / z } else { first };
                    values.push((first, 0.0));
                    values.push((second, 0.0));
                } else {
                    values.push((x + p, z));
                    values.push((x + p, -z));
                }
                nn -= 2;
                break;
            }

            if its == MAX_SHIFTS {
                return None;
            }
            if its == 10 || its == 20 {
                // exceptional shift
                t += x;
                for i in 1..=nn {
                    a[i][i] -= x;
                }
                let s = a[nn][nn - 1].abs() + a[nn - 1][nn - 2].abs();
                x = 0.75 * s;
                y = x;
                w = -0.4375 * s * s;
            }
            its += 1;

            // start the bulge where two consecutive subdiagonals are small
            let mut m = nn - 2;
            let mut p: f64;
            let mut q: f64;
            let mut r: f64;
            loop {
                let z = a[m][m];
                let rr = x - z;
                let ss = y - z;
                p = (rr * ss - w) / a[m + 1][m] + a[m][m + 1];
                q = a[m + 1][m + 1] - z - rr - ss;
                r = a[m + 2][m + 1];
                let s = p.abs() + q.abs() + r.abs();
                p /= s;
                q /= s;
                r /= s;
                if m == l {
                    break;
                }
                let u = a[m][m - 1].abs() * (q.abs() + r.abs());
                let v = p.abs() * (a[m - 1][m - 1].abs() + z.abs() + a[m + 1][m + 1].abs());
                if u + v == v {
                    break;
                }
                m -= 1;
            }
            for i in m + 2..=nn {
                a[i][i - 2] = 0.0;
                if i != m + 2 {
                    a[i][i - 3] = 0.0;
                }
            }

            // chase the bulge down the subdiagonal
            for k in m..nn {
                if k != m {
                    p = a[k][k - 1];
                    q = a[k + 1][k - 1];
                    r = if k != nn - 1 { a[k + 2][k - 1] } else { 0.0 };
                    x = p.abs() + q.abs() + r.abs();
                    if x != 0.0 {
                        p /= x;
                        q /= x;
                        r /= x;
                    }
                }
                let s = sign((p * p + q * q + r * r).sqrt(), p);
                if s == 0.0 {
                    continue;
                }
                if k == m {
                    if l != m {
                        a[k][k - 1] = -a[k][k - 1];
                    }
                } else {
                    a[k][k - 1] = -s * x;
                }
                p += s;
                x = p / s;
                y = q / s;
                let z = r / s;
                q /= p;
                r /= p;
                for j in k..=nn {
                    let mut pj = a[k][j] + q * a[k + 1][j];
                    if k != nn - 1 {
                        pj += r * a[k + 2][j];
                        a[k + 2][j] -= pj * z;
                    }
                    a[k + 1][j] -= pj * y;
                    a[k][j] -= pj * x;
                }
                for i in l..=nn.min(k + 3) {
                    let mut pi = x * a[i][k] + y * a[i][k + 1];
                    if k != nn - 1 {
                        pi += z * a[i][k + 2];
                        a[i][k + 2] -= pi * r;
                    }
                    a[i][k + 1] -= pi * q;
                    a[i][k] -= pi;
                }
            }
        }
    }
    Some(values)
}

/// Eigenvalue moduli read from a quasi-upper-triangular matrix.
pub fn eigenvalue_moduli(t: &Matrix) -> Vec<f64> {
    let n = t.rows();
    let mut moduli = Vec::with_capacity(n);
    let mut i = 0;
    while i < n {
        if i + 1 < n && !negligible(t, i + 1, i) {
            let (a, b, c, d) = (t[(i, i)], t[(i, i + 1)], t[(i + 1, i)], t[(i + 1, i + 1)]);
            let half_trace = (a + d) / 2.0;
            let det = a * d - b * c;
            let disc = half_trace * half_trace - det;
            if disc < 0.0 {
                let modulus = det.abs().sqrt();
                moduli.push(modulus);
                moduli.push(modulus);
            } else {
                let root = disc.sqrt();
                moduli.push((half_trace + root).abs());
                moduli.push((half_trace - root).abs());
            }
            i += 2;
        } else {
            moduli.push(t[(i, i)].abs());
            i += 1;
        }
    }
    moduli
}

fn negligible(t: &Matrix, row: usize, col: usize) -> bool {
    let scale = t[(col, col)].abs() + t[(row, row)].abs();
    t[(row, col)].abs() <= SETTLE_TOLERANCE * scale.max(f64::MIN_POSITIVE)
}

/// Largest eigenvalue modulus of a square matrix.
///
/// # Examples
/// ```
/// use numeric_core::math::linear::{spectral_radius, Matrix};
///
/// let m = Matrix::from_rows(&[vec![0.0, 0.5], vec![-0.5, 0.0]]).unwrap();
/// assert!((spectral_radius(&m) - 0.5).abs() < 1e-12);
/// ```
pub fn spectral_radius(m: &Matrix) -> f64 {
    if m.rows() == 0 {
        return 0.0;
    }
    match eigenvalues(m) {
        Some(values) => values
            .into_iter()
            .map(|(re, im)| re.hypot(im))
            .fold(0.0, f64::max),
        None => {
            debug!(n = m.rows(), "shifted QR did not deflate, using unshifted sweeps");
            unshifted_radius(m)
        }
    }
}

fn unshifted_radius(m: &Matrix) -> f64 {
    let mut a = m.clone();
    let mut previous = f64::NAN;
    for sweep in 1..=MAX_SWEEPS {
        let (q, r) = householder_qr(&a);
        a = r.mul(&q);
        if sweep % CHECK_EVERY == 0 {
            let current = radius_of(&a);
            if (current - previous).abs() <= SETTLE_TOLERANCE * current.max(1.0) {
                return current;
            }
            previous = current;
        }
    }
    radius_of(&a)
}

fn radius_of(t: &Matrix) -> f64 {
    eigenvalue_moduli(t).into_iter().fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn moduli_sorted(m: &Matrix) -> Vec<f64> {
        let mut moduli: Vec<f64> = eigenvalues(m)
            .unwrap()
            .into_iter()
            .map(|(re, im)| re.hypot(im))
            .collect();
        moduli.sort_by(|a, b| a.total_cmp(b));
        moduli
    }

    // ========================================
    // Decompositions
    // ========================================

    #[test]
    fn test_qr_reconstructs() {
        let a = Matrix::from_rows(&[
            vec![4.0, 1.0, 2.0],
            vec![1.0, 3.0, 0.5],
            vec![2.0, 0.5, 5.0],
        ])
        .unwrap();
        let (q, r) = householder_qr(&a);
        let back = q.mul(&r);
        for i in 0..3 {
            for j in 0..3 {
                assert_relative_eq!(back[(i, j)], a[(i, j)], epsilon = 1e-12);
                if i > j {
                    assert!(r[(i, j)].abs() < 1e-12);
                }
            }
        }
    }

    #[test]
    fn test_hessenberg_shape_and_trace() {
        let a = Matrix::from_rows(&[
            vec![4.0, 1.0, 2.0, 3.0],
            vec![1.0, 3.0, 0.5, -1.0],
            vec![2.0, 0.5, 5.0, 0.0],
            vec![-2.0, 1.0, 1.0, 1.0],
        ])
        .unwrap();
        let h = hessenberg(&a);
        for i in 0..4 {
            for j in 0..4 {
                if i > j + 1 {
                    assert_eq!(h[(i, j)], 0.0);
                }
            }
        }
        let trace_a: f64 = a.diagonal().iter().sum();
        let trace_h: f64 = h.diagonal().iter().sum();
        assert_relative_eq!(trace_a, trace_h, epsilon = 1e-12);
    }

    // ========================================
    // Spectral radius
    // ========================================

    #[test]
    fn test_diagonal_matrix() {
        let m = Matrix::from_rows(&[vec![0.3, 0.0], vec![0.0, -0.7]]).unwrap();
        assert_relative_eq!(spectral_radius(&m), 0.7, epsilon = 1e-12);
    }

    #[test]
    fn test_symmetric_matrix() {
        // eigenvalues 1 and 3
        let m = Matrix::from_rows(&[vec![2.0, 1.0], vec![1.0, 2.0]]).unwrap();
        assert_relative_eq!(spectral_radius(&m), 3.0, epsilon = 1e-10);
    }

    #[test]
    fn test_rotation_has_complex_pair() {
        let m = Matrix::from_rows(&[vec![0.0, -2.0], vec![2.0, 0.0]]).unwrap();
        assert_relative_eq!(spectral_radius(&m), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_opposite_sign_pair() {
        let m = Matrix::from_rows(&[vec![0.0, 0.5], vec![0.5, 0.0]]).unwrap();
        assert_relative_eq!(spectral_radius(&m), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_three_by_three() {
        // upper triangular: eigenvalues on the diagonal
        let m = Matrix::from_rows(&[
            vec![0.2, 1.0, 3.0],
            vec![0.0, -0.9, 2.0],
            vec![0.0, 0.0, 0.4],
        ])
        .unwrap();
        assert_relative_eq!(spectral_radius(&m), 0.9, epsilon = 1e-9);
    }

    #[test]
    fn test_cyclic_matrix_equal_moduli() {
        // lambda^3 = 1.5^3: three eigenvalues of modulus 1.5
        let m = Matrix::from_rows(&[
            vec![0.0, 0.0, 1.5],
            vec![1.5, 0.0, 0.0],
            vec![0.0, 1.5, 0.0],
        ])
        .unwrap();
        assert_relative_eq!(spectral_radius(&m), 1.5, epsilon = 1e-9);
        for modulus in moduli_sorted(&m) {
            assert_relative_eq!(modulus, 1.5, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_scaled_four_cycle() {
        // 0.5 times the fourth roots of unity
        let m = Matrix::from_rows(&[
            vec![0.0, 0.5, 0.0, 0.0],
            vec![0.0, 0.0, 0.5, 0.0],
            vec![0.0, 0.0, 0.0, 0.5],
            vec![0.5, 0.0, 0.0, 0.0],
        ])
        .unwrap();
        assert_relative_eq!(spectral_radius(&m), 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_companion_matrix() {
        // lambda^3 - 7 lambda + 6 = (lambda - 1)(lambda - 2)(lambda + 3)
        let m = Matrix::from_rows(&[
            vec![0.0, 7.0, -6.0],
            vec![1.0, 0.0, 0.0],
            vec![0.0, 1.0, 0.0],
        ])
        .unwrap();
        let moduli = moduli_sorted(&m);
        assert_relative_eq!(moduli[0], 1.0, epsilon = 1e-9);
        assert_relative_eq!(moduli[1], 2.0, epsilon = 1e-9);
        assert_relative_eq!(moduli[2], 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_eigenvalue_count_matches_dimension() {
        let m = Matrix::from_rows(&[
            vec![0.0, -0.2, 0.1, 0.3, 0.0],
            vec![0.4, 0.0, -0.1, 0.0, 0.2],
            vec![0.0, 0.3, 0.0, 0.1, -0.1],
            vec![0.1, 0.0, 0.2, 0.0, 0.3],
            vec![-0.3, 0.1, 0.0, 0.2, 0.0],
        ])
        .unwrap();
        let values = eigenvalues(&m).unwrap();
        assert_eq!(values.len(), 5);
        let sum_re: f64 = values.iter().map(|(re, _)| re).sum();
        let sum_im: f64 = values.iter().map(|(_, im)| im).sum();
        assert_relative_eq!(sum_re, 0.0, epsilon = 1e-10);
        assert_relative_eq!(sum_im, 0.0, epsilon = 1e-10);
    }

    #[test]
    fn test_unshifted_fallback_agrees_on_separated_spectrum() {
        let m = Matrix::from_rows(&[vec![2.0, 1.0], vec![1.0, 2.0]]).unwrap();
        assert_relative_eq!(unshifted_radius(&m), spectral_radius(&m), epsilon = 1e-9);
    }
}
