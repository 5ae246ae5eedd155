//! Least-squares polynomial regression over evenly spaced points.
//!
//! Points are indexed x = 0, 1, ..., n-1. Coefficients are returned lowest power
//! first: `[c0, c1, c2]` means c0 + c1*x + c2*x^2. The normal equations are
//! solved by Gaussian elimination with partial pivoting.

const PIVOT_EPSILON: f64 = 1e-12;

/// Fit a polynomial of `degree` to `values`. Returns `None` when the system is
/// singular, which happens when `degree >= values.len()`.
pub fn polyfit(values: &[f64], degree: usize) -> Option<Vec<f64>> {
    let n = values.len();
    if n == 0 || degree >= n {
        return None;
    }
    let size = degree + 1;

    // power_sums[k] = sum(x^k) for k in 0..=2*degree
    let mut power_sums = vec![0.0; 2 * degree + 1];
    let mut rhs = vec![0.0; size];
    for (i, &y) in values.iter().enumerate() {
        let x = i as f64;
        let mut xk = 1.0;
        for (k, sum) in power_sums.iter_mut().enumerate() {
            *sum += xk;
            if k < size {
                rhs[k] += xk * y;
            }
            xk *= x;
        }
    }

    let mut matrix: Vec<Vec<f64>> = (0..size)
        .map(|row| {
            let mut r: Vec<f64> = (0..size).map(|col| power_sums[row + col]).collect();
            r.push(rhs[row]);
            r
        })
        .collect();

    solve_augmented(&mut matrix)
}

fn solve_augmented(matrix: &mut [Vec<f64>]) -> Option<Vec<f64>> {
    let size = matrix.len();

    for col in 0..size {
        let pivot_row = (col..size).max_by(|&a, &b| {
            matrix[a][col].abs().total_cmp(&matrix[b][col].abs())
        })?;
        if matrix[pivot_row][col].abs() < PIVOT_EPSILON {
            return None;
        }
        matrix.swap(col, pivot_row);

        for row in (col + 1)..size {
            let factor = matrix[row][col] / matrix[col][col];
            for k in col..=size {
                matrix[row][k] -= factor * matrix[col][k];
            }
        }
    }

    let mut coeffs = vec![0.0; size];
    for row in (0..size).rev() {
        let tail: f64 = ((row + 1)..size).map(|k| matrix[row][k] * coeffs[k]).sum();
        coeffs[row] = (matrix[row][size] - tail) / matrix[row][row];
    }

    if coeffs.iter().all(|c| c.is_finite()) {
        Some(coeffs)
    } else {
        None
    }
}

/// Evaluate a lowest-power-first polynomial at `x` (Horner's method).
pub fn polyval(coeffs: &[f64], x: f64) -> f64 {
    coeffs.iter().rev().fold(0.0, |acc, &c| acc * x + c)
}

/// OLS slope of `values` against their index. 0.0 with fewer than two points.
pub fn linear_slope(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    polyfit(values, 1).map(|c| c[1]).unwrap_or(0.0)
}
