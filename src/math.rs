//! Mathematical utilities for section calculations

use nalgebra::{DMatrix, DVector};

pub type Mat = DMatrix<f64>;
pub type Vec = DVector<f64>;

/// Smallest accepted ratio between the extreme singular values of a
/// stiffness matrix before it is treated as singular
pub const MIN_RECIPROCAL_CONDITION: f64 = 1e-14;

/// Solve a linear system using LU decomposition
pub fn solve_linear_system(a: &Mat, b: &Vec) -> Option<Vec> {
    a.clone().lu().solve(b)
}

/// Reciprocal condition number estimate from the singular values
///
/// Returns 0.0 for an empty or all-zero matrix.
pub fn reciprocal_condition(a: &Mat) -> f64 {
    let sv = a.clone().svd(false, false).singular_values;
    let max = sv.iter().cloned().fold(0.0_f64, f64::max);
    let min = sv.iter().cloned().fold(f64::INFINITY, f64::min);
    if max <= 0.0 || !min.is_finite() {
        0.0
    } else {
        min / max
    }
}

/// Solve a small dense system, rejecting singular or ill-conditioned matrices
///
/// Returns `None` if the matrix has non-finite entries, fails the condition
/// check, or the LU solve fails or yields non-finite values.
pub fn solve_guarded(a: &Mat, b: &Vec) -> Option<Vec> {
    if a.iter().any(|v| !v.is_finite()) || b.iter().any(|v| !v.is_finite()) {
        return None;
    }
    if reciprocal_condition(a) < MIN_RECIPROCAL_CONDITION {
        return None;
    }
    solve_linear_system(a, b).filter(|x| x.iter().all(|v| v.is_finite()))
}

/// Linear interpolation between two points, extrapolating outside [x0, x1]
#[inline]
pub fn lerp(x0: f64, y0: f64, x1: f64, y1: f64, x: f64) -> f64 {
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}

/// Evenly spaced samples from `start` to `end` inclusive
pub fn linspace(start: f64, end: f64, num: usize) -> std::vec::Vec<f64> {
    match num {
        0 => std::vec::Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (num - 1) as f64;
            (0..num)
                .map(|i| if i == num - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}
