//! Scalar precision helpers and the slice kernels shared by the solvers.

/// Machine epsilon for `f64`.
pub fn epsilon0() -> f64 {
    f64::EPSILON
}

/// Square root of the machine epsilon.
pub fn epsilon1() -> f64 {
    f64::EPSILON.sqrt()
}

/// Cube root of the machine epsilon.
pub fn epsilon2() -> f64 {
    f64::EPSILON.cbrt()
}

/// Fourth root of the machine epsilon.
pub fn epsilon3() -> f64 {
    f64::EPSILON.sqrt().sqrt()
}

/// Check if two scalars are almost equal relative to their magnitude.
pub fn close(x: f64, y: f64, epsilon: f64) -> bool {
    (x - y).abs() <= (1.0 + x.abs().max(y.abs())) * epsilon
}

/// Dot product `x · y`.
pub fn dot(x: &[f64], y: &[f64]) -> f64 {
    debug_assert_eq!(x.len(), y.len());
    x.iter().zip(y.iter()).map(|(a, b)| a * b).sum()
}

/// `y ← y + alpha * x`.
pub fn axpy(alpha: f64, x: &[f64], y: &mut [f64]) {
    debug_assert_eq!(x.len(), y.len());
    for (yi, xi) in y.iter_mut().zip(x.iter()) {
        *yi += alpha * xi;
    }
}

/// `y ← beta * y + alpha * x`.
pub fn axpby(alpha: f64, x: &[f64], beta: f64, y: &mut [f64]) {
    scal(beta, y);
    axpy(alpha, x, y);
}

/// `x ← alpha * x`.
pub fn scal(alpha: f64, x: &mut [f64]) {
    for xi in x.iter_mut() {
        *xi *= alpha;
    }
}

/// Infinity norm `max |x_i|`.
pub fn norm_inf(x: &[f64]) -> f64 {
    x.iter().fold(0.0, |acc, xi| acc.max(xi.abs()))
}

/// Squared Euclidean norm `x · x`.
pub fn squared_norm(x: &[f64]) -> f64 {
    dot(x, x)
}

/// Euclidean norm.
pub fn norm2(x: &[f64]) -> f64 {
    squared_norm(x).sqrt()
}

/// Check that every component is finite.
pub fn is_finite(x: &[f64]) -> bool {
    x.iter().all(|xi| xi.is_finite())
}
