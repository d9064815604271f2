//! Benchmark objectives for testing and benchmarking the solvers.
//!
//! See <https://en.wikipedia.org/wiki/Test_functions_for_optimization>.

mod beale;
mod booth;
mod himmelblau;
mod matyas;
mod quadratic;
mod rosenbrock;
mod sphere;
mod sum_squares;

pub use self::beale::Beale;
pub use self::booth::Booth;
pub use self::himmelblau::Himmelblau;
pub use self::matyas::Matyas;
pub use self::quadratic::Quadratic;
pub use self::rosenbrock::Rosenbrock;
pub use self::sphere::Sphere;
pub use self::sum_squares::SumSquares;

use crate::function::Function;

/// All benchmark objectives with dimensions in `[min_dims, max_dims]`.
pub fn make_functions(min_dims: usize, max_dims: usize) -> Vec<Box<dyn Function>> {
    let min_dims = min_dims.max(1);
    let mut functions: Vec<Box<dyn Function>> = Vec::new();
    for dims in min_dims..=max_dims {
        functions.push(Box::new(Sphere::new(dims)));
        functions.push(Box::new(SumSquares::new(dims)));
        functions.push(Box::new(Quadratic::ellipse(dims)));
        if dims >= 2 {
            functions.push(Box::new(Rosenbrock::new(dims)));
        }
        if dims == 2 {
            functions.push(Box::new(Booth::new()));
            functions.push(Box::new(Matyas::new()));
            functions.push(Box::new(Beale::new()));
            functions.push(Box::new(Himmelblau::new()));
        }
    }
    functions
}

/// The convex subset of [`make_functions`](fn.make_functions.html).
pub fn make_convex_functions(min_dims: usize, max_dims: usize) -> Vec<Box<dyn Function>> {
    make_functions(min_dims, max_dims)
        .into_iter()
        .filter(|function| function.is_convex())
        .collect()
}
