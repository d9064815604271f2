#[cfg(test)]
mod function_specs {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use sprout::function::Problem;
    use sprout::functions::make_functions;
    use sprout::math;

    fn random_point(rng: &mut StdRng, dims: usize, radius: f64) -> Vec<f64> {
        (0..dims).map(|_| rng.gen_range(-radius..radius)).collect()
    }

    #[test]
    // every benchmark gradient matches a central finite difference
    fn gradient_accuracy() {
        let mut rng = StdRng::seed_from_u64(42);

        for function in make_functions(1, 4).iter_mut() {
            let dims = function.size();
            assert!(dims >= function.min_size());
            assert!(dims <= function.max_size());

            for _ in 0..100 {
                let x = random_point(&mut rng, dims, 1.0);
                let accuracy = Problem::new(function.as_mut()).grad_accuracy(&x);
                assert!(
                    accuracy < 10.0 * math::epsilon2(),
                    "{}: grad accuracy {} at {:?}",
                    function.name(),
                    accuracy,
                    x
                );
            }
        }
    }

    #[test]
    // functions flagged convex satisfy midpoint convexity
    fn convexity() {
        let mut rng = StdRng::seed_from_u64(7);

        for function in make_functions(1, 4).iter_mut() {
            if !function.is_convex() {
                continue;
            }
            let dims = function.size();

            for _ in 0..100 {
                let x0 = random_point(&mut rng, dims, 2.0);
                let x1 = random_point(&mut rng, dims, 2.0);
                let mid: Vec<f64> = x0
                    .iter()
                    .zip(x1.iter())
                    .map(|(a, b)| 0.5 * (a + b))
                    .collect();

                let f0 = function.eval(&x0, None);
                let f1 = function.eval(&x1, None);
                let fm = function.eval(&mid, None);
                assert!(
                    fm <= 0.5 * (f0 + f1) + math::epsilon0() * (1.0 + f0.abs() + f1.abs()),
                    "{}: not convex between {:?} and {:?}",
                    function.name(),
                    x0,
                    x1
                );
            }
        }
    }

    #[test]
    // the domain predicate accepts the unit box for every benchmark
    fn domains() {
        let mut rng = StdRng::seed_from_u64(3);
        for function in make_functions(1, 4).iter_mut() {
            let x = random_point(&mut rng, function.size(), 1.0);
            assert!(function.is_valid(&x), "{}", function.name());
        }
    }
}
