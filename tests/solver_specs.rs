#[cfg(test)]
mod solver_specs {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use sprout::function::Function;
    use sprout::functions::{make_convex_functions, Quadratic, Rosenbrock, Sphere};
    use sprout::math;
    use sprout::solver::{BatchParams, BatchSolver, SolverStatus};
    use sprout::solvers::{batch_solver_ids, make_batch_solver};

    fn random_point(rng: &mut StdRng, dims: usize) -> Vec<f64> {
        (0..dims).map(|_| rng.gen_range(-1.0..1.0)).collect()
    }

    #[test]
    // every batch solver reaches the convergence criterion on every convex
    // benchmark and never increases the objective
    fn convex_convergence() {
        let _ = env_logger::builder().is_test(true).try_init();
        let params = BatchParams::new(200_000, math::epsilon2());

        for id in batch_solver_ids() {
            let solver = make_batch_solver(id).unwrap();
            let mut rng = StdRng::seed_from_u64(99);

            for function in make_convex_functions(1, 4).iter_mut() {
                for _ in 0..3 {
                    let x0 = random_point(&mut rng, function.size());
                    let f0 = function.eval(&x0, None);

                    let state = solver.minimize(&params, function.as_mut(), &x0, None);

                    if !function.is_valid(&state.x) {
                        continue;
                    }
                    assert!(
                        state.f <= f0,
                        "{} on {}: f increased {} -> {}",
                        id,
                        function.name(),
                        f0,
                        state.f
                    );
                    assert!(
                        state.convergence_criteria() < math::epsilon2(),
                        "{} on {}: criterion {} [{}]",
                        id,
                        function.name(),
                        state.convergence_criteria(),
                        state.status
                    );
                }
            }
        }
    }

    #[test]
    // Rosenbrock 2D from the classic start with L-BFGS
    fn lbfgs_rosenbrock() {
        let mut solver = make_batch_solver("lbfgs").unwrap();
        solver
            .from_json(
                r#"{"c1":1e-4,"c2":0.9,"history":20,"init":"quadratic","strat":"interpolation"}"#,
            )
            .unwrap();

        let mut function = Rosenbrock::new(2);
        let params = BatchParams::new(1000, 1e-6);
        let state = solver.minimize(&params, &mut function, &[-1.2, 1.0], None);

        assert_eq!(state.status, SolverStatus::Converged);
        assert!(math::norm_inf(&state.g) < 1e-6);
        assert!((state.x[0] - 1.0).abs() < 1e-3);
        assert!((state.x[1] - 1.0).abs() < 1e-3);
        assert!(state.gcalls <= 50, "too many gradient calls: {}", state.gcalls);
    }

    #[test]
    // sphere 8D with plain gradient descent and backtracking
    fn gd_sphere() {
        let mut solver = make_batch_solver("gd").unwrap();
        solver
            .from_json(r#"{"c1":1e-4,"c2":0.9,"init":"linear","strat":"backtrack"}"#)
            .unwrap();

        let mut rng = StdRng::seed_from_u64(8);
        let mut function = Sphere::new(8);
        let x0 = random_point(&mut rng, 8);

        let params = BatchParams::new(200, 1e-8);
        let state = solver.minimize(&params, &mut function, &x0, None);

        assert!(state.f < 1e-10, "f = {}", state.f);
        assert!(state.iterations <= 200);
    }

    #[test]
    // badly conditioned diagonal quadratic with CGD-HS
    fn cgd_hs_quadratic() {
        let solver = make_batch_solver("cgd-hs").unwrap();

        let mut function = Quadratic::new(vec![1.0, 10.0, 100.0, 1000.0]);
        let params = BatchParams::new(20, 1e-6);
        let state = solver.minimize(&params, &mut function, &[1.0, 1.0, 1.0, 1.0], None);

        assert_eq!(state.status, SolverStatus::Converged);
        assert!(state.iterations <= 20, "iterations = {}", state.iterations);
    }

    #[test]
    // the logger can stop the solver
    fn logger_stops() {
        let solver = make_batch_solver("gd").unwrap();
        let mut function = Rosenbrock::new(2);

        let mut epochs = 0;
        let mut ulog = |_state: &sprout::solver::SolverState| -> bool {
            epochs += 1;
            epochs < 3
        };
        let params = BatchParams::new(1000, 1e-12);
        let state = solver.minimize(&params, &mut function, &[-1.2, 1.0], Some(&mut ulog));

        assert_eq!(state.status, SolverStatus::Stopped);
        assert_eq!(state.iterations, 3);
    }

    #[test]
    // strict configuration parsing: unknown keys are rejected
    fn config_is_strict() {
        let mut solver = make_batch_solver("lbfgs").unwrap();
        assert!(solver.from_json(r#"{"c1":1e-4}"#).is_ok());
        assert!(solver.from_json(r#"{"c3":1.0}"#).is_err());
        assert!(solver.from_json(r#"{"init":"sideways"}"#).is_err());

        let json = solver.to_json();
        assert!(json.contains("\"history\":20"));
        let mut other = make_batch_solver("lbfgs").unwrap();
        other.from_json(&json).unwrap();
        assert_eq!(other.to_json(), json);
    }

    #[test]
    fn registry_knows_all_ids() {
        for id in batch_solver_ids() {
            assert!(make_batch_solver(id).is_some(), "{}", id);
        }
        assert!(make_batch_solver("newton").is_none());
    }

    #[test]
    // a non-finite objective surfaces as divergence, not a panic
    fn divergence_is_reported() {
        struct Exploding;
        impl Function for Exploding {
            fn size(&self) -> usize {
                1
            }
            fn eval(&mut self, x: &[f64], gx: Option<&mut [f64]>) -> f64 {
                if let Some(gx) = gx {
                    gx[0] = f64::NAN;
                }
                x[0]
            }
        }

        let solver = make_batch_solver("gd").unwrap();
        let params = BatchParams::new(10, 1e-6);
        let state = solver.minimize(&params, &mut Exploding, &[1.0], None);
        assert_eq!(state.status, SolverStatus::Diverged);
    }
}
