#[cfg(test)]
mod stoch_specs {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use sprout::functions::{Sphere, SumSquares};
    use sprout::math;
    use sprout::function::Function;
    use sprout::solver::{SolverStatus, StochParams, StochSolver};
    use sprout::solvers::{make_stoch_solver, stoch_solver_ids};

    fn random_point(rng: &mut StdRng, dims: usize) -> Vec<f64> {
        (0..dims).map(|_| rng.gen_range(-1.0..1.0)).collect()
    }

    #[test]
    // every stochastic solver decreases an easy convex objective from
    // nearly every random start
    fn convex_decrease() {
        let _ = env_logger::builder().is_test(true).try_init();
        let params = StochParams::new(64, 32, 1e-12);
        let trials = 10;

        for id in stoch_solver_ids() {
            let solver = make_stoch_solver(id).unwrap();
            let mut rng = StdRng::seed_from_u64(123);

            let mut passed = 0;
            for _ in 0..trials {
                let mut function = Sphere::new(2);
                let x0 = random_point(&mut rng, 2);
                let f0 = function.eval(&x0, None);

                let state = solver.minimize(&params, &mut function, &x0, None);

                assert!(state.f.is_finite(), "{}: non-finite result", id);
                if state.f < f0 * (1.0 - math::epsilon3()) {
                    passed += 1;
                }
            }
            assert!(
                passed * 10 >= trials * 9,
                "{}: decreased only {}/{} starts",
                id,
                passed,
                trials
            );
        }
    }

    #[test]
    // stochastic gradient on the weighted sum of squares, 32 dimensions
    fn sg_sum_squares() {
        let mut solver = make_stoch_solver("sg").unwrap();
        solver
            .from_json(r#"{"alpha0":0.01,"decay":1.0}"#)
            .unwrap();

        let mut rng = StdRng::seed_from_u64(321);
        let mut function = SumSquares::new(32);
        let x0 = random_point(&mut rng, 32);
        let f0 = function.eval(&x0, None);

        let params = StochParams::new(50, 100, 1e-12);
        let state = solver.minimize(&params, &mut function, &x0, None);

        assert!(state.f < 0.01 * f0, "f = {} from f0 = {}", state.f, f0);
    }

    #[test]
    // the per-epoch snapshot is reported through the logger
    fn logger_sees_epochs() {
        let solver = make_stoch_solver("adam").unwrap();
        let mut function = Sphere::new(3);

        let mut epochs = 0;
        let mut ulog = |_state: &sprout::solver::SolverState| -> bool {
            epochs += 1;
            true
        };
        let params = StochParams::new(7, 16, 1e-12);
        solver.minimize(&params, &mut function, &[0.5, -0.5, 0.25], Some(&mut ulog));
        assert_eq!(epochs, 7);
    }

    #[test]
    // the logger can request an early stop
    fn logger_stops() {
        let solver = make_stoch_solver("sg").unwrap();
        let mut function = Sphere::new(3);

        let mut epochs = 0;
        let mut ulog = |_state: &sprout::solver::SolverState| -> bool {
            epochs += 1;
            epochs < 2
        };
        let params = StochParams::new(100, 16, 1e-12);
        let state = solver.minimize(&params, &mut function, &[0.5, -0.5, 0.25], Some(&mut ulog));
        assert_eq!(state.status, SolverStatus::Stopped);
        assert_eq!(epochs, 2);
    }

    #[test]
    // strict configuration parsing for the stochastic family
    fn config_is_strict() {
        let mut solver = make_stoch_solver("adam").unwrap();
        assert!(solver
            .from_json(r#"{"alpha0":0.001,"beta1":0.9,"beta2":0.999}"#)
            .is_ok());
        assert!(solver.from_json(r#"{"gamma":0.5}"#).is_err());

        let json = solver.to_json();
        assert!(json.contains("beta1"));
    }

    #[test]
    fn registry_knows_all_ids() {
        for id in stoch_solver_ids() {
            assert!(make_stoch_solver(id).is_some(), "{}", id);
        }
        assert!(make_stoch_solver("lbfgs").is_none());
    }

    #[test]
    // convergence at a snapshot reports the converged status
    fn converges_on_easy_function() {
        let solver = make_stoch_solver("adam").unwrap();
        let mut function = Sphere::new(2);
        let params = StochParams::new(512, 32, 1e-3);
        let state = solver.minimize(&params, &mut function, &[0.8, -0.3], None);
        assert_eq!(state.status, SolverStatus::Converged);
        assert!(state.convergence_criteria() < 1e-3);
    }
}
