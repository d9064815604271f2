#[cfg(test)]
mod lsearch_specs {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use sprout::function::Function;
    use sprout::functions::{Rosenbrock, Sphere};
    use sprout::lsearch::{LineSearch, LsInitializer, LsStrategy};
    use sprout::solver::SolverState;

    const C1: f64 = 1e-4;
    const C2: f64 = 0.9;

    fn steepest_state(function: &mut dyn Function, x0: &[f64]) -> SolverState {
        let mut state = SolverState::new(function, x0);
        for i in 0..state.d.len() {
            state.d[i] = -state.g[i];
        }
        state
    }

    // accept a step, then verify the declared condition by re-evaluating
    fn check_strategy(strat: LsStrategy, wolfe: bool, strong: bool, curved: bool) {
        let mut rng = StdRng::seed_from_u64(11);

        let mut sphere = Sphere::new(4);
        let mut rosenbrock = Rosenbrock::new(2);
        for _ in 0..20 {
            let mut functions: Vec<&mut dyn Function> = vec![&mut sphere];
            if curved {
                functions.push(&mut rosenbrock);
            }
            for function in functions {
                let dims = function.size();
                let x0: Vec<f64> = (0..dims).map(|_| rng.gen_range(-1.0..1.0)).collect();

                let state0 = steepest_state(function, &x0);
                if state0.convergence_criteria() < 1e-12 {
                    continue;
                }
                let dg0 = state0.dg();

                let mut state = state0.clone();
                let mut lsearch = LineSearch::new(LsInitializer::Unit, strat, C1, C2);
                let ok = lsearch.step(function, &mut state);
                assert!(ok, "line search failed at {:?}", x0);

                // recompute value and slope at the returned point
                let mut g = vec![0.0; dims];
                let f = function.eval(&state.x, Some(&mut g));
                let dg: f64 = state0.d.iter().zip(g.iter()).map(|(d, g)| d * g).sum();

                assert!(state.t > 0.0);
                assert!(
                    f <= state0.f + C1 * state.t * dg0 + 1e-12,
                    "sufficient decrease violated: f = {}, f0 = {}",
                    f,
                    state0.f
                );
                if strong {
                    assert!(dg.abs() <= C2 * dg0.abs() + 1e-12);
                } else if wolfe {
                    assert!(dg >= C2 * dg0 - 1e-12);
                }
            }
        }
    }

    #[test]
    fn backtrack_satisfies_armijo() {
        check_strategy(LsStrategy::Backtrack, false, false, true);
    }

    #[test]
    fn backtrack_satisfies_wolfe() {
        check_strategy(LsStrategy::Wolfe, true, false, false);
    }

    #[test]
    fn backtrack_satisfies_strong_wolfe() {
        check_strategy(LsStrategy::StrongWolfe, true, true, false);
    }

    #[test]
    fn interpolation_satisfies_strong_wolfe() {
        check_strategy(LsStrategy::Interpolation, true, true, true);
    }

    #[test]
    // the CG-DESCENT search accepts on (approximate) Wolfe conditions; the
    // value may relax by at most ε·|f0|
    fn cgdescent_accepts_wolfe_like_steps() {
        let mut rng = StdRng::seed_from_u64(13);
        let mut function = Sphere::new(4);

        for _ in 0..20 {
            let x0: Vec<f64> = (0..4).map(|_| rng.gen_range(-1.0..1.0)).collect();
            let state0 = steepest_state(&mut function, &x0);
            let dg0 = state0.dg();

            let mut state = state0.clone();
            let mut lsearch =
                LineSearch::new(LsInitializer::Unit, LsStrategy::CgDescent, C1, C2);
            let ok = lsearch.step(&mut function, &mut state);
            assert!(ok, "cgdescent failed at {:?}", x0);

            let mut g = vec![0.0; 4];
            let f = function.eval(&state.x, Some(&mut g));
            let dg: f64 = state0.d.iter().zip(g.iter()).map(|(d, g)| d * g).sum();

            assert!(f <= state0.f + 1e-6 * state0.f.abs() + 1e-12);
            assert!(dg >= C2 * dg0 - 1e-12);
        }
    }

    #[test]
    // a failed search leaves the state at the iterate it started from
    fn failure_restores_the_iterate() {
        struct Flat;
        impl Function for Flat {
            fn size(&self) -> usize {
                1
            }
            fn eval(&mut self, x: &[f64], gx: Option<&mut [f64]>) -> f64 {
                // constant slope uphill everywhere: no Armijo step exists
                if let Some(gx) = gx {
                    gx[0] = -1.0;
                }
                -x[0]
            }
        }

        let mut function = Flat;
        let mut state = SolverState::new(&mut function, &[0.0]);
        state.d[0] = -1.0; // uphill: d·g = 1 > 0

        let mut lsearch = LineSearch::new(
            LsInitializer::Unit,
            LsStrategy::Backtrack,
            C1,
            C2,
        );
        let ok = lsearch.step(&mut function, &mut state);
        assert!(!ok);
        assert_eq!(state.x[0], 0.0);
        assert_eq!(state.f, 0.0);
    }
}
