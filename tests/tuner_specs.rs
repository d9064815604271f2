#[cfg(test)]
mod tuner_specs {
    use serde_json::Value;
    use sprout::solver::{BatchSolver, StochSolver};
    use sprout::solvers::{make_batch_solver, make_stoch_solver};
    use sprout::tuner::Tuner;

    fn parse(json: &str) -> serde_json::Map<String, Value> {
        match serde_json::from_str(json).unwrap() {
            Value::Object(object) => object,
            other => panic!("not an object: {}", other),
        }
    }

    #[test]
    // the first pass enumerates the grid over finite axes
    fn grid_covers_finite_axes() {
        let mut tuner = Tuner::new();
        tuner.add_finite("alpha0", vec![0.01, 0.1]);
        tuner.add_finite("decay", vec![0.5, 1.0]);
        assert_eq!(tuner.axes(), 2);

        let mut seen = Vec::new();
        for _ in 0..4 {
            let config = parse(&tuner.get());
            tuner.score(1.0);
            let alpha0 = config["alpha0"].as_f64().unwrap();
            let decay = config["decay"].as_f64().unwrap();
            seen.push((alpha0, decay));
        }
        seen.sort_by(|a, b| a.partial_cmp(b).unwrap());
        seen.dedup();
        assert_eq!(seen.len(), 4);
        assert_eq!(tuner.trials(), 4);
    }

    #[test]
    // the optimum is the best-scored configuration
    fn optimum_tracks_scores() {
        let mut tuner = Tuner::new();
        tuner.add_finite("alpha0", vec![1.0, 2.0, 3.0]);

        let mut best = (f64::INFINITY, String::new());
        for _ in 0..3 {
            let config = tuner.get();
            let alpha0 = parse(&config)["alpha0"].as_f64().unwrap();
            // score by distance to 2: the middle value must win
            let score = (alpha0 - 2.0).abs();
            tuner.score(score);
            if score < best.0 {
                best = (score, config);
            }
        }
        assert_eq!(tuner.optimum(), best.1);
        assert_eq!(parse(&tuner.optimum())["alpha0"].as_f64().unwrap(), 2.0);
    }

    #[test]
    // after the grid, refinable axes keep producing new configurations
    fn refinement_generates_neighbours() {
        let mut tuner = Tuner::new();
        tuner.add_base10("alpha0", -3.0, 0.0);

        let mut configs = Vec::new();
        for _ in 0..4 {
            let config = tuner.get();
            let alpha0 = parse(&config)["alpha0"].as_f64().unwrap();
            tuner.score(alpha0);
            configs.push(alpha0);
        }

        // refinement probes between the grid points
        let refined = parse(&tuner.get())["alpha0"].as_f64().unwrap();
        tuner.score(refined);
        assert!(!configs.contains(&refined));
        assert!(refined > 0.0 && refined < 1.0);
    }

    #[test]
    // refinement halves spans a bounded number of times and then the
    // tuner keeps serving the optimum
    fn refinement_terminates() {
        let mut tuner = Tuner::new();
        tuner.add_finite("alpha0", vec![0.5]);

        let first = tuner.get();
        tuner.score(1.0);
        // a single non-refinable axis is exhausted immediately
        for _ in 0..4 {
            assert_eq!(tuner.get(), first);
            tuner.score(1.0);
        }
        assert_eq!(tuner.trials(), 1);
    }

    #[test]
    // tuner output feeds straight into the solver configurations
    fn trials_parse_as_solver_configs() {
        let mut stoch = make_stoch_solver("adam").unwrap();
        let mut tuner = stoch.tuner();
        for _ in 0..16 {
            let config = tuner.get();
            stoch.from_json(&config).unwrap();
            tuner.score(1.0);
        }

        let mut batch = make_batch_solver("lbfgs").unwrap();
        let mut tuner = batch.tuner();
        for _ in 0..16 {
            let config = tuner.get();
            batch.from_json(&config).unwrap();
            tuner.score(1.0);
        }
    }
}
