#[cfg(test)]
mod trainer_specs {
    use sprout::functions::Sphere;
    use sprout::solver::SolverState;
    use sprout::trainer::{is_done, TrainerResult, TrainerState, TrainerStatus};

    fn solver_state(dims: usize) -> SolverState {
        let mut function = Sphere::new(dims);
        SolverState::new(&mut function, &vec![0.5; dims])
    }

    fn epoch_state(epoch: usize, train: f64, valid: f64) -> TrainerState {
        TrainerState {
            millis: (epoch * 1000) as u64,
            epoch,
            train_value: train,
            train_error: train,
            valid_value: valid,
            valid_error: valid,
            test_value: valid,
            test_error: valid,
        }
    }

    #[test]
    // the canonical overfitting run: three improvements, two declines,
    // then the patience runs out
    fn overfitting_detection() {
        let trains = [1.0, 0.8, 0.6, 0.5, 0.4, 0.3];
        let valids = [1.0, 0.9, 0.85, 0.88, 0.90, 0.95];
        let expected = [
            TrainerStatus::Better,
            TrainerStatus::Better,
            TrainerStatus::Better,
            TrainerStatus::Worse,
            TrainerStatus::Worse,
            TrainerStatus::Overfit,
        ];

        let state = solver_state(2);
        let mut result = TrainerResult::new("{}");
        for epoch in 0..trains.len() {
            let status = result.update(
                &state,
                epoch_state(epoch + 1, trains[epoch], valids[epoch]),
                2,
            );
            assert_eq!(status, expected[epoch], "epoch {}", epoch + 1);
        }

        assert_eq!(result.optimum_epoch(), 3);
        assert_eq!(result.optimum_state().valid_value, 0.85);
        assert!(result.valid());
    }

    #[test]
    // the stored best validation value never increases
    fn best_is_monotone() {
        let state = solver_state(2);
        let mut result = TrainerResult::new("{}");

        let valids = [0.9, 0.5, 0.7, 0.3, 0.8, 0.2, 0.9];
        let mut best = f64::INFINITY;
        for (epoch, &valid) in valids.iter().enumerate() {
            result.update(&state, epoch_state(epoch + 1, 1.0, valid), 100);
            assert!(result.optimum_state().valid_value <= best);
            best = result.optimum_state().valid_value;
        }
        assert_eq!(result.optimum_state().valid_value, 0.2);
    }

    #[test]
    fn divergence_and_solved() {
        let state = solver_state(2);

        let mut result = TrainerResult::new("{}");
        let status = result.update(&state, epoch_state(1, f64::NAN, 1.0), 8);
        assert_eq!(status, TrainerStatus::Diverge);
        assert!(is_done(status));

        let mut result = TrainerResult::new("{}");
        result.set_accuracy(0.1);
        let status = result.update(&state, epoch_state(1, 0.05, 1.0), 8);
        assert_eq!(status, TrainerStatus::Solved);
        assert!(is_done(status));

        assert!(!is_done(TrainerStatus::Better));
        assert!(!is_done(TrainerStatus::Worse));
    }

    #[test]
    // the best parameters come from the best epoch
    fn snapshots_parameters() {
        let mut function = Sphere::new(2);
        let mut result = TrainerResult::new("{}");

        let mut state = SolverState::new(&mut function, &[0.5, 0.5]);
        result.update(&state, epoch_state(1, 1.0, 1.0), 8);

        state.update_at(&mut function, &[0.25, 0.25]);
        result.update(&state, epoch_state(2, 0.5, 0.5), 8);

        state.update_at(&mut function, &[0.75, 0.75]);
        result.update(&state, epoch_state(3, 0.4, 0.9), 8);

        assert_eq!(result.optimum_epoch(), 2);
        assert_eq!(result.optimum_params(), &[0.25, 0.25]);
    }

    #[test]
    // a geometric loss decay is recovered as the per-second factor
    fn convergence_speed() {
        let state = solver_state(2);
        let mut result = TrainerResult::new("{}");

        for epoch in 1..=8 {
            let value = 0.5f64.powi(epoch as i32);
            result.update(&state, epoch_state(epoch, value, value), 100);
        }

        let speed = result.convergence_speed();
        assert!((speed - 0.5).abs() < 1e-6, "speed = {}", speed);
    }

    #[test]
    fn saves_csv() {
        let state = solver_state(2);
        let mut result = TrainerResult::new(r#"{"alpha0":0.01}"#);
        for epoch in 1..=4 {
            result.update(&state, epoch_state(epoch, 1.0 / epoch as f64, 1.0), 8);
        }

        let path = std::env::temp_dir().join("sprout_trainer_history.csv");
        result.save(&path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("epoch,wall_time_ms,train_value"));
        assert!(lines[1].contains("better"));
        let _ = std::fs::remove_file(&path);
    }
}
