#[cfg(test)]
mod trainers_specs {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use sprout::error::Error;
    use sprout::loss::LogisticLoss;
    use sprout::model::{AffineModel, Model};
    use sprout::task::{SynthAffineTask, Task};
    use sprout::thread_pool::ThreadPool;
    use sprout::trainers::{BatchTrainer, StochasticTrainer};

    fn fixture(seed: u64) -> (SynthAffineTask, AffineModel) {
        let task = SynthAffineTask::new(6, 3, 80, seed);
        let mut model = AffineModel::new(task.idims(), task.odims());

        let mut rng = StdRng::seed_from_u64(seed ^ 0xff);
        let params: Vec<f64> = (0..model.psize()).map(|_| rng.gen_range(-0.1..0.1)).collect();
        model.set_params(&params);
        (task, model)
    }

    #[test]
    // the batch driver improves the training loss and restores the best
    // parameters into the model
    fn batch_training_learns() {
        let _ = env_logger::builder().is_test(true).try_init();
        let (task, mut model) = fixture(77);
        let pool = ThreadPool::with_workers(2);
        let loss = LogisticLoss;

        let initial = model.params();
        let trainer = BatchTrainer {
            epochs: 40,
            patience: 40,
            ..BatchTrainer::default()
        };
        let result = trainer
            .train(&pool, &mut model, &task, 0, &loss)
            .unwrap();

        assert!(result.valid());
        assert!(!result.history().is_empty());
        let first = result.history()[0].0;
        let best = result.optimum_state();
        assert!(
            best.train_value < first.train_value,
            "no improvement: {} -> {}",
            first.train_value,
            best.train_value
        );
        assert_eq!(model.params(), result.optimum_params());
        assert_ne!(model.params(), initial);
    }

    #[test]
    fn stochastic_training_learns() {
        let (task, mut model) = fixture(78);
        let pool = ThreadPool::with_workers(2);
        let loss = LogisticLoss;

        let trainer = StochasticTrainer {
            solver: "adam".to_owned(),
            epochs: 30,
            patience: 30,
            batch: 16,
            ..StochasticTrainer::default()
        };
        let result = trainer
            .train(&pool, &mut model, &task, 0, &loss)
            .unwrap();

        assert!(result.valid());
        let first = result.history()[0].0;
        let best = result.optimum_state();
        assert!(best.train_value < first.train_value);
    }

    #[test]
    // hyper-parameter tuning returns a configuration the solver accepts
    fn stochastic_tuning() {
        let (task, model) = fixture(79);
        let pool = ThreadPool::with_workers(2);
        let loss = LogisticLoss;

        let trainer = StochasticTrainer {
            solver: "sg".to_owned(),
            batch: 16,
            ..StochasticTrainer::default()
        };
        let optimum = trainer.tune(&pool, &model, &task, 0, &loss, 6).unwrap();
        assert!(optimum.contains("alpha0"));

        let tuned = StochasticTrainer {
            config: Some(optimum),
            ..trainer
        };
        let mut model = model;
        let result = tuned.train(&pool, &mut model, &task, 0, &loss);
        assert!(result.is_ok());
    }

    #[test]
    // shape disagreements surface before any iteration runs
    fn dimension_mismatch() {
        let (task, _) = fixture(80);
        let pool = ThreadPool::with_workers(2);
        let loss = LogisticLoss;
        let mut model = AffineModel::new((5, 1, 1), task.odims());

        let trainer = BatchTrainer::default();
        match trainer.train(&pool, &mut model, &task, 0, &loss) {
            Err(Error::DimensionMismatch { expected, found }) => {
                assert_eq!(expected, 6);
                assert_eq!(found, 5);
            }
            other => panic!("expected a dimension mismatch, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn unknown_solver_is_rejected() {
        let (task, mut model) = fixture(81);
        let pool = ThreadPool::with_workers(2);
        let loss = LogisticLoss;

        let trainer = BatchTrainer {
            solver: "newton".to_owned(),
            ..BatchTrainer::default()
        };
        assert!(matches!(
            trainer.train(&pool, &mut model, &task, 0, &loss),
            Err(Error::InvalidConfig(_))
        ));
    }
}
