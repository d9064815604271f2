#[cfg(test)]
mod accumulator_specs {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use sprout::accumulator::{Accumulator, AccumulatorFunction, Criterion, Mode};
    use sprout::function::{Function, Problem};
    use sprout::loss::LogisticLoss;
    use sprout::math;
    use sprout::model::{AffineModel, Model};
    use sprout::task::{Fold, SynthAffineTask, Task};
    use sprout::thread_pool::ThreadPool;

    const ISIZE: usize = 7;
    const OSIZE: usize = 3;
    const COUNT: usize = 64;

    fn fixture() -> (SynthAffineTask, AffineModel, Vec<f64>) {
        let task = SynthAffineTask::new(ISIZE, OSIZE, COUNT, 1234);
        let model = AffineModel::new(task.idims(), task.odims());

        let mut rng = StdRng::seed_from_u64(5678);
        let params: Vec<f64> = (0..model.psize()).map(|_| rng.gen_range(-0.5..0.5)).collect();
        (task, model, params)
    }

    #[test]
    // value and gradient are independent of the worker count
    fn worker_count_parity() {
        let (task, model, params) = fixture();
        let loss = LogisticLoss;
        let fold = Fold::train(0);

        let reference_pool = ThreadPool::with_workers(1);
        let mut reference = Accumulator::new(&reference_pool, &model, &loss);
        reference.set_params(&params);
        reference.set_mode(Mode::VGrad);
        reference.update(&task, fold);
        let value = reference.value();
        let error = reference.error();
        let vgrad = reference.vgrad();

        assert!(value.is_finite());
        assert_eq!(reference.count(), task.size(fold));

        for workers in [2, 4, 8] {
            let pool = ThreadPool::with_workers(workers);
            let mut accumulator = Accumulator::new(&pool, &model, &loss);
            accumulator.set_params(&params);
            accumulator.set_mode(Mode::VGrad);
            accumulator.update(&task, fold);

            assert_eq!(accumulator.count(), task.size(fold));
            assert!(
                math::close(accumulator.value(), value, math::epsilon1()),
                "workers = {}: {} vs {}",
                workers,
                accumulator.value(),
                value
            );
            assert!(math::close(accumulator.error(), error, math::epsilon1()));
            for (a, b) in accumulator.vgrad().iter().zip(vgrad.iter()) {
                assert!(math::close(*a, *b, math::epsilon1()));
            }
        }
    }

    #[test]
    // the minibatch tiling does not change the reduction
    fn minibatch_invariance() {
        let (task, model, params) = fixture();
        let loss = LogisticLoss;
        let fold = Fold::train(0);
        let pool = ThreadPool::with_workers(4);

        let mut reference = Accumulator::new(&pool, &model, &loss);
        reference.set_params(&params);
        reference.set_mode(Mode::VGrad);
        reference.update(&task, fold);
        let value = reference.value();
        let vgrad = reference.vgrad();

        for batch in [2, 8, 1024] {
            let mut accumulator = Accumulator::new(&pool, &model, &loss);
            accumulator.set_params(&params);
            accumulator.set_mode(Mode::VGrad);
            accumulator.set_minibatch(batch);
            accumulator.update(&task, fold);

            assert!(math::close(accumulator.value(), value, math::epsilon1()));
            for (a, b) in accumulator.vgrad().iter().zip(vgrad.iter()) {
                assert!(math::close(*a, *b, math::epsilon1()));
            }
        }
    }

    #[test]
    // L2 regularization shifts value and gradient by the closed form
    fn l2_regularization() {
        let (task, model, params) = fixture();
        let loss = LogisticLoss;
        let fold = Fold::train(0);
        let pool = ThreadPool::with_workers(4);

        let mut accumulator = Accumulator::new(&pool, &model, &loss);
        accumulator.set_params(&params);
        accumulator.set_mode(Mode::VGrad);
        accumulator.update(&task, fold);
        let value = accumulator.value();
        let error = accumulator.error();
        let vgrad = accumulator.vgrad();
        assert!(!accumulator.can_regularize());

        for lambda in [0.0, 0.00042, 0.042, 0.42] {
            accumulator.set_criterion(Criterion::AverageL2, lambda);
            assert!(accumulator.can_regularize());
            accumulator.update(&task, fold);

            let expected = value + 0.5 * lambda * math::squared_norm(&params);
            assert!(math::close(accumulator.value(), expected, math::epsilon1()));
            assert!(math::close(accumulator.error(), error, math::epsilon1()));

            let regularized = accumulator.vgrad();
            for i in 0..params.len() {
                let expected = vgrad[i] + lambda * params[i];
                assert!(math::close(regularized[i], expected, math::epsilon1()));
            }
        }
    }

    #[test]
    // the variance criterion matches the statistics of per-sample losses
    fn variance_criterion() {
        let (task, model, params) = fixture();
        let loss = LogisticLoss;
        let fold = Fold::train(0);
        let pool = ThreadPool::with_workers(4);
        let lambda = 0.1;

        // per-sample loss values through single-sample updates
        let mut probe = Accumulator::new(&pool, &model, &loss);
        probe.set_params(&params);
        probe.set_mode(Mode::Value);
        let n = task.size(fold);
        let mut values = Vec::with_capacity(n);
        for i in 0..n {
            probe.update_range(&task, fold, i, i + 1);
            values.push(probe.value());
        }
        let sum: f64 = values.iter().sum();
        let sum2: f64 = values.iter().map(|v| v * v).sum();
        let nf = n as f64;

        let mut accumulator = Accumulator::new(&pool, &model, &loss);
        accumulator.set_params(&params);
        accumulator.set_mode(Mode::Value);
        accumulator.set_criterion(Criterion::AverageVariance, lambda);
        accumulator.update(&task, fold);

        let expected = sum / nf + lambda * (nf * sum2 - sum * sum) / (nf * nf);
        assert!(
            math::close(accumulator.value(), expected, math::epsilon1()),
            "{} vs {}",
            accumulator.value(),
            expected
        );
    }

    #[test]
    // the accumulator exposes a numerically consistent gradient under all
    // criteria
    fn objective_gradient_accuracy() {
        let (task, model, params) = fixture();
        let loss = LogisticLoss;
        let pool = ThreadPool::with_workers(4);

        for criterion in [
            Criterion::Average,
            Criterion::AverageL2,
            Criterion::AverageVariance,
        ] {
            let mut accumulator = Accumulator::new(&pool, &model, &loss);
            accumulator.set_criterion(criterion, 0.1);
            let mut objective =
                AccumulatorFunction::new(accumulator, &task, Fold::train(0), 32);

            let accuracy = Problem::new(&mut objective).grad_accuracy(&params);
            assert!(
                accuracy < 10.0 * math::epsilon2(),
                "{:?}: grad accuracy {}",
                criterion,
                accuracy
            );
        }
    }

    #[test]
    // the stochastic protocol walks the fold in minibatches
    fn stochastic_protocol() {
        let (task, model, params) = fixture();
        let loss = LogisticLoss;
        let pool = ThreadPool::with_workers(2);

        let accumulator = Accumulator::new(&pool, &model, &loss);
        let mut objective = AccumulatorFunction::new(accumulator, &task, Fold::train(0), 10);

        let size = task.size(Fold::train(0));
        assert_eq!(objective.summands(), size.div_ceil(10));

        let full = objective.eval(&params, None);
        assert!(full.is_finite());

        // one full pass over the minibatches stays finite and averages out
        // near the full value
        let mut sum = 0.0;
        let mut count = 0.0;
        for _ in 0..objective.summands() {
            let value = objective.stoch_eval(&params, None);
            assert!(value.is_finite());
            sum += value;
            count += 1.0;
            objective.stoch_next();
        }
        assert!((sum / count - full).abs() < 1.0);
    }
}
