#[cfg(test)]
mod thread_pool_specs {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use sprout::thread_pool::ThreadPool;

    #[test]
    // every index is visited exactly once and all writes are visible after
    // the call returns
    fn loopit_covers_the_range() {
        let pool = ThreadPool::with_workers(4);
        let n = 1337;

        let visits: Vec<AtomicUsize> = (0..n).map(|_| AtomicUsize::new(0)).collect();
        pool.loopit(n, 32, |begin, end, worker| {
            assert!(begin < end);
            assert!(end <= n);
            assert!(worker < pool.workers());
            for i in begin..end {
                visits[i].fetch_add(1, Ordering::Relaxed);
            }
        });

        for (i, visit) in visits.iter().enumerate() {
            assert_eq!(visit.load(Ordering::Relaxed), 1, "index {}", i);
        }
    }

    #[test]
    // chunks are tiled by the requested bound
    fn loopit_respects_the_chunk_bound() {
        let pool = ThreadPool::with_workers(3);
        let sizes = Mutex::new(Vec::new());
        pool.loopit(100, 7, |begin, end, _worker| {
            sizes.lock().unwrap().push(end - begin);
        });
        let sizes = sizes.into_inner().unwrap();
        assert_eq!(sizes.iter().sum::<usize>(), 100);
        assert!(sizes.iter().all(|&size| size <= 7));
    }

    #[test]
    // the per-worker index addresses a private scratch slot
    fn worker_indexed_scratch() {
        let pool = ThreadPool::with_workers(4);
        let n = 1000usize;

        let scratch: Vec<Mutex<u64>> = (0..pool.workers()).map(|_| Mutex::new(0)).collect();
        pool.loopit(n, 16, |begin, end, worker| {
            let mut slot = scratch[worker].lock().unwrap();
            for i in begin..end {
                *slot += i as u64;
            }
        });

        let total: u64 = scratch.iter().map(|slot| *slot.lock().unwrap()).sum();
        assert_eq!(total, (n as u64 - 1) * n as u64 / 2);
    }

    #[test]
    fn empty_loop_is_a_noop() {
        let pool = ThreadPool::with_workers(2);
        pool.loopit(0, 8, |_begin, _end, _worker| {
            panic!("the body must not run");
        });
    }

    #[test]
    // worker panics propagate to the caller instead of poisoning the pool
    fn panics_propagate() {
        let pool = ThreadPool::with_workers(2);

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            pool.loopit(16, 4, |begin, _end, _worker| {
                if begin == 0 {
                    panic!("boom");
                }
            });
        }));
        assert!(result.is_err());

        // the pool keeps working afterwards
        let count = AtomicUsize::new(0);
        pool.loopit(16, 4, |begin, end, _worker| {
            count.fetch_add(end - begin, Ordering::Relaxed);
        });
        assert_eq!(count.load(Ordering::Relaxed), 16);
    }

    #[test]
    fn global_pool_is_shared() {
        let first = ThreadPool::global();
        let second = ThreadPool::global();
        assert!(std::ptr::eq(first, second));
        assert!(first.workers() >= 1);
    }
}
