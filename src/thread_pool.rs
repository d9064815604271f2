//! A fixed-size worker pool with an indexed parallel-for.
//!
//! The pool owns one OS thread per physical core. Work arrives as boxed
//! closures on a mutex-protected deque; workers block on a condition
//! variable until a task is available or a cooperative stop is requested,
//! in which case pending tasks are discarded and the workers exit.
//!
//! [`loopit`][1] is the only entry point the numerical code uses: it splits
//! `[0, n)` into one contiguous chunk per worker, tiles each chunk by a
//! caller-supplied bound and passes the worker index to the body so callers
//! can address private scratch slots without synchronization. The call
//! returns only once every chunk finished; worker panics are re-raised on
//! the calling thread.
//!
//! Calling `loopit` from inside a pool task would deadlock the pool and is
//! rejected with a panic.
//!
//! [1]: struct.ThreadPool.html#method.loopit

use std::any::Any;
use std::cell::Cell;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, OnceLock};
use std::thread;

type Task = Box<dyn FnOnce() + Send>;
type TaskResult = Result<(), Box<dyn Any + Send>>;

thread_local! {
    static IS_WORKER: Cell<bool> = const { Cell::new(false) };
}

/// Completion handle fulfilled by the worker that ran the task.
struct Future {
    done: Mutex<Option<TaskResult>>,
    condition: Condvar,
}

impl Future {
    fn new() -> Arc<Future> {
        Arc::new(Future {
            done: Mutex::new(None),
            condition: Condvar::new(),
        })
    }

    fn complete(&self, result: TaskResult) {
        let mut done = self.done.lock().unwrap();
        *done = Some(result);
        self.condition.notify_all();
    }

    fn wait(&self) -> TaskResult {
        let mut done = self.done.lock().unwrap();
        loop {
            if let Some(result) = done.take() {
                return result;
            }
            done = self.condition.wait(done).unwrap();
        }
    }
}

/// Tasks to execute plus the synchronization shared with the workers.
struct Queue {
    tasks: Mutex<QueueState>,
    condition: Condvar,
}

struct QueueState {
    pending: VecDeque<(Task, Arc<Future>)>,
    stop: bool,
}

impl Queue {
    fn new() -> Queue {
        Queue {
            tasks: Mutex::new(QueueState {
                pending: VecDeque::new(),
                stop: false,
            }),
            condition: Condvar::new(),
        }
    }

    fn enqueue(&self, task: Task) -> Arc<Future> {
        let future = Future::new();
        let mut state = self.tasks.lock().unwrap();
        state.pending.push_back((task, future.clone()));
        self.condition.notify_all();
        future
    }

    /// Worker loop: run tasks until the stop flag is raised.
    fn work(&self) {
        IS_WORKER.with(|flag| flag.set(true));
        loop {
            let (task, future) = {
                let mut state = self.tasks.lock().unwrap();
                loop {
                    if state.stop {
                        state.pending.clear();
                        self.condition.notify_all();
                        return;
                    }
                    if let Some(entry) = state.pending.pop_front() {
                        break entry;
                    }
                    state = self.condition.wait(state).unwrap();
                }
            };
            let result = panic::catch_unwind(AssertUnwindSafe(task));
            future.complete(result);
        }
    }
}

/// Barrier over a set of enqueued tasks; joining re-raises worker panics.
struct Section {
    futures: Vec<Arc<Future>>,
}

impl Section {
    fn new() -> Section {
        Section { futures: Vec::new() }
    }

    fn push(&mut self, future: Arc<Future>) {
        self.futures.push(future);
    }

    fn join(mut self) {
        let mut panic_payload = None;
        for future in self.futures.drain(..) {
            if let Err(payload) = future.wait() {
                panic_payload = Some(payload);
            }
        }
        if let Some(payload) = panic_payload {
            panic::resume_unwind(payload);
        }
    }
}

impl Drop for Section {
    fn drop(&mut self) {
        // Backstop when join() was skipped by an unwinding caller: the
        // borrowed loop body must not outlive this call frame.
        for future in self.futures.drain(..) {
            let _ = future.wait();
        }
    }
}

/// Fixed-size worker pool.
pub struct ThreadPool {
    queue: Arc<Queue>,
    threads: Vec<thread::JoinHandle<()>>,
}

impl ThreadPool {
    /// Create a pool with one worker per physical core.
    pub fn new() -> ThreadPool {
        ThreadPool::with_workers(num_cpus::get_physical())
    }

    /// Create a pool with an explicit worker count.
    pub fn with_workers(workers: usize) -> ThreadPool {
        let workers = workers.max(1);
        let queue = Arc::new(Queue::new());
        let threads = (0..workers)
            .map(|_| {
                let queue = queue.clone();
                thread::spawn(move || queue.work())
            })
            .collect();
        ThreadPool { queue, threads }
    }

    /// The process-wide pool, created on first use.
    ///
    /// Prefer constructing and passing a pool explicitly; this is the
    /// convenience default for entry points. It lives until process exit.
    pub fn global() -> &'static ThreadPool {
        static GLOBAL: OnceLock<ThreadPool> = OnceLock::new();
        GLOBAL.get_or_init(ThreadPool::new)
    }

    /// Number of worker threads.
    pub fn workers(&self) -> usize {
        self.threads.len()
    }

    /// Split `[0, size)` across the workers and run `op(begin, end, worker)`
    /// for every tile, blocking until all tiles completed.
    ///
    /// Each worker receives one contiguous chunk, further tiled so that no
    /// single call to `op` covers more than `max_chunk` indices. The worker
    /// index passed to the body is unique per chunk and lies in
    /// `[0, workers)`.
    pub fn loopit<F>(&self, size: usize, max_chunk: usize, op: F)
    where
        F: Fn(usize, usize, usize) + Sync,
    {
        assert!(
            !IS_WORKER.with(|flag| flag.get()),
            "nested parallel loops on the thread pool would deadlock"
        );
        if size == 0 {
            return;
        }

        let workers = self.workers();
        let thread_chunk = size.div_ceil(workers);
        let chunk = thread_chunk.min(max_chunk).max(1);

        let op_ref: &(dyn Fn(usize, usize, usize) + Sync) = &op;
        // The section below joins every task before this frame returns, so
        // the borrowed body cannot be observed after it is dropped.
        #[allow(unsafe_code)]
        let op_ref: &'static (dyn Fn(usize, usize, usize) + Sync) =
            unsafe { std::mem::transmute(op_ref) };

        let mut section = Section::new();
        for worker in 0..workers {
            let begin = worker * thread_chunk;
            let end = (begin + thread_chunk).min(size);
            if begin >= end {
                // not enough data to split to all workers
                break;
            }
            section.push(self.queue.enqueue(Box::new(move || {
                let mut ibegin = begin;
                while ibegin < end {
                    let iend = (ibegin + chunk).min(end);
                    op_ref(ibegin, iend, worker);
                    ibegin = iend;
                }
            })));
        }
        section.join();
    }
}

impl Default for ThreadPool {
    fn default() -> ThreadPool {
        ThreadPool::new()
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        {
            let mut state = self.queue.tasks.lock().unwrap();
            state.stop = true;
            self.queue.condition.notify_all();
        }
        for thread in self.threads.drain(..) {
            let _ = thread.join();
        }
    }
}

impl std::fmt::Debug for ThreadPool {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "ThreadPool({} workers)", self.workers())
    }
}
