//! Worker pool and the parallel race between a baseline and its challengers.

use std::sync::mpsc;

use gomoku_core::Move;
use tracing::debug;

use crate::error::StrategyError;
use crate::search::control::CancelToken;

/// A search job handed to the pool. It must watch the token it is given.
pub type Task = Box<dyn FnOnce(&CancelToken) -> Option<Move> + Send + 'static>;

/// Fixed-size pool shared by every strategy of a match.
#[derive(Debug)]
pub struct WorkerPool {
    pool: rayon::ThreadPool,
    threads: usize,
}

impl WorkerPool {
    /// Start a pool with `threads` workers (at least one).
    pub fn new(threads: usize) -> Result<WorkerPool, StrategyError> {
        let threads = threads.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|index| format!("gomoku-worker-{index}"))
            .build()?;
        Ok(WorkerPool { pool, threads })
    }

    /// Number of workers.
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Run `job` on a worker.
    pub fn spawn<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.pool.spawn(job);
    }
}

/// A challenger in a [`race`]: its search, and what to do with its answer.
///
/// The callback runs on the coordinating thread, so it may borrow from the
/// caller.
pub struct Contender<'a> {
    task: Task,
    on_result: Box<dyn FnOnce(Option<Move>) + 'a>,
}

impl<'a> Contender<'a> {
    pub fn new<T, C>(task: T, on_result: C) -> Contender<'a>
    where
        T: FnOnce(&CancelToken) -> Option<Move> + Send + 'static,
        C: FnOnce(Option<Move>) + 'a,
    {
        Contender {
            task: Box::new(task),
            on_result: Box::new(on_result),
        }
    }
}

/// Run `baseline` and every contender concurrently.
///
/// The first winning move from any task ends the race and is returned.
/// Otherwise every task is awaited and the baseline's answer is returned.
/// Each contender's callback sees its own result as soon as it arrives;
/// callbacks of tasks still running when the race ends are never called.
/// All tasks are cancelled before returning.
pub fn race(
    pool: &WorkerPool,
    cancel: &CancelToken,
    baseline: Task,
    contenders: Vec<Contender<'_>>,
) -> Option<Move> {
    let token = cancel.child();
    let (tx, rx) = mpsc::channel();

    let mut callbacks = Vec::with_capacity(contenders.len() + 1);
    let tasks = std::iter::once((baseline, None)).chain(
        contenders
            .into_iter()
            .map(|contender| (contender.task, Some(contender.on_result))),
    );
    for (index, (task, callback)) in tasks.enumerate() {
        callbacks.push(callback);
        let tx = tx.clone();
        let token = token.clone();
        pool.spawn(move || {
            let result = task(&token);
            // The coordinator may already have left.
            let _ = tx.send((index, result));
        });
    }
    drop(tx);

    let mut baseline_result = None;
    let mut winner = None;
    for _ in 0..callbacks.len() {
        let Ok((index, result)) = rx.recv() else {
            break;
        };
        if index == 0 {
            baseline_result = result;
        } else if let Some(callback) = callbacks[index].take() {
            callback(result);
        }
        if result.is_some_and(|mv| mv.winning) {
            debug!(task = index, ?result, "race won");
            winner = result;
            break;
        }
    }
    token.cancel();
    winner.or(baseline_result)
}
