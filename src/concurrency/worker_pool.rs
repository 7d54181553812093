use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{self as channel, Receiver, RecvTimeoutError, SendTimeoutError, Sender};
use parking_lot::Mutex;
use tracing::debug;

use super::{CancellationToken, POLL_INTERVAL, PoolError};

/// Error returned by a failed task.
pub type TaskError = Box<dyn std::error::Error + Send + Sync>;

type Task = Box<dyn FnOnce() -> Result<(), TaskError> + Send>;

/// Outcome of one task, tagged with the worker that ran it.
#[derive(Debug)]
pub struct TaskResult {
    pub worker: usize,
    pub error: Option<TaskError>,
}

/// Fixed number of worker threads pulling tasks from a bounded queue.
///
/// Every finished task publishes a [`TaskResult`] on a second bounded queue
/// read through [`results`](Self::results). If nobody drains the results and
/// that queue fills up, workers wait at the publish step until the pool is
/// cancelled.
///
/// # Examples
///
/// ```
/// use storeql::concurrency::WorkerPool;
///
/// let mut pool = WorkerPool::new(2, 8);
/// pool.start().unwrap();
/// for _ in 0..4 {
///     assert!(pool.submit(|| Ok(())));
/// }
/// pool.stop();
///
/// let finished = pool.results().iter().filter(|r| r.error.is_none()).count();
/// assert_eq!(finished, 4);
/// ```
pub struct WorkerPool {
    workers: usize,
    task_tx: Option<Sender<Task>>,
    task_rx: Receiver<Task>,
    result_tx: Option<Sender<TaskResult>>,
    result_rx: Receiver<TaskResult>,
    token: CancellationToken,
    handles: Vec<JoinHandle<()>>,
    started: bool,
}

impl WorkerPool {
    pub fn new(workers: usize, queue_size: usize) -> Self {
        let (task_tx, task_rx) = channel::bounded(queue_size);
        let (result_tx, result_rx) = channel::bounded(queue_size);
        WorkerPool {
            workers,
            task_tx: Some(task_tx),
            task_rx,
            result_tx: Some(result_tx),
            result_rx,
            token: CancellationToken::new(),
            handles: Vec::new(),
            started: false,
        }
    }

    /// Spawn the worker threads. A pool starts at most once.
    pub fn start(&mut self) -> Result<(), PoolError> {
        if self.started {
            return Err(PoolError::AlreadyStarted);
        }
        self.started = true;

        // Stopped before starting: nothing left to run.
        let Some(result_tx) = self.result_tx.clone() else {
            return Ok(());
        };

        for id in 0..self.workers {
            let tasks = self.task_rx.clone();
            let results = result_tx.clone();
            let token = self.token.clone();
            let handle = thread::Builder::new()
                .name(format!("worker-{}", id))
                .spawn(move || run_worker(id, tasks, results, token))?;
            self.handles.push(handle);
        }

        debug!(workers = self.workers, "worker pool started");
        Ok(())
    }

    /// Queue a task without blocking.
    ///
    /// Returns false when the queue is full, the pool is stopped, or the pool
    /// is cancelled.
    pub fn submit<F>(&self, task: F) -> bool
    where
        F: FnOnce() -> Result<(), TaskError> + Send + 'static,
    {
        if self.token.is_cancelled() {
            return false;
        }
        match &self.task_tx {
            Some(tx) => tx.try_send(Box::new(task)).is_ok(),
            None => false,
        }
    }

    /// Completed task results. The receiver disconnects after [`stop`](Self::stop).
    pub fn results(&self) -> Receiver<TaskResult> {
        self.result_rx.clone()
    }

    /// Close the task queue, wait for the workers to drain it, then close
    /// the result queue.
    pub fn stop(&mut self) {
        self.task_tx.take();
        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }
        self.result_tx.take();
        debug!(workers = self.workers, "worker pool stopped");
    }

    /// Ask workers to exit at their next blocking point. Tasks that are
    /// already running finish; queued tasks are abandoned.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn workers(&self) -> usize {
        self.workers
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        if !self.handles.is_empty() {
            self.cancel();
            self.stop();
        }
    }
}

fn run_worker(
    id: usize,
    tasks: Receiver<Task>,
    results: Sender<TaskResult>,
    token: CancellationToken,
) {
    while !token.is_cancelled() {
        let task = match tasks.recv_timeout(POLL_INTERVAL) {
            Ok(task) => task,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        };

        let mut result = TaskResult {
            worker: id,
            error: task().err(),
        };

        loop {
            match results.send_timeout(result, POLL_INTERVAL) {
                Ok(()) => break,
                Err(SendTimeoutError::Timeout(unsent)) => {
                    if token.is_cancelled() {
                        return;
                    }
                    result = unsent;
                }
                Err(SendTimeoutError::Disconnected(_)) => return,
            }
        }
    }
}

/// Run `process` over every item on a temporary pool of `workers` threads.
///
/// Returns one slot per input item, in input order: `None` when the item was
/// processed successfully, the task's error otherwise.
///
/// # Examples
///
/// ```
/// use storeql::concurrency::batch_process;
///
/// let errors = batch_process(vec![1, 2, 3, 4], 2, |n| {
///     if n % 2 == 0 { Err(format!("{} is even", n).into()) } else { Ok(()) }
/// })
/// .unwrap();
///
/// assert!(errors[0].is_none());
/// assert_eq!(errors[1].as_ref().unwrap().to_string(), "2 is even");
/// ```
pub fn batch_process<T, F>(
    items: Vec<T>,
    workers: usize,
    process: F,
) -> Result<Vec<Option<TaskError>>, PoolError>
where
    T: Send + 'static,
    F: Fn(T) -> Result<(), TaskError> + Send + Sync + 'static,
{
    let slots = Arc::new(Mutex::new(
        (0..items.len()).map(|_| None).collect::<Vec<Option<TaskError>>>(),
    ));
    let process = Arc::new(process);

    // Both queues hold every item, so submit never fails and workers never
    // wait to publish.
    let mut pool = WorkerPool::new(workers.max(1), items.len().max(1));
    pool.start()?;

    for (index, item) in items.into_iter().enumerate() {
        let slots = Arc::clone(&slots);
        let process = Arc::clone(&process);
        pool.submit(move || {
            let outcome = process(item);
            if let Err(err) = outcome {
                let message = err.to_string();
                slots.lock()[index] = Some(err);
                return Err(message.into());
            }
            Ok(())
        });
    }

    pool.stop();
    let errors = std::mem::take(&mut *slots.lock());
    Ok(errors)
}
