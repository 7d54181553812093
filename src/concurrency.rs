//! # Concurrency Toolkit
//!
//! Thread-based building blocks that share one cancellation model:
//!
//! - **[WorkerPool]** - fixed set of named worker threads over a bounded task queue
//! - **[BoundedBuffer]** / **[ProducerConsumerSystem]** - ring buffer with
//!   blocking produce/consume, and loops running against it
//! - **[pipeline]** - channel stages (generator, filter, map, fan-out, fan-in)
//!
//! ## Cancellation
//!
//! Cancellation is cooperative. A [`CancellationToken`] is a shared flag;
//! every blocking point (task dequeue, buffer produce/consume, channel send
//! and receive) waits with a short timeout and re-checks the flag. Work that
//! is already running is never interrupted.
pub mod buffer;
pub mod cancel;
pub mod pipeline;
pub mod worker_pool;

pub use buffer::{BoundedBuffer, ProducerConsumerSystem};
pub use cancel::CancellationToken;
pub use pipeline::Pipeline;
pub use worker_pool::{TaskError, TaskResult, WorkerPool, batch_process};

use std::io;
use std::time::Duration;

use thiserror::Error;

/// How long a blocked thread waits before re-checking its cancellation token.
pub(crate) const POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("failed to spawn thread: {0}")]
    Spawn(#[from] io::Error),

    #[error("worker pool already started")]
    AlreadyStarted,
}
