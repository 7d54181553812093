//! Channel pipelines.
//!
//! Every stream is a rendezvous channel (`bounded(0)`): a send completes only
//! when the next stage takes the item. Each stage runs on its own thread and
//! closes its output by dropping the sender when its input is exhausted or
//! the token is cancelled.
//!
//! ```text
//! generator -> filter -> map -> fan_out -+-> worker stream 0 -+
//!                                        +-> worker stream 1 -+-> fan_in
//! ```

use std::sync::Arc;
use std::thread;

use crossbeam_channel::{self as channel, Receiver, RecvTimeoutError, SendTimeoutError, Sender};

use super::{CancellationToken, POLL_INTERVAL};

/// A pipeline stage: consumes one stream and returns the next.
pub type Stage<T> = Box<dyn Fn(&CancellationToken, Receiver<T>) -> Receiver<T> + Send + Sync>;

/// Send `item`, giving up when the receiver is gone or the token is cancelled.
fn forward<T>(out: &Sender<T>, mut item: T, token: &CancellationToken) -> bool {
    loop {
        match out.send_timeout(item, POLL_INTERVAL) {
            Ok(()) => return true,
            Err(SendTimeoutError::Timeout(unsent)) => {
                if token.is_cancelled() {
                    return false;
                }
                item = unsent;
            }
            Err(SendTimeoutError::Disconnected(_)) => return false,
        }
    }
}

/// Receive the next item, or `None` once the input closes or the token is
/// cancelled.
fn next<T>(input: &Receiver<T>, token: &CancellationToken) -> Option<T> {
    loop {
        if token.is_cancelled() {
            return None;
        }
        match input.recv_timeout(POLL_INTERVAL) {
            Ok(item) => return Some(item),
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => return None,
        }
    }
}

/// Stream `items` in order.
pub fn generator<T>(token: &CancellationToken, items: Vec<T>) -> Receiver<T>
where
    T: Send + 'static,
{
    let (tx, rx) = channel::bounded(0);
    let token = token.clone();
    thread::spawn(move || {
        for item in items {
            if !forward(&tx, item, &token) {
                return;
            }
        }
    });
    rx
}

/// Stage keeping the items that satisfy `predicate`.
pub fn filter<T, P>(predicate: P) -> impl Fn(&CancellationToken, Receiver<T>) -> Receiver<T> + Send + Sync
where
    T: Send + 'static,
    P: Fn(&T) -> bool + Send + Sync + 'static,
{
    let predicate = Arc::new(predicate);
    move |token: &CancellationToken, input: Receiver<T>| {
        let (tx, rx) = channel::bounded(0);
        let token = token.clone();
        let predicate = Arc::clone(&predicate);
        thread::spawn(move || {
            while let Some(item) = next(&input, &token) {
                if predicate(&item) && !forward(&tx, item, &token) {
                    return;
                }
            }
        });
        rx
    }
}

/// Stage applying `transform` to every item.
pub fn map<T, R, F>(transform: F) -> impl Fn(&CancellationToken, Receiver<T>) -> Receiver<R> + Send + Sync
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> R + Send + Sync + 'static,
{
    let transform = Arc::new(transform);
    move |token: &CancellationToken, input: Receiver<T>| {
        let (tx, rx) = channel::bounded(0);
        let token = token.clone();
        let transform = Arc::clone(&transform);
        thread::spawn(move || {
            while let Some(item) = next(&input, &token) {
                if !forward(&tx, transform(item), &token) {
                    return;
                }
            }
        });
        rx
    }
}

/// Split `input` across `n` output streams.
///
/// Outputs compete for items: each item reaches exactly one output, whichever
/// is ready first. Items are not copied to every output.
pub fn fan_out<T>(token: &CancellationToken, input: Receiver<T>, n: usize) -> Vec<Receiver<T>>
where
    T: Send + 'static,
{
    (0..n)
        .map(|_| {
            let (tx, rx) = channel::bounded(0);
            let input = input.clone();
            let token = token.clone();
            thread::spawn(move || {
                while let Some(item) = next(&input, &token) {
                    if !forward(&tx, item, &token) {
                        return;
                    }
                }
            });
            rx
        })
        .collect()
}

/// Merge `inputs` into one stream.
///
/// Inputs are drained one after another in the order given: nothing from the
/// second input is forwarded until the first has closed.
pub fn fan_in<T>(token: &CancellationToken, inputs: Vec<Receiver<T>>) -> Receiver<T>
where
    T: Send + 'static,
{
    let (tx, rx) = channel::bounded(0);
    let token = token.clone();
    thread::spawn(move || {
        for input in inputs {
            while let Some(item) = next(&input, &token) {
                if !forward(&tx, item, &token) {
                    return;
                }
            }
        }
    });
    rx
}

/// Ordered chain of same-typed stages sharing one cancellation token.
///
/// # Examples
///
/// ```
/// use storeql::concurrency::{CancellationToken, Pipeline};
/// use storeql::concurrency::pipeline::{filter, generator, map};
///
/// let token = CancellationToken::new();
/// let pipeline = Pipeline::new(token.clone())
///     .stage(filter(|n: &i32| n % 2 == 0))
///     .stage(map(|n: i32| n * 10));
///
/// let output: Vec<i32> = pipeline.execute(generator(&token, (1..=6).collect())).iter().collect();
/// assert_eq!(output, vec![20, 40, 60]);
/// ```
pub struct Pipeline<T> {
    token: CancellationToken,
    stages: Vec<Stage<T>>,
}

impl<T: Send + 'static> Pipeline<T> {
    pub fn new(token: CancellationToken) -> Self {
        Pipeline {
            token,
            stages: Vec::new(),
        }
    }

    pub fn stage<S>(mut self, stage: S) -> Self
    where
        S: Fn(&CancellationToken, Receiver<T>) -> Receiver<T> + Send + Sync + 'static,
    {
        self.stages.push(Box::new(stage));
        self
    }

    /// Chain the stages onto `input` and return the final stream.
    pub fn execute(&self, input: Receiver<T>) -> Receiver<T> {
        self.stages
            .iter()
            .fold(input, |stream, stage| stage(&self.token, stream))
    }

    /// Cancel every stage started by this pipeline.
    pub fn stop(&self) {
        self.token.cancel();
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}
