use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::{Condvar, Mutex};
use tracing::debug;

use super::{CancellationToken, POLL_INTERVAL, PoolError};

/// Fixed-size circular array.
struct Ring<T> {
    slots: Vec<Option<T>>,
    head: usize,
    len: usize,
}

impl<T> Ring<T> {
    fn with_capacity(capacity: usize) -> Self {
        Ring {
            slots: (0..capacity).map(|_| None).collect(),
            head: 0,
            len: 0,
        }
    }

    fn is_full(&self) -> bool {
        self.len == self.slots.len()
    }

    fn push(&mut self, item: T) {
        let tail = (self.head + self.len) % self.slots.len();
        self.slots[tail] = Some(item);
        self.len += 1;
    }

    fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        let item = self.slots[self.head].take();
        self.head = (self.head + 1) % self.slots.len();
        self.len -= 1;
        item
    }
}

/// Thread-safe bounded FIFO buffer.
///
/// One mutex guards the ring; `not_empty` and `not_full` are condition
/// variables on that same mutex. `0 <= len <= capacity` always holds.
///
/// # Examples
///
/// ```
/// use storeql::concurrency::BoundedBuffer;
///
/// let buffer = BoundedBuffer::new(1);
/// assert!(buffer.try_produce("a").is_ok());
/// assert_eq!(buffer.try_produce("b"), Err("b"));
/// assert_eq!(buffer.try_consume(), Some("a"));
/// assert_eq!(buffer.try_consume(), None);
/// ```
pub struct BoundedBuffer<T> {
    ring: Mutex<Ring<T>>,
    not_empty: Condvar,
    not_full: Condvar,
    capacity: usize,
}

impl<T> BoundedBuffer<T> {
    /// # Panics
    ///
    /// Panics if `capacity` is 0.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "bounded buffer capacity must be at least 1");
        BoundedBuffer {
            ring: Mutex::new(Ring::with_capacity(capacity)),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            capacity,
        }
    }

    /// Append `item`, blocking while the buffer is full.
    pub fn produce(&self, item: T) {
        let mut ring = self.ring.lock();
        while ring.is_full() {
            self.not_full.wait(&mut ring);
        }
        ring.push(item);
        self.not_empty.notify_one();
    }

    /// Remove the oldest item, blocking while the buffer is empty.
    pub fn consume(&self) -> T {
        let mut ring = self.ring.lock();
        loop {
            if let Some(item) = ring.pop() {
                self.not_full.notify_one();
                return item;
            }
            self.not_empty.wait(&mut ring);
        }
    }

    /// Append without blocking; hands the item back when full.
    pub fn try_produce(&self, item: T) -> Result<(), T> {
        let mut ring = self.ring.lock();
        if ring.is_full() {
            return Err(item);
        }
        ring.push(item);
        self.not_empty.notify_one();
        Ok(())
    }

    pub fn try_consume(&self) -> Option<T> {
        let item = self.ring.lock().pop()?;
        self.not_full.notify_one();
        Some(item)
    }

    /// Like [`produce`](Self::produce), but gives the item back once `token`
    /// is cancelled while waiting for space.
    pub fn produce_until(&self, item: T, token: &CancellationToken) -> Result<(), T> {
        let mut ring = self.ring.lock();
        while ring.is_full() {
            if token.is_cancelled() {
                return Err(item);
            }
            self.not_full.wait_for(&mut ring, POLL_INTERVAL);
        }
        ring.push(item);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Like [`consume`](Self::consume), but returns `None` once `token` is
    /// cancelled while waiting for an item.
    pub fn consume_until(&self, token: &CancellationToken) -> Option<T> {
        let mut ring = self.ring.lock();
        loop {
            if let Some(item) = ring.pop() {
                self.not_full.notify_one();
                return Some(item);
            }
            if token.is_cancelled() {
                return None;
            }
            self.not_empty.wait_for(&mut ring, POLL_INTERVAL);
        }
    }

    pub fn len(&self) -> usize {
        self.ring.lock().len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Producer and consumer loops sharing one [`BoundedBuffer`].
///
/// Each loop runs on its own thread until [`stop`](Self::stop) cancels the
/// shared token. Loops check the token before every call to the user
/// function and at every blocking point, so `stop` returns once each thread
/// finishes its current item.
pub struct ProducerConsumerSystem<T> {
    buffer: Arc<BoundedBuffer<T>>,
    token: CancellationToken,
    handles: Vec<JoinHandle<()>>,
    producers: usize,
    consumers: usize,
}

impl<T: Send + 'static> ProducerConsumerSystem<T> {
    /// # Panics
    ///
    /// Panics if `capacity` is 0.
    pub fn new(capacity: usize) -> Self {
        ProducerConsumerSystem {
            buffer: Arc::new(BoundedBuffer::new(capacity)),
            token: CancellationToken::new(),
            handles: Vec::new(),
            producers: 0,
            consumers: 0,
        }
    }

    /// Start a thread that keeps calling `produce` and pushing its items.
    pub fn start_producer<F>(&mut self, mut produce: F) -> Result<(), PoolError>
    where
        F: FnMut() -> T + Send + 'static,
    {
        let buffer = Arc::clone(&self.buffer);
        let token = self.token.clone();
        let id = self.producers;

        let handle = thread::Builder::new()
            .name(format!("producer-{}", id))
            .spawn(move || {
                while !token.is_cancelled() {
                    let item = produce();
                    if buffer.produce_until(item, &token).is_err() {
                        break;
                    }
                }
                debug!(producer = id, "producer stopped");
            })?;

        self.handles.push(handle);
        self.producers += 1;
        Ok(())
    }

    /// Start a thread that keeps taking items and passing them to `consume`.
    pub fn start_consumer<F>(&mut self, mut consume: F) -> Result<(), PoolError>
    where
        F: FnMut(T) + Send + 'static,
    {
        let buffer = Arc::clone(&self.buffer);
        let token = self.token.clone();
        let id = self.consumers;

        let handle = thread::Builder::new()
            .name(format!("consumer-{}", id))
            .spawn(move || {
                while !token.is_cancelled() {
                    match buffer.consume_until(&token) {
                        Some(item) => consume(item),
                        None => break,
                    }
                }
                debug!(consumer = id, "consumer stopped");
            })?;

        self.handles.push(handle);
        self.consumers += 1;
        Ok(())
    }
}

impl<T> ProducerConsumerSystem<T> {
    pub fn buffer_len(&self) -> usize {
        self.buffer.len()
    }

    pub fn producers(&self) -> usize {
        self.producers
    }

    pub fn consumers(&self) -> usize {
        self.consumers
    }

    /// Cancel every loop and wait for all threads to exit.
    pub fn stop(&mut self) {
        self.token.cancel();
        for handle in self.handles.drain(..) {
            // A panicking user function only takes down its own loop.
            let _ = handle.join();
        }
        debug!(
            producers = self.producers,
            consumers = self.consumers,
            "producer/consumer system stopped"
        );
    }
}

impl<T> Drop for ProducerConsumerSystem<T> {
    fn drop(&mut self) {
        if !self.handles.is_empty() {
            self.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_wraps_around() {
        let mut ring = Ring::with_capacity(2);
        ring.push(1);
        ring.push(2);
        assert!(ring.is_full());
        assert_eq!(ring.pop(), Some(1));
        ring.push(3);
        assert_eq!(ring.pop(), Some(2));
        assert_eq!(ring.pop(), Some(3));
        assert_eq!(ring.pop(), None);
    }

    #[test]
    fn test_produce_until_gives_item_back_when_cancelled() {
        let buffer = BoundedBuffer::new(1);
        let token = CancellationToken::new();
        buffer.produce(1);

        token.cancel();
        assert_eq!(buffer.produce_until(2, &token), Err(2));
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_consume_until_prefers_buffered_items() {
        let buffer = BoundedBuffer::new(2);
        let token = CancellationToken::new();
        buffer.produce("x");
        token.cancel();

        assert_eq!(buffer.consume_until(&token), Some("x"));
        assert_eq!(buffer.consume_until(&token), None);
    }

    #[test]
    #[should_panic(expected = "capacity must be at least 1")]
    fn test_zero_capacity_panics() {
        let _ = BoundedBuffer::<u8>::new(0);
    }
}
