use std::collections::LinkedList;

use parking_lot::RwLock;

use super::ContainerError;

/// Thread-safe FIFO queue over linked nodes.
///
/// Enqueue and dequeue are O(1) and never move existing elements.
///
/// # Examples
///
/// ```
/// use storeql::containers::Queue;
///
/// let queue = Queue::new();
/// queue.enqueue("first");
/// queue.enqueue("second");
/// assert_eq!(queue.dequeue().unwrap(), "first");
/// assert_eq!(queue.front().unwrap(), "second");
/// ```
#[derive(Debug)]
pub struct Queue<T> {
    nodes: RwLock<LinkedList<T>>,
}

impl<T> Default for Queue<T> {
    fn default() -> Self {
        Queue {
            nodes: RwLock::new(LinkedList::new()),
        }
    }
}

impl<T> Queue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item at the rear.
    pub fn enqueue(&self, item: T) {
        self.nodes.write().push_back(item);
    }

    /// Remove and return the front item.
    pub fn dequeue(&self) -> Result<T, ContainerError> {
        self.nodes
            .write()
            .pop_front()
            .ok_or(ContainerError::Empty { container: "queue" })
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.read().is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.read().len()
    }

    pub fn clear(&self) {
        self.nodes.write().clear();
    }
}

impl<T: Clone> Queue<T> {
    /// Return a copy of the front item without removing it.
    pub fn front(&self) -> Result<T, ContainerError> {
        self.nodes
            .read()
            .front()
            .cloned()
            .ok_or(ContainerError::Empty { container: "queue" })
    }
}
