use parking_lot::RwLock;

use super::ContainerError;

/// Thread-safe LIFO stack.
///
/// # Examples
///
/// ```
/// use storeql::containers::Stack;
///
/// let stack = Stack::new();
/// stack.push(1);
/// stack.push(2);
/// assert_eq!(stack.pop().unwrap(), 2);
/// assert_eq!(stack.len(), 1);
/// ```
#[derive(Debug)]
pub struct Stack<T> {
    items: RwLock<Vec<T>>,
}

impl<T> Default for Stack<T> {
    fn default() -> Self {
        Stack {
            items: RwLock::new(Vec::new()),
        }
    }
}

impl<T> Stack<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push an item on top.
    pub fn push(&self, item: T) {
        self.items.write().push(item);
    }

    /// Remove and return the top item.
    pub fn pop(&self) -> Result<T, ContainerError> {
        self.items
            .write()
            .pop()
            .ok_or(ContainerError::Empty { container: "stack" })
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn clear(&self) {
        self.items.write().clear();
    }
}

impl<T: Clone> Stack<T> {
    /// Return a copy of the top item without removing it.
    pub fn peek(&self) -> Result<T, ContainerError> {
        self.items
            .read()
            .last()
            .cloned()
            .ok_or(ContainerError::Empty { container: "stack" })
    }
}
