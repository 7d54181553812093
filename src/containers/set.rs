use std::collections::HashSet;
use std::hash::Hash;

use parking_lot::RwLock;

/// Thread-safe hash set.
///
/// `add` and `remove` report whether membership changed; re-adding an
/// existing element is a no-op, not an error. The algebra operations return
/// new sets and leave both operands untouched.
///
/// # Examples
///
/// ```
/// use storeql::containers::Set;
///
/// let left: Set<&str> = ["a", "b"].into_iter().collect();
/// let right: Set<&str> = ["b", "c"].into_iter().collect();
///
/// assert_eq!(left.union(&right).len(), 3);
/// assert!(left.intersection(&right).contains(&"b"));
/// assert!(left.difference(&right).contains(&"a"));
/// ```
#[derive(Debug)]
pub struct Set<T> {
    items: RwLock<HashSet<T>>,
}

impl<T> Default for Set<T> {
    fn default() -> Self {
        Set {
            items: RwLock::new(HashSet::new()),
        }
    }
}

impl<T: Eq + Hash + Clone> Set<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an item; false if it was already present.
    pub fn add(&self, item: T) -> bool {
        self.items.write().insert(item)
    }

    /// Remove an item; false if it was absent.
    pub fn remove(&self, item: &T) -> bool {
        self.items.write().remove(item)
    }

    pub fn contains(&self, item: &T) -> bool {
        self.items.read().contains(item)
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    pub fn clear(&self) {
        self.items.write().clear();
    }

    /// Snapshot of the members, in no particular order.
    pub fn items(&self) -> Vec<T> {
        self.items.read().iter().cloned().collect()
    }

    pub fn union(&self, other: &Set<T>) -> Set<T> {
        let result: Set<T> = self.items().into_iter().collect();
        for item in other.items() {
            result.add(item);
        }
        result
    }

    pub fn intersection(&self, other: &Set<T>) -> Set<T> {
        self.items()
            .into_iter()
            .filter(|item| other.contains(item))
            .collect()
    }

    /// Members of `self` that are not in `other`.
    pub fn difference(&self, other: &Set<T>) -> Set<T> {
        self.items()
            .into_iter()
            .filter(|item| !other.contains(item))
            .collect()
    }
}

impl<T: Eq + Hash> FromIterator<T> for Set<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Set {
            items: RwLock::new(iter.into_iter().collect()),
        }
    }
}
