use std::collections::{HashSet, VecDeque};

/// A set of strings with a fixed capacity.
///
/// Inserting into a full set evicts the oldest entry first, so memory stays
/// bounded no matter how long the owner lives.
///
/// # Examples
///
/// ```
/// use json_render_util::BoundedSet;
///
/// let mut seen = BoundedSet::new(2);
/// assert!(seen.insert("a"));
/// assert!(!seen.insert("a"));
/// assert!(seen.insert("b"));
/// assert!(seen.insert("c"));
/// assert!(!seen.contains("a"));
/// assert!(seen.contains("c"));
/// ```
#[derive(Debug, Clone)]
pub struct BoundedSet {
    capacity: usize,
    items: HashSet<String>,
    order: VecDeque<String>,
}

impl BoundedSet {
    pub fn new(capacity: usize) -> Self {
        BoundedSet {
            capacity,
            items: HashSet::new(),
            order: VecDeque::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    pub fn contains(&self, item: &str) -> bool {
        self.items.contains(item)
    }

    /// Inserts `item`, returning `true` if it was not already present.
    ///
    /// A zero-capacity set never stores anything and always returns `true`.
    pub fn insert(&mut self, item: &str) -> bool {
        if self.items.contains(item) {
            return false;
        }
        if self.capacity == 0 {
            return true;
        }
        while self.items.len() >= self.capacity {
            match self.order.pop_front() {
                Some(oldest) => {
                    self.items.remove(&oldest);
                }
                None => break,
            }
        }
        self.items.insert(item.to_string());
        self.order.push_back(item.to_string());
        true
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.order.clear();
    }
}
