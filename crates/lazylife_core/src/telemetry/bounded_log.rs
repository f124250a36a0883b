//! Fixed-capacity newest-first ring buffer.

use std::collections::VecDeque;

/// Newest-first sequence holding at most `CAP` entries.
///
/// Pushing onto a full log evicts the oldest entry in O(1).
#[derive(Debug, Clone)]
pub struct BoundedLog<T, const CAP: usize> {
    entries: VecDeque<T>,
}

impl<T, const CAP: usize> Default for BoundedLog<T, CAP> {
    fn default() -> Self {
        Self {
            entries: VecDeque::with_capacity(CAP),
        }
    }
}

impl<T: Clone, const CAP: usize> BoundedLog<T, CAP> {
    pub const CAPACITY: usize = CAP;

    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `item` as the newest entry and returns the evicted oldest
    /// entry, if any.
    pub fn push(&mut self, item: T) -> Option<T> {
        if CAP == 0 {
            return Some(item);
        }
        let evicted = if self.entries.len() == CAP {
            self.entries.pop_back()
        } else {
            None
        };
        self.entries.push_front(item);
        evicted
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Newest entry.
    pub fn first(&self) -> Option<&T> {
        self.entries.front()
    }

    /// Iterates newest to oldest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    /// Owned copy, newest first. Later pushes never show up in it.
    pub fn to_vec(&self) -> Vec<T> {
        self.entries.iter().cloned().collect()
    }
}
