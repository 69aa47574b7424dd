//! Fixed-capacity FIFO history.

use std::collections::VecDeque;

/// Keeps the most recent `capacity` entries, oldest first.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundedHistory<T> {
    entries: VecDeque<T>,
    capacity: usize,
}

impl<T> BoundedHistory<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an entry, evicting the oldest one when full
    pub fn push(&mut self, item: T) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(item);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entries from oldest to newest
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&T> {
        self.entries.back()
    }

    /// The `n`-th most recent entry (0 = newest)
    pub fn recent(&self, n: usize) -> Option<&T> {
        self.entries.iter().rev().nth(n)
    }
}

impl<T: Clone> BoundedHistory<T> {
    /// A copy of this history with `item` appended; `self` is left untouched.
    pub fn pushed(&self, item: T) -> Self {
        let mut next = self.clone();
        next.push(item);
        next
    }
}

impl<'a, T> IntoIterator for &'a BoundedHistory<T> {
    type Item = &'a T;
    type IntoIter = std::collections::vec_deque::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_evicts_oldest() {
        let mut history = BoundedHistory::new(3);
        for i in 1..=5 {
            history.push(i);
        }

        assert_eq!(history.len(), 3);
        assert_eq!(history.iter().copied().collect::<Vec<_>>(), vec![3, 4, 5]);
        assert_eq!(history.last(), Some(&5));
        assert_eq!(history.recent(0), Some(&5));
        assert_eq!(history.recent(2), Some(&3));
        assert_eq!(history.recent(3), None);
    }

    #[test]
    fn test_pushed_leaves_original_untouched() {
        let mut history = BoundedHistory::new(2);
        history.push("a");
        history.push("b");

        let next = history.pushed("c");
        assert_eq!(history.iter().copied().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(next.iter().copied().collect::<Vec<_>>(), vec!["b", "c"]);
    }

    #[test]
    fn test_zero_capacity_keeps_nothing() {
        let mut history = BoundedHistory::new(0);
        history.push(1);
        assert!(history.is_empty());
        assert_eq!(history.last(), None);
    }

    proptest! {
        /// Property: length never exceeds capacity and the newest entries survive in order.
        #[test]
        fn prop_length_bounded_by_capacity(
            capacity in 0usize..16,
            items in proptest::collection::vec(any::<i32>(), 0..64),
        ) {
            let mut history = BoundedHistory::new(capacity);
            for item in &items {
                history.push(*item);
                prop_assert!(history.len() <= capacity);
            }

            let kept = items.len().min(capacity);
            let expected: Vec<i32> = items[items.len() - kept..].to_vec();
            prop_assert_eq!(history.iter().copied().collect::<Vec<_>>(), expected);
        }
    }
}
