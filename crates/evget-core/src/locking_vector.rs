//! Bounded-threshold shared buffer (spec §4.4).
//!
//! A mutex-guarded `Vec<T>` with three linearizable operations: push one,
//! drain everything if a threshold is met, drain everything unconditionally.
//! No partial drains are ever observed: every push either lands in a future
//! drain or is still sitting in the buffer, never both.

use std::sync::Mutex;

/// Thread-safe buffer shared between the [`crate::storage::DatabaseManager`]
/// fast path and its two background flush tasks.
pub struct LockingVector<T> {
    inner: Mutex<Vec<T>>,
}

impl<T> LockingVector<T> {
    pub fn new() -> Self {
        Self { inner: Mutex::new(Vec::new()) }
    }

    /// Append `item`. Never blocks longer than another operation's mutex
    /// hold, which is O(1) for a push and O(n) only for a drain.
    pub fn push_back(&self, item: T) {
        self.inner.lock().expect("locking vector mutex poisoned").push(item);
    }

    /// Atomically take every item if the buffer holds `>= threshold` items;
    /// otherwise leave it untouched and return `None`. The comparison is
    /// inclusive: a buffer of exactly `threshold` items drains.
    pub fn drain_if_at(&self, threshold: usize) -> Option<Vec<T>> {
        let mut guard = self.inner.lock().expect("locking vector mutex poisoned");
        if guard.len() >= threshold {
            Some(std::mem::take(&mut *guard))
        } else {
            None
        }
    }

    /// Atomically take every item if the buffer is non-empty.
    pub fn drain_all(&self) -> Option<Vec<T>> {
        let mut guard = self.inner.lock().expect("locking vector mutex poisoned");
        if guard.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut *guard))
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.inner.lock().expect("locking vector mutex poisoned").len()
    }
}

impl<T> Default for LockingVector<T> {
    fn default() -> Self {
        Self::new()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn drain_if_at_returns_none_below_threshold() {
        let vector = LockingVector::new();
        vector.push_back(1);
        vector.push_back(2);
        assert!(vector.drain_if_at(3).is_none());
        assert_eq!(vector.len(), 2);
    }

    #[test]
    fn drain_if_at_is_inclusive_of_threshold() {
        let vector = LockingVector::new();
        vector.push_back("a");
        vector.push_back("b");
        vector.push_back("c");
        let drained = vector.drain_if_at(3).expect("threshold exactly met");
        assert_eq!(drained, vec!["a", "b", "c"]);
        assert!(vector.drain_all().is_none());
    }

    #[test]
    fn drain_all_empties_buffer_in_push_order() {
        let vector = LockingVector::new();
        for item in 0..5 {
            vector.push_back(item);
        }
        assert_eq!(vector.drain_all(), Some(vec![0, 1, 2, 3, 4]));
        assert!(vector.drain_all().is_none());
    }

    #[test]
    fn concurrent_pushes_are_all_observed_exactly_once() {
        let vector = Arc::new(LockingVector::new());
        let mut handles = Vec::new();
        for worker in 0..8 {
            let vector = vector.clone();
            handles.push(std::thread::spawn(move || {
                for item in 0..100 {
                    vector.push_back(worker * 100 + item);
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        let drained = vector.drain_all().expect("buffer should be non-empty");
        assert_eq!(drained.len(), 800);
        assert!(vector.drain_all().is_none());
    }
}
