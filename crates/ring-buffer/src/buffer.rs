//! Ring Buffer Implementation

use serde::{Deserialize, Serialize};

/// Fixed-capacity FIFO that overwrites its oldest entry when full
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RingBuffer<T> {
    /// Storage, grows up to `capacity` and is then reused in place
    storage: Vec<T>,
    /// Maximum number of retained entries
    capacity: usize,
    /// Index of the oldest entry once the buffer has wrapped
    head: usize,
}

impl<T> RingBuffer<T> {
    /// Create a new ring buffer holding at most `capacity` entries.
    ///
    /// A zero capacity is bumped to one so the buffer is never unusable.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            storage: Vec::with_capacity(capacity),
            capacity,
            head: 0,
        }
    }

    /// Push a value, returning the evicted oldest value if the buffer was full
    pub fn push(&mut self, value: T) -> Option<T> {
        if self.storage.len() < self.capacity {
            self.storage.push(value);
            return None;
        }

        let evicted = std::mem::replace(&mut self.storage[self.head], value);
        self.head = (self.head + 1) % self.capacity;
        Some(evicted)
    }

    /// Number of entries currently held
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Iterate from oldest to newest
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            buffer: self,
            front: 0,
            back: self.storage.len(),
        }
    }

    /// Drop all entries, keeping the capacity
    pub fn clear(&mut self) {
        self.storage.clear();
        self.head = 0;
    }
}

impl<T: Clone> RingBuffer<T> {
    /// Copy the contents out, oldest first
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }
}

/// Oldest-to-newest iterator over a [`RingBuffer`]
pub struct Iter<'a, T> {
    buffer: &'a RingBuffer<T>,
    /// Logical offset of the next entry from the front
    front: usize,
    /// Logical offset one past the next entry from the back
    back: usize,
}

impl<'a, T> Iter<'a, T> {
    fn slot(&self, offset: usize) -> Option<&'a T> {
        let len = self.buffer.storage.len();
        self.buffer.storage.get((self.buffer.head + offset) % len)
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        let item = self.slot(self.front);
        self.front += 1;
        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        self.slot(self.back)
    }
}

impl<'a, T> ExactSizeIterator for Iter<'a, T> {}
