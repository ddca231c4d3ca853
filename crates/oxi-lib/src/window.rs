//! Sliding window

/// Fixed-capacity FIFO history backed by a ring buffer.
///
/// Items are appended at the tail; once the window is full every push
/// overwrites (and returns) the oldest item. Iteration always yields items in
/// insertion order, oldest first.
#[derive(Debug, Clone)]
pub struct SlidingWindow<T> {
    buffer: Vec<T>,
    capacity: usize,
    head: usize,
}

impl<T: Copy> SlidingWindow<T> {
    /// Creates an empty window. The capacity is clamped to at least one item.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buffer: Vec::with_capacity(capacity),
            capacity,
            head: 0,
        }
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.head = 0;
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.buffer.len() == self.capacity
    }

    /// Appends `item`, returning the evicted oldest item when the window was full.
    pub fn push(&mut self, item: T) -> Option<T> {
        if self.buffer.len() < self.capacity {
            self.buffer.push(item);
            return None;
        }
        let old = std::mem::replace(&mut self.buffer[self.head], item);
        self.head = (self.head + 1) % self.capacity;
        Some(old)
    }

    /// Item at logical position `index`, where 0 is the oldest.
    pub fn get(&self, index: usize) -> Option<T> {
        if index >= self.buffer.len() {
            return None;
        }
        Some(self.buffer[(self.head + index) % self.buffer.len()])
    }

    pub fn first(&self) -> Option<T> {
        self.get(0)
    }

    pub fn last(&self) -> Option<T> {
        self.len().checked_sub(1).and_then(|idx| self.get(idx))
    }

    pub fn iter(&self) -> impl Iterator<Item = T> + Clone + '_ {
        let (newer, older) = self.buffer.split_at(self.head);
        older.iter().chain(newer.iter()).copied()
    }

    /// The most recent `n` items (fewer if the window holds less), oldest first.
    pub fn tail(&self, n: usize) -> impl Iterator<Item = T> + Clone + '_ {
        self.iter().skip(self.len().saturating_sub(n))
    }
}

impl<T: Copy + Into<f64>> SlidingWindow<T> {
    pub fn mean(&self) -> Option<f64> {
        mean(self.iter().map(Into::into))
    }

    /// Mean of the most recent `n` items, or of all items when fewer exist.
    pub fn mean_last(&self, n: usize) -> Option<f64> {
        mean(self.tail(n).map(Into::into))
    }

    /// `(min, max)` over the whole window.
    pub fn min_max(&self) -> Option<(f64, f64)> {
        self.iter().map(Into::into).fold(None, |acc, v: f64| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}
